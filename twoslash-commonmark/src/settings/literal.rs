//! A data-only parser for JavaScript object literals.
//!
//! Twoslash settings are written as JavaScript (`{theme: "dark", errors:
//! [2322],}`) rather than strict JSON. This parser accepts that notation and
//! produces a [`serde_json::Value`] without evaluating anything: only objects,
//! arrays, strings, numbers, booleans, `null`/`undefined` and comments are
//! understood.

use serde_json::{Map, Number, Value};

/// Error raised when a literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct LiteralError {
  /// What went wrong.
  pub message: String,
  /// Byte offset into the literal where parsing stopped.
  pub offset:  usize,
}

/// Parse a JavaScript object/array/scalar literal into a JSON value.
///
/// A single trailing `;` is tolerated, since settings are commonly copied from
/// JavaScript statements.
///
/// # Errors
///
/// Returns a [`LiteralError`] describing the first syntax error encountered.
///
/// # Examples
///
/// ```
/// use twoslash_commonmark::settings::parse_literal;
///
/// let value = parse_literal("{theme: 'dark', errors: [2322,],}").unwrap();
/// assert_eq!(value["theme"], "dark");
/// assert_eq!(value["errors"][0], 2322);
/// ```
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
  let mut parser = Parser { src: input, pos: 0 };
  parser.skip_trivia()?;
  let value = parser.parse_value(0)?;
  parser.skip_trivia()?;
  if parser.peek() == Some(';') {
    parser.bump();
    parser.skip_trivia()?;
  }
  if parser.pos < parser.src.len() {
    return Err(parser.error("unexpected trailing input"));
  }
  Ok(value)
}

/// Nesting beyond this depth is rejected rather than risking the stack.
const MAX_DEPTH: usize = 128;

struct Parser<'a> {
  src: &'a str,
  pos: usize,
}

impl<'a> Parser<'a> {
  fn error(&self, message: impl Into<String>) -> LiteralError {
    LiteralError {
      message: message.into(),
      offset:  self.pos,
    }
  }

  fn peek(&self) -> Option<char> {
    self.src[self.pos..].chars().next()
  }

  fn peek_second(&self) -> Option<char> {
    self.src[self.pos..].chars().nth(1)
  }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.pos += c.len_utf8();
    Some(c)
  }

  fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
    match self.peek() {
      Some(c) if c == expected => {
        self.bump();
        Ok(())
      },
      Some(c) => {
        Err(self.error(format!("expected '{expected}', found '{c}'")))
      },
      None => {
        Err(self.error(format!(
          "expected '{expected}', found end of input"
        )))
      },
    }
  }

  /// Skip whitespace and `//`/`/* */` comments.
  fn skip_trivia(&mut self) -> Result<(), LiteralError> {
    loop {
      match (self.peek(), self.peek_second()) {
        (Some(c), _) if c.is_whitespace() => {
          self.bump();
        },
        (Some('/'), Some('/')) => {
          while let Some(c) = self.bump() {
            if c == '\n' {
              break;
            }
          }
        },
        (Some('/'), Some('*')) => {
          let start = self.pos;
          self.pos += 2;
          match self.src[self.pos..].find("*/") {
            Some(end) => self.pos += end + 2,
            None => {
              self.pos = start;
              return Err(self.error("unterminated block comment"));
            },
          }
        },
        _ => return Ok(()),
      }
    }
  }

  fn parse_value(&mut self, depth: usize) -> Result<Value, LiteralError> {
    if depth > MAX_DEPTH {
      return Err(self.error("literal is nested too deeply"));
    }

    match self.peek() {
      Some('{') => self.parse_object(depth),
      Some('[') => self.parse_array(depth),
      Some(quote @ ('"' | '\'' | '`')) => {
        self.parse_string(quote).map(Value::String)
      },
      Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => {
        self.parse_number()
      },
      Some(c) if is_ident_start(c) => {
        let start = self.pos;
        let ident = self.parse_identifier();
        match ident {
          "true" => Ok(Value::Bool(true)),
          "false" => Ok(Value::Bool(false)),
          "null" | "undefined" => Ok(Value::Null),
          other => {
            self.pos = start;
            Err(self.error(format!(
              "'{other}' is not a literal value; only data is allowed in \
               settings"
            )))
          },
        }
      },
      Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
      None => Err(self.error("unexpected end of input")),
    }
  }

  fn parse_object(&mut self, depth: usize) -> Result<Value, LiteralError> {
    self.expect('{')?;
    let mut map = Map::new();

    loop {
      self.skip_trivia()?;
      if self.peek() == Some('}') {
        self.bump();
        return Ok(Value::Object(map));
      }

      let key = self.parse_key()?;
      self.skip_trivia()?;
      self.expect(':')?;
      self.skip_trivia()?;
      let value = self.parse_value(depth + 1)?;
      map.insert(key, value);

      self.skip_trivia()?;
      match self.peek() {
        Some(',') => {
          self.bump();
        },
        Some('}') => {},
        Some(c) => {
          return Err(self.error(format!("expected ',' or '}}', found '{c}'")));
        },
        None => return Err(self.error("unterminated object")),
      }
    }
  }

  fn parse_key(&mut self) -> Result<String, LiteralError> {
    match self.peek() {
      Some(quote @ ('"' | '\'')) => self.parse_string(quote),
      Some(c) if is_ident_start(c) => Ok(self.parse_identifier().to_string()),
      Some(c) if c.is_ascii_digit() => {
        match self.parse_number()? {
          Value::Number(n) => Ok(n.to_string()),
          _ => Err(self.error("invalid numeric key")),
        }
      },
      Some(c) => {
        Err(self.error(format!("expected a property name, found '{c}'")))
      },
      None => Err(self.error("unterminated object")),
    }
  }

  fn parse_array(&mut self, depth: usize) -> Result<Value, LiteralError> {
    self.expect('[')?;
    let mut items = Vec::new();

    loop {
      self.skip_trivia()?;
      if self.peek() == Some(']') {
        self.bump();
        return Ok(Value::Array(items));
      }

      items.push(self.parse_value(depth + 1)?);

      self.skip_trivia()?;
      match self.peek() {
        Some(',') => {
          self.bump();
        },
        Some(']') => {},
        Some(c) => {
          return Err(self.error(format!("expected ',' or ']', found '{c}'")));
        },
        None => return Err(self.error("unterminated array")),
      }
    }
  }

  fn parse_identifier(&mut self) -> &'a str {
    let start = self.pos;
    while let Some(c) = self.peek() {
      if is_ident_continue(c) {
        self.bump();
      } else {
        break;
      }
    }
    &self.src[start..self.pos]
  }

  fn parse_string(&mut self, quote: char) -> Result<String, LiteralError> {
    let start = self.pos;
    self.bump();
    let mut out = String::new();

    loop {
      let Some(c) = self.bump() else {
        self.pos = start;
        return Err(self.error("unterminated string"));
      };

      match c {
        c if c == quote => return Ok(out),
        '\\' => self.parse_escape(&mut out)?,
        '$' if quote == '`' && self.peek() == Some('{') => {
          return Err(
            self.error("template literal interpolation is not allowed"),
          );
        },
        '\n' if quote != '`' => {
          return Err(self.error("unescaped newline in string"));
        },
        c => out.push(c),
      }
    }
  }

  fn parse_escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
    let Some(c) = self.bump() else {
      return Err(self.error("unterminated escape sequence"));
    };

    match c {
      'n' => out.push('\n'),
      't' => out.push('\t'),
      'r' => out.push('\r'),
      'b' => out.push('\u{0008}'),
      'f' => out.push('\u{000C}'),
      'v' => out.push('\u{000B}'),
      '0' => out.push('\0'),
      // Line continuation
      '\n' => {},
      '\r' => {
        if self.peek() == Some('\n') {
          self.bump();
        }
      },
      'x' => {
        let code = self.parse_hex_digits(2)?;
        out.push(self.char_from(code)?);
      },
      'u' => {
        let code = if self.peek() == Some('{') {
          self.bump();
          let start = self.pos;
          while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.bump();
          }
          let digits = &self.src[start..self.pos];
          self.expect('}')?;
          u32::from_str_radix(digits, 16)
            .map_err(|_| self.error("invalid unicode escape"))?
        } else {
          self.parse_hex_digits(4)?
        };
        out.push(self.char_from(code)?);
      },
      other => out.push(other),
    }
    Ok(())
  }

  fn parse_hex_digits(&mut self, count: usize) -> Result<u32, LiteralError> {
    let start = self.pos;
    for _ in 0..count {
      match self.peek() {
        Some(c) if c.is_ascii_hexdigit() => {
          self.bump();
        },
        _ => return Err(self.error("invalid hexadecimal escape")),
      }
    }
    u32::from_str_radix(&self.src[start..self.pos], 16)
      .map_err(|_| self.error("invalid hexadecimal escape"))
  }

  fn char_from(&self, code: u32) -> Result<char, LiteralError> {
    char::from_u32(code)
      .ok_or_else(|| self.error(format!("invalid character code {code:#x}")))
  }

  fn parse_number(&mut self) -> Result<Value, LiteralError> {
    let start = self.pos;
    let negative = match self.peek() {
      Some('-') => {
        self.bump();
        true
      },
      Some('+') => {
        self.bump();
        false
      },
      _ => false,
    };

    if self.peek() == Some('0')
      && matches!(self.peek_second(), Some('x' | 'X'))
    {
      self.pos += 2;
      let digits_start = self.pos;
      while self.peek().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
        self.bump();
      }
      let digits = self.src[digits_start..self.pos].replace('_', "");
      let magnitude = i64::from_str_radix(&digits, 16).map_err(|_| {
        LiteralError {
          message: "invalid hexadecimal number".to_string(),
          offset:  start,
        }
      })?;
      return Ok(Value::Number(Number::from(if negative {
        -magnitude
      } else {
        magnitude
      })));
    }

    let mut is_integer = true;
    while let Some(c) = self.peek() {
      match c {
        '0'..='9' | '_' => {},
        '.' | 'e' | 'E' => is_integer = false,
        '+' | '-'
          if matches!(
            self.src[..self.pos].chars().last(),
            Some('e' | 'E')
          ) => {},
        _ => break,
      }
      self.bump();
    }

    let text = self.src[start..self.pos].replace('_', "");
    let invalid = || {
      LiteralError {
        message: format!("invalid number '{text}'"),
        offset:  start,
      }
    };

    if is_integer && let Ok(n) = text.parse::<i64>() {
      return Ok(Value::Number(Number::from(n)));
    }

    let float = text.parse::<f64>().map_err(|_| invalid())?;
    Number::from_f64(float).map(Value::Number).ok_or_else(invalid)
  }
}

const fn is_ident_start(c: char) -> bool {
  c.is_ascii_alphabetic() || c == '_' || c == '$'
}

const fn is_ident_continue(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use serde_json::json;

  use super::*;

  #[test]
  fn test_parses_unquoted_keys_and_single_quotes() {
    let value = parse_literal("{theme: 'dark', wrapFragments: true}").unwrap();
    assert_eq!(value, json!({"theme": "dark", "wrapFragments": true}));
  }

  #[test]
  fn test_parses_strict_json() {
    let value = parse_literal(r#"{"a": [1, 2.5, null], "b": {"c": false}}"#)
      .unwrap();
    assert_eq!(value, json!({"a": [1, 2.5, null], "b": {"c": false}}));
  }

  #[test]
  fn test_trailing_commas_and_comments() {
    let value = parse_literal(
      "{\n  // the theme\n  theme: \"nord\", /* inline */\n  themes: \
       ['a', 'b',],\n}",
    )
    .unwrap();
    assert_eq!(value, json!({"theme": "nord", "themes": ["a", "b"]}));
  }

  #[test]
  fn test_trailing_semicolon_is_tolerated() {
    assert_eq!(parse_literal("{a: 1};").unwrap(), json!({"a": 1}));
  }

  #[test]
  fn test_numbers() {
    let value =
      parse_literal("[-1, +2, 0x1F, 1e3, .5, 1_000, -0.25]").unwrap();
    assert_eq!(value, json!([-1, 2, 31, 1000.0, 0.5, 1000, -0.25]));
  }

  #[test]
  fn test_string_escapes() {
    let value = parse_literal(r#"["a\nb", 'it\'s', "A\x42\u{43}"]"#)
      .unwrap();
    assert_eq!(value, json!(["a\nb", "it's", "ABC"]));
  }

  #[test]
  fn test_undefined_becomes_null() {
    assert_eq!(parse_literal("{a: undefined}").unwrap(), json!({"a": null}));
  }

  #[test]
  fn test_rejects_code() {
    let err = parse_literal("{a: process.exit(1)}").unwrap_err();
    assert!(err.message.contains("process"));
    assert_eq!(err.offset, 4);
  }

  #[test]
  fn test_rejects_template_interpolation() {
    assert!(parse_literal("{a: `${x}`}").is_err());
    assert_eq!(parse_literal("{a: `plain`}").unwrap(), json!({"a": "plain"}));
  }

  #[test]
  fn test_unterminated_object() {
    let err = parse_literal("{bad syntax").unwrap_err();
    assert!(err.message.contains("expected ':'"));
  }

  #[test]
  fn test_trailing_input() {
    let err = parse_literal("{a: 1} + 2").unwrap_err();
    assert!(err.message.contains("trailing"));
  }

  #[test]
  fn test_unterminated_string() {
    let err = parse_literal("{a: 'oops}").unwrap_err();
    assert!(err.message.contains("unterminated string"));
    assert_eq!(err.offset, 4);
  }

  #[test]
  fn test_deep_nesting_is_rejected() {
    let input = "[".repeat(MAX_DEPTH + 2);
    let err = parse_literal(&input).unwrap_err();
    assert!(err.message.contains("nested too deeply"));
  }
}
