//! Parsing of the Twoslash notation inside a code sample.
//!
//! ```ts
//! // @errors: 2322
//! // @target: ES2020
//! const hidden = 1;
//! // ---cut---
//! const shown: string = hidden;
//! //    ^?
//! ```
//!
//! Markup lines are removed from the sample. `---cut---` hides everything
//! above it from display while keeping it in the code that is checked.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::{settings::TwoslashSettings, utils::compile_or_never};

static OPTION_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never(r"^//\s*@([A-Za-z]\w*)(?::\s*(.*))?$"));

static QUERY_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never(r"^\s*//\s*\^\?\s*$"));

static ERROR_CODE_SPLIT_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never(r"[\s,]+"));

/// Errors in the notation of a sample.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
  #[error("'{code}' is not a valid diagnostic code in `// @errors`")]
  InvalidErrorCode { code: String },

  #[error("`^?` query on line {line} has no code line above it")]
  QueryWithoutLine { line: usize },

  #[error("`// @{name}` expects true or false, got '{value}'")]
  InvalidFlag { name: String, value: String },
}

/// Options that control how diagnostics of a sample are treated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandbookOptions {
  /// Diagnostic codes the sample is expected to raise.
  pub errors:              Vec<u32>,
  /// Hide all diagnostics.
  pub no_errors:           bool,
  /// Show diagnostics but do not fail on unexpected or missing ones.
  pub no_error_validation: bool,
}

/// A `^?` request for the type under a caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
  /// Zero-based line in the checked code.
  pub line:   usize,
  /// Zero-based character column of the caret.
  pub column: usize,
}

/// A Twoslash code sample with its markup stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoslashSample {
  /// Language tag of the fence (`ts`, `tsx`, `js`, ...).
  pub language:         String,
  /// Every non-markup line, which is what gets type checked.
  pub lines:            Vec<String>,
  /// First line of `lines` that is displayed.
  pub display_start:    usize,
  /// One past the last line of `lines` that is displayed.
  pub display_end:      usize,
  pub handbook:         HandbookOptions,
  /// Compiler options, defaults first then the sample's own.
  pub compiler_options: Map<String, Value>,
  pub queries:          Vec<Query>,
}

impl TwoslashSample {
  /// Parse the body of a Twoslash fence.
  ///
  /// `settings` supplies default handbook and compiler options; anything the
  /// sample declares itself takes precedence.
  ///
  /// # Errors
  ///
  /// Returns a [`MarkupError`] for malformed `// @errors` codes, boolean
  /// flags with a non-boolean value, or a `^?` query with nothing above it.
  pub fn parse(
    code: &str,
    language: &str,
    settings: &TwoslashSettings,
  ) -> Result<Self, MarkupError> {
    let defaults = &settings.default_options;
    let mut handbook = HandbookOptions {
      errors:              defaults.errors.clone(),
      no_errors:           defaults.no_errors,
      no_error_validation: defaults.no_error_validation,
    };
    let mut declared_errors: Option<Vec<u32>> = None;
    let mut compiler_options = settings.default_compiler_options.clone();

    let mut lines: Vec<String> = Vec::new();
    let mut queries = Vec::new();
    let mut display_start = 0;
    let mut display_end = None;

    for (index, raw) in code.lines().enumerate() {
      let trimmed = raw.trim();

      match trimmed {
        "// ---cut---" | "// ---cut-before---" => {
          display_start = lines.len();
          continue;
        },
        "// ---cut-after---" => {
          display_end = Some(lines.len());
          continue;
        },
        _ => {},
      }

      if QUERY_RE.is_match(raw) {
        if lines.is_empty() {
          return Err(MarkupError::QueryWithoutLine { line: index + 1 });
        }
        let column = raw
          .find('^')
          .map_or(0, |byte| raw[..byte].chars().count());
        queries.push(Query {
          line: lines.len() - 1,
          column,
        });
        continue;
      }

      if let Some(caps) = OPTION_RE.captures(trimmed) {
        let name = &caps[1];
        let value = caps.get(2).map(|m| m.as_str().trim());

        match name {
          "errors" => {
            let codes = declared_errors.get_or_insert_with(Vec::new);
            for code in ERROR_CODE_SPLIT_RE
              .split(value.unwrap_or_default())
              .filter(|code| !code.is_empty())
            {
              let parsed = code.parse::<u32>().map_err(|_| {
                MarkupError::InvalidErrorCode {
                  code: code.to_string(),
                }
              })?;
              codes.push(parsed);
            }
          },
          "noErrors" => handbook.no_errors = parse_flag(name, value)?,
          "noErrorValidation" => {
            handbook.no_error_validation = parse_flag(name, value)?;
          },
          _ => {
            compiler_options
              .insert(name.to_string(), parse_option_value(value));
          },
        }
        continue;
      }

      lines.push(raw.to_string());
    }

    if let Some(errors) = declared_errors {
      handbook.errors = errors;
    }

    let display_end = display_end.unwrap_or(lines.len()).max(display_start);

    Ok(Self {
      language: language.to_string(),
      lines,
      display_start,
      display_end,
      handbook,
      compiler_options,
      queries,
    })
  }

  /// The code that is type checked.
  #[must_use]
  pub fn checked_code(&self) -> String {
    let mut code = self.lines.join("\n");
    code.push('\n');
    code
  }

  /// The lines that are shown to readers.
  #[must_use]
  pub fn display_lines(&self) -> &[String] {
    &self.lines[self.display_start..self.display_end]
  }

  /// The code that is shown to readers.
  #[must_use]
  pub fn display_code(&self) -> String {
    self.display_lines().join("\n")
  }

  /// Whether a line of the checked code is displayed.
  #[must_use]
  pub const fn is_displayed(&self, line: usize) -> bool {
    line >= self.display_start && line < self.display_end
  }

  /// File extension used when handing the sample to a checker.
  #[must_use]
  pub fn file_extension(&self) -> &str {
    match self.language.as_str() {
      "js" | "javascript" => "js",
      "jsx" => "jsx",
      "tsx" => "tsx",
      _ => "ts",
    }
  }
}

fn parse_flag(name: &str, value: Option<&str>) -> Result<bool, MarkupError> {
  match value {
    None | Some("" | "true") => Ok(true),
    Some("false") => Ok(false),
    Some(other) => {
      Err(MarkupError::InvalidFlag {
        name:  name.to_string(),
        value: other.to_string(),
      })
    },
  }
}

/// Interpret a `// @option: value` value: booleans and numbers are typed,
/// anything else stays a string. A bare `// @option` means `true`.
fn parse_option_value(value: Option<&str>) -> Value {
  match value {
    None | Some("" | "true") => Value::Bool(true),
    Some("false") => Value::Bool(false),
    Some(text) => {
      if let Ok(n) = text.parse::<i64>() {
        return Value::Number(Number::from(n));
      }
      text
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(text.to_string()), Value::Number)
    },
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use serde_json::json;

  use super::*;

  fn parse(code: &str) -> TwoslashSample {
    TwoslashSample::parse(code, "ts", &TwoslashSettings::default()).unwrap()
  }

  #[test]
  fn test_plain_code_is_untouched() {
    let sample = parse("const a = 1;\nconst b = 2;");
    assert_eq!(sample.display_code(), "const a = 1;\nconst b = 2;");
    assert_eq!(sample.checked_code(), "const a = 1;\nconst b = 2;\n");
    assert!(sample.queries.is_empty());
  }

  #[test]
  fn test_cut_hides_preceding_lines() {
    let sample =
      parse("const hidden = 1;\n// ---cut---\nconst shown = hidden;");
    assert_eq!(sample.display_code(), "const shown = hidden;");
    assert!(sample.checked_code().contains("const hidden = 1;"));
    assert!(!sample.checked_code().contains("---cut---"));
    assert!(!sample.is_displayed(0));
    assert!(sample.is_displayed(1));
  }

  #[test]
  fn test_cut_after_hides_following_lines() {
    let sample = parse("const a = 1;\n// ---cut-after---\nexport {};");
    assert_eq!(sample.display_code(), "const a = 1;");
    assert!(sample.checked_code().contains("export {};"));
  }

  #[test]
  fn test_errors_option() {
    let sample = parse("// @errors: 2322, 2345\nconst a: string = 1;");
    assert_eq!(sample.handbook.errors, vec![2322, 2345]);
    assert_eq!(sample.display_code(), "const a: string = 1;");
  }

  #[test]
  fn test_invalid_error_code() {
    let err = TwoslashSample::parse(
      "// @errors: twenty\nconst a = 1;",
      "ts",
      &TwoslashSettings::default(),
    )
    .unwrap_err();
    assert_eq!(err, MarkupError::InvalidErrorCode {
      code: "twenty".to_string(),
    });
  }

  #[test]
  fn test_handbook_flags() {
    let sample = parse("// @noErrors\n// @noErrorValidation: false\nlet x;");
    assert!(sample.handbook.no_errors);
    assert!(!sample.handbook.no_error_validation);
  }

  #[test]
  fn test_compiler_options_are_typed() {
    let sample = parse(
      "// @strict: false\n// @target: ES2020\n// @maxNodeModuleJsDepth: \
       2\n// @esModuleInterop\nlet x;",
    );
    assert_eq!(sample.compiler_options["strict"], json!(false));
    assert_eq!(sample.compiler_options["target"], json!("ES2020"));
    assert_eq!(sample.compiler_options["maxNodeModuleJsDepth"], json!(2));
    assert_eq!(sample.compiler_options["esModuleInterop"], json!(true));
    assert_eq!(sample.display_code(), "let x;");
  }

  #[test]
  fn test_ts_comment_directives_are_code() {
    let sample = parse(
      "// @ts-expect-error\nconst a: string = 1;\n// @ts-ignore\nlet b;",
    );
    assert!(sample.compiler_options.is_empty());
    assert_eq!(sample.lines, vec![
      "// @ts-expect-error",
      "const a: string = 1;",
      "// @ts-ignore",
      "let b;",
    ]);
    assert!(sample.checked_code().starts_with("// @ts-expect-error\n"));
  }

  #[test]
  fn test_query_attaches_to_previous_line() {
    let sample = parse("const hello = 'hi';\n//    ^?\nconst b = 1;");
    assert_eq!(sample.queries, vec![Query { line: 0, column: 6 }]);
    assert_eq!(sample.lines.len(), 2);
  }

  #[test]
  fn test_query_without_line() {
    let err = TwoslashSample::parse("// ^?", "ts", &TwoslashSettings::default())
      .unwrap_err();
    assert_eq!(err, MarkupError::QueryWithoutLine { line: 1 });
  }

  #[test]
  fn test_defaults_from_settings() {
    let settings = TwoslashSettings::from_value(json!({
      "defaultOptions": {"errors": [2304]},
      "defaultCompilerOptions": {"strict": false},
    }))
    .unwrap();

    let sample = TwoslashSample::parse("x;", "ts", &settings).unwrap();
    assert_eq!(sample.handbook.errors, vec![2304]);
    assert_eq!(sample.compiler_options["strict"], json!(false));

    let sample =
      TwoslashSample::parse("// @errors: 2322\n// @strict\nx;", "ts", &settings)
        .unwrap();
    assert_eq!(sample.handbook.errors, vec![2322]);
    assert_eq!(sample.compiler_options["strict"], json!(true));
  }

  #[test]
  fn test_file_extension() {
    let settings = TwoslashSettings::default();
    let ext = |lang| {
      TwoslashSample::parse("x", lang, &settings)
        .unwrap()
        .file_extension()
        .to_string()
    };
    assert_eq!(ext("js"), "js");
    assert_eq!(ext("tsx"), "tsx");
    assert_eq!(ext("typescript"), "ts");
  }
}
