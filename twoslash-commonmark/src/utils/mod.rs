pub mod codeblock;

/// Slugify a string for use as a CSS class or anchor ID.
/// Converts to lowercase, replaces non-alphanumeric characters with dashes,
/// and trims leading/trailing dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
  text
    .to_lowercase()
    .replace(|c: char| !c.is_alphanumeric() && c != '-' && c != '_', "-")
    .trim_matches('-')
    .to_string()
}

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile.
/// It will never match any input, which is safer than using a trivial regex
/// like `^$` which would match empty strings.
///
/// # Panics
///
/// Panics if the fallback regex pattern `r"^\b$"` fails to compile, which
/// should never happen.
#[must_use]
#[allow(clippy::unwrap_used, reason = "Both patterns are known to be valid")]
pub fn never_matching_regex() -> regex::Regex {
  regex::Regex::new(r"[^\s\S]")
    .unwrap_or_else(|_| regex::Regex::new(r"^\b$").unwrap())
}

/// Compile a static pattern, logging and substituting
/// [`never_matching_regex`] if it is invalid.
#[must_use]
pub fn compile_or_never(pattern: &str) -> regex::Regex {
  regex::Regex::new(pattern).unwrap_or_else(|e| {
    log::error!("Failed to compile regex '{pattern}': {e}");
    never_matching_regex()
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_slugify() {
    assert_eq!(slugify("InspiredGitHub"), "inspiredgithub");
    assert_eq!(slugify("Solarized (dark)"), "solarized--dark");
    assert_eq!(slugify("--already-slug--"), "already-slug");
  }

  #[test]
  fn test_never_matching_regex() {
    let re = never_matching_regex();
    assert!(!re.is_match(""));
    assert!(!re.is_match("anything"));
  }

  #[test]
  fn test_compile_or_never_with_bad_pattern() {
    let re = compile_or_never("(unclosed");
    assert!(!re.is_match("(unclosed"));
    assert!(compile_or_never("a+").is_match("aaa"));
  }
}
