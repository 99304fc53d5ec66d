//! Core types and traits for syntax highlighting.

use std::collections::HashMap;

use super::error::{SyntaxError, SyntaxResult};

/// Trait for syntax highlighting backends.
///
/// Allows different syntax highlighting implementations to be used
/// interchangeably. Implementations report the languages they know and do
/// the actual highlighting.
pub trait SyntaxHighlighter: Send + Sync {
  /// Get the name of this highlighter backend
  fn name(&self) -> &'static str;

  /// Get a list of supported languages
  fn supported_languages(&self) -> Vec<String>;

  /// Check if a language is supported
  fn supports_language(&self, language: &str) -> bool {
    self
      .supported_languages()
      .iter()
      .any(|lang| lang.eq_ignore_ascii_case(language))
  }

  /// Highlight code line by line.
  ///
  /// # Arguments
  ///
  /// * `code` - The source code to highlight
  /// * `language` - The programming language (case-insensitive)
  /// * `theme` - The theme name (case-insensitive, optional)
  ///
  /// # Returns
  ///
  /// One HTML fragment per source line, without the line terminator. The
  /// fragments only contain inline markup so callers can wrap them freely.
  fn highlight_lines(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<Vec<String>>;

  /// Inline CSS for the container of a highlighted block, usually the theme's
  /// foreground and background colours.
  fn theme_style(&self, _theme: Option<&str>) -> Option<String> {
    None
  }
}

/// Configuration for syntax highlighting
#[derive(Debug, Clone)]
pub struct SyntaxConfig {
  /// Default theme to use when none is specified
  pub default_theme: Option<String>,

  /// Language aliases for mapping common names to supported languages
  pub language_aliases: HashMap<String, String>,

  /// Whether to fall back to plain text for unsupported languages
  pub fallback_to_plain: bool,
}

impl Default for SyntaxConfig {
  fn default() -> Self {
    let mut language_aliases = HashMap::new();

    language_aliases.insert("js".to_string(), "javascript".to_string());
    language_aliases.insert("ts".to_string(), "typescript".to_string());
    language_aliases.insert("py".to_string(), "python".to_string());
    language_aliases.insert("rb".to_string(), "ruby".to_string());
    language_aliases.insert("sh".to_string(), "bash".to_string());
    language_aliases.insert("shell".to_string(), "bash".to_string());
    language_aliases.insert("yml".to_string(), "yaml".to_string());
    language_aliases.insert("md".to_string(), "markdown".to_string());
    language_aliases.insert("text".to_string(), "txt".to_string());
    language_aliases.insert("plain".to_string(), "txt".to_string());

    Self {
      default_theme: None,
      language_aliases,
      fallback_to_plain: true,
    }
  }
}

/// High-level syntax highlighting manager.
///
/// Manages a syntax highlighting backend and provides a convenient
/// interface for highlighting code with configuration options.
pub struct SyntaxManager {
  highlighter: Box<dyn SyntaxHighlighter>,
  config:      SyntaxConfig,
}

impl SyntaxManager {
  /// Create a new syntax manager with the given highlighter and config
  #[must_use]
  pub fn new(
    highlighter: Box<dyn SyntaxHighlighter>,
    config: SyntaxConfig,
  ) -> Self {
    Self {
      highlighter,
      config,
    }
  }

  /// Create a new syntax manager with the default configuration
  #[must_use]
  pub fn with_highlighter(highlighter: Box<dyn SyntaxHighlighter>) -> Self {
    Self::new(highlighter, SyntaxConfig::default())
  }

  /// Resolve a language name using aliases
  #[must_use]
  pub fn resolve_language(&self, language: &str) -> String {
    let lowered = language.to_lowercase();
    self
      .config
      .language_aliases
      .get(&lowered)
      .cloned()
      .unwrap_or(lowered)
  }

  /// Resolve the theme to use, falling back to the configured default.
  #[must_use]
  pub fn resolve_theme<'a>(
    &'a self,
    theme: Option<&'a str>,
  ) -> Option<&'a str> {
    theme.or(self.config.default_theme.as_deref())
  }

  /// Highlight code line by line with automatic language resolution and
  /// fallback.
  ///
  /// # Errors
  ///
  /// Returns an error if the language is unsupported and plain-text fallback
  /// is disabled, or if the backend fails.
  pub fn highlight_lines(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<Vec<String>> {
    let resolved_language = self.resolve_language(language);
    let theme = self.resolve_theme(theme);

    if self.highlighter.supports_language(&resolved_language) {
      return self
        .highlighter
        .highlight_lines(code, &resolved_language, theme);
    }

    if self.config.fallback_to_plain {
      log::debug!(
        "No syntax for '{resolved_language}', highlighting as plain text"
      );
      return self.highlighter.highlight_lines(code, "txt", theme);
    }

    Err(SyntaxError::UnsupportedLanguage(resolved_language))
  }

  /// Inline CSS for a highlighted block container in the given theme.
  #[must_use]
  pub fn theme_style(&self, theme: Option<&str>) -> Option<String> {
    self.highlighter.theme_style(self.resolve_theme(theme))
  }
}
