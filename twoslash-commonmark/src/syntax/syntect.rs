//! Syntect-based syntax highlighting backend enhanced with two-face.
//!
//! Uses Sublime Text syntax definitions (TextMate grammars) from syntect,
//! extended with the two-face syntax and theme sets, which bring in
//! TypeScript, TSX and a much larger selection of themes.

use std::sync::OnceLock;

use syntect::{
  easy::HighlightLines,
  highlighting::{Color, Theme, ThemeSet},
  html::{IncludeBackground, styled_line_to_highlighted_html},
  parsing::SyntaxSet,
  util::LinesWithEndings,
};
use two_face::theme::{EmbeddedLazyThemeSet, EmbeddedThemeName};

use super::{
  error::{SyntaxError, SyntaxResult},
  types::{SyntaxConfig, SyntaxHighlighter, SyntaxManager},
};

/// Theme used when nothing else is requested or the request is unknown.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Themes shipped by two-face, keyed by the name users put in settings.
const EMBEDDED_THEMES: &[(&str, EmbeddedThemeName)] = &[
  ("Ansi", EmbeddedThemeName::Ansi),
  ("Base16", EmbeddedThemeName::Base16),
  ("Base16EightiesDark", EmbeddedThemeName::Base16EightiesDark),
  ("Base16MochaDark", EmbeddedThemeName::Base16MochaDark),
  ("Base16OceanDark", EmbeddedThemeName::Base16OceanDark),
  ("Base16OceanLight", EmbeddedThemeName::Base16OceanLight),
  ("Base16_256", EmbeddedThemeName::Base16_256),
  ("ColdarkCold", EmbeddedThemeName::ColdarkCold),
  ("ColdarkDark", EmbeddedThemeName::ColdarkDark),
  ("DarkNeon", EmbeddedThemeName::DarkNeon),
  ("Dracula", EmbeddedThemeName::Dracula),
  ("Github", EmbeddedThemeName::Github),
  ("GruvboxDark", EmbeddedThemeName::GruvboxDark),
  ("GruvboxLight", EmbeddedThemeName::GruvboxLight),
  ("InspiredGithub", EmbeddedThemeName::InspiredGithub),
  ("Leet", EmbeddedThemeName::Leet),
  ("MonokaiExtended", EmbeddedThemeName::MonokaiExtended),
  ("MonokaiExtendedBright", EmbeddedThemeName::MonokaiExtendedBright),
  ("MonokaiExtendedLight", EmbeddedThemeName::MonokaiExtendedLight),
  ("MonokaiExtendedOrigin", EmbeddedThemeName::MonokaiExtendedOrigin),
  ("Nord", EmbeddedThemeName::Nord),
  ("OneHalfDark", EmbeddedThemeName::OneHalfDark),
  ("OneHalfLight", EmbeddedThemeName::OneHalfLight),
  ("SolarizedDark", EmbeddedThemeName::SolarizedDark),
  ("SolarizedLight", EmbeddedThemeName::SolarizedLight),
  ("SublimeSnazzy", EmbeddedThemeName::SublimeSnazzy),
  ("TwoDark", EmbeddedThemeName::TwoDark),
  ("VisualStudioDarkPlus", EmbeddedThemeName::VisualStudioDarkPlus),
  ("Zenburn", EmbeddedThemeName::Zenburn),
];

/// Syntect-based syntax highlighter
pub struct SyntectHighlighter {
  theme_name: String,
}

impl SyntectHighlighter {
  /// Create a new Syntect highlighter with the specified default theme.
  #[must_use]
  pub fn new(theme_name: Option<String>) -> Self {
    Self {
      theme_name: theme_name.unwrap_or_else(|| DEFAULT_THEME.to_string()),
    }
  }

  /// Get the syntect `SyntaxSet`.
  fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
  }

  /// Get the two-face theme set.
  fn theme_set() -> &'static EmbeddedLazyThemeSet {
    static THEME_SET: OnceLock<EmbeddedLazyThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(two_face::theme::extra)
  }

  /// Get the default syntect `ThemeSet`.
  fn default_theme_set() -> &'static ThemeSet {
    static DEFAULT_THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    DEFAULT_THEME_SET.get_or_init(ThemeSet::load_defaults)
  }

  /// Look a theme up by name, case-insensitively, in both theme sets.
  fn find_theme(name: &str) -> Option<&'static Theme> {
    if let Some(theme) = Self::default_theme_set()
      .themes
      .iter()
      .find(|(key, _)| key.eq_ignore_ascii_case(name))
      .map(|(_, theme)| theme)
    {
      return Some(theme);
    }

    EMBEDDED_THEMES
      .iter()
      .find(|(key, _)| key.eq_ignore_ascii_case(name))
      .map(|(_, embedded)| Self::theme_set().get(*embedded))
  }

  /// Get the theme by name, falling back to this highlighter's default.
  fn get_theme(&self, theme_name: Option<&str>) -> &'static Theme {
    if let Some(name) = theme_name {
      if let Some(theme) = Self::find_theme(name) {
        return theme;
      }
      log::warn!(
        "Unknown highlighting theme '{name}', using '{}' instead",
        self.theme_name
      );
    }

    Self::find_theme(&self.theme_name).unwrap_or_else(|| {
      Self::theme_set().get(EmbeddedThemeName::InspiredGithub)
    })
  }
}

impl Default for SyntectHighlighter {
  fn default() -> Self {
    Self::new(None)
  }
}

fn css_color(color: Color) -> String {
  format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

impl SyntaxHighlighter for SyntectHighlighter {
  fn name(&self) -> &'static str {
    "Syntect"
  }

  fn supported_languages(&self) -> Vec<String> {
    Self::syntax_set()
      .syntaxes()
      .iter()
      .flat_map(|syntax| {
        std::iter::once(syntax.name.to_lowercase())
          .chain(syntax.file_extensions.iter().map(|ext| ext.to_lowercase()))
      })
      .collect()
  }

  fn highlight_lines(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<Vec<String>> {
    let syntax_set = Self::syntax_set();
    let syntax = syntax_set
      .find_syntax_by_token(language)
      .unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    let mut highlighter = HighlightLines::new(syntax, self.get_theme(theme));
    let mut lines = Vec::new();

    for line in LinesWithEndings::from(code) {
      let regions = highlighter
        .highlight_line(line, syntax_set)
        .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;

      // Terminators are dropped so every line can be wrapped on its own
      let trimmed: Vec<_> = regions
        .into_iter()
        .map(|(style, text)| (style, text.trim_end_matches(['\n', '\r'])))
        .filter(|(_, text)| !text.is_empty())
        .collect();

      let html =
        styled_line_to_highlighted_html(&trimmed, IncludeBackground::No)
          .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;
      lines.push(html);
    }

    Ok(lines)
  }

  fn theme_style(&self, theme: Option<&str>) -> Option<String> {
    let settings = &self.get_theme(theme).settings;
    match (settings.background, settings.foreground) {
      (Some(bg), Some(fg)) => {
        Some(format!(
          "background-color: {}; color: {}",
          css_color(bg),
          css_color(fg)
        ))
      },
      (Some(bg), None) => Some(format!("background-color: {}", css_color(bg))),
      (None, Some(fg)) => Some(format!("color: {}", css_color(fg))),
      (None, None) => None,
    }
  }
}

/// Create a Syntect-based syntax manager using `theme` as the default theme.
///
/// # Errors
///
/// Currently infallible; the `Result` mirrors other backend constructors.
pub fn create_syntect_manager(
  theme: Option<&str>,
) -> SyntaxResult<SyntaxManager> {
  let theme = theme.unwrap_or(DEFAULT_THEME).to_string();
  let highlighter = Box::new(SyntectHighlighter::new(Some(theme.clone())));
  let config = SyntaxConfig {
    default_theme: Some(theme),
    ..SyntaxConfig::default()
  };
  Ok(SyntaxManager::new(highlighter, config))
}
