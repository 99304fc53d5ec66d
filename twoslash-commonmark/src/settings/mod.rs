//! Per-document Twoslash settings.
//!
//! A document may carry an HTML comment of the form
//! `<!-- twoslash: {theme: "dark"} -->`. The object literal inside is parsed
//! with [`parse_literal`] and layered over the configured defaults before the
//! Twoslash transform runs.

mod literal;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use self::literal::{LiteralError, parse_literal};

/// Prefix that introduces a settings comment.
pub const SETTINGS_MARKER: &str = "<!-- twoslash: ";

/// Settings are only recognised when the literal opens an object.
const SETTINGS_OPENING: &str = "<!-- twoslash: {";

const SETTINGS_CLOSING: &str = " -->";

/// Settings keys understood by the renderer.
const KNOWN_KEYS: &[&str] = &[
  "theme",
  "themes",
  "defaultCompilerOptions",
  "defaultOptions",
  "ignoreCodeblocksWithCodefenceMeta",
  "wrapFragments",
];

/// Raised when a settings comment does not contain a valid literal.
#[derive(Debug, thiserror::Error)]
#[error(
  "Setting custom twoslash settings in {} failed; the literal '{literal}' \
   could not be parsed: {source}",
  path.display()
)]
pub struct SettingsError {
  /// Document the settings comment was found in.
  pub path:    PathBuf,
  /// The literal text that failed to parse.
  pub literal: String,
  /// Underlying syntax error.
  #[source]
  pub source:  LiteralError,
}

/// Locate the settings literal of a document, if it has one.
///
/// Only a comment at the very start of the document counts. The literal runs
/// from the opening `{` up to the first ` -->`, or to the end of the text when
/// the comment is never closed.
#[must_use]
pub fn settings_literal(text: &str) -> Option<&str> {
  if !text.starts_with(SETTINGS_OPENING) {
    return None;
  }
  let rest = &text[SETTINGS_MARKER.len()..];
  let end = rest.find(SETTINGS_CLOSING).unwrap_or(rest.len());
  Some(&rest[..end])
}

/// Extract per-document settings from the leading settings comment in `text`.
///
/// Returns `Ok(None)` when the document has no settings comment.
///
/// # Errors
///
/// Returns a [`SettingsError`] naming `path` and the offending literal when
/// the literal cannot be parsed. The error is also logged.
pub fn extract_settings(
  text: &str,
  path: &Path,
) -> Result<Option<Value>, SettingsError> {
  let Some(literal) = settings_literal(text) else {
    return Ok(None);
  };

  match parse_literal(literal) {
    Ok(value) => {
      log::debug!("Found twoslash settings in {}", path.display());
      Ok(Some(value))
    },
    Err(source) => {
      let error = SettingsError {
        path: path.to_path_buf(),
        literal: literal.to_string(),
        source,
      };
      log::error!("{error}");
      Err(error)
    },
  }
}

/// Layer document settings over configured defaults.
///
/// Keys set by the document replace the defaults wholesale; nested objects are
/// not merged.
#[must_use]
pub fn merge_settings(
  defaults: &Map<String, Value>,
  document: Option<Value>,
) -> Value {
  let mut merged = defaults.clone();
  if let Some(Value::Object(overrides)) = document {
    for (key, value) in overrides {
      merged.insert(key, value);
    }
  }
  Value::Object(merged)
}

/// Defaults for the `// @errors`-style handbook options of every sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HandbookDefaults {
  /// Diagnostic codes every sample is expected to raise.
  pub errors:              Vec<u32>,
  /// Suppress all diagnostics without validating them.
  pub no_errors:           bool,
  /// Report diagnostics but never fail on them.
  pub no_error_validation: bool,
}

/// Typed view of the settings that drive the Twoslash transform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TwoslashSettings {
  /// Highlighting theme for every sample.
  pub theme:                                 Option<String>,
  /// Render each sample once per theme, concatenating the results.
  pub themes:                                Vec<String>,
  /// Compiler options applied before per-sample `// @option` lines.
  pub default_compiler_options:              Map<String, Value>,
  /// Handbook option defaults.
  pub default_options:                       HandbookDefaults,
  /// Fenced blocks whose info string contains one of these words are left
  /// untouched.
  pub ignore_codeblocks_with_codefence_meta: Vec<String>,
  /// Wrap every rendered sample in a fragment container.
  pub wrap_fragments:                        bool,
}

impl TwoslashSettings {
  /// Build typed settings from a merged settings object.
  ///
  /// # Errors
  ///
  /// Returns an error if a known key holds a value of the wrong type.
  pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
    if let Value::Object(map) = &value {
      for key in map.keys().filter(|key| !KNOWN_KEYS.contains(&key.as_str())) {
        log::warn!("Ignoring unrecognised twoslash setting '{key}'");
      }
    }
    serde_json::from_value(value)
  }

  /// The themes each sample should be rendered in.
  ///
  /// `None` stands for the highlighter's default theme.
  #[must_use]
  pub fn render_themes(&self) -> Vec<Option<&str>> {
    if self.themes.is_empty() {
      vec![self.theme.as_deref()]
    } else {
      self.themes.iter().map(|theme| Some(theme.as_str())).collect()
    }
  }

  /// Whether a fenced block's info words ask for it to be left alone.
  #[must_use]
  pub fn ignores<'a>(&self, meta: impl IntoIterator<Item = &'a str>) -> bool {
    meta.into_iter().any(|word| {
      self
        .ignore_codeblocks_with_codefence_meta
        .iter()
        .any(|ignored| ignored == word)
    })
  }
}
