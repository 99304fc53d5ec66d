//! Wrapping TS/JS sources into synthetic Markdown documents.
use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use log::debug;
use twoslash_commonmark::utils::codeblock::TWOSLASH_META;

/// Leading line forwarding Twoslash settings into the synthetic document.
pub const SETTINGS_DIRECTIVE: &str = "// twoslash: ";

/// Leading line forwarding extra code fence attributes.
pub const CODEFENCE_DIRECTIVE: &str = "// codefence: ";

/// A TS/JS source split into its directives and code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedSource {
  /// Settings comment placed before the fence, or empty.
  pub prefix:  String,
  /// Fence language, the source's extension.
  pub lang:    String,
  /// Attributes forwarded through `// codefence:`.
  pub classes: Vec<String>,
  /// The code left once the directives are stripped.
  pub content: String,
}

impl WrappedSource {
  /// Split `text`, read from `path`, into directives and code.
  #[must_use]
  pub fn parse(path: &Path, text: &str) -> Self {
    let mut content = text;

    let mut prefix = String::new();
    if content.starts_with("// twoslash: {") {
      let (line, rest) = split_first_line(content);
      let payload = line.strip_prefix(SETTINGS_DIRECTIVE).unwrap_or(line);
      prefix = format!("<!-- twoslash: {payload} -->");
      content = rest;
    }

    let mut classes = Vec::new();
    if let Some(stripped) = content.strip_prefix(CODEFENCE_DIRECTIVE) {
      let (payload, rest) = split_first_line(stripped);
      classes.push(payload.to_string());
      content = rest;
    }

    let lang = path
      .extension()
      .map(|ext| ext.to_string_lossy().into_owned())
      .unwrap_or_default();

    Self {
      prefix,
      lang,
      classes,
      content: content.to_string(),
    }
  }

  /// The synthetic Markdown document, with or without the `twoslash` fence
  /// marker.
  #[must_use]
  pub fn to_markdown(&self, twoslash: bool) -> String {
    let mut classes: Vec<&str> =
      self.classes.iter().map(String::as_str).collect();
    if twoslash {
      classes.push(TWOSLASH_META);
    }
    to_code(&self.prefix, &self.lang, &classes, &self.content)
  }
}

/// Lay out a single fenced code block document.
#[must_use]
pub fn to_code(
  prefix: &str,
  lang: &str,
  classes: &[&str],
  content: &str,
) -> String {
  format!(
    "{prefix}\n```{lang} {}\n{content}\n```\n",
    classes.join(" ")
  )
}

/// Write the synthetic documents for the source at `from` into `scratch`.
///
/// The first document, `<basename>.md`, marks its fence `twoslash`. With
/// `also_render_source` a second one, `<basename>_src.md`, leaves the marker
/// off.
///
/// # Errors
///
/// Returns an error if the source cannot be read or a document cannot be
/// written.
pub fn write_scratch_documents(
  from: &Path,
  scratch: &Path,
  also_render_source: bool,
) -> Result<Vec<PathBuf>> {
  let text = fs::read_to_string(from)
    .wrap_err_with(|| format!("Failed to read source: {}", from.display()))?;
  let source = WrappedSource::parse(from, &text);

  let basename = from
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default();

  fs::create_dir_all(scratch).wrap_err_with(|| {
    format!("Failed to create scratch directory: {}", scratch.display())
  })?;

  let mut documents = vec![(format!("{basename}.md"), true)];
  if also_render_source {
    documents.push((format!("{basename}_src.md"), false));
  }

  documents
    .into_iter()
    .map(|(name, twoslash)| {
      let path = scratch.join(name);
      fs::write(&path, source.to_markdown(twoslash)).wrap_err_with(|| {
        format!("Failed to write scratch document: {}", path.display())
      })?;
      debug!("Wrapped {} into {}", from.display(), path.display());
      Ok(path)
    })
    .collect()
}

fn split_first_line(text: &str) -> (&str, &str) {
  text.split_once('\n').unwrap_or((text, ""))
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]

  use tempfile::tempdir;

  use super::*;

  #[test]
  fn test_settings_directive_becomes_a_comment() {
    let source = WrappedSource::parse(
      Path::new("a.ts"),
      "// twoslash: {theme: \"dark\"}\nconst a = 1;\n",
    );
    let markdown = source.to_markdown(true);

    assert_eq!(source.prefix, "<!-- twoslash: {theme: \"dark\"} -->");
    assert!(markdown.starts_with(
      "<!-- twoslash: {theme: \"dark\"} -->\n```ts twoslash\nconst a = 1;"
    ));
    assert!(!markdown.contains("// twoslash:"));
  }

  #[test]
  fn test_codefence_directive_is_forwarded_and_stripped() {
    let source = WrappedSource::parse(
      Path::new("a.tsx"),
      "// twoslash: {}\n// codefence: {1,3}\nlet a;\n",
    );
    assert_eq!(source.classes, vec!["{1,3}".to_string()]);
    assert_eq!(source.content, "let a;\n");
    assert_eq!(
      source.to_markdown(true),
      "<!-- twoslash: {} -->\n```tsx {1,3} twoslash\nlet a;\n\n```\n"
    );
  }

  #[test]
  fn test_plain_source() {
    let source = WrappedSource::parse(Path::new("b.js"), "let b;");
    assert_eq!(source.to_markdown(true), "\n```js twoslash\nlet b;\n```\n");
    assert_eq!(source.to_markdown(false), "\n```js \nlet b;\n```\n");
  }

  #[test]
  fn test_directive_must_lead() {
    let text = "let a;\n// twoslash: {theme: 'x'}\n";
    let source = WrappedSource::parse(Path::new("a.ts"), text);
    assert!(source.prefix.is_empty());
    assert_eq!(source.content, text);
  }

  #[test]
  fn test_scratch_documents() {
    let dir = tempdir().expect("Failed to create temp dir in test");
    let from = dir.path().join("sample.ts");
    fs::write(&from, "const a = 1;\n").expect("Failed to write in test");
    let scratch = dir.path().join("scratch");

    let written = write_scratch_documents(&from, &scratch, true)
      .expect("Failed to wrap source");
    assert_eq!(written, vec![
      scratch.join("sample.ts.md"),
      scratch.join("sample.ts_src.md"),
    ]);

    let twoslash =
      fs::read_to_string(&written[0]).expect("Failed to read in test");
    let plain =
      fs::read_to_string(&written[1]).expect("Failed to read in test");
    assert!(twoslash.contains("```ts twoslash\n"));
    assert!(!plain.contains("twoslash"));
  }

  #[test]
  fn test_scratch_documents_missing_source() {
    let dir = tempdir().expect("Failed to create temp dir in test");
    assert!(
      write_scratch_documents(&dir.path().join("gone.ts"), dir.path(), false)
        .is_err()
    );
  }
}
