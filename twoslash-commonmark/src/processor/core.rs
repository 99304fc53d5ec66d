//! Core implementation of the Markdown processor.
//!
//! A render pass owns its comrak arena: the document is parsed, transformed in
//! place and serialized before the arena is dropped.
use std::{fs, path::Path, sync::Arc};

use comrak::{
  Arena,
  nodes::{AstNode, NodeValue},
  options::Options,
  parse_document,
};
use log::trace;

use super::types::{AstTransformer, MarkdownOptions, MarkdownProcessor};
use crate::{
  error::{RenderError, RenderResult},
  settings::{TwoslashSettings, extract_settings, merge_settings},
  syntax::{SyntaxManager, SyntectHighlighter, create_default_manager},
  twoslash::{
    TwoslashTransformer,
    checker::{TscChecker, TypeChecker},
  },
  types::{RenderMode, RenderOutput},
};

impl MarkdownProcessor {
  /// Create a new `MarkdownProcessor` with the given options.
  ///
  /// When `options.tsc` is set, Twoslash samples are checked with it.
  #[must_use]
  pub fn new(options: MarkdownOptions) -> Self {
    let syntax_manager = create_default_manager(
      options.highlight_theme.as_deref(),
    )
    .unwrap_or_else(|e| {
      log::warn!("Failed to create syntax manager: {e}; using defaults");
      SyntaxManager::with_highlighter(Box::new(SyntectHighlighter::default()))
    });

    let checker = options.tsc.as_ref().map(|tsc| {
      Arc::new(
        TscChecker::new(tsc, &options.scratch_dir)
          .with_args(options.tsc_args.clone()),
      ) as Arc<dyn TypeChecker>
    });

    Self {
      options,
      syntax_manager: Arc::new(syntax_manager),
      checker,
    }
  }

  /// Replace the type checker.
  #[must_use]
  pub fn with_checker(mut self, checker: Arc<dyn TypeChecker>) -> Self {
    self.checker = Some(checker);
    self
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// Access the syntax manager.
  #[must_use]
  pub fn syntax_manager(&self) -> &SyntaxManager {
    &self.syntax_manager
  }

  /// Whether Twoslash samples are type checked.
  #[must_use]
  pub const fn checks_types(&self) -> bool {
    self.checker.is_some()
  }

  /// Resolve the settings for a document: configured defaults overlaid with
  /// the document's own settings comment.
  ///
  /// # Errors
  ///
  /// Returns an error if the settings comment cannot be parsed or holds
  /// values of the wrong type.
  pub fn settings_for(
    &self,
    text: &str,
    path: &Path,
  ) -> RenderResult<TwoslashSettings> {
    let document = extract_settings(text, path)?;
    let merged = merge_settings(&self.options.settings, document);
    TwoslashSettings::from_value(merged).map_err(|source| {
      RenderError::InvalidSettings {
        path: path.to_path_buf(),
        source,
      }
    })
  }

  /// Read and render a Markdown file.
  ///
  /// # Errors
  ///
  /// See [`MarkdownProcessor::render`]; additionally fails if the file cannot
  /// be read.
  pub fn render_file(
    &self,
    path: &Path,
    mode: RenderMode,
  ) -> RenderResult<RenderOutput> {
    let text = fs::read_to_string(path).map_err(|source| {
      RenderError::Io {
        path: path.to_path_buf(),
        source,
      }
    })?;
    self.render(&text, path, mode)
  }

  /// Render Markdown text. `path` names the document in errors.
  ///
  /// # Errors
  ///
  /// Returns an error if the document's settings are invalid, if a code block
  /// cannot be transformed, or if serialization fails.
  pub fn render(
    &self,
    text: &str,
    path: &Path,
    mode: RenderMode,
  ) -> RenderResult<RenderOutput> {
    let settings = self.settings_for(text, path)?;

    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, text, &options);

    let transformer = TwoslashTransformer::new(
      &settings,
      &self.syntax_manager,
      self.checker.clone(),
    );
    transformer.transform(root).map_err(|source| {
      RenderError::Transform {
        path: path.to_path_buf(),
        source,
      }
    })?;

    match mode {
      RenderMode::Lint => Ok(RenderOutput::Linted),
      RenderMode::Document => {
        Ok(RenderOutput::Document(serialize(root, &options)?))
      },
      RenderMode::Samples => {
        Ok(RenderOutput::Samples(extract_html_nodes(root, &options)?))
      },
    }
  }

  /// Build comrak options from `MarkdownOptions` and feature flags.
  fn comrak_options(&self) -> Options<'_> {
    let mut options = Options::default();
    if self.options.gfm {
      options.extension.table = true;
      options.extension.footnotes = true;
      options.extension.strikethrough = true;
      options.extension.tasklist = true;
      options.extension.autolink = true;
    }
    // Highlighted samples are raw HTML
    options.render.r#unsafe = true;
    options
  }
}

/// Serialize a (sub)tree to HTML.
///
/// # Errors
///
/// Returns an error if formatting fails.
pub fn serialize<'a>(
  node: &'a AstNode<'a>,
  options: &Options,
) -> RenderResult<String> {
  let mut html = String::new();
  comrak::format_html(node, options, &mut html)?;
  Ok(html)
}

/// Serialize every raw HTML node, block or inline, in document order.
///
/// # Errors
///
/// Returns an error if formatting fails.
pub fn extract_html_nodes<'a>(
  root: &'a AstNode<'a>,
  options: &Options,
) -> RenderResult<Vec<String>> {
  let mut samples = Vec::new();
  for node in root.descendants() {
    let is_html = matches!(
      node.data.borrow().value,
      NodeValue::HtmlBlock(_) | NodeValue::HtmlInline(_)
    );
    if is_html {
      trace!("Serializing raw HTML node {}", samples.len() + 1);
      samples.push(serialize(node, options)?);
    }
  }
  Ok(samples)
}
