//! Type definitions for the Markdown processor.
//!
//! Contains the core types used by the processor, including:
//! - Configuration options (`MarkdownOptions`)
//! - The main processor struct (`MarkdownProcessor`)
//! - The AST transformation trait
//!
//! # Examples
//!
//! ```
//! use twoslash_commonmark::{MarkdownOptions, MarkdownProcessor};
//!
//! let options = MarkdownOptions {
//!   gfm: true,
//!   highlight_theme: Some("Nord".to_string()),
//!   ..Default::default()
//! };
//!
//! let processor = MarkdownProcessor::new(options);
//! ```

use std::{path::PathBuf, sync::Arc};

use comrak::nodes::AstNode;
use serde_json::{Map, Value};

use crate::{syntax::SyntaxManager, twoslash::checker::TypeChecker};

/// Options for configuring the Markdown processor.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
  /// Enable GitHub Flavored Markdown (GFM) extensions.
  pub gfm: bool,

  /// Optional: Default syntax highlighting theme name.
  pub highlight_theme: Option<String>,

  /// Optional: TypeScript compiler used to check Twoslash samples. Samples
  /// are only validated for markup when unset.
  pub tsc: Option<PathBuf>,

  /// Extra arguments for every compiler invocation.
  pub tsc_args: Vec<String>,

  /// Where checker inputs are written.
  pub scratch_dir: PathBuf,

  /// Default Twoslash settings, overridden per document by a settings
  /// comment.
  pub settings: Map<String, Value>,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self {
      gfm:             cfg!(feature = "gfm"),
      highlight_theme: None,
      tsc:             None,
      tsc_args:        Vec::new(),
      scratch_dir:     std::env::temp_dir(),
      settings:        Map::new(),
    }
  }
}

/// Main Markdown processor.
///
/// Can be cheaply cloned since it uses `Arc` internally for the syntax manager
/// and type checker.
#[derive(Clone)]
pub struct MarkdownProcessor {
  pub(crate) options:        MarkdownOptions,
  pub(crate) syntax_manager: Arc<SyntaxManager>,
  pub(crate) checker:        Option<Arc<dyn TypeChecker>>,
}

/// Trait for in-place AST transformations.
pub trait AstTransformer {
  type Error;

  /// Transform the tree rooted at `node`.
  ///
  /// # Errors
  ///
  /// Implementations abort on the first node they cannot transform; nodes
  /// already visited stay transformed.
  fn transform<'a>(&self, node: &'a AstNode<'a>) -> Result<(), Self::Error>;
}

/// Builder for constructing `MarkdownOptions` with method chaining.
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptionsBuilder {
  options: MarkdownOptions,
}

impl MarkdownOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable or disable GitHub Flavored Markdown.
  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.gfm = enabled;
    self
  }

  /// Set the syntax highlighting theme.
  #[must_use]
  pub fn highlight_theme<S: Into<String>>(mut self, theme: Option<S>) -> Self {
    self.options.highlight_theme = theme.map(Into::into);
    self
  }

  /// Set the TypeScript compiler and its extra arguments.
  #[must_use]
  pub fn tsc<P: Into<PathBuf>>(
    mut self,
    tsc: Option<P>,
    args: Vec<String>,
  ) -> Self {
    self.options.tsc = tsc.map(Into::into);
    self.options.tsc_args = args;
    self
  }

  /// Set the scratch directory.
  #[must_use]
  pub fn scratch_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
    self.options.scratch_dir = dir.into();
    self
  }

  /// Set the default Twoslash settings.
  #[must_use]
  pub fn settings(mut self, settings: Map<String, Value>) -> Self {
    self.options.settings = settings;
    self
  }

  /// Build the final `MarkdownOptions`.
  #[must_use]
  pub fn build(self) -> MarkdownOptions {
    self.options
  }
}
