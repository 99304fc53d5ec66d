//! Types for twoslash-commonmark public API and internal use.

/// What a render pass produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
  /// Run the transform and discard the tree.
  Lint,
  /// Serialize the whole document.
  #[default]
  Document,
  /// Serialize every raw HTML node on its own.
  Samples,
}

/// Result of a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutput {
  /// The document transformed cleanly; nothing was serialized.
  Linted,
  /// HTML for the whole document.
  Document(String),
  /// HTML of each raw HTML node, in document order.
  Samples(Vec<String>),
}

impl RenderOutput {
  /// The rendered document, if this is a full render.
  #[must_use]
  pub fn document(&self) -> Option<&str> {
    match self {
      Self::Document(html) => Some(html),
      _ => None,
    }
  }

  /// The rendered samples, if this is a split render.
  #[must_use]
  pub fn samples(&self) -> Option<&[String]> {
    match self {
      Self::Samples(samples) => Some(samples),
      _ => None,
    }
  }
}
