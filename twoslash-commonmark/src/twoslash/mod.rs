//! The Twoslash transform: highlights every fenced code block of a document
//! and type checks the ones marked `twoslash`.

pub mod checker;
pub mod html;
pub mod markup;

use std::sync::Arc;

use comrak::nodes::{AstNode, NodeValue};

use self::{
  checker::{CheckError, CheckReport, Diagnostic, TypeChecker},
  markup::{MarkupError, TwoslashSample},
};
use crate::{
  processor::AstTransformer,
  settings::TwoslashSettings,
  syntax::{SyntaxError, SyntaxManager},
  utils::codeblock::FenceInfo,
};

/// Errors raised while transforming a document.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
  #[error("Invalid twoslash markup in sample {sample}: {source}")]
  InvalidMarkup {
    sample: usize,
    #[source]
    source: MarkupError,
  },

  #[error(
    "Sample {sample} raised errors that were not declared with `// \
     @errors`:\n{}",
    describe(.diagnostics)
  )]
  UnexpectedErrors {
    sample:      usize,
    diagnostics: Vec<Diagnostic>,
  },

  #[error(
    "Sample {sample} declares errors that were not raised: {}",
    join_codes(.codes)
  )]
  MissingErrors { sample: usize, codes: Vec<u32> },

  #[error("Type checker '{checker}' failed on sample {sample}: {source}")]
  Checker {
    checker: String,
    sample:  usize,
    #[source]
    source:  CheckError,
  },

  #[error("Failed to highlight sample {sample}: {source}")]
  Highlight {
    sample: usize,
    #[source]
    source: SyntaxError,
  },
}

fn join_codes(codes: &[u32]) -> String {
  codes
    .iter()
    .map(u32::to_string)
    .collect::<Vec<_>>()
    .join(", ")
}

fn describe(diagnostics: &[Diagnostic]) -> String {
  diagnostics
    .iter()
    .map(|d| {
      format!(
        "  [{}] {}:{} - {}",
        d.code,
        d.line + 1,
        d.column + 1,
        d.message
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// Decide which diagnostics to show for a sample, failing on the ones that
/// disagree with its `// @errors` declaration.
///
/// # Errors
///
/// Returns [`TransformError::UnexpectedErrors`] when a diagnostic was not
/// declared, or [`TransformError::MissingErrors`] when a declared code was
/// never raised.
pub fn validate(
  sample_index: usize,
  sample: &TwoslashSample,
  diagnostics: Vec<Diagnostic>,
) -> Result<Vec<Diagnostic>, TransformError> {
  let handbook = &sample.handbook;
  if handbook.no_errors {
    return Ok(Vec::new());
  }
  if handbook.no_error_validation {
    return Ok(diagnostics);
  }

  let unexpected: Vec<Diagnostic> = diagnostics
    .iter()
    .filter(|d| !handbook.errors.contains(&d.code))
    .cloned()
    .collect();
  if !unexpected.is_empty() {
    return Err(TransformError::UnexpectedErrors {
      sample:      sample_index,
      diagnostics: unexpected,
    });
  }

  let missing: Vec<u32> = handbook
    .errors
    .iter()
    .filter(|code| !diagnostics.iter().any(|d| d.code == **code))
    .copied()
    .collect();
  if !missing.is_empty() {
    return Err(TransformError::MissingErrors {
      sample: sample_index,
      codes:  missing,
    });
  }

  Ok(diagnostics)
}

/// Replaces fenced code blocks with highlighted raw HTML.
///
/// The tree is mutated in place. Blocks whose info string carries one of the
/// `ignoreCodeblocksWithCodefenceMeta` words are left as they are.
pub struct TwoslashTransformer<'s> {
  settings: &'s TwoslashSettings,
  syntax:   &'s SyntaxManager,
  checker:  Option<Arc<dyn TypeChecker>>,
}

impl<'s> TwoslashTransformer<'s> {
  #[must_use]
  pub fn new(
    settings: &'s TwoslashSettings,
    syntax: &'s SyntaxManager,
    checker: Option<Arc<dyn TypeChecker>>,
  ) -> Self {
    Self {
      settings,
      syntax,
      checker,
    }
  }

  fn render_block(
    &self,
    index: usize,
    info: &FenceInfo,
    code: &str,
  ) -> Result<String, TransformError> {
    let highlight_error =
      |source| TransformError::Highlight { sample: index, source };

    let mut blocks = String::new();

    if info.is_twoslash() {
      let sample = TwoslashSample::parse(code, info.language(), self.settings)
        .map_err(|source| {
          TransformError::InvalidMarkup {
            sample: index,
            source,
          }
        })?;

      let mut report = match &self.checker {
        Some(checker) => {
          log::debug!("Checking sample {index} with {}", checker.name());
          checker.check(&sample).map_err(|source| {
            TransformError::Checker {
              checker: checker.name().to_string(),
              sample: index,
              source,
            }
          })?
        },
        None => CheckReport::default(),
      };
      report.diagnostics = validate(index, &sample, report.diagnostics)?;

      for theme in self.settings.render_themes() {
        blocks.push_str(
          &html::render_twoslash(self.syntax, &sample, &report, theme)
            .map_err(highlight_error)?,
        );
      }
    } else {
      for theme in self.settings.render_themes() {
        blocks.push_str(
          &html::render_code(self.syntax, code, info.language(), theme)
            .map_err(highlight_error)?,
        );
      }
    }

    if self.settings.wrap_fragments {
      blocks = html::wrap_fragment(&blocks);
    }
    Ok(blocks)
  }
}

impl AstTransformer for TwoslashTransformer<'_> {
  type Error = TransformError;

  fn transform<'a>(&self, node: &'a AstNode<'a>) -> Result<(), Self::Error> {
    let mut index = 0;

    for descendant in node.descendants() {
      let mut data = descendant.data.borrow_mut();
      let NodeValue::CodeBlock(ref block) = data.value else {
        continue;
      };

      let info = FenceInfo::parse(&block.info);
      if self.settings.ignores(info.meta_words()) {
        log::debug!("Leaving code block with meta {:?} untouched", info.meta);
        continue;
      }

      index += 1;
      let code = block.literal.strip_suffix('\n').unwrap_or(&block.literal);
      let literal = self.render_block(index, &info, code)?;

      data.value = NodeValue::HtmlInline(literal);
    }

    Ok(())
  }
}
