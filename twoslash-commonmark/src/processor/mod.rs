//! Markdown processing module.
//!
//! - [`core`]: Main processor implementation and the render pipeline
//! - [`types`]: Core type definitions and configuration structures
pub mod core;
pub mod types;

pub use core::{extract_html_nodes, serialize};

pub use types::{
  AstTransformer,
  MarkdownOptions,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
};

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use std::{path::Path, sync::Arc};

  use serde_json::json;

  use super::{MarkdownOptions, MarkdownOptionsBuilder, MarkdownProcessor};
  use crate::{
    error::RenderError,
    twoslash::{
      TransformError,
      checker::{CheckError, CheckReport, Diagnostic, TypeChecker},
      markup::TwoslashSample,
    },
    types::{RenderMode, RenderOutput},
  };

  struct FixedChecker(Vec<Diagnostic>);

  impl TypeChecker for FixedChecker {
    fn name(&self) -> &str {
      "fixed"
    }

    fn check(
      &self,
      _sample: &TwoslashSample,
    ) -> Result<CheckReport, CheckError> {
      Ok(CheckReport {
        diagnostics: self.0.clone(),
        answers:     Vec::new(),
      })
    }
  }

  fn render(text: &str, mode: RenderMode) -> RenderOutput {
    MarkdownProcessor::new(MarkdownOptions::default())
      .render(text, Path::new("doc.md"), mode)
      .unwrap()
  }

  #[test]
  fn test_prose_is_rendered() {
    let output = render("# Hello\n\nSome *prose*.\n", RenderMode::Document);
    let html = output.document().unwrap();
    assert!(html.contains("<h1>Hello</h1>"));
    assert!(html.contains("<em>prose</em>"));
  }

  #[test]
  fn test_code_blocks_become_highlighted_html() {
    let output =
      render("```ts twoslash\nconst a = 1;\n```\n", RenderMode::Document);
    let html = output.document().unwrap();
    assert!(html.contains("<pre class=\"shiki"));
    assert!(html.contains("twoslash lsp"));
    assert!(!html.contains("language-ts"));
  }

  #[test]
  fn test_ignored_meta_is_left_alone() {
    let text = "<!-- twoslash: {ignoreCodeblocksWithCodefenceMeta: \
                ['skip']} -->\n\n```ts skip\nconst a = 1;\n```\n";
    let output = render(text, RenderMode::Document);
    let html = output.document().unwrap();
    assert!(html.contains("<code class=\"language-ts\">"));
    assert!(!html.contains("shiki"));
  }

  #[test]
  fn test_lint_produces_nothing() {
    let output = render("```ts\nlet a;\n```\n", RenderMode::Lint);
    assert_eq!(output, RenderOutput::Linted);
  }

  #[test]
  fn test_samples_in_document_order() {
    let text = "```ts\nlet first;\n```\n\ntext\n\n<div>raw</div>\n\n```js\nlet \
                second;\n```\n";
    let output = render(text, RenderMode::Samples);
    let samples = output.samples().unwrap();
    assert_eq!(samples.len(), 3);
    assert!(samples[0].contains("first"));
    assert!(samples[1].contains("<div>raw</div>"));
    assert!(samples[2].contains("second"));
  }

  #[test]
  fn test_settings_comment_applies_theme() {
    let text = "<!-- twoslash: {theme: 'Nord'} -->\n\n```ts\nlet a;\n```\n";
    let output = render(text, RenderMode::Document);
    assert!(output.document().unwrap().contains("shiki nord"));
  }

  #[test]
  fn test_config_defaults_are_overridden_by_document() {
    let mut defaults = serde_json::Map::new();
    defaults.insert("theme".into(), json!("Nord"));
    defaults.insert("wrapFragments".into(), json!(true));
    let processor = MarkdownProcessor::new(
      MarkdownOptionsBuilder::new().settings(defaults).build(),
    );

    let text =
      "<!-- twoslash: {theme: 'Dracula'} -->\n\n```ts\nlet a;\n```\n";
    let output = processor
      .render(text, Path::new("doc.md"), RenderMode::Document)
      .unwrap();
    let html = output.document().unwrap();
    assert!(html.contains("shiki dracula"));
    assert!(html.contains("shiki-twoslash-fragment"));
  }

  #[test]
  fn test_multiple_themes() {
    let text = "<!-- twoslash: {themes: ['Nord', 'Dracula']} -->\n\n```ts\nlet \
                a;\n```\n";
    let output = render(text, RenderMode::Samples);
    let samples = output.samples().unwrap();
    // The settings comment is a raw HTML node too
    assert_eq!(samples.len(), 2);
    assert!(samples[1].contains("shiki nord"));
    assert!(samples[1].contains("shiki dracula"));
  }

  #[test]
  fn test_bad_settings_fail() {
    let err = MarkdownProcessor::new(MarkdownOptions::default())
      .render(
        "<!-- twoslash: {bad syntax -->\n",
        Path::new("docs/bad.md"),
        RenderMode::Document,
      )
      .unwrap_err();
    assert!(matches!(err, RenderError::Settings(_)));
    let message = err.to_string();
    assert!(message.contains("docs/bad.md"));
    assert!(message.contains("{bad syntax"));
  }

  #[test]
  fn test_mistyped_settings_fail() {
    let err = MarkdownProcessor::new(MarkdownOptions::default())
      .render(
        "<!-- twoslash: {themes: 3} -->\n",
        Path::new("doc.md"),
        RenderMode::Document,
      )
      .unwrap_err();
    assert!(matches!(err, RenderError::InvalidSettings { .. }));
  }

  #[test]
  fn test_checker_diagnostics_are_validated() {
    let diagnostic = Diagnostic {
      line:    0,
      column:  6,
      code:    2322,
      message: "Type 'number' is not assignable to type 'string'.".into(),
    };
    let processor = MarkdownProcessor::new(MarkdownOptions::default())
      .with_checker(Arc::new(FixedChecker(vec![diagnostic])));
    assert!(processor.checks_types());

    let err = processor
      .render(
        "```ts twoslash\nconst a: string = 1;\n```\n",
        Path::new("doc.md"),
        RenderMode::Lint,
      )
      .unwrap_err();
    assert!(matches!(err, RenderError::Transform {
      source: TransformError::UnexpectedErrors { .. },
      ..
    }));

    let output = processor
      .render(
        "```ts twoslash\n// @errors: 2322\nconst a: string = 1;\n```\n",
        Path::new("doc.md"),
        RenderMode::Document,
      )
      .unwrap();
    let html = output.document().unwrap();
    assert!(html.contains("<span class=\"code\">2322</span>"));
    assert!(!html.contains("@errors"));
  }

  #[test]
  fn test_checker_only_runs_on_twoslash_blocks() {
    let diagnostic = Diagnostic {
      line:    0,
      column:  0,
      code:    1,
      message: "never".into(),
    };
    let processor = MarkdownProcessor::new(MarkdownOptions::default())
      .with_checker(Arc::new(FixedChecker(vec![diagnostic])));
    let output = processor
      .render("```ts\nlet a;\n```\n", Path::new("doc.md"), RenderMode::Lint)
      .unwrap();
    assert_eq!(output, RenderOutput::Linted);
  }
}
