//! # twoslash-commonmark
//!
//! A CommonMark processor that renders fenced code blocks as highlighted HTML
//! and type checks the ones marked `twoslash`.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::path::Path;
//!
//! use twoslash_commonmark::{
//!   MarkdownOptions,
//!   MarkdownProcessor,
//!   RenderMode,
//! };
//!
//! let processor = MarkdownProcessor::new(MarkdownOptions::default());
//! let output = processor
//!   .render(
//!     "# Hello\n\n```ts twoslash\nconst a = 1;\n```\n",
//!     Path::new("hello.md"),
//!     RenderMode::Document,
//!   )
//!   .unwrap();
//!
//! assert!(output.document().unwrap().contains("<h1>Hello</h1>"));
//! ```
//!
//! ## Features
//!
//! - **AST-based processing** using `comrak`; code blocks are replaced in
//!   place by raw HTML
//! - **Per-document settings** from a leading `<!-- twoslash: {...} -->`
//!   comment, parsed as data
//! - **Twoslash markup**: `// @errors`, compiler flags, `// ---cut---` and `^?`
//!   queries
//! - **Pluggable type checking** through [`TypeChecker`], with a `tsc`
//!   implementation
//! - **Split output**: every raw HTML node serialized on its own

mod error;
pub mod processor;
pub mod settings;
pub mod syntax;
pub mod twoslash;
mod types;
pub mod utils;

pub use crate::{
  error::{RenderError, RenderResult},
  processor::{AstTransformer, MarkdownOptions, MarkdownProcessor},
  settings::{SettingsError, TwoslashSettings},
  twoslash::{
    TransformError,
    checker::{CheckReport, Diagnostic, TscChecker, TypeChecker, find_tsc},
  },
  types::{RenderMode, RenderOutput},
};
