//! Provides a trait-based architecture for syntax highlighting that allows
//! multiple backends to be plugged in.
//!
//! The bundled backend is **Syntect**, using Sublime Text syntax definitions
//! with two-face added for TypeScript/TSX grammars and extended themes.

pub mod error;
mod syntect;
pub mod types;

pub use error::{SyntaxError, SyntaxResult};
pub use self::syntect::{
  DEFAULT_THEME,
  SyntectHighlighter,
  create_syntect_manager,
};
pub use types::{SyntaxConfig, SyntaxHighlighter, SyntaxManager};

/// Create the default syntax manager with `theme` as its fallback theme.
///
/// # Errors
///
/// Returns an error if backend initialization fails.
pub fn create_default_manager(
  theme: Option<&str>,
) -> SyntaxResult<SyntaxManager> {
  create_syntect_manager(theme)
}
