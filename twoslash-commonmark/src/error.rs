use std::path::PathBuf;

use crate::{settings::SettingsError, twoslash::TransformError};

/// Errors raised while rendering a document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
  #[error("Failed to read {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Settings(#[from] SettingsError),

  #[error("Invalid twoslash settings in {}: {source}", path.display())]
  InvalidSettings {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to transform {}: {source}", path.display())]
  Transform {
    path:   PathBuf,
    #[source]
    source: TransformError,
  },

  #[error("Failed to serialize HTML: {0}")]
  Serialize(#[from] std::fmt::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
