pub mod filter;
pub mod output;
pub mod source;

pub use crate::utils::{
  filter::{can_convert, is_markdown},
  output::{write_document, write_samples},
  source::write_scratch_documents,
};
