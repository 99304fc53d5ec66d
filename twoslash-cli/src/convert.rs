//! Conversion of single files and directories to HTML.
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use log::{debug, info, warn};
use twoslash_commonmark::{MarkdownProcessor, RenderMode, RenderOutput};
use walkdir::WalkDir;

use crate::utils::{
  can_convert,
  is_markdown,
  write_document,
  write_samples,
  write_scratch_documents,
};

/// A single conversion, from a source file to a destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionRequest {
  /// File (or directory, see [`Converter::run`]) to convert.
  pub from: PathBuf,

  /// Destination file (ending in `.html`) or directory.
  pub to: PathBuf,

  /// Write every raw HTML node to `<to>/mds/code-<n>.html`.
  pub split_out_code_samples: bool,

  /// For TS/JS sources, also render the source without Twoslash.
  pub also_render_source: bool,

  /// Check only, write nothing.
  pub lint: bool,

  /// The file shown in logs when `from` is a synthetic document.
  pub real_from: Option<PathBuf>,
}

impl ConversionRequest {
  #[must_use]
  pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(from: P, to: Q) -> Self {
    Self {
      from: from.into(),
      to: to.into(),
      ..Default::default()
    }
  }

  const fn mode(&self) -> RenderMode {
    if self.lint {
      RenderMode::Lint
    } else if self.split_out_code_samples {
      RenderMode::Samples
    } else {
      RenderMode::Document
    }
  }

  fn display_source(&self) -> &Path {
    self.real_from.as_deref().unwrap_or(&self.from)
  }
}

/// Drives conversions through a [`MarkdownProcessor`].
#[derive(Clone)]
pub struct Converter {
  processor:   MarkdownProcessor,
  scratch_dir: PathBuf,
}

impl Converter {
  /// Create a converter writing synthetic documents to `scratch_dir`.
  #[must_use]
  pub fn new<P: Into<PathBuf>>(
    processor: MarkdownProcessor,
    scratch_dir: P,
  ) -> Self {
    Self {
      processor,
      scratch_dir: scratch_dir.into(),
    }
  }

  /// Whether Twoslash samples are type checked, not just parsed.
  #[must_use]
  pub fn checks_types(&self) -> bool {
    self.processor.checks_types()
  }

  /// Convert `request.from`, which may be a file or a directory.
  ///
  /// A directory has its direct children converted in name order; the first
  /// failure stops the run.
  ///
  /// # Errors
  ///
  /// Returns the first conversion error.
  pub fn run(&self, request: &ConversionRequest) -> Result<()> {
    if request.lint && !self.checks_types() {
      warn!(
        "No TypeScript compiler found; linting only validates Twoslash \
         markup. Pass --tsc or set `tsc` in the configuration."
      );
    }

    if !request.from.is_dir() {
      return self.run_on_file(request);
    }

    info!("Converting files in {}", request.from.display());
    let entries = WalkDir::new(&request.from)
      .min_depth(1)
      .max_depth(1)
      .sort_by_file_name();
    for entry in entries {
      let entry = entry.wrap_err_with(|| {
        format!("Failed to read directory: {}", request.from.display())
      })?;
      self.run_on_file(&ConversionRequest {
        from: entry.into_path(),
        ..request.clone()
      })?;
    }
    Ok(())
  }

  /// Convert a single file. Files the converter cannot handle are skipped.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be stat'ed, read, rendered or
  /// written.
  pub fn run_on_file(&self, request: &ConversionRequest) -> Result<()> {
    let convertible = can_convert(&request.from).wrap_err_with(|| {
      format!("Failed to inspect {}", request.from.display())
    })?;
    if !convertible {
      debug!("Skipping {}", request.from.display());
      return Ok(());
    }

    if is_markdown(&request.from) {
      self.render_markdown(request)
    } else {
      self.render_source(request)
    }
  }

  /// Wrap a TS/JS source into Markdown documents in the scratch directory
  /// and render those.
  ///
  /// # Errors
  ///
  /// Returns an error if the source cannot be wrapped or a document fails to
  /// render.
  pub fn render_source(&self, request: &ConversionRequest) -> Result<()> {
    let documents = write_scratch_documents(
      &request.from,
      &self.scratch_dir,
      request.also_render_source,
    )?;

    for document in documents {
      self.render_markdown(&ConversionRequest {
        from: document,
        real_from: Some(request.from.clone()),
        ..request.clone()
      })?;
    }
    Ok(())
  }

  /// Render a Markdown document and write the result.
  ///
  /// # Errors
  ///
  /// Returns an error if rendering or writing fails.
  pub fn render_markdown(&self, request: &ConversionRequest) -> Result<()> {
    let output = self
      .processor
      .render_file(&request.from, request.mode())
      .wrap_err_with(|| {
        format!("Failed to convert {}", request.display_source().display())
      })?;

    match output {
      RenderOutput::Linted => {
        debug!("Checked {}", request.display_source().display());
      },
      RenderOutput::Document(html) => {
        let written = write_document(&request.to, &request.from, &html)?;
        info!(
          "  - {} -> {}",
          request.display_source().display(),
          written.display()
        );
      },
      RenderOutput::Samples(samples) => {
        let count = write_samples(&request.to, &samples)?;
        info!(" -> Wrote {count} files to {}", request.to.display());
      },
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mode() {
    let mut request = ConversionRequest::new("a.md", "out");
    assert_eq!(request.mode(), RenderMode::Document);
    request.split_out_code_samples = true;
    assert_eq!(request.mode(), RenderMode::Samples);
    request.lint = true;
    assert_eq!(request.mode(), RenderMode::Lint);
  }

  #[test]
  fn test_display_source() {
    let mut request = ConversionRequest::new("/tmp/a.ts.md", "out");
    assert_eq!(request.display_source(), Path::new("/tmp/a.ts.md"));
    request.real_from = Some("src/a.ts".into());
    assert_eq!(request.display_source(), Path::new("src/a.ts"));
  }
}
