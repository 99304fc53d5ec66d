use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};

/// Directory under the destination holding split out samples.
pub const SAMPLES_DIR: &str = "mds";

/// Whether `to` names a file rather than a directory.
///
/// Only the name matters; an existing directory called `out.html` is still
/// treated as a file.
#[must_use]
pub fn is_html_destination(to: &Path) -> bool {
  to.to_string_lossy().ends_with(".html")
}

/// Where the document rendered from `from` is written.
#[must_use]
pub fn document_path(to: &Path, from: &Path) -> PathBuf {
  if is_html_destination(to) {
    return to.to_path_buf();
  }

  let name = from
    .file_name()
    .map(PathBuf::from)
    .unwrap_or_default()
    .with_extension("html");
  to.join(name)
}

/// Write a full document, creating the destination directory if needed.
///
/// Returns the path written to.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written.
pub fn write_document(to: &Path, from: &Path, html: &str) -> Result<PathBuf> {
  if !to.exists() {
    let host = if is_html_destination(to) {
      to.parent().unwrap_or_else(|| Path::new(""))
    } else {
      to
    };
    fs::create_dir_all(host).wrap_err_with(|| {
      format!("Failed to create output directory: {}", host.display())
    })?;
  }

  let path = document_path(to, from);
  fs::write(&path, html)
    .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}

/// Write each sample to `<to>/mds/code-<n>.html`, numbered from 1.
///
/// Returns the number of files written.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or a file cannot be
/// written.
pub fn write_samples(to: &Path, samples: &[String]) -> Result<usize> {
  let dir = to.join(SAMPLES_DIR);
  fs::create_dir_all(&dir).wrap_err_with(|| {
    format!("Failed to create output directory: {}", dir.display())
  })?;

  for (index, sample) in samples.iter().enumerate() {
    let path = dir.join(format!("code-{}.html", index + 1));
    fs::write(&path, sample)
      .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
  }

  Ok(samples.len())
}
