use std::{fs, io, path::Path};

/// Extensions the converter accepts.
pub const CONVERTIBLE_EXTENSIONS: &[&str] = &["md", "ts", "js", "tsx", "jsx"];

/// Whether `path` names a file the converter can handle.
///
/// The extension and dotfile checks run first and never touch the
/// filesystem; only then is the path stat'ed to reject directories.
///
/// # Errors
///
/// Returns the stat error if the path does not exist or cannot be read.
pub fn can_convert(path: &Path) -> io::Result<bool> {
  let convertible = path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| CONVERTIBLE_EXTENSIONS.contains(&ext));
  if !convertible {
    return Ok(false);
  }

  let hidden = path
    .file_name()
    .and_then(|name| name.to_str())
    .is_some_and(|name| name.starts_with('.'));
  if hidden {
    return Ok(false);
  }

  Ok(!fs::metadata(path)?.is_dir())
}

/// Whether `path` is a Markdown document rather than a TS/JS source.
#[must_use]
pub fn is_markdown(path: &Path) -> bool {
  path.extension().is_some_and(|ext| ext == "md")
}
