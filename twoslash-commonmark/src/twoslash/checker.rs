//! Type checking of Twoslash samples.
//!
//! The transform only depends on the [`TypeChecker`] trait. [`TscChecker`]
//! implements it by running the TypeScript compiler over each sample.

use std::{
  fs,
  path::{Path, PathBuf},
  process::Command,
  sync::LazyLock,
};

use regex::Regex;
use serde_json::Value;

use super::markup::{Query, TwoslashSample};
use crate::utils::compile_or_never;

#[cfg(windows)]
const TSC_BIN: &str = "tsc.cmd";
#[cfg(not(windows))]
const TSC_BIN: &str = "tsc";

/// `input.ts(3,7): error TS2322: Type 'number' is not assignable ...`
static DIAGNOSTIC_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never(concat!(
    r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\): ",
    r"error TS(?P<code>\d+): (?P<message>.*)$",
  ))
});

/// A diagnostic reported by a checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  /// Zero-based line in the checked code.
  pub line:    usize,
  /// Zero-based character column.
  pub column:  usize,
  /// TypeScript error code, e.g. `2322`.
  pub code:    u32,
  pub message: String,
}

/// The answer to a `^?` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAnswer {
  pub query: Query,
  /// Text shown in the popover, usually the type at the caret.
  pub text:  String,
}

/// Everything a checker found out about one sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
  pub diagnostics: Vec<Diagnostic>,
  pub answers:     Vec<QueryAnswer>,
}

/// Errors raised while running a checker.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
  #[error("I/O error while preparing the sample: {0}")]
  Io(#[from] std::io::Error),

  #[error("Failed to run type checker '{}': {source}", program.display())]
  Spawn {
    program: PathBuf,
    #[source]
    source:  std::io::Error,
  },

  #[error(
    "Type checker exited with {status} without reporting \
     diagnostics:\n{output}"
  )]
  Failed { status: String, output: String },
}

/// A type checker for Twoslash samples.
pub trait TypeChecker: Send + Sync {
  /// Name used in logs.
  fn name(&self) -> &str;

  /// Check a sample and report its diagnostics.
  ///
  /// # Errors
  ///
  /// Returns an error if the checker could not be run. Type errors in the
  /// sample are not errors; they are part of the report.
  fn check(&self, sample: &TwoslashSample) -> Result<CheckReport, CheckError>;
}

/// Runs `tsc --noEmit` over each sample.
///
/// `tsc` only reports diagnostics, so `^?` queries are left unanswered.
#[derive(Debug, Clone)]
pub struct TscChecker {
  program: PathBuf,
  args:    Vec<String>,
  scratch: PathBuf,
}

impl TscChecker {
  /// Create a checker running `program`, writing inputs under `scratch`.
  #[must_use]
  pub fn new(program: impl Into<PathBuf>, scratch: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args:    Vec::new(),
      scratch: scratch.into(),
    }
  }

  /// Extra arguments passed to every invocation, before the input file.
  #[must_use]
  pub fn with_args(mut self, args: Vec<String>) -> Self {
    self.args = args;
    self
  }

  /// Command line arguments for a sample, excluding the input file.
  #[must_use]
  pub fn arguments(&self, sample: &TwoslashSample) -> Vec<String> {
    let options = &sample.compiler_options;
    let mut args: Vec<String> =
      vec!["--noEmit".into(), "--pretty".into(), "false".into()];

    if !options.contains_key("strict") {
      args.push("--strict".into());
    }

    match sample.file_extension() {
      "js" | "jsx" => {
        if !options.contains_key("allowJs") {
          args.push("--allowJs".into());
        }
        if !options.contains_key("checkJs") {
          args.push("--checkJs".into());
        }
      },
      _ => {},
    }

    if matches!(sample.file_extension(), "jsx" | "tsx")
      && !options.contains_key("jsx")
    {
      args.extend(["--jsx".into(), "preserve".into()]);
    }

    for (name, value) in options {
      match value {
        Value::Bool(true) => args.push(format!("--{name}")),
        Value::Null => {},
        Value::String(text) => {
          args.extend([format!("--{name}"), text.clone()]);
        },
        Value::Array(items) => {
          let joined = items
            .iter()
            .map(|item| {
              item.as_str().map_or_else(|| item.to_string(), str::to_string)
            })
            .collect::<Vec<_>>()
            .join(",");
          args.extend([format!("--{name}"), joined]);
        },
        other => args.extend([format!("--{name}"), other.to_string()]),
      }
    }

    args.extend(self.args.iter().cloned());
    args
  }
}

impl TypeChecker for TscChecker {
  fn name(&self) -> &str {
    "tsc"
  }

  fn check(&self, sample: &TwoslashSample) -> Result<CheckReport, CheckError> {
    fs::create_dir_all(&self.scratch)?;
    let dir = tempfile::Builder::new()
      .prefix("twoslash-check-")
      .tempdir_in(&self.scratch)?;

    let file_name = format!("input.{}", sample.file_extension());
    fs::write(dir.path().join(&file_name), sample.checked_code())?;

    let args = self.arguments(sample);
    log::debug!(
      "Running {} {} {file_name}",
      self.program.display(),
      args.join(" ")
    );

    let output = Command::new(&self.program)
      .args(&args)
      .arg(&file_name)
      .current_dir(dir.path())
      .output()
      .map_err(|source| {
        CheckError::Spawn {
          program: self.program.clone(),
          source,
        }
      })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    let diagnostics = parse_diagnostics(&text, Path::new(&file_name));
    if !output.status.success() && diagnostics.is_empty() {
      return Err(CheckError::Failed {
        status: output.status.to_string(),
        output: text,
      });
    }

    Ok(CheckReport {
      diagnostics,
      answers: Vec::new(),
    })
  }
}

/// Locate a TypeScript compiler: the nearest `node_modules/.bin/tsc` at or
/// above `start`, then `tsc` on `PATH`.
#[must_use]
pub fn find_tsc(start: &Path) -> Option<PathBuf> {
  find_local_tsc(start).or_else(|| which::which(TSC_BIN).ok())
}

/// The nearest `node_modules/.bin/tsc` at or above `start`.
#[must_use]
pub fn find_local_tsc(start: &Path) -> Option<PathBuf> {
  start
    .ancestors()
    .map(|dir| dir.join("node_modules").join(".bin").join(TSC_BIN))
    .find(|candidate| candidate.is_file())
}

/// Parse `tsc --pretty false` output.
///
/// Only diagnostics for `file` are kept; errors in other files (e.g. a
/// broken `tsconfig.json`) are logged. Indented lines continue the message of
/// the diagnostic before them.
#[must_use]
pub fn parse_diagnostics(output: &str, file: &Path) -> Vec<Diagnostic> {
  let mut diagnostics: Vec<Diagnostic> = Vec::new();
  let mut continuing = false;

  for line in output.lines() {
    if let Some(caps) = DIAGNOSTIC_RE.captures(line) {
      let (Ok(line_no), Ok(col), Ok(code)) = (
        caps["line"].parse::<usize>(),
        caps["col"].parse::<usize>(),
        caps["code"].parse::<u32>(),
      ) else {
        continuing = false;
        continue;
      };

      if Path::new(&caps["file"]) != file {
        log::warn!("tsc: {line}");
        continuing = false;
        continue;
      }

      diagnostics.push(Diagnostic {
        line:    line_no.saturating_sub(1),
        column:  col.saturating_sub(1),
        code,
        message: caps["message"].to_string(),
      });
      continuing = true;
    } else if continuing
      && line.starts_with(char::is_whitespace)
      && let Some(last) = diagnostics.last_mut()
    {
      last.message.push('\n');
      last.message.push_str(line.trim());
    } else {
      continuing = false;
    }
  }

  diagnostics
}
