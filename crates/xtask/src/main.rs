use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;
use twoslash_cli::cli::Cli;

const BIN_NAME: &str = "twoslash";

const DEFAULT_SHELLS: [Shell; 4] =
  [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell];

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  /// Root directory for generated files.
  #[arg(short, long, global = true, default_value = "dist")]
  out_dir: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate completions for the twoslash CLI into `<OUT_DIR>/completions`
  Completions {
    /// Shells to generate for. Defaults to bash, zsh, fish and powershell.
    #[arg(short, long, value_enum)]
    shell: Vec<Shell>,
  },

  /// Generate the `twoslash(1)` manpage into `<OUT_DIR>/man`
  Manpage,

  /// Generate every distribution artifact
  Dist,
}

fn main() -> Result<()> {
  let xtask = Xtask::parse();

  let written = match xtask.command {
    Commands::Completions { shell } => {
      write_completions(&xtask.out_dir, &shell)?
    },
    Commands::Manpage => vec![write_manpage(&xtask.out_dir)?],
    Commands::Dist => {
      let mut written = write_completions(&xtask.out_dir, &[])?;
      written.push(write_manpage(&xtask.out_dir)?);
      written
    },
  };

  for path in written {
    println!("Wrote {}", path.display());
  }
  Ok(())
}

fn create_dir(dir: &Path) -> Result<()> {
  fs::create_dir_all(dir)
    .with_context(|| format!("Failed to create {}", dir.display()))
}

/// Write one completion script per shell, all of them if `shells` is empty.
fn write_completions(out_dir: &Path, shells: &[Shell]) -> Result<Vec<PathBuf>> {
  let dir = out_dir.join("completions");
  create_dir(&dir)?;

  let shells = if shells.is_empty() {
    &DEFAULT_SHELLS[..]
  } else {
    shells
  };

  let mut cmd = Cli::command();
  shells
    .iter()
    .map(|&shell| {
      generate_to(shell, &mut cmd, BIN_NAME, &dir).with_context(|| {
        format!("Failed to generate {shell} completions")
      })
    })
    .collect()
}

fn write_manpage(out_dir: &Path) -> Result<PathBuf> {
  let dir = out_dir.join("man");
  create_dir(&dir)?;

  let path = dir.join(format!("{BIN_NAME}.1"));
  let mut file = fs::File::create(&path)
    .with_context(|| format!("Failed to create {}", path.display()))?;
  Man::new(Cli::command())
    .render(&mut file)
    .with_context(|| format!("Failed to render {}", path.display()))?;
  Ok(path)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]

  use tempfile::tempdir;

  use super::*;

  #[test]
  fn test_command_is_well_formed() {
    Xtask::command().debug_assert();
  }

  #[test]
  fn test_completions_for_selected_shells() {
    let temp_dir = tempdir().expect("Failed to create temp dir in test");
    let written = write_completions(temp_dir.path(), &[Shell::Fish])
      .expect("Failed to write completions");

    assert_eq!(written.len(), 1);
    assert_eq!(written[0], temp_dir.path().join("completions/twoslash.fish"));
    let script = fs::read_to_string(&written[0]).expect("Failed to read");
    assert!(script.contains("also-render-source"));
  }

  #[test]
  fn test_completions_default_to_every_shell() {
    let temp_dir = tempdir().expect("Failed to create temp dir in test");
    let written =
      write_completions(temp_dir.path(), &[]).expect("Failed to write");
    assert_eq!(written.len(), DEFAULT_SHELLS.len());
    assert!(written.iter().all(|path| path.is_file()));
  }

  #[test]
  fn test_manpage() {
    let temp_dir = tempdir().expect("Failed to create temp dir in test");
    let path = write_manpage(temp_dir.path()).expect("Failed to write");
    assert_eq!(path, temp_dir.path().join("man/twoslash.1"));
    let page = fs::read_to_string(path).expect("Failed to read");
    assert!(page.contains(".TH twoslash"));
  }

  #[test]
  fn test_out_dir_is_global() {
    let xtask = Xtask::try_parse_from(["xtask", "manpage", "-o", "target/x"])
      .expect("Failed to parse arguments");
    assert_eq!(xtask.out_dir, Path::new("target/x"));
    assert!(matches!(xtask.command, Commands::Manpage));
  }
}
