use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Command line interface for twoslash
#[derive(Parser, Debug)]
#[command(
  name = "twoslash",
  author,
  version,
  about = "Convert Markdown and TS/JS sources with Twoslash code samples to \
           HTML"
)]
pub struct Cli {
  /// File or directory to convert. Directories have their direct children
  /// converted in name order.
  pub from: PathBuf,

  /// Destination. A path ending in `.html` is written as a file, anything
  /// else is treated as a directory.
  pub to: PathBuf,

  /// Write every rendered code sample to `<TO>/mds/code-<n>.html` instead of
  /// a full document
  #[arg(short, long, alias = "splitOutCodeSamples")]
  pub split_out_code_samples: bool,

  /// Also render TS/JS sources without Twoslash, next to the Twoslash
  /// rendering
  #[arg(long, alias = "alsoRenderSource")]
  pub also_render_source: bool,

  /// Only check the code samples, write nothing
  #[arg(long)]
  pub lint: bool,

  /// Directory for intermediate Markdown documents and checker inputs.
  /// Defaults to the system temporary directory.
  #[arg(long, value_name = "DIR")]
  pub scratch_dir: Option<PathBuf>,

  /// TypeScript compiler used to check Twoslash samples
  #[arg(long, value_name = "PATH")]
  pub tsc: Option<PathBuf>,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,

  #[command(flatten)]
  pub verbose: Verbosity<InfoLevel>,
}

impl Cli {
  /// Parse command line arguments
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
