use std::env;

use color_eyre::eyre::{Context, Result};
use log::debug;
use twoslash_cli::{
  cli::Cli,
  convert::{ConversionRequest, Converter},
};
use twoslash_commonmark::{
  MarkdownProcessor,
  find_tsc,
  processor::MarkdownOptionsBuilder,
};
use twoslash_config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  // Initialize logging first so we can log while loading configuration
  env_logger::Builder::new()
    .filter_level(cli.verbose.log_level_filter())
    .write_style(env_logger::WriteStyle::Always)
    .init();

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;

  // Command line flags win over any configuration source
  if let Some(scratch_dir) = cli.scratch_dir.clone() {
    config.scratch_dir = Some(scratch_dir);
  }
  if let Some(tsc) = cli.tsc.clone() {
    config.tsc = Some(tsc);
  }
  if config.tsc.is_none() {
    let cwd =
      env::current_dir().wrap_err("Failed to read the current directory")?;
    config.tsc = find_tsc(&cwd);
    if let Some(tsc) = &config.tsc {
      debug!("Found TypeScript compiler: {}", tsc.display());
    }
  }
  debug!("Effective configuration: {config:?}");

  let scratch_dir = config.scratch_dir();
  let options = MarkdownOptionsBuilder::new()
    .gfm(config.gfm)
    .highlight_theme(Some(config.highlight_theme))
    .tsc(config.tsc, config.tsc_args)
    .scratch_dir(&scratch_dir)
    .settings(config.settings)
    .build();

  let converter = Converter::new(MarkdownProcessor::new(options), scratch_dir);
  let request = ConversionRequest {
    from: cli.from,
    to: cli.to,
    split_out_code_samples: cli.split_out_code_samples,
    also_render_source: cli.also_render_source,
    lint: cli.lint,
    real_from: None,
  };

  converter.run(&request).wrap_err_with(|| {
    format!(
      "Failed to convert {} to {}",
      request.from.display(),
      request.to.display()
    )
  })
}
