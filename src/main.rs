use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use asset_dump::groups::{list_groups, render_group_listing};
use asset_dump::logging::init_logging;
use asset_dump::{AssetConfig, AssetDumper, AssetSource, ConfigAssetSource, ConsoleReporter};

/// Dump compiled assets for every configured variable combination.
#[derive(Debug, Parser)]
#[command(name = "asset-dump", version, about)]
struct Cli {
  /// List configured asset groups and whether they are compiled, then exit.
  #[arg(long)]
  show_groups: bool,

  /// Override the configured output root.
  #[arg(long, value_name = "DIR")]
  write_to: Option<PathBuf>,

  /// Configuration file (defaults to assets.config.{json,yaml,yml} in the working directory).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Enable debug logging.
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let config = match &cli.config {
    Some(path) => AssetConfig::from_path(path)?,
    None => {
      let cwd = std::env::current_dir().context("failed to determine working directory")?;
      AssetConfig::discover(&cwd)?
    }
  };

  let mut reporter = ConsoleReporter::new(io::stdout());

  if cli.show_groups {
    reporter.line("Get list of asset groups");
    for line in render_group_listing(&list_groups(&config)) {
      reporter.line(line);
    }
    return Ok(());
  }

  let settings = config
    .dump_settings(cli.write_to.as_deref())
    .context("failed to resolve output root")?;
  let bundles = ConfigAssetSource::new(&config).bundles()?;

  reporter.line(format!(
    "Dumping all assets to {}.",
    settings.output_root.display()
  ));
  reporter.line("");

  let report = AssetDumper::new(settings).dump(&bundles, &mut reporter)?;
  reporter.line("");
  reporter.line(report.summary());
  Ok(())
}
