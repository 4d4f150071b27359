pub mod aggregate;
pub mod cli;
pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod format;
pub mod io_utils;
pub mod normalize;
pub mod report;
pub mod resolve;
pub mod store;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, OutputFormat},
    config::Config,
    normalize::Normalizer,
    report::{RenderedView, Report},
    store::{DatasetStore, DirectorySource},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("manpower_ledger", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    debug!("Effective configuration: {config:?}");

    let source = DirectorySource::from_config(&config)
        .with_context(|| format!("Preparing sheet source in {:?}", config.source.directory))?;
    let normalizer = Normalizer::new(config.locale.clone());
    let mut store = DatasetStore::new(source, normalizer, config.cache_ttl());
    let snapshot = store.snapshot();
    if !snapshot.warnings.is_empty() {
        info!(
            "{} sheet(s) unavailable; dependent views will be empty",
            snapshot.warnings.len()
        );
    }

    let filters = cli.filters.to_state();
    let report = Report::new(&snapshot.datasets, &filters, &config.locale)
        .with_warnings(&snapshot.warnings);
    let views = cli
        .command
        .views()
        .into_iter()
        .map(|kind| report.render(kind))
        .collect::<Vec<_>>();
    emit(&views, cli.format)
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(directory) = &cli.data_dir {
        config.source.directory = directory.clone();
    }
    Ok(config)
}

fn emit(views: &[RenderedView], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for view in views {
                table::print_view(view);
            }
        }
        OutputFormat::Json => {
            let rendered = match views {
                [single] => serde_json::to_string_pretty(single),
                many => serde_json::to_string_pretty(many),
            }
            .context("Serializing views to JSON")?;
            println!("{rendered}");
        }
    }
    Ok(())
}
