mod cli;
mod config;
mod input;
mod logging;
mod report;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::{engine_error, engine_info, engine_warn};
use filing_core::BatchSummary;
use filing_engine::{ensure_output_dir, SearchSession, WebDriverBrowser};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::report::ConsoleSink;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log_level(), cli.log_file.as_deref());

    match run(&cli) {
        Ok(summary) => {
            println!("{}", report::summary_line(&summary));
            ExitCode::SUCCESS
        }
        Err(err) => {
            engine_error!("Harvest aborted: {err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<BatchSummary> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    cli.apply_to(&mut config);

    let input = config
        .input
        .clone()
        .context("no input file; pass --input or set `input` in the config")?;
    let entities = input::read_entity_names(&input, &config.name_column, config.limit)?;
    if entities.is_empty() {
        engine_warn!("No plan names in {}", input.display());
        return Ok(BatchSummary::default());
    }
    engine_info!(
        "Loaded {} plan names from {} (year {})",
        entities.len(),
        input.display(),
        config.year
    );

    let session_config = config.session_config()?;
    // Chrome needs the download directory before the session starts.
    ensure_output_dir(&session_config.download_dir)?;
    let browser = WebDriverBrowser::connect(&config.driver_settings(&session_config))
        .with_context(|| format!("connecting to WebDriver at {}", config.webdriver_url))?;

    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })
    .context("installing Ctrl-C handler")?;

    let mut session = SearchSession::new(browser, session_config, Box::new(ConsoleSink));
    let summary = session.run_batch(&entities, &stop)?;
    Ok(summary)
}
