use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "filing-harvester")]
#[command(about = "Search the benefit-plan filing registry and download each plan's filing for one year")]
pub struct Cli {
    /// CSV file with one plan name per row
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Header of the column holding plan names
    #[arg(long)]
    pub column: Option<String>,

    /// Process at most this many plan names
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Reporting year to filter on
    #[arg(short, long)]
    pub year: Option<String>,

    /// Directory that receives the renamed filings
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Scratch directory the browser downloads into
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// WebDriver endpoint (chromedriver)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Run Chrome without a window
    #[arg(long)]
    pub headless: bool,

    /// RON configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Warn,
            (false, 0) => LevelFilter::Info,
            (false, 1) => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(input) = &self.input {
            config.input = Some(input.clone());
        }
        if let Some(column) = &self.column {
            config.name_column = column.clone();
        }
        if let Some(limit) = self.limit {
            config.limit = Some(limit);
        }
        if let Some(year) = &self.year {
            config.year = year.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dir) = &self.download_dir {
            config.download_dir = dir.clone();
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if self.headless {
            config.headless = true;
        }
    }
}
