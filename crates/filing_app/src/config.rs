use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use filing_engine::{
    DriverSettings, PageSelectors, PollBudget, SessionConfig, DEFAULT_MODAL_SIGNAL,
    DEFAULT_SEARCH_URL,
};
use serde::{Deserialize, Serialize};

/// Run configuration, loadable from a RON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input: Option<PathBuf>,
    pub name_column: String,
    pub limit: Option<usize>,
    pub year: String,
    pub search_url: String,
    pub output_dir: PathBuf,
    pub download_dir: PathBuf,
    pub webdriver_url: String,
    pub headless: bool,
    pub extension: String,
    pub modal_signal_text: String,
    pub timings: TimingOverrides,
    pub selectors: PageSelectors,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: None,
            name_column: "Full_Plan_Name".to_string(),
            limit: Some(10),
            year: "2024".to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            output_dir: PathBuf::from("outputs"),
            download_dir: PathBuf::from("outputs_tmp_downloads"),
            webdriver_url: "http://localhost:4444".to_string(),
            headless: false,
            extension: "pdf".to_string(),
            modal_signal_text: DEFAULT_MODAL_SIGNAL.to_string(),
            timings: TimingOverrides::default(),
            selectors: PageSelectors::default(),
        }
    }
}

/// Optional replacements for the session's default budgets, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingOverrides {
    /// Tick for every element, submit, results and modal wait. Waits without
    /// their own override keep their default total.
    pub poll_interval_ms: Option<u64>,
    pub element_wait_ms: Option<u64>,
    pub results_wait_ms: Option<u64>,
    pub modal_probe_ms: Option<u64>,
    pub download_interval_ms: Option<u64>,
    pub download_attempts: Option<u32>,
    pub clear_attempts: Option<u32>,
    pub recovery_attempts: Option<u32>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        ron::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Session settings with both directories made absolute.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let download_dir = std::path::absolute(&self.download_dir)
            .with_context(|| format!("resolving {}", self.download_dir.display()))?;
        let output_dir = std::path::absolute(&self.output_dir)
            .with_context(|| format!("resolving {}", self.output_dir.display()))?;

        let mut config = SessionConfig::new(self.year.trim(), download_dir, output_dir);
        config.search_url = self.search_url.clone();
        config.expected_extension = self.extension.clone();
        config.modal_signal_text = self.modal_signal_text.clone();
        self.timings.apply(&mut config);
        Ok(config)
    }

    pub fn driver_settings(&self, session: &SessionConfig) -> DriverSettings {
        DriverSettings {
            webdriver_url: self.webdriver_url.clone(),
            download_dir: session.download_dir.clone(),
            headless: self.headless,
            selectors: self.selectors.clone(),
        }
    }
}

impl TimingOverrides {
    fn apply(&self, config: &mut SessionConfig) {
        let timings = &mut config.timings;
        let interval = self.poll_interval_ms.map(Duration::from_millis);
        // A new interval alone re-spreads each wait over its current total.
        let rebudget = |current: PollBudget, timeout_ms: Option<u64>| {
            if interval.is_none() && timeout_ms.is_none() {
                return current;
            }
            let timeout = timeout_ms.map_or_else(|| current.total(), Duration::from_millis);
            PollBudget::from_timeout(timeout, interval.unwrap_or(current.interval))
        };

        timings.element_wait = rebudget(timings.element_wait, self.element_wait_ms);
        timings.submit_wait = rebudget(timings.submit_wait, None);
        timings.results_wait = rebudget(timings.results_wait, self.results_wait_ms);
        timings.modal_probe = rebudget(timings.modal_probe, self.modal_probe_ms);

        if let Some(ms) = self.download_interval_ms {
            timings.download_poll.interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = self.download_attempts {
            timings.download_poll.attempts = attempts;
        }
        if let Some(attempts) = self.clear_attempts {
            timings.clear_attempts = attempts;
        }
        if let Some(attempts) = self.recovery_attempts {
            timings.recovery_attempts = attempts;
        }
    }
}
