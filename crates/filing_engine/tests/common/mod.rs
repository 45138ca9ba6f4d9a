#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

use filing_engine::{
    Browser, BrowserError, ElementHandle, PollBudget, SessionConfig, SessionTimings, Target,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// What clicking a row's download control does.
#[derive(Debug, Clone)]
pub enum Download {
    /// Writes each queued payload in turn as `file_name`.
    Completes {
        file_name: String,
        payloads: VecDeque<Vec<u8>>,
    },
    /// Leaves a partial marker that never finishes.
    Stalls { file_name: String },
    /// Nothing happens.
    Silent,
}

#[derive(Debug, Clone)]
pub struct Row {
    pub year: String,
    pub download: Download,
}

impl Row {
    pub fn completes(year: &str, file_name: &str, payload: &[u8]) -> Self {
        Self {
            year: year.to_string(),
            download: Download::Completes {
                file_name: file_name.to_string(),
                payloads: VecDeque::from(vec![payload.to_vec()]),
            },
        }
    }

    pub fn silent(year: &str) -> Self {
        Self {
            year: year.to_string(),
            download: Download::Silent,
        }
    }
}

/// Snapshot of the filter/query state at the moment a query is typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryProbe {
    pub year_filter: Option<String>,
    pub previous_query: Option<String>,
    pub text: String,
}

/// In-memory model of the registry search page.
pub struct FakeRegistry {
    download_dir: PathBuf,
    results: HashMap<String, Vec<Row>>,
    available_years: Vec<String>,

    // Scripted misbehavior.
    pub submit_present: bool,
    pub modal_on_loads: usize,
    /// Breadcrumb control missing until the next reload.
    pub clear_broken: bool,
    pub stale_cell_lookups: usize,
    pub lose_session_on_query: bool,
    /// Returned once by the next query entry.
    pub fail_next_query: Option<BrowserError>,
    /// The overlay shows but its close control never does.
    pub modal_stuck: bool,

    // Live page state.
    filters_open: bool,
    category_open: bool,
    year_filter: Option<String>,
    query: Option<String>,
    shown_query: Option<String>,
    modal_visible: bool,

    // Observations.
    pub loads: usize,
    pub reloads: usize,
    pub modals_closed: usize,
    pub triggers: usize,
    pub clear_lookups: usize,
    pub releases: usize,
    pub closed: usize,
    pub probes: Vec<QueryProbe>,
}

impl FakeRegistry {
    pub fn new(download_dir: &Path) -> Self {
        Self {
            download_dir: download_dir.to_path_buf(),
            results: HashMap::new(),
            available_years: vec!["2023".into(), "2024".into()],
            submit_present: true,
            modal_on_loads: 0,
            clear_broken: false,
            stale_cell_lookups: 0,
            lose_session_on_query: false,
            fail_next_query: None,
            modal_stuck: false,
            filters_open: false,
            category_open: false,
            year_filter: None,
            query: None,
            shown_query: None,
            modal_visible: false,
            loads: 0,
            reloads: 0,
            modals_closed: 0,
            triggers: 0,
            clear_lookups: 0,
            releases: 0,
            closed: 0,
            probes: Vec::new(),
        }
    }

    pub fn with_results(mut self, query: &str, rows: Vec<Row>) -> Self {
        self.results.insert(query.to_string(), rows);
        self
    }

    /// True when the page shows the year filter and no query term.
    pub fn is_filter_applied(&self) -> bool {
        self.year_filter.is_some() && self.query.is_none() && !self.modal_visible
    }

    pub fn year_filter(&self) -> Option<&str> {
        self.year_filter.as_deref()
    }

    fn load(&mut self) {
        self.loads += 1;
        self.filters_open = false;
        self.category_open = false;
        self.year_filter = None;
        self.query = None;
        self.shown_query = None;
        self.modal_visible = self.modal_on_loads > 0;
        self.modal_on_loads = self.modal_on_loads.saturating_sub(1);
    }

    fn shown_rows(&self) -> &[Row] {
        self.shown_query
            .as_ref()
            .and_then(|query| self.results.get(query))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn handles(ids: impl IntoIterator<Item = String>) -> Vec<ElementHandle> {
        ids.into_iter().map(ElementHandle::new).collect()
    }

    fn row_index(handle: &ElementHandle, prefix: &str) -> Option<usize> {
        handle
            .as_str()
            .strip_prefix(prefix)?
            .split(':')
            .next()?
            .parse()
            .ok()
    }

    fn trigger_download(&mut self, row: usize) {
        self.triggers += 1;
        let Some(query) = self.shown_query.clone() else {
            return;
        };
        let Some(row) = self.results.get_mut(&query).and_then(|rows| rows.get_mut(row)) else {
            return;
        };
        match &mut row.download {
            Download::Completes {
                file_name,
                payloads,
            } => {
                let payload = if payloads.len() > 1 {
                    payloads.pop_front().unwrap_or_default()
                } else {
                    payloads.front().cloned().unwrap_or_default()
                };
                fs::write(self.download_dir.join(&*file_name), payload).unwrap();
            }
            Download::Stalls { file_name } => {
                let marker = format!("{file_name}.crdownload");
                fs::write(self.download_dir.join(marker), b"partial").unwrap();
            }
            Download::Silent => {}
        }
    }
}

impl Browser for FakeRegistry {
    fn open(&mut self, _url: &str) -> Result<(), BrowserError> {
        self.load();
        Ok(())
    }

    fn reload(&mut self) -> Result<(), BrowserError> {
        self.reloads += 1;
        self.clear_broken = false;
        self.load();
        Ok(())
    }

    fn locate_all(
        &mut self,
        target: &Target,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, BrowserError> {
        if self.modal_visible && !matches!(target, Target::ModalSignal(_) | Target::ModalClose) {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = match target {
            Target::ShowFilters => vec!["show-filters".into()],
            Target::FilterCategory if self.filters_open => vec!["category".into()],
            Target::YearOption(year)
                if self.category_open && self.available_years.contains(year) =>
            {
                vec![format!("year:{year}")]
            }
            Target::SearchField => vec!["search".into()],
            Target::SubmitSearch if self.submit_present => vec!["submit".into()],
            Target::ResultRow => (0..self.shown_rows().len()).map(|i| format!("row:{i}")).collect(),
            Target::RowCell => {
                if self.stale_cell_lookups > 0 {
                    self.stale_cell_lookups -= 1;
                    return Err(BrowserError::StaleElement);
                }
                let row = scope
                    .and_then(|s| Self::row_index(s, "row:"))
                    .ok_or(BrowserError::StaleElement)?;
                (0..3).map(|col| format!("cell:{row}:{col}")).collect()
            }
            Target::RowTrigger => {
                let row = scope
                    .and_then(|s| Self::row_index(s, "cell:"))
                    .ok_or(BrowserError::StaleElement)?;
                vec![format!("trigger:{row}")]
            }
            Target::ModalClose if self.modal_stuck => Vec::new(),
            Target::ModalSignal(_) | Target::ModalClose if self.modal_visible => {
                vec![format!("{target:?}")]
            }
            Target::ClearQueryCriterion => {
                self.clear_lookups += 1;
                if self.query.is_some() && !self.clear_broken {
                    vec!["clear".into()]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        };
        Ok(Self::handles(ids))
    }

    fn is_interactable(&mut self, _element: &ElementHandle) -> Result<bool, BrowserError> {
        Ok(true)
    }

    fn read_text(&mut self, element: &ElementHandle) -> Result<String, BrowserError> {
        let id = element.as_str();
        let Some(rest) = id.strip_prefix("cell:") else {
            return Ok(String::new());
        };
        let mut parts = rest.split(':');
        let row: usize = parts.next().and_then(|p| p.parse().ok()).unwrap_or(usize::MAX);
        let col: usize = parts.next().and_then(|p| p.parse().ok()).unwrap_or(usize::MAX);
        let rows = self.shown_rows();
        let Some(row) = rows.get(row) else {
            return Err(BrowserError::StaleElement);
        };
        Ok(if col == 2 { row.year.clone() } else { String::new() })
    }

    fn dispatch_click(&mut self, element: &ElementHandle) -> Result<(), BrowserError> {
        let id = element.as_str().to_string();
        match id.as_str() {
            "show-filters" => self.filters_open = true,
            "category" => self.category_open = true,
            "submit" => self.shown_query = self.query.clone(),
            "clear" => {
                self.query = None;
                self.shown_query = None;
            }
            "ModalClose" => {
                self.modal_visible = false;
                self.modals_closed += 1;
            }
            other => {
                if let Some(year) = other.strip_prefix("year:") {
                    self.year_filter = Some(year.to_string());
                    self.filters_open = false;
                    self.category_open = false;
                } else if let Some(row) = Self::row_index(element, "trigger:") {
                    self.trigger_download(row);
                } else {
                    return Err(BrowserError::NotInteractable(other.to_string()));
                }
            }
        }
        Ok(())
    }

    fn enter_text(&mut self, _element: &ElementHandle, text: &str) -> Result<(), BrowserError> {
        if self.lose_session_on_query {
            return Err(BrowserError::SessionLost("chrome not reachable".into()));
        }
        if let Some(err) = self.fail_next_query.take() {
            return Err(err);
        }
        self.probes.push(QueryProbe {
            year_filter: self.year_filter.clone(),
            previous_query: self.query.clone(),
            text: text.to_string(),
        });
        self.query = Some(text.to_string());
        if !self.submit_present {
            self.shown_query = self.query.clone();
        }
        Ok(())
    }

    fn release_handles(&mut self) {
        self.releases += 1;
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        self.closed += 1;
        Ok(())
    }
}

pub fn quick(attempts: u32) -> PollBudget {
    PollBudget::new(Duration::from_millis(1), attempts)
}

/// Session config with millisecond budgets rooted in `root`.
pub fn fast_config(root: &Path) -> SessionConfig {
    let mut config = SessionConfig::new("2024", root.join("tmp_downloads"), root.join("outputs"));
    config.timings = SessionTimings {
        element_wait: quick(5),
        submit_wait: quick(2),
        results_wait: quick(5),
        modal_probe: quick(3),
        download_poll: quick(20),
        stale_attempts: 3,
        stale_backoff: Duration::from_millis(1),
        clear_attempts: 3,
        clear_backoff: Duration::from_millis(1),
        settle_delay: Duration::ZERO,
        recovery_attempts: 2,
    };
    config
}
