//! Search session state machine.
//!
//! For each entity the session drives the remote page through
//! filter → query → result check → download → reset and always returns it to
//! [`UiState::FilterApplied`] before the next entity begins. Per-entity
//! failures become outcomes; only an unusable browser session or a page that
//! cannot be re-filtered ends the batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use engine_logging::{engine_debug, engine_info, engine_warn, set_current_entity};
use filing_core::{
    build_search_query, canonical_file_name, year_matches, BatchSummary, NotFoundReason,
    SearchOutcome, UiState,
};
use thiserror::Error;

use crate::interact::{
    click_when_ready, dismiss_blocking_modal, retry_on_staleness, wait_until_ready, ModalCheck,
};
use crate::persist::ensure_output_dir;
use crate::poll::poll_until;
use crate::watcher::{Completion, DirectoryWatcher, DownloadTarget};
use crate::{
    Browser, BrowserError, ElementHandle, EventSink, SessionConfig, SessionError, SessionEvent,
    Target, WatchError,
};

/// Non-fatal reasons an entity ends early; reported as [`SearchOutcome::Error`].
#[derive(Debug, Error)]
enum EntityError {
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error("{0} never became ready")]
    NotReady(Target),
    #[error(transparent)]
    Watch(#[from] WatchError),
}

/// Clears the logging entity context when an entity finishes, on any path.
struct EntityScope;

impl EntityScope {
    fn enter(index: usize) -> Self {
        set_current_entity(Some(index));
        Self
    }
}

impl Drop for EntityScope {
    fn drop(&mut self) {
        set_current_entity(None);
    }
}

pub struct SearchSession<B: Browser> {
    browser: B,
    config: SessionConfig,
    watcher: DirectoryWatcher,
    sink: Box<dyn EventSink>,
    state: UiState,
    closed: bool,
}

impl<B: Browser> SearchSession<B> {
    pub fn new(browser: B, config: SessionConfig, sink: Box<dyn EventSink>) -> Self {
        let watcher = DirectoryWatcher::new(
            config.timings.download_poll,
            config.partial_extension.clone(),
        );
        Self {
            browser,
            config,
            watcher,
            sink,
            state: UiState::Unfiltered,
            closed: false,
        }
    }

    /// Position the session believes the remote page is in.
    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    /// Opens the search page, clears any blocking overlay and applies the
    /// year filter.
    pub fn start(&mut self) -> Result<(), SessionError> {
        ensure_output_dir(&self.config.download_dir)?;
        ensure_output_dir(&self.config.output_dir)?;

        engine_info!("opening {}", self.config.search_url);
        self.browser.open(&self.config.search_url)?;
        self.state = UiState::Unfiltered;

        match self.establish_filter() {
            Ok(true) => {}
            Ok(false) => {
                engine_warn!("initial year filter failed; reloading");
                self.recover(0)?;
            }
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => {
                engine_warn!("initial year filter failed: {}; reloading", err);
                self.recover(0)?;
            }
        }
        self.sink.emit(SessionEvent::Ready);
        Ok(())
    }

    /// Processes entities in order, stopping early once `stop` is set.
    /// The browser session is closed on every exit path.
    pub fn run_batch(
        &mut self,
        entities: &[String],
        stop: &AtomicBool,
    ) -> Result<BatchSummary, SessionError> {
        let result = self.drive_batch(entities, stop);
        if let Err(err) = self.close() {
            engine_warn!("failed to close browser session: {}", err);
        }
        result
    }

    fn drive_batch(
        &mut self,
        entities: &[String],
        stop: &AtomicBool,
    ) -> Result<BatchSummary, SessionError> {
        self.start()?;
        let mut summary = BatchSummary::default();
        for (offset, entity) in entities.iter().enumerate() {
            if stop.load(Ordering::SeqCst) {
                engine_info!("stop requested; {} entities left", entities.len() - offset);
                summary.stopped_early = true;
                break;
            }
            let outcome = self.process_entity(offset + 1, entity)?;
            summary.record(&outcome);
        }
        Ok(summary)
    }

    /// Searches for one entity and resets the page for the next one.
    ///
    /// `index` is 1-based and only used for reporting.
    pub fn process_entity(
        &mut self,
        index: usize,
        entity: &str,
    ) -> Result<SearchOutcome, SessionError> {
        let _scope = EntityScope::enter(index);
        self.browser.release_handles();

        if !self.state.is_ready_for_query() {
            engine_warn!("page not in filtered state ({:?}); restoring", self.state);
            self.recover(index)?;
        }

        let query = build_search_query(entity, self.config.max_query_words);
        engine_info!("searching: {}", query);
        self.sink.emit(SessionEvent::EntityStarted {
            index,
            entity: entity.to_string(),
            query: query.clone(),
        });

        let outcome = match self.search(entity, &query) {
            Ok(outcome) => outcome,
            Err(EntityError::Browser(err)) if err.is_fatal() => {
                return Err(SessionError::SessionFatal(err));
            }
            Err(err) => {
                engine_warn!("search for {:?} failed: {}", entity, err);
                SearchOutcome::Error(err.to_string())
            }
        };
        match &outcome {
            SearchOutcome::Found(path) => engine_info!("found, saved {:?}", path),
            other => engine_info!("{}", other),
        }
        self.sink.emit(SessionEvent::EntityFinished {
            index,
            entity: entity.to_string(),
            outcome: outcome.clone(),
        });

        self.reset_for_next(index)?;
        Ok(outcome)
    }

    /// Releases the browser session. Safe to call more than once.
    pub fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.browser.close()
    }

    fn search(&mut self, entity: &str, query: &str) -> Result<SearchOutcome, EntityError> {
        let target = DownloadTarget {
            source_directory: self.config.download_dir.clone(),
            canonical_output_path: self.config.output_dir.join(canonical_file_name(
                entity,
                &self.config.target_year,
                &self.config.expected_extension,
            )),
            expected_extension: self.config.expected_extension.clone(),
        };

        self.submit_query(query)?;

        if !self.wait_for_results()? {
            return Ok(SearchOutcome::NotFound(NotFoundReason::NoResults));
        }
        if !self.has_year_row()? {
            return Ok(SearchOutcome::NotFound(NotFoundReason::NoMatchingYear));
        }

        let before = self.watcher.snapshot(&target.source_directory)?;
        if !self.trigger_download()? {
            return Ok(SearchOutcome::NotFound(NotFoundReason::TriggerUnavailable));
        }

        match self.watcher.await_completion(&before, &target)? {
            Completion::Relocated(path) => Ok(SearchOutcome::Found(path)),
            Completion::TimedOut { saw_partial } => {
                engine_warn!(
                    "download triggered but no file arrived within {:?} (transfer seen: {})",
                    self.config.timings.download_poll.total(),
                    saw_partial
                );
                Ok(SearchOutcome::NotFound(NotFoundReason::NoArtifact))
            }
        }
    }

    fn submit_query(&mut self, query: &str) -> Result<(), EntityError> {
        let timings = &self.config.timings;
        let field = wait_until_ready(&mut self.browser, &Target::SearchField, timings.element_wait)?
            .ok_or(EntityError::NotReady(Target::SearchField))?;
        self.browser.enter_text(&field, query)?;
        self.state = UiState::ResultsShown;
        thread::sleep(timings.settle_delay);

        if !click_when_ready(&mut self.browser, &Target::SubmitSearch, timings.submit_wait)? {
            engine_debug!("no submit control; relying on the input event");
        }
        Ok(())
    }

    fn wait_for_results(&mut self) -> Result<bool, BrowserError> {
        let browser = &mut self.browser;
        let rendered = poll_until(self.config.timings.results_wait, |_| {
            match browser.locate_all(&Target::ResultRow, None) {
                Ok(rows) if !rows.is_empty() => Ok(Some(rows.len())),
                Ok(_) => Ok(None),
                Err(err) if err.is_transient() => Ok(None),
                Err(err) => Err(err),
            }
        })?;
        if let Some(count) = rendered {
            engine_debug!("{} result rows rendered", count);
        }
        Ok(rendered.is_some())
    }

    fn has_year_row(&mut self) -> Result<bool, BrowserError> {
        let year = self.config.target_year.as_str();
        let column = self.config.year_column;
        let timings = &self.config.timings;
        let scanned = retry_on_staleness(
            &mut self.browser,
            timings.stale_attempts,
            timings.stale_backoff,
            |browser| find_year_row(browser, year, column),
        );
        match scanned {
            Ok(cells) => Ok(cells.is_some()),
            Err(err) if err.is_transient() => {
                engine_warn!("result rows kept changing: {}", err);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Activates the download control of the first row for the target
    /// year. Rows are re-read on each attempt since they may re-render
    /// between the year check and the click.
    fn trigger_download(&mut self) -> Result<bool, BrowserError> {
        let year = self.config.target_year.as_str();
        let year_column = self.config.year_column;
        let trigger_column = self.config.trigger_column;
        let timings = &self.config.timings;
        let triggered = retry_on_staleness(
            &mut self.browser,
            timings.stale_attempts,
            timings.stale_backoff,
            |browser| {
                let Some(cells) = find_year_row(browser, year, year_column)? else {
                    return Ok(false);
                };
                let Some(cell) = cells.get(trigger_column) else {
                    return Ok(false);
                };
                let Some(control) = browser.locate_first(&Target::RowTrigger, Some(cell))? else {
                    return Ok(false);
                };
                browser.dispatch_click(&control)?;
                Ok(true)
            },
        );
        match triggered {
            Ok(true) => {
                engine_debug!("download triggered");
                Ok(true)
            }
            Ok(false) => {
                engine_warn!("matching row has no usable download control");
                Ok(false)
            }
            Err(err) if err.is_transient() => {
                engine_warn!("download control unavailable: {}", err);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Returns the page to [`UiState::FilterApplied`], preferring the
    /// breadcrumb and falling back to reload plus re-filter.
    fn reset_for_next(&mut self, index: usize) -> Result<(), SessionError> {
        if self.clear_query_criterion()? {
            self.state = UiState::FilterApplied;
            thread::sleep(self.config.timings.settle_delay);
            return Ok(());
        }
        engine_warn!(
            "clear control failed after {} attempts; reloading",
            self.config.timings.clear_attempts
        );
        self.recover(index)
    }

    fn clear_query_criterion(&mut self) -> Result<bool, SessionError> {
        let timings = self.config.timings.clone();
        for attempt in 1..=timings.clear_attempts {
            match click_when_ready(
                &mut self.browser,
                &Target::ClearQueryCriterion,
                timings.element_wait,
            ) {
                Ok(true) => return Ok(true),
                Ok(false) => engine_debug!("clear control not clickable (attempt {})", attempt),
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(err) => engine_debug!("clear control failed (attempt {}): {}", attempt, err),
            }
            thread::sleep(timings.clear_backoff);
        }
        Ok(false)
    }

    /// Reload, dismiss the modal and re-apply the year filter, up to the
    /// configured number of attempts.
    fn recover(&mut self, index: usize) -> Result<(), SessionError> {
        let attempts = self.config.timings.recovery_attempts.max(1);
        for attempt in 1..=attempts {
            let restored = self
                .browser
                .reload()
                .and_then(|()| {
                    self.state = UiState::Unfiltered;
                    self.establish_filter()
                });
            match restored {
                Ok(true) => {
                    engine_info!("search page restored (attempt {})", attempt);
                    self.sink.emit(SessionEvent::Recovered { index, attempts: attempt });
                    return Ok(());
                }
                Ok(false) => engine_warn!("year filter not applied (attempt {})", attempt),
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(err) => engine_warn!("recovery attempt {} failed: {}", attempt, err),
            }
        }
        Err(SessionError::RecoveryFailed { attempts })
    }

    fn establish_filter(&mut self) -> Result<bool, BrowserError> {
        if !self.dismiss_modal()? {
            return Ok(false);
        }
        let wait = self.config.timings.element_wait;
        let steps = [
            Target::ShowFilters,
            Target::FilterCategory,
            Target::YearOption(self.config.target_year.clone()),
        ];
        for step in &steps {
            if !click_when_ready(&mut self.browser, step, wait)? {
                engine_warn!("could not click {}", step);
                return Ok(false);
            }
        }
        self.state = UiState::FilterApplied;
        engine_debug!("year filter {} applied", self.config.target_year);
        Ok(true)
    }

    /// Clears the overlay if present. `false` means it is still covering
    /// the page.
    fn dismiss_modal(&mut self) -> Result<bool, BrowserError> {
        let check = dismiss_blocking_modal(
            &mut self.browser,
            &self.config.modal_signal_text,
            self.config.timings.modal_probe,
        )?;
        match check {
            ModalCheck::Absent => Ok(true),
            ModalCheck::Dismissed => {
                engine_info!("dismissed blocking modal");
                self.sink.emit(SessionEvent::ModalDismissed);
                Ok(true)
            }
            ModalCheck::Stuck => {
                engine_warn!("blocking modal could not be closed");
                self.state = UiState::Blocked;
                Ok(false)
            }
        }
    }
}

/// Cells of the first rendered row whose year cell contains `year`.
fn find_year_row<B: Browser + ?Sized>(
    browser: &mut B,
    year: &str,
    year_column: usize,
) -> Result<Option<Vec<ElementHandle>>, BrowserError> {
    for row in browser.locate_all(&Target::ResultRow, None)? {
        let cells = browser.locate_all(&Target::RowCell, Some(&row))?;
        let Some(year_cell) = cells.get(year_column) else {
            continue;
        };
        if year_matches(&browser.read_text(year_cell)?, year) {
            return Ok(Some(cells));
        }
    }
    Ok(None)
}
