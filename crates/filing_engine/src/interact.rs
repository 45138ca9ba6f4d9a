//! Bounded-retry wrappers around single UI actions.
//!
//! Element-not-ready and stale-reference failures are absorbed here; only
//! non-transient browser errors reach the caller.

use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};

use crate::poll::{poll_until, PollBudget};
use crate::{Browser, BrowserError, ElementHandle, Target};

/// Waits until `target` is present and interactable, returning its handle.
pub fn wait_until_ready<B: Browser + ?Sized>(
    browser: &mut B,
    target: &Target,
    wait: PollBudget,
) -> Result<Option<ElementHandle>, BrowserError> {
    poll_until(wait, |_| {
        let Some(element) = absorb_transient(browser.locate_first(target, None), target)?.flatten()
        else {
            return Ok(None);
        };
        match absorb_transient(browser.is_interactable(&element), target)? {
            Some(true) => Ok(Some(element)),
            _ => Ok(None),
        }
    })
}

/// Waits up to `wait` for `target` to become interactable, then clicks it
/// by event dispatch. Returns `false` on timeout.
pub fn click_when_ready<B: Browser + ?Sized>(
    browser: &mut B,
    target: &Target,
    wait: PollBudget,
) -> Result<bool, BrowserError> {
    let clicked = poll_until(wait, |_| {
        let Some(element) = absorb_transient(browser.locate_first(target, None), target)?.flatten()
        else {
            return Ok(None);
        };
        if absorb_transient(browser.is_interactable(&element), target)? != Some(true) {
            return Ok(None);
        }
        Ok(absorb_transient(browser.dispatch_click(&element), target)?)
    })?;

    if clicked.is_none() {
        engine_debug!("{} not clickable within {:?}", target, wait.total());
    }
    Ok(clicked.is_some())
}

/// Re-runs `action` from scratch while it fails with a stale element
/// reference, up to `max_attempts` runs in total. Any other error, and the
/// final stale error, is returned unchanged.
pub fn retry_on_staleness<B, T, F>(
    browser: &mut B,
    max_attempts: u32,
    backoff: Duration,
    mut action: F,
) -> Result<T, BrowserError>
where
    B: Browser + ?Sized,
    F: FnMut(&mut B) -> Result<T, BrowserError>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match action(browser) {
            Err(BrowserError::StaleElement) if attempt < max_attempts => {
                engine_debug!("stale element (attempt {}/{}), retrying", attempt, max_attempts);
                attempt += 1;
                thread::sleep(backoff);
            }
            other => return other,
        }
    }
}

/// Result of checking for the "service unavailable" overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalCheck {
    /// Never showed up within the probe; the common case.
    Absent,
    Dismissed,
    /// Showed up but its close control could not be clicked.
    Stuck,
}

/// Closes the "service unavailable" overlay when it shows up within
/// `probe`.
pub fn dismiss_blocking_modal<B: Browser + ?Sized>(
    browser: &mut B,
    signal_text: &str,
    probe: PollBudget,
) -> Result<ModalCheck, BrowserError> {
    let signal = Target::ModalSignal(signal_text.to_string());
    let present = poll_until(probe, |_| {
        let found = absorb_transient(browser.locate_all(&signal, None), &signal)?;
        Ok(found.filter(|elements| !elements.is_empty()).map(|_| ()))
    })?;
    if present.is_none() {
        return Ok(ModalCheck::Absent);
    }
    engine_debug!("blocking modal present, closing");
    if click_when_ready(browser, &Target::ModalClose, probe)? {
        Ok(ModalCheck::Dismissed)
    } else {
        Ok(ModalCheck::Stuck)
    }
}

/// Maps transient failures to `None` so polls keep going.
fn absorb_transient<T>(
    result: Result<T, BrowserError>,
    target: &Target,
) -> Result<Option<T>, BrowserError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_transient() => {
            engine_trace!("{}: {}", target, err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
