mod common;

use std::cell::Cell;
use std::collections::VecDeque;
use std::time::Duration;

use filing_engine::{
    click_when_ready, dismiss_blocking_modal, retry_on_staleness, Browser, BrowserError,
    ElementHandle, ModalCheck, Target,
};

use common::{init_logging, quick};

/// Browser whose lookups replay a script, then fall back to "present".
#[derive(Default)]
struct ScriptedBrowser {
    lookups: VecDeque<Result<bool, BrowserError>>,
    modal_close_present: bool,
    clicks: Vec<String>,
}

impl ScriptedBrowser {
    fn with_lookups(lookups: Vec<Result<bool, BrowserError>>) -> Self {
        Self {
            lookups: lookups.into(),
            modal_close_present: true,
            ..Self::default()
        }
    }
}

impl Browser for ScriptedBrowser {
    fn open(&mut self, _url: &str) -> Result<(), BrowserError> {
        Ok(())
    }

    fn reload(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }

    fn locate_all(
        &mut self,
        target: &Target,
        _scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, BrowserError> {
        if *target == Target::ModalClose {
            return Ok(if self.modal_close_present {
                vec![ElementHandle::new("close")]
            } else {
                Vec::new()
            });
        }
        match self.lookups.pop_front().unwrap_or(Ok(true))? {
            true => Ok(vec![ElementHandle::new(target.to_string())]),
            false => Ok(Vec::new()),
        }
    }

    fn is_interactable(&mut self, _element: &ElementHandle) -> Result<bool, BrowserError> {
        Ok(true)
    }

    fn read_text(&mut self, _element: &ElementHandle) -> Result<String, BrowserError> {
        Ok(String::new())
    }

    fn dispatch_click(&mut self, element: &ElementHandle) -> Result<(), BrowserError> {
        self.clicks.push(element.as_str().to_string());
        Ok(())
    }

    fn enter_text(&mut self, _element: &ElementHandle, _text: &str) -> Result<(), BrowserError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }
}

#[test]
fn click_waits_through_transient_failures() {
    init_logging();
    let mut browser = ScriptedBrowser::with_lookups(vec![
        Ok(false),
        Err(BrowserError::StaleElement),
        Err(BrowserError::NotInteractable("overlay".into())),
        Ok(true),
    ]);
    let clicked = click_when_ready(&mut browser, &Target::SubmitSearch, quick(5)).unwrap();
    assert!(clicked);
    assert_eq!(browser.clicks, vec![Target::SubmitSearch.to_string()]);
}

#[test]
fn click_times_out_without_raising() {
    init_logging();
    let mut browser = ScriptedBrowser::with_lookups(vec![Ok(false); 4]);
    let clicked = click_when_ready(&mut browser, &Target::SubmitSearch, quick(3)).unwrap();
    assert!(!clicked);
    assert!(browser.clicks.is_empty());
    // Only the budgeted lookups were spent.
    assert_eq!(browser.lookups.len(), 1);
}

#[test]
fn click_propagates_fatal_errors() {
    init_logging();
    let mut browser =
        ScriptedBrowser::with_lookups(vec![Err(BrowserError::SessionLost("gone".into()))]);
    let err = click_when_ready(&mut browser, &Target::ShowFilters, quick(3)).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn staleness_is_retried_up_to_the_limit() {
    init_logging();
    let mut browser = ScriptedBrowser::default();
    let calls = Cell::new(0);
    let result = retry_on_staleness(&mut browser, 3, Duration::ZERO, |_| {
        calls.set(calls.get() + 1);
        if calls.get() < 3 {
            Err(BrowserError::StaleElement)
        } else {
            Ok("rows")
        }
    });
    assert_eq!(result, Ok("rows"));
    assert_eq!(calls.get(), 3);

    calls.set(0);
    let result: Result<(), _> = retry_on_staleness(&mut browser, 3, Duration::ZERO, |_| {
        calls.set(calls.get() + 1);
        Err(BrowserError::StaleElement)
    });
    assert_eq!(result, Err(BrowserError::StaleElement));
    assert_eq!(calls.get(), 3);
}

#[test]
fn other_errors_are_not_retried() {
    init_logging();
    let mut browser = ScriptedBrowser::default();
    let calls = Cell::new(0);
    let result: Result<(), _> = retry_on_staleness(&mut browser, 3, Duration::ZERO, |_| {
        calls.set(calls.get() + 1);
        Err(BrowserError::Command("javascript error".into()))
    });
    assert_eq!(result, Err(BrowserError::Command("javascript error".into())));
    assert_eq!(calls.get(), 1);
}

#[test]
fn absent_modal_is_not_an_error() {
    init_logging();
    let mut browser = ScriptedBrowser::with_lookups(vec![Ok(false); 3]);
    let check = dismiss_blocking_modal(&mut browser, "Please try back later", quick(3)).unwrap();
    assert_eq!(check, ModalCheck::Absent);
    assert!(browser.clicks.is_empty());
}

#[test]
fn present_modal_is_closed() {
    init_logging();
    let mut browser = ScriptedBrowser::with_lookups(vec![Ok(false), Ok(true)]);
    let check = dismiss_blocking_modal(&mut browser, "Please try back later", quick(3)).unwrap();
    assert_eq!(check, ModalCheck::Dismissed);
    assert_eq!(browser.clicks, vec!["close".to_string()]);
}

#[test]
fn modal_without_close_control_is_stuck() {
    init_logging();
    let mut browser = ScriptedBrowser::with_lookups(vec![Ok(true)]);
    browser.modal_close_present = false;
    let check = dismiss_blocking_modal(&mut browser, "Please try back later", quick(2)).unwrap();
    assert_eq!(check, ModalCheck::Stuck);
}
