//! Filing engine: download acquisition, UI interaction retries and the
//! search session state machine.
mod browser;
mod config;
mod error;
mod events;
mod interact;
mod persist;
mod poll;
mod session;
mod watcher;
mod webdriver;

pub use browser::{Browser, ElementHandle, Target};
pub use config::{SessionConfig, SessionTimings, DEFAULT_MODAL_SIGNAL, DEFAULT_SEARCH_URL};
pub use error::{BrowserError, SessionError, WatchError};
pub use events::{ChannelEventSink, EventSink, NullSink, SessionEvent};
pub use interact::{
    click_when_ready, dismiss_blocking_modal, retry_on_staleness, wait_until_ready, ModalCheck,
};
pub use persist::{ensure_output_dir, relocate_file, PersistError};
pub use poll::{poll_until, PollBudget};
pub use session::SearchSession;
pub use watcher::{Completion, DirectorySnapshot, DirectoryWatcher, DownloadTarget};
pub use webdriver::{chrome_capabilities, DriverSettings, PageSelectors, Selector, WebDriverBrowser};
