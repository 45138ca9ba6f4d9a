use std::fmt;

use crate::BrowserError;

/// Opaque reference to an element located by a [`Browser`].
///
/// Handles may go stale at any time; callers re-locate rather than cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Behavioral affordances of the remote search page.
///
/// The session only ever asks for these; how each maps onto the page's
/// markup belongs to the [`Browser`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    ShowFilters,
    /// The "Plan Years" filter category.
    FilterCategory,
    /// Entry in the year list whose label starts with the given year.
    YearOption(String),
    SearchField,
    SubmitSearch,
    ResultRow,
    /// Cell of a result row; scoped to a row.
    RowCell,
    /// Download control inside a cell; scoped to a cell.
    RowTrigger,
    /// Text of the "service unavailable" overlay.
    ModalSignal(String),
    ModalClose,
    /// Breadcrumb control removing the query term but not the year filter.
    ClearQueryCriterion,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::ShowFilters => write!(f, "show-filters button"),
            Target::FilterCategory => write!(f, "filter category"),
            Target::YearOption(year) => write!(f, "year option {year}"),
            Target::SearchField => write!(f, "search field"),
            Target::SubmitSearch => write!(f, "submit button"),
            Target::ResultRow => write!(f, "result row"),
            Target::RowCell => write!(f, "row cell"),
            Target::RowTrigger => write!(f, "row download control"),
            Target::ModalSignal(text) => write!(f, "modal '{text}'"),
            Target::ModalClose => write!(f, "modal close button"),
            Target::ClearQueryCriterion => write!(f, "clear-query breadcrumb"),
        }
    }
}

/// Capability set the search session automates against: locate, click,
/// read text. Implemented over WebDriver in production and by scripted
/// fakes in tests.
pub trait Browser {
    fn open(&mut self, url: &str) -> Result<(), BrowserError>;

    fn reload(&mut self) -> Result<(), BrowserError>;

    /// Finds all elements for `target`, optionally inside `scope`.
    /// An empty vector means "not present right now", not an error.
    fn locate_all(
        &mut self,
        target: &Target,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, BrowserError>;

    /// Visible and enabled.
    fn is_interactable(&mut self, element: &ElementHandle) -> Result<bool, BrowserError>;

    fn read_text(&mut self, element: &ElementHandle) -> Result<String, BrowserError>;

    /// Activates the element by dispatching a bubbling `click` event rather
    /// than simulating a pointer.
    fn dispatch_click(&mut self, element: &ElementHandle) -> Result<(), BrowserError>;

    /// Replaces the element's value with `text` and fires an `input` event.
    fn enter_text(&mut self, element: &ElementHandle, text: &str) -> Result<(), BrowserError>;

    /// Forgets every handle returned so far. Called between entities; the
    /// default keeps nothing to forget.
    fn release_handles(&mut self) {}

    /// Releases the remote session. Calling it twice is a no-op.
    fn close(&mut self) -> Result<(), BrowserError>;

    fn locate_first(
        &mut self,
        target: &Target,
        scope: Option<&ElementHandle>,
    ) -> Result<Option<ElementHandle>, BrowserError> {
        Ok(self.locate_all(target, scope)?.into_iter().next())
    }
}
