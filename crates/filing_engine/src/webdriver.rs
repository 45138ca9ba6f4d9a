//! [`Browser`] over a W3C WebDriver endpoint (chromedriver) via fantoccini.
//!
//! fantoccini is async; the session state machine is not. The browser owns a
//! tokio runtime and blocks on each command.

use std::collections::HashMap;
use std::path::PathBuf;

use engine_logging::{engine_debug, engine_info, engine_warn};
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::{Client, ClientBuilder, Locator};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{Browser, BrowserError, ElementHandle, Target};

const CLICK_SCRIPT: &str = "arguments[0].scrollIntoView({block: 'center'}); \
     arguments[0].dispatchEvent(new Event('click', {bubbles: true}));";
const INPUT_SCRIPT: &str = "arguments[0].dispatchEvent(new Event('input', {bubbles: true}));";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    fn locator(&self) -> Locator<'_> {
        match self {
            Selector::Css(css) => Locator::Css(css),
            Selector::XPath(xpath) => Locator::XPath(xpath),
        }
    }

    /// Substitutes `{placeholder}` in the selector text.
    fn fill(&self, placeholder: &str, value: &str) -> Selector {
        let key = format!("{{{placeholder}}}");
        match self {
            Selector::Css(css) => Selector::Css(css.replace(&key, value)),
            Selector::XPath(xpath) => Selector::XPath(xpath.replace(&key, value)),
        }
    }
}

/// How each [`Target`] is found on the registry page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    pub show_filters: Selector,
    pub filter_category: Selector,
    /// `{year}` is replaced by the target year.
    pub year_option: Selector,
    pub search_field: Selector,
    pub submit_search: Selector,
    pub result_row: Selector,
    pub row_cell: Selector,
    pub row_trigger: Selector,
    /// `{text}` is replaced by the modal signal text.
    pub modal_signal: Selector,
    pub modal_close: Selector,
    pub clear_query: Selector,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            show_filters: Selector::XPath(
                "//button[.//span[normalize-space(text())='Show Filters']]".into(),
            ),
            filter_category: Selector::XPath(
                "//button[contains(@class,'filter-category-button') and normalize-space(text())='Plan Years']".into(),
            ),
            year_option: Selector::XPath(
                "//div[@id='planYearList']//a[starts-with(normalize-space(text()), '{year}')]".into(),
            ),
            search_field: Selector::Css("#search-field".into()),
            submit_search: Selector::XPath("//button[.//span[text()='Go!']]".into()),
            result_row: Selector::Css("table tbody tr".into()),
            row_cell: Selector::Css("td".into()),
            row_trigger: Selector::Css("svg".into()),
            modal_signal: Selector::XPath("//span[contains(text(),'{text}')]".into()),
            modal_close: Selector::XPath(
                "//button[contains(@class,'usa-modal__close')] | //button[.//span[text()='Close']]".into(),
            ),
            clear_query: Selector::XPath(
                "(//button[contains(@class,'breadcrumb-delete-btn')])[2]".into(),
            ),
        }
    }
}

impl PageSelectors {
    pub fn resolve(&self, target: &Target) -> Selector {
        match target {
            Target::ShowFilters => self.show_filters.clone(),
            Target::FilterCategory => self.filter_category.clone(),
            Target::YearOption(year) => self.year_option.fill("year", year),
            Target::SearchField => self.search_field.clone(),
            Target::SubmitSearch => self.submit_search.clone(),
            Target::ResultRow => self.result_row.clone(),
            Target::RowCell => self.row_cell.clone(),
            Target::RowTrigger => self.row_trigger.clone(),
            Target::ModalSignal(text) => self.modal_signal.fill("text", text),
            Target::ModalClose => self.modal_close.clone(),
            Target::ClearQueryCriterion => self.clear_query.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub webdriver_url: String,
    /// Directory Chrome saves downloads into; must be absolute.
    pub download_dir: PathBuf,
    pub headless: bool,
    pub selectors: PageSelectors,
}

/// Chrome capabilities: silent downloads into `download_dir`.
pub fn chrome_capabilities(settings: &DriverSettings) -> Map<String, Value> {
    let mut args = vec!["--start-maximized".to_string()];
    if settings.headless {
        args.push("--headless=new".to_string());
    }
    let options = json!({
        "args": args,
        "prefs": {
            "download.default_directory": settings.download_dir.to_string_lossy(),
            "download.prompt_for_download": false,
            "plugins.always_open_pdf_externally": true,
        },
    });
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), options);
    caps
}

/// Live elements behind the opaque handles given to the session.
///
/// Every lookup registers fresh entries, so the owner clears it whenever
/// the handles it gave out can no longer be used.
struct ElementRegistry<E> {
    elements: HashMap<ElementHandle, E>,
    next_id: u64,
}

impl<E> ElementRegistry<E> {
    fn new() -> Self {
        Self {
            elements: HashMap::new(),
            next_id: 0,
        }
    }

    fn register(&mut self, found: Vec<E>) -> Vec<ElementHandle> {
        found
            .into_iter()
            .map(|element| {
                self.next_id += 1;
                let handle = ElementHandle::new(format!("wd-{}", self.next_id));
                self.elements.insert(handle.clone(), element);
                handle
            })
            .collect()
    }

    fn get(&self, handle: &ElementHandle) -> Result<&E, BrowserError> {
        self.elements.get(handle).ok_or(BrowserError::StaleElement)
    }

    fn clear(&mut self) {
        self.elements.clear();
    }

    fn len(&self) -> usize {
        self.elements.len()
    }
}

pub struct WebDriverBrowser {
    runtime: tokio::runtime::Runtime,
    client: Option<Client>,
    selectors: PageSelectors,
    elements: ElementRegistry<Element>,
}

impl WebDriverBrowser {
    /// Starts a new WebDriver session.
    pub fn connect(settings: &DriverSettings) -> Result<Self, BrowserError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|err| BrowserError::SessionLost(format!("tokio runtime: {err}")))?;

        let capabilities = chrome_capabilities(settings);
        let client = runtime.block_on(async {
            let mut builder = ClientBuilder::rustls()
                .map_err(|err| BrowserError::SessionLost(format!("tls setup: {err}")))?;
            builder.capabilities(capabilities);
            builder
                .connect(&settings.webdriver_url)
                .await
                .map_err(|err| {
                    BrowserError::SessionLost(format!(
                        "cannot start session at {}: {err}",
                        settings.webdriver_url
                    ))
                })
        })?;
        engine_info!("webdriver session started at {}", settings.webdriver_url);

        Ok(Self {
            runtime,
            client: Some(client),
            selectors: settings.selectors.clone(),
            elements: ElementRegistry::new(),
        })
    }

    fn client(&self) -> Result<&Client, BrowserError> {
        self.client
            .as_ref()
            .ok_or_else(|| BrowserError::SessionLost("session already closed".into()))
    }

    fn element(&self, handle: &ElementHandle) -> Result<&Element, BrowserError> {
        self.elements.get(handle)
    }
}

impl Browser for WebDriverBrowser {
    fn open(&mut self, url: &str) -> Result<(), BrowserError> {
        self.elements.clear();
        let client = self.client()?;
        self.runtime.block_on(client.goto(url)).map_err(map_cmd_error)
    }

    fn reload(&mut self) -> Result<(), BrowserError> {
        self.elements.clear();
        let client = self.client()?;
        self.runtime.block_on(client.refresh()).map_err(map_cmd_error)
    }

    fn locate_all(
        &mut self,
        target: &Target,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, BrowserError> {
        let selector = self.selectors.resolve(target);
        let found = match scope {
            Some(handle) => {
                let parent = self.element(handle)?;
                self.runtime.block_on(parent.find_all(selector.locator()))
            }
            None => {
                let client = self.client()?;
                self.runtime.block_on(client.find_all(selector.locator()))
            }
        };
        match found {
            Ok(elements) => Ok(self.elements.register(elements)),
            Err(err) => match map_cmd_error(err) {
                BrowserError::NoSuchElement(_) => Ok(Vec::new()),
                other => Err(other),
            },
        }
    }

    fn is_interactable(&mut self, element: &ElementHandle) -> Result<bool, BrowserError> {
        let element = self.element(element)?;
        self.runtime.block_on(async {
            let displayed = element.is_displayed().await?;
            Ok::<_, CmdError>(displayed && element.is_enabled().await?)
        })
        .map_err(map_cmd_error)
    }

    fn read_text(&mut self, element: &ElementHandle) -> Result<String, BrowserError> {
        let element = self.element(element)?;
        self.runtime.block_on(element.text()).map_err(map_cmd_error)
    }

    fn dispatch_click(&mut self, element: &ElementHandle) -> Result<(), BrowserError> {
        let element = self.element(element)?;
        let client = self.client()?;
        let arg = serde_json::to_value(element)
            .map_err(|err| BrowserError::Command(err.to_string()))?;
        self.runtime
            .block_on(client.execute(CLICK_SCRIPT, vec![arg]))
            .map(|_| ())
            .map_err(map_cmd_error)
    }

    fn enter_text(&mut self, element: &ElementHandle, text: &str) -> Result<(), BrowserError> {
        let element = self.element(element)?;
        let client = self.client()?;
        let arg = serde_json::to_value(element)
            .map_err(|err| BrowserError::Command(err.to_string()))?;
        self.runtime
            .block_on(async {
                element.clear().await?;
                element.send_keys(text).await?;
                client.execute(INPUT_SCRIPT, vec![arg]).await.map(|_| ())
            })
            .map_err(map_cmd_error)
    }

    fn release_handles(&mut self) {
        engine_debug!("releasing {} element handles", self.elements.len());
        self.elements.clear();
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        self.elements.clear();
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        engine_debug!("closing webdriver session");
        self.runtime.block_on(client.close()).map_err(map_cmd_error)
    }
}

impl Drop for WebDriverBrowser {
    fn drop(&mut self) {
        if self.client.is_some() {
            if let Err(err) = self.close() {
                engine_warn!("webdriver session not closed cleanly: {}", err);
            }
        }
    }
}

pub(crate) fn map_cmd_error(err: CmdError) -> BrowserError {
    match err {
        CmdError::Standard(wd) => map_status(&wd.error, wd.message.to_string()),
        CmdError::Lost(io) => BrowserError::SessionLost(io.to_string()),
        other => BrowserError::Command(other.to_string()),
    }
}

fn map_status(status: &ErrorStatus, message: String) -> BrowserError {
    match status {
        ErrorStatus::StaleElementReference => BrowserError::StaleElement,
        ErrorStatus::NoSuchElement => BrowserError::NoSuchElement(message),
        ErrorStatus::ElementNotInteractable | ErrorStatus::ElementClickIntercepted => {
            BrowserError::NotInteractable(message)
        }
        ErrorStatus::InvalidSessionId | ErrorStatus::NoSuchWindow | ErrorStatus::SessionNotCreated => {
            BrowserError::SessionLost(message)
        }
        _ => BrowserError::Command(message),
    }
}
