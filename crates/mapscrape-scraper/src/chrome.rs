//! Chrome DevTools implementation of [`BrowserSurface`].

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::ScraperError;
use crate::retry::retry_launch;
use crate::surface::{BrowserSurface, Scope};

const SEARCH_BASE_URL: &str = "https://www.google.com/maps/search/";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const LAUNCH_RETRIES: u32 = 2;
const LAUNCH_BACKOFF: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

/// Builds the search URL for `query` and `location`.
///
/// Both terms are joined with a space and whitespace runs become `+`.
#[must_use]
pub fn search_url(query: &str, location: &str) -> String {
    let terms = format!("{query} {location}");
    let joined = terms.split_whitespace().collect::<Vec<_>>().join("+");
    format!("{SEARCH_BASE_URL}{joined}")
}

pub struct ChromeSurface {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeSurface {
    /// Starts Chrome and opens a blank tab.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Launch`] if the browser cannot be started after
    /// retries, or [`ScraperError::Browser`] if the initial tab cannot be opened.
    pub async fn launch(options: &LaunchOptions) -> Result<Self, ScraperError> {
        let config = build_config(options)?;

        let (browser, mut handler) = retry_launch(LAUNCH_RETRIES, LAUNCH_BACKOFF, || {
            let config = config.clone();
            async move {
                Browser::launch(config)
                    .await
                    .map_err(|e| ScraperError::Launch(e.to_string()))
            }
        })
        .await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    tracing::debug!(error = %err, "devtools handler event error");
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        tracing::info!(headless = options.headless, "browser launched");

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Navigates to the search results for `query` near `location`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] if navigation fails.
    pub async fn open_search(&self, query: &str, location: &str) -> Result<(), ScraperError> {
        let url = search_url(query, location);
        tracing::info!(url = %url, "opening search results");
        self.page.goto(url.as_str()).await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    /// Closes the browser and stops the event handler.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] if the close command fails.
    pub async fn close(mut self) -> Result<(), ScraperError> {
        self.browser.close().await?;
        if let Err(err) = self.browser.wait().await {
            tracing::debug!(error = %err, "browser process did not exit cleanly");
        }
        self.handler.abort();
        Ok(())
    }
}

fn build_config(options: &LaunchOptions) -> Result<BrowserConfig, ScraperError> {
    let mut builder = BrowserConfig::builder()
        .window_size(options.window_width, options.window_height)
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-dev-shm-usage")
        .arg("--no-sandbox")
        .arg("--disable-infobars")
        .arg("--no-first-run")
        .arg(format!("--user-agent={USER_AGENT}"));

    if !options.headless {
        builder = builder.with_head();
    }
    if let Some(path) = &options.chrome_path {
        builder = builder.chrome_executable(path);
    }

    builder.build().map_err(ScraperError::Launch)
}

impl BrowserSurface for ChromeSurface {
    type Element = Element;

    async fn query_all(
        &self,
        scope: Scope<'_, Element>,
        pattern: &str,
    ) -> Result<Vec<Element>, ScraperError> {
        let found = match scope {
            Scope::Document => self.page.find_elements(pattern).await,
            Scope::Within(element) => element.find_elements(pattern).await,
        };
        match found {
            Ok(elements) => Ok(elements),
            // A selector with no matches is reported as a "not found" CDP error.
            Err(chromiumoxide::error::CdpError::NotFound) => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn text(&self, element: &Element) -> Result<String, ScraperError> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>, ScraperError> {
        Ok(element.attribute(name).await?)
    }

    async fn click(&self, element: &Element) -> Result<(), ScraperError> {
        element.click().await?;
        Ok(())
    }

    async fn run_script(&self, code: &str) -> Result<serde_json::Value, ScraperError> {
        let result = self.page.evaluate(code).await?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }
}
