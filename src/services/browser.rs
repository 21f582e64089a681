// src/services/browser.rs

//! Browser-driven listing source adapter.
//!
//! The listing site renders through JavaScript and defers off-screen items,
//! so it is only reachable through a driven browser session. The session is
//! scoped to one request: acquired at entry and released on every exit path,
//! success, error, or loop break. A leaked session is a leaked OS process.

use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeLaunchConfig};
use futures::StreamExt;
use scraper::Html;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use crate::error::{AppError, Result};
use crate::extract::ListingExtractor;
use crate::models::{BrowserConfig, ListingSelectors, Notice, SearchRequest};
use crate::pipeline::filter::source_trust_boundary_filter;
use crate::pipeline::paginate::{ListingStop, url_reflects_page};

const SELECTOR_POLL: Duration = Duration::from_millis(250);

/// One launched browser with its event pump.
struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    async fn launch() -> Result<Self> {
        let config = ChromeLaunchConfig::builder()
            .build()
            .map_err(AppError::browser)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(AppError::browser)?;

        // The handler stream must be drained for the session to make
        // progress; it ends when the browser process goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    async fn new_page(&self) -> Result<Page> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(AppError::browser)
    }

    /// Release the browser process and stop the event pump.
    async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            log::warn!("browser close failed: {e}");
        }
        self.handler_task.abort();
    }
}

/// What loading one listing page concluded.
enum Loaded {
    /// The page rendered a results list; extract from it
    Ready,
    /// Pagination ended here
    Stopped(ListingStop),
}

/// The browser-driven listing source adapter.
pub struct BrowserSource {
    config: BrowserConfig,
    selectors: ListingSelectors,
    extractor: ListingExtractor,
}

impl BrowserSource {
    pub fn new(config: &BrowserConfig, selectors: &ListingSelectors) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            selectors: selectors.clone(),
            extractor: ListingExtractor::new(selectors, &config.search_url)?,
        })
    }

    /// Fetch all notices for a request by walking the numbered listing pages.
    pub async fn fetch_notices(&self, request: &SearchRequest) -> Result<Vec<Notice>> {
        let session = BrowserSession::launch().await?;
        // Run the loop through a helper so the session is released before
        // any error propagates.
        let outcome = self.drive(&session, request).await;
        session.shutdown().await;
        let collected = outcome?;

        // The listing is known to occasionally return records outside the
        // requested range; this defensive pass is deliberate and distinct
        // from the aggregator's final filter.
        Ok(source_trust_boundary_filter(collected, request))
    }

    async fn drive(
        &self,
        session: &BrowserSession,
        request: &SearchRequest,
    ) -> Result<Vec<Notice>> {
        let page = session.new_page().await?;
        let mut notices = Vec::new();
        let mut page_no: usize = 1;

        loop {
            let url = self.search_url(request, page_no)?;
            log::debug!("loading listing page {page_no}: {url}");

            match self.load_listing(&page, &url, page_no).await? {
                Loaded::Ready => {}
                Loaded::Stopped(stop) => {
                    log::debug!("pagination stopped at page {page_no}: {stop:?}");
                    break;
                }
            }

            let extracted = self.extract_current(&page).await?;
            if extracted.is_empty() {
                log::debug!(
                    "pagination stopped at page {page_no}: {:?}",
                    ListingStop::EmptyPage
                );
                break;
            }
            notices.extend(extracted);

            if page_no >= self.config.max_pages {
                log::warn!(
                    "pagination stopped at page {page_no}: {:?}",
                    ListingStop::PageCeiling
                );
                break;
            }
            page_no += 1;
        }

        Ok(notices)
    }

    /// Navigate to one listing page and decide whether it can be extracted.
    ///
    /// Bounded waits exceeded past the first page mean "no more data"; on the
    /// first page they escalate, since a search that cannot load at all is an
    /// upstream failure, not an empty result.
    async fn load_listing(&self, page: &Page, url: &str, page_no: usize) -> Result<Loaded> {
        let first_page = page_no == 1;
        let nav_timeout = Duration::from_secs(self.config.nav_timeout_secs);

        let navigated = timeout(nav_timeout, async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        })
        .await;

        match navigated {
            Ok(Ok(())) => {}
            Ok(Err(e)) if first_page => {
                return Err(AppError::upstream("listing navigation", e));
            }
            Err(_) if first_page => {
                return Err(AppError::upstream("listing navigation", "timed out"));
            }
            Ok(Err(e)) => {
                log::warn!("navigation to page {page_no} failed: {e}");
                return Ok(Loaded::Stopped(ListingStop::NavTimedOut));
            }
            Err(_) => return Ok(Loaded::Stopped(ListingStop::NavTimedOut)),
        }

        let current = page
            .url()
            .await
            .map_err(AppError::browser)?
            .unwrap_or_default();
        if !url_reflects_page(&current, page_no) {
            // The site redirected away from the requested page number.
            return Ok(Loaded::Stopped(ListingStop::UrlMismatch));
        }

        if !self.wait_for_results(page).await {
            if first_page {
                return Err(AppError::upstream(
                    "listing results",
                    "results list never appeared on the first page",
                ));
            }
            return Ok(Loaded::Stopped(ListingStop::ListAbsent));
        }

        Ok(Loaded::Ready)
    }

    /// Poll for the results-list selector within the bounded wait.
    async fn wait_for_results(&self, page: &Page) -> bool {
        let deadline = Duration::from_secs(self.config.selector_timeout_secs);
        let pair = &self.selectors.results_list;

        let poll = async {
            loop {
                if page.find_element(pair.primary.as_str()).await.is_ok() {
                    return;
                }
                if let Some(fallback) = &pair.fallback {
                    if page.find_element(fallback.as_str()).await.is_ok() {
                        return;
                    }
                }
                sleep(SELECTOR_POLL).await;
            }
        };

        timeout(deadline, poll).await.is_ok()
    }

    /// Scroll until the viewport has covered the full document height, so
    /// lazily rendered items exist in the DOM before extraction.
    async fn auto_scroll(&self, page: &Page) -> Result<()> {
        let script = format!(
            r#"new Promise((resolve) => {{
                let scrolled = 0;
                const step = {step};
                const timer = setInterval(() => {{
                    window.scrollBy(0, step);
                    scrolled += step;
                    if (scrolled >= document.body.scrollHeight) {{
                        clearInterval(timer);
                        resolve(scrolled);
                    }}
                }}, {interval});
            }})"#,
            step = self.config.scroll_step_px,
            interval = self.config.scroll_interval_ms,
        );

        page.evaluate(script).await.map_err(AppError::browser)?;
        Ok(())
    }

    async fn extract_current(&self, page: &Page) -> Result<Vec<Notice>> {
        self.auto_scroll(page).await?;
        let html = page.content().await.map_err(AppError::browser)?;

        let document = Html::parse_document(&html);
        Ok(self.extractor.extract_page(&document))
    }

    /// Build the listing search URL for one page.
    fn search_url(&self, request: &SearchRequest, page_no: usize) -> Result<String> {
        let mut url = url::Url::parse(&self.config.search_url)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("from", &request.from.to_string());
            pairs.append_pair("to", &request.to.to_string());
            if let Some(location) = &request.location {
                pairs.append_pair("location", location);
            }
            pairs.append_pair("page", &page_no.to_string());
        }
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn source() -> BrowserSource {
        BrowserSource::new(&BrowserConfig::default(), &ListingSelectors::default()).unwrap()
    }

    fn request(location: Option<&str>) -> SearchRequest {
        SearchRequest {
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            location: location.map(str::to_string),
            cpv_codes: Vec::new(),
        }
    }

    #[test]
    fn test_search_url_carries_range_and_page() {
        let url = source().search_url(&request(None), 3).unwrap();
        assert!(url.starts_with("https://www.doffin.no/search?"));
        assert!(url.contains("from=2024-01-01"));
        assert!(url.contains("to=2024-01-31"));
        assert!(url.contains("page=3"));
        assert!(!url.contains("location="));
    }

    #[test]
    fn test_search_url_includes_location_when_set() {
        let url = source().search_url(&request(Some("NO081")), 1).unwrap();
        assert!(url.contains("location=NO081"));
        assert!(url.contains("page=1"));
    }

    #[test]
    fn test_built_urls_satisfy_their_own_page_check() {
        let src = source();
        for page_no in [1, 2, 13] {
            let url = src.search_url(&request(None), page_no).unwrap();
            assert!(url_reflects_page(&url, page_no), "{url}");
        }
    }
}
