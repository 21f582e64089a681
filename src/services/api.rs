// src/services/api.rs

//! Structured search API source adapter.
//!
//! Drains cursor pagination against the notice-search API, then fetches the
//! linked eForms document per summary record and classifies it. A failed
//! document fetch marks that one record and moves on; only a failed page
//! fetch aborts the request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::extract::{XmlFields, XmlNode, extract_fields};
use crate::models::{ApiConfig, Notice, SearchRequest};
use crate::pipeline::filter::cpv_match;
use crate::pipeline::pace::{FetchOutcome, Pacer};
use crate::pipeline::paginate::{PageTurn, advance};
use crate::utils::date::reformat_iso_date;

/// One page request sent to the search API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub num_hits_per_page: usize,
    /// Cursor-based iteration instead of offset paging
    pub iteration_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_after: Option<String>,
    pub published_from: String,
    pub published_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One page of summary records.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPage {
    #[serde(default)]
    pub hits: Vec<ApiHit>,

    /// Opaque cursor; absence is the pagination-termination signal
    #[serde(default)]
    pub search_after: Option<String>,
}

/// One summary record as returned by the search API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHit {
    pub heading: Option<String>,
    pub description: Option<String>,
    /// Human-facing notice page
    pub notice_url: Option<String>,
    /// Linked eForms XML document
    pub document_url: Option<String>,
    /// ISO `yyyy-mm-dd`
    pub publication_date: Option<String>,
    pub buyer: Option<String>,
    pub location: Option<String>,
    pub estimated_value: Option<String>,
    /// ISO `yyyy-mm-dd`
    pub deadline: Option<String>,
    pub notice_type: Option<String>,
    pub notice_sub_type: Option<String>,
}

/// Transport seam for the search API, so pagination and failure handling can
/// run against stubs.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Fetch one result page. A failure here is fatal to the request.
    async fn fetch_page(&self, query: &PageQuery) -> Result<ApiPage>;

    /// Fetch one linked notice document. A failure here is per-record.
    async fn fetch_document(&self, url: &str) -> Result<String>;
}

/// Production transport over reqwest.
pub struct HttpSearchApi {
    client: reqwest::Client,
    search_url: String,
    bearer_token: Option<String>,
}

impl HttpSearchApi {
    pub fn new(client: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            client,
            search_url: config.search_url.clone(),
            bearer_token: config.bearer_token.clone(),
        }
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn fetch_page(&self, query: &PageQuery) -> Result<ApiPage> {
        let mut request = self.client.post(&self.search_url).json(query);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::upstream("search page", e))?;
        response
            .json()
            .await
            .map_err(|e| AppError::upstream("search page body", e))
    }

    async fn fetch_document(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// The structured-API source adapter.
pub struct ApiSource<T: SearchApi> {
    api: T,
    page_size: usize,
    max_pages: usize,
    pacer: Pacer,
}

impl<T: SearchApi> ApiSource<T> {
    pub fn new(api: T, config: &ApiConfig, pacer: Pacer) -> Self {
        Self {
            api,
            page_size: config.page_size,
            max_pages: config.max_pages,
            pacer,
        }
    }

    /// Fetch, normalize and pre-filter all notices for a request.
    pub async fn fetch_notices(&self, request: &SearchRequest) -> Result<Vec<Notice>> {
        let summaries = self.fetch_summaries(request).await?;
        log::info!("search API returned {} summary records", summaries.len());

        let mut notices = Vec::new();
        for hit in summaries {
            let had_document = hit.document_url.is_some();
            let (notice, outcome) = self.resolve_hit(hit, &request.cpv_codes).await;
            if let Some(notice) = notice {
                notices.push(notice);
            }
            if had_document {
                self.pacer.pause(outcome).await;
            }
        }
        Ok(notices)
    }

    /// Drain cursor pagination and return the raw summary records.
    pub async fn fetch_summaries(&self, request: &SearchRequest) -> Result<Vec<ApiHit>> {
        let mut hits = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages_fetched = 0;

        loop {
            let query = PageQuery {
                num_hits_per_page: self.page_size,
                iteration_mode: true,
                search_after: cursor.take(),
                published_from: request.from.to_string(),
                published_to: request.to.to_string(),
                location: request.location.clone(),
            };

            let page = self.api.fetch_page(&query).await?;
            pages_fetched += 1;
            log::debug!("page {} carried {} hits", pages_fetched, page.hits.len());
            hits.extend(page.hits);

            match advance(page.search_after, pages_fetched, self.max_pages) {
                PageTurn::HasMore(next) => cursor = Some(next),
                PageTurn::Exhausted(reason) => {
                    log::debug!("pagination stopped after {pages_fetched} pages: {reason:?}");
                    break;
                }
            }
        }

        Ok(hits)
    }

    /// Turn one summary record into a Notice, fetching and classifying its
    /// linked document when there is one.
    async fn resolve_hit(
        &self,
        hit: ApiHit,
        targets: &[String],
    ) -> (Option<Notice>, FetchOutcome) {
        let document_url = hit.document_url.clone();
        let mut notice = summary_notice(hit);

        let Some(url) = document_url else {
            // Nothing to classify against; the summary stands on its own.
            return (Some(notice), FetchOutcome::Kept);
        };

        match self.fetch_and_extract(&url).await {
            Ok(fields) => {
                apply_fields(&mut notice, fields);
                if cpv_match(targets, &notice.cpv_codes) {
                    (Some(notice), FetchOutcome::Kept)
                } else {
                    // Early drop saves the remaining work for this record;
                    // the aggregator re-applies the same predicate anyway.
                    (None, FetchOutcome::Skipped)
                }
            }
            Err(e) => {
                log::warn!("document fetch failed for {url}: {e}");
                notice.source_error = Some(e.to_string());
                (Some(notice), FetchOutcome::Kept)
            }
        }
    }

    async fn fetch_and_extract(&self, url: &str) -> Result<XmlFields> {
        let xml = self.api.fetch_document(url).await?;
        let doc = XmlNode::parse(&xml)?;
        Ok(extract_fields(&doc))
    }
}

/// Build a Notice from summary fields alone.
fn summary_notice(hit: ApiHit) -> Notice {
    Notice {
        title: hit.heading,
        description: hit.description,
        link: hit.notice_url,
        publication_date: hit
            .publication_date
            .map(|d| reformat_iso_date(&d).unwrap_or(d)),
        buyer: hit.buyer,
        location: hit.location,
        estimated_value: hit.estimated_value,
        deadline: hit.deadline.map(|d| reformat_iso_date(&d).unwrap_or(d)),
        announcement_type: hit.notice_type,
        announcement_subtype: hit.notice_sub_type,
        ..Notice::default()
    }
}

/// Merge document-extracted fields into the summary notice. Document data
/// fills gaps; it does not overwrite summary values the API already gave.
fn apply_fields(notice: &mut Notice, fields: XmlFields) {
    notice.cpv_codes = fields.cpv_codes;
    notice.nuts_code = fields.nuts_code;
    notice.country = fields.country;
    if notice.buyer.is_none() {
        notice.buyer = fields.buyer.as_ref().and_then(|p| p.display());
    }
    notice.provider = fields.provider.as_ref().and_then(|p| p.display());
}
