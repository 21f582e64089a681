// src/pipeline/aggregate.rs

//! Top-level ingestion entry point.
//!
//! Exactly one adapter serves a request; the caller decides which source to
//! use, and there is no in-core merging across sources. An adapter-fatal
//! error surfaces as-is; no retry happens here.

use crate::error::Result;
use crate::models::{Config, Notice, SearchRequest, SourceKind};
use crate::pipeline::filter;
use crate::pipeline::pace::Pacer;
use crate::services::{ApiSource, HttpSearchApi};
use crate::utils::http;

/// Validate the request, drive the selected source to completion, and apply
/// the CPV and date filter stages.
pub async fn run_aggregation(
    config: &Config,
    source: SourceKind,
    request: &SearchRequest,
) -> Result<Vec<Notice>> {
    // Rejected before any network call.
    request.validate()?;

    let collected = match source {
        SourceKind::Api => {
            let client = http::create_async_client(&config.http)?;
            let api = HttpSearchApi::new(client, &config.api);
            ApiSource::new(api, &config.api, Pacer::new(&config.pacing))
                .fetch_notices(request)
                .await?
        }
        #[cfg(feature = "browser")]
        SourceKind::Browser => {
            crate::services::BrowserSource::new(&config.browser, &config.selectors)?
                .fetch_notices(request)
                .await?
        }
        #[cfg(not(feature = "browser"))]
        SourceKind::Browser => {
            return Err(crate::error::AppError::config(
                "this build has no browser support",
            ));
        }
    };

    log::info!("collected {} notices before filtering", collected.len());
    let kept = filter::cpv_filter(collected, &request.cpv_codes);
    let kept = filter::final_range_filter(kept, request);
    log::info!("{} notices after filtering", kept.len());
    Ok(kept)
}
