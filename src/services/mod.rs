//! Source adapters for the aggregation engine.
//!
//! This module contains the business logic for:
//! - Structured search API ingestion (`ApiSource`)
//! - Browser-driven listing ingestion (`BrowserSource`)

mod api;
#[cfg(feature = "browser")]
mod browser;

pub use api::{ApiHit, ApiPage, ApiSource, HttpSearchApi, PageQuery, SearchApi};
#[cfg(feature = "browser")]
pub use browser::BrowserSource;
