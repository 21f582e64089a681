//! Ingestion pipeline stages.
//!
//! - `aggregate`: request entry point, adapter selection, final filtering
//! - `filter`: CPV and publication-date predicates
//! - `paginate`: pagination termination decisions, as pure functions
//! - `pace`: delay policy between per-document fetches

pub mod aggregate;
pub mod filter;
pub mod pace;
pub mod paginate;

pub use aggregate::run_aggregation;
pub use pace::{FetchOutcome, Pacer};
pub use paginate::{ListingStop, PageTurn, StopReason};
