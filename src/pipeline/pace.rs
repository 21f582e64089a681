// src/pipeline/pace.rs

//! Delay policy between per-document fetches.
//!
//! The document server sees one request per summary record, thousands per
//! ingestion run. The pacer spreads those out: a longer pause after a record
//! passed the CPV check and was kept, a shorter one after a skip. The policy
//! lives here as a component instead of inline sleeps so it is configurable
//! and testable.

use std::time::Duration;

use crate::models::PacingConfig;

/// What happened to the record a fetch produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Record kept (or kept with a source error)
    Kept,
    /// Record dropped by the early CPV check
    Skipped,
}

/// Fixed-delay pacer applied between document fetches.
#[derive(Debug, Clone)]
pub struct Pacer {
    kept: Duration,
    skipped: Duration,
}

impl Pacer {
    /// Build from configuration.
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            kept: Duration::from_millis(config.kept_delay_ms),
            skipped: Duration::from_millis(config.skipped_delay_ms),
        }
    }

    /// A pacer that never waits.
    pub fn unthrottled() -> Self {
        Self {
            kept: Duration::ZERO,
            skipped: Duration::ZERO,
        }
    }

    /// The configured delay for an outcome.
    pub fn delay_for(&self, outcome: FetchOutcome) -> Duration {
        match outcome {
            FetchOutcome::Kept => self.kept,
            FetchOutcome::Skipped => self.skipped,
        }
    }

    /// Sleep for the configured delay.
    pub async fn pause(&self, outcome: FetchOutcome) {
        let delay = self.delay_for(outcome);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
