// src/models/request.rs

//! Search request types and pre-network validation.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Which source adapter serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Structured search API with per-notice XML documents
    Api,
    /// Browser-driven HTML listing
    Browser,
}

impl FromStr for SourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "browser" => Ok(Self::Browser),
            other => Err(AppError::validation(format!(
                "Unknown source '{other}' (expected 'api' or 'browser')"
            ))),
        }
    }
}

/// A validated ingestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Inclusive start of the publication date range
    pub from: NaiveDate,

    /// Inclusive end of the publication date range
    pub to: NaiveDate,

    /// Optional location/county code forwarded to the source
    pub location: Option<String>,

    /// CPV target codes; empty means no commodity filtering
    pub cpv_codes: Vec<String>,
}

impl SearchRequest {
    /// Validate invariants. Runs before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.from > self.to {
            return Err(AppError::validation(format!(
                "'from' ({}) must not be after 'to' ({})",
                self.from, self.to
            )));
        }
        Ok(())
    }
}

/// Wire shape accepted by both ingestion endpoints and the CLI.
///
/// Dates arrive as `YYYY-MM-DD` strings so that malformed input turns into a
/// `Validation` error with the `{error}` envelope instead of a framework
/// rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPayload {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub cpv: Option<Vec<String>>,
}

impl SearchPayload {
    /// Convert into a validated [`SearchRequest`].
    pub fn into_request(self) -> Result<SearchRequest> {
        let from = parse_request_date("from", &self.from)?;
        let to = parse_request_date("to", &self.to)?;

        let location = self
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        let request = SearchRequest {
            from,
            to,
            location,
            cpv_codes: self.cpv.unwrap_or_default(),
        };
        request.validate()?;
        Ok(request)
    }
}

fn parse_request_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::validation(format!(
            "Invalid '{field}' date '{value}' (expected YYYY-MM-DD)"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(from: &str, to: &str) -> SearchPayload {
        SearchPayload {
            from: from.to_string(),
            to: to.to_string(),
            location: None,
            cpv: None,
        }
    }

    #[test]
    fn test_valid_range_accepted() {
        let request = payload("2024-01-01", "2024-01-31").into_request().unwrap();
        assert_eq!(request.from, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(request.to, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert!(request.cpv_codes.is_empty());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = payload("2024-02-01", "2024-01-01").into_request().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_single_day_range_is_valid() {
        assert!(payload("2024-01-15", "2024-01-15").into_request().is_ok());
    }

    #[test]
    fn test_malformed_date_rejected() {
        let err = payload("15.01.2024", "2024-01-31").into_request().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_blank_location_dropped() {
        let mut p = payload("2024-01-01", "2024-01-31");
        p.location = Some("  ".to_string());
        let request = p.into_request().unwrap();
        assert_eq!(request.location, None);
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("api".parse::<SourceKind>().unwrap(), SourceKind::Api);
        assert_eq!("Browser".parse::<SourceKind>().unwrap(), SourceKind::Browser);
        assert!("rss".parse::<SourceKind>().is_err());
    }
}
