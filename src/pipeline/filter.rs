// src/pipeline/filter.rs

//! CPV and publication-date predicates.
//!
//! Exclusion here is silent by contract: a record that fails a predicate is
//! dropped, never turned into an error. Two date stages exist on purpose:
//! [`source_trust_boundary_filter`] runs inside the browser adapter against an
//! upstream that returns out-of-range records, and [`final_range_filter`] runs
//! in the aggregator for both sources. They share one predicate but are
//! separate, named stages rather than one folded pass.

use chrono::NaiveDate;

use crate::models::{Notice, SearchRequest};
use crate::utils::date::parse_display_date;

/// Exact-equality intersection between a notice's codes and the target set.
///
/// 8-digit string equality only: `45210000` does not match a `45000000`
/// target. An empty target set disables commodity filtering entirely; an
/// empty code list never matches a non-empty target set.
pub fn cpv_match(targets: &[String], codes: &[String]) -> bool {
    if targets.is_empty() {
        return true;
    }
    codes.iter().any(|code| targets.iter().any(|t| t == code))
}

/// Apply the CPV predicate to a collected batch.
///
/// Records carrying a `source_error` bypass the predicate: their document
/// could not be classified, and hiding them would mask upstream failures.
pub fn cpv_filter(notices: Vec<Notice>, targets: &[String]) -> Vec<Notice> {
    if targets.is_empty() {
        return notices;
    }
    notices
        .into_iter()
        .filter(|n| n.source_error.is_some() || cpv_match(targets, &n.cpv_codes))
        .collect()
}

/// Whether a notice's publication date parses and falls inside the inclusive
/// range. Unparsable dates (including regex-valid but calendar-invalid text)
/// make the record non-filterable and therefore excluded.
pub fn in_range(notice: &Notice, from: NaiveDate, to: NaiveDate) -> bool {
    notice
        .publication_date
        .as_deref()
        .and_then(parse_display_date)
        .is_some_and(|date| from <= date && date <= to)
}

/// Defensive date pass the browser adapter runs over everything it collected.
pub fn source_trust_boundary_filter(
    notices: Vec<Notice>,
    request: &SearchRequest,
) -> Vec<Notice> {
    retain_in_range(notices, request)
}

/// Final date pass applied by the aggregator to both sources.
pub fn final_range_filter(notices: Vec<Notice>, request: &SearchRequest) -> Vec<Notice> {
    retain_in_range(notices, request)
}

fn retain_in_range(notices: Vec<Notice>, request: &SearchRequest) -> Vec<Notice> {
    notices
        .into_iter()
        .filter(|n| in_range(n, request.from, request.to))
        .collect()
}
