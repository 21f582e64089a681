// src/pipeline/paginate.rs

//! Pagination termination decisions, kept as pure functions so the
//! heuristics are testable without a server or a browser.

use std::sync::OnceLock;

use regex::Regex;

/// Outcome of one fetched API page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTurn {
    /// The server returned a cursor and the ceiling is not reached
    HasMore(String),
    /// Stop fetching
    Exhausted(StopReason),
}

/// Why API pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The server returned no cursor, the normal termination signal
    CursorAbsent,
    /// The adapter's own ceiling fired. The server's cursor stream is not
    /// trusted to terminate, so this guards against runaway loops.
    PageCeiling,
}

/// Decide whether to fetch another API page.
pub fn advance(cursor: Option<String>, pages_fetched: usize, max_pages: usize) -> PageTurn {
    match cursor {
        _ if pages_fetched >= max_pages => PageTurn::Exhausted(StopReason::PageCeiling),
        Some(cursor) => PageTurn::HasMore(cursor),
        None => PageTurn::Exhausted(StopReason::CursorAbsent),
    }
}

/// Why the browser pagination loop stopped. None of these are errors past
/// the first page; they are the listing's way of saying "no more data".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStop {
    /// The navigated URL no longer carries the requested page number;
    /// the site redirected away, so pagination ended
    UrlMismatch,
    /// The results-list selector never appeared within the bounded wait
    ListAbsent,
    /// Navigation did not settle within the bounded wait
    NavTimedOut,
    /// The list rendered but an extraction pass yielded zero records
    EmptyPage,
    /// The adapter's own page ceiling fired
    PageCeiling,
}

fn page_param_re(page: usize) -> Regex {
    // Built per call for the page number; the shape itself is fixed.
    Regex::new(&format!(r"[?&]page={page}(?:[&#]|$)")).expect("page parameter pattern")
}

fn trailing_digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[?&]page=(\d+)").expect("page capture pattern"))
}

/// Whether a navigated URL still reflects the requested page number.
///
/// A redirect that drops or rewrites the `page` parameter means the site ran
/// out of pages for this search.
pub fn url_reflects_page(url: &str, page: usize) -> bool {
    if page_param_re(page).is_match(url) {
        return true;
    }
    // Page 1 is frequently canonicalized to a URL without any page
    // parameter; only an explicit different number contradicts it.
    if page == 1 {
        return !trailing_digits_re().is_match(url);
    }
    false
}
