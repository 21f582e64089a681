// src/models/selectors.rs

//! CSS selectors for extracting notices from the browser-driven listing.
//!
//! The listing site has reshuffled its markup more than once, so every field
//! carries a primary selector and an optional fallback that matches the older
//! structure.

use serde::{Deserialize, Serialize};

/// A primary CSS selector with an optional fallback for legacy markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorPair {
    /// Selector tried first
    pub primary: String,

    /// Selector tried when the primary matches nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl SelectorPair {
    /// Pair with only a primary selector.
    pub fn of(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallback: None,
        }
    }

    /// Pair with a primary and a fallback selector.
    pub fn with_fallback(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallback: Some(fallback.into()),
        }
    }
}

/// Selectors for one search-result page of the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Container that signals the results list rendered at all
    #[serde(default = "defaults::results_list")]
    pub results_list: SelectorPair,

    /// One notice per match
    #[serde(default = "defaults::item")]
    pub item: SelectorPair,

    /// Title element; its anchor (or the link selector) carries the href
    #[serde(default = "defaults::title")]
    pub title: SelectorPair,

    /// Ingress/description element
    #[serde(default = "defaults::description")]
    pub description: SelectorPair,

    /// Anchor element holding the notice link
    #[serde(default = "defaults::link")]
    pub link: SelectorPair,

    /// Element whose text contains the publication date
    #[serde(default = "defaults::published")]
    pub published: SelectorPair,

    /// Buyer name element(s); multiple matches are joined
    #[serde(default = "defaults::buyer")]
    pub buyer: SelectorPair,

    /// Ordered chip elements: first = type, second = subtype
    #[serde(default = "defaults::chips")]
    pub chips: SelectorPair,

    /// Element carrying the place of performance, preferably via aria-label
    #[serde(default = "defaults::location")]
    pub location: SelectorPair,

    /// Label prefix stripped from the location aria-label text
    #[serde(default = "defaults::location_label")]
    pub location_label: String,

    /// Element whose `title` attribute carries the EØS flag text
    #[serde(default = "defaults::eoes")]
    pub eoes: SelectorPair,

    /// Estimated value element
    #[serde(default = "defaults::estimated_value")]
    pub estimated_value: SelectorPair,

    /// Deadline element
    #[serde(default = "defaults::deadline")]
    pub deadline: SelectorPair,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            results_list: defaults::results_list(),
            item: defaults::item(),
            title: defaults::title(),
            description: defaults::description(),
            link: defaults::link(),
            published: defaults::published(),
            buyer: defaults::buyer(),
            chips: defaults::chips(),
            location: defaults::location(),
            location_label: defaults::location_label(),
            eoes: defaults::eoes(),
            estimated_value: defaults::estimated_value(),
            deadline: defaults::deadline(),
        }
    }
}

mod defaults {
    use super::SelectorPair;

    pub fn results_list() -> SelectorPair {
        SelectorPair::with_fallback("ul.search-results", "div.search-results")
    }
    pub fn item() -> SelectorPair {
        SelectorPair::with_fallback("li.search-result", "article.search-result")
    }
    pub fn title() -> SelectorPair {
        SelectorPair::with_fallback("h2.title a", "a.result-title")
    }
    pub fn description() -> SelectorPair {
        SelectorPair::with_fallback("p.ingress", "div.description")
    }
    pub fn link() -> SelectorPair {
        SelectorPair::with_fallback("h2.title a", "a.result-title")
    }
    pub fn published() -> SelectorPair {
        SelectorPair::with_fallback("time.published", "span.published-date")
    }
    pub fn buyer() -> SelectorPair {
        SelectorPair::with_fallback("span.buyer-name", "div.organisation")
    }
    pub fn chips() -> SelectorPair {
        SelectorPair::with_fallback("ul.chips li", "span.tag")
    }
    pub fn location() -> SelectorPair {
        SelectorPair::with_fallback("span.location[aria-label]", "span.location")
    }
    pub fn location_label() -> String {
        "Sted:".to_string()
    }
    pub fn eoes() -> SelectorPair {
        SelectorPair::with_fallback("span.eoes[title]", "abbr.eoes[title]")
    }
    pub fn estimated_value() -> SelectorPair {
        SelectorPair::of("span.estimated-value")
    }
    pub fn deadline() -> SelectorPair {
        SelectorPair::with_fallback("time.deadline", "span.deadline")
    }
}
