// src/extract/dom.rs

//! Field extraction from listing-page DOM nodes.
//!
//! Each notice field is looked up via a configured CSS selector with an
//! optional fallback for the site's older markup. Selectors are compiled once
//! per extraction pass.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ListingSelectors, Notice, SelectorPair};
use crate::utils::date::extract_display_date;
use crate::utils::resolve_url;

/// A compiled primary/fallback selector pair.
struct CompiledPair {
    primary: Selector,
    fallback: Option<Selector>,
}

impl CompiledPair {
    fn compile(pair: &SelectorPair) -> Result<Self> {
        Ok(Self {
            primary: parse_selector(&pair.primary)?,
            fallback: pair
                .fallback
                .as_deref()
                .map(parse_selector)
                .transpose()?,
        })
    }

    /// First match of the primary selector, else first match of the fallback.
    fn select_first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope.select(&self.primary).next().or_else(|| {
            self.fallback
                .as_ref()
                .and_then(|sel| scope.select(sel).next())
        })
    }

    /// All matches of whichever selector matches anything.
    fn select_all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let matches: Vec<_> = scope.select(&self.primary).collect();
        if !matches.is_empty() {
            return matches;
        }
        match &self.fallback {
            Some(sel) => scope.select(sel).collect(),
            None => Vec::new(),
        }
    }
}

/// Extracts notices from one listing page.
pub struct ListingExtractor {
    base_url: url::Url,
    location_label: String,
    results_list: CompiledPair,
    item: CompiledPair,
    title: CompiledPair,
    description: CompiledPair,
    link: CompiledPair,
    published: CompiledPair,
    buyer: CompiledPair,
    chips: CompiledPair,
    location: CompiledPair,
    eoes: CompiledPair,
    estimated_value: CompiledPair,
    deadline: CompiledPair,
}

impl ListingExtractor {
    /// Compile the configured selectors against a base URL for link
    /// resolution.
    pub fn new(selectors: &ListingSelectors, base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: url::Url::parse(base_url)?,
            location_label: selectors.location_label.clone(),
            results_list: CompiledPair::compile(&selectors.results_list)?,
            item: CompiledPair::compile(&selectors.item)?,
            title: CompiledPair::compile(&selectors.title)?,
            description: CompiledPair::compile(&selectors.description)?,
            link: CompiledPair::compile(&selectors.link)?,
            published: CompiledPair::compile(&selectors.published)?,
            buyer: CompiledPair::compile(&selectors.buyer)?,
            chips: CompiledPair::compile(&selectors.chips)?,
            location: CompiledPair::compile(&selectors.location)?,
            eoes: CompiledPair::compile(&selectors.eoes)?,
            estimated_value: CompiledPair::compile(&selectors.estimated_value)?,
            deadline: CompiledPair::compile(&selectors.deadline)?,
        })
    }

    /// Whether the results-list container is present in the page at all.
    pub fn has_results_list(&self, document: &Html) -> bool {
        self.results_list
            .select_first(document.root_element())
            .is_some()
    }

    /// Extract every notice item on the page, in document order.
    pub fn extract_page(&self, document: &Html) -> Vec<Notice> {
        self.item
            .select_all(document.root_element())
            .into_iter()
            .map(|item| self.extract_item(item))
            .collect()
    }

    fn extract_item(&self, item: ElementRef<'_>) -> Notice {
        let title = self.title.select_first(item).map(element_text);

        let link = self
            .link
            .select_first(item)
            .and_then(|el| el.value().attr("href"))
            .map(|href| resolve_url(&self.base_url, href));

        let publication_date = self
            .published
            .select_first(item)
            .and_then(|el| extract_display_date(&element_text(el)));

        // Multiple buyer entries are joined rather than truncated to one.
        let buyers: Vec<String> = self
            .buyer
            .select_all(item)
            .into_iter()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect();
        let buyer = (!buyers.is_empty()).then(|| buyers.join(" / "));

        // Chips are positional: first = type, second (if present) = subtype.
        let chips: Vec<String> = self
            .chips
            .select_all(item)
            .into_iter()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect();
        let announcement_type = chips.first().cloned();
        let announcement_subtype = chips.get(1).cloned();

        let location = self.location.select_first(item).and_then(|el| {
            match el.value().attr("aria-label") {
                Some(label) => strip_label(label, &self.location_label),
                None => non_empty(element_text(el)),
            }
        });

        let eoes_flag = self
            .eoes
            .select_first(item)
            .and_then(|el| el.value().attr("title"))
            .map(|t| t.trim().to_string())
            .and_then(non_empty);

        let description = self
            .description
            .select_first(item)
            .map(element_text)
            .and_then(non_empty);

        let estimated_value = self
            .estimated_value
            .select_first(item)
            .map(element_text)
            .and_then(non_empty);

        let deadline = self
            .deadline
            .select_first(item)
            .and_then(|el| extract_display_date(&element_text(el)));

        Notice {
            title: title.and_then(non_empty),
            description,
            link,
            publication_date,
            buyer,
            location,
            estimated_value,
            deadline,
            announcement_type,
            announcement_subtype,
            eoes_flag,
            ..Notice::default()
        }
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Element text with collapsed whitespace.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_label(value: &str, label: &str) -> Option<String> {
    let stripped = value.trim().strip_prefix(label).unwrap_or(value.trim());
    non_empty(stripped.trim().to_string())
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingSelectors;

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(&ListingSelectors::default(), "https://www.doffin.no/search")
            .unwrap()
    }

    const CURRENT_MARKUP: &str = r#"
        <html><body>
          <ul class="search-results">
            <li class="search-result">
              <h2 class="title"><a href="/notices/2024-123">Ny barnehage i Asker</a></h2>
              <p class="ingress">Totalentreprise for ny barnehage.</p>
              <time class="published">Publisert 15.01.2024</time>
              <span class="buyer-name">Asker kommune</span>
              <ul class="chips"><li>Anskaffelse</li><li>Anbudskonkurranse</li></ul>
              <span class="location" aria-label="Sted: Viken">V</span>
              <span class="eoes" title="Kunngjort i EOS-omradet">EOS</span>
              <span class="estimated-value">12 500 000 NOK</span>
              <time class="deadline">Frist 20.02.2024</time>
            </li>
          </ul>
        </body></html>"#;

    const LEGACY_MARKUP: &str = r#"
        <html><body>
          <div class="search-results">
            <article class="search-result">
              <a class="result-title" href="https://www.doffin.no/notices/2023-9">Vintervedlikehold</a>
              <div class="description">Broyting og stroing.</div>
              <span class="published-date">03.11.2023</span>
              <div class="organisation">Trondheim kommune</div>
              <span class="tag">Anskaffelse</span>
              <span class="location">Trondelag</span>
            </article>
          </div>
        </body></html>"#;

    #[test]
    fn test_extracts_all_fields_from_current_markup() {
        let document = Html::parse_document(CURRENT_MARKUP);
        let extractor = extractor();
        assert!(extractor.has_results_list(&document));

        let notices = extractor.extract_page(&document);
        assert_eq!(notices.len(), 1);
        let n = &notices[0];

        assert_eq!(n.title.as_deref(), Some("Ny barnehage i Asker"));
        assert_eq!(
            n.link.as_deref(),
            Some("https://www.doffin.no/notices/2024-123")
        );
        assert_eq!(n.description.as_deref(), Some("Totalentreprise for ny barnehage."));
        assert_eq!(n.publication_date.as_deref(), Some("15.01.2024"));
        assert_eq!(n.buyer.as_deref(), Some("Asker kommune"));
        assert_eq!(n.announcement_type.as_deref(), Some("Anskaffelse"));
        assert_eq!(n.announcement_subtype.as_deref(), Some("Anbudskonkurranse"));
        assert_eq!(n.location.as_deref(), Some("Viken"));
        assert_eq!(n.eoes_flag.as_deref(), Some("Kunngjort i EOS-omradet"));
        assert_eq!(n.estimated_value.as_deref(), Some("12 500 000 NOK"));
        assert_eq!(n.deadline.as_deref(), Some("20.02.2024"));
        assert!(n.cpv_codes.is_empty());
        assert!(n.source_error.is_none());
    }

    #[test]
    fn test_fallback_selectors_cover_legacy_markup() {
        let document = Html::parse_document(LEGACY_MARKUP);
        let extractor = extractor();
        assert!(extractor.has_results_list(&document));

        let notices = extractor.extract_page(&document);
        assert_eq!(notices.len(), 1);
        let n = &notices[0];

        assert_eq!(n.title.as_deref(), Some("Vintervedlikehold"));
        assert_eq!(
            n.link.as_deref(),
            Some("https://www.doffin.no/notices/2023-9")
        );
        assert_eq!(n.publication_date.as_deref(), Some("03.11.2023"));
        assert_eq!(n.buyer.as_deref(), Some("Trondheim kommune"));
        assert_eq!(n.announcement_type.as_deref(), Some("Anskaffelse"));
        assert_eq!(n.announcement_subtype, None);
        // No aria-label on the legacy markup: element text is used.
        assert_eq!(n.location.as_deref(), Some("Trondelag"));
        assert_eq!(n.eoes_flag, None);
    }

    #[test]
    fn test_multiple_buyers_joined() {
        let html = r#"
            <ul class="search-results"><li class="search-result">
              <h2 class="title"><a href="/n/1">Felles rammeavtale</a></h2>
              <span class="buyer-name">Oslo kommune</span>
              <span class="buyer-name">Viken fylkeskommune</span>
            </li></ul>"#;
        let document = Html::parse_document(html);
        let notices = extractor().extract_page(&document);
        assert_eq!(
            notices[0].buyer.as_deref(),
            Some("Oslo kommune / Viken fylkeskommune")
        );
    }

    #[test]
    fn test_calendar_invalid_date_is_kept_verbatim() {
        // Extraction does not validate; the filter pipeline excludes later.
        let html = r#"
            <ul class="search-results"><li class="search-result">
              <h2 class="title"><a href="/n/2">X</a></h2>
              <time class="published">31.02.2024</time>
            </li></ul>"#;
        let document = Html::parse_document(html);
        let notices = extractor().extract_page(&document);
        assert_eq!(notices[0].publication_date.as_deref(), Some("31.02.2024"));
    }

    #[test]
    fn test_empty_page_yields_no_records() {
        let document = Html::parse_document("<html><body><p>Ingen resultater</p></body></html>");
        let extractor = extractor();
        assert!(!extractor.has_results_list(&document));
        assert!(extractor.extract_page(&document).is_empty());
    }
}
