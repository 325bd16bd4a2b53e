//! Search-result page helpers built on `scraper`.

use scraper::{Html, Selector};

/// Container holding the dictionary articles of a result page.
pub const RESULTS_SELECTOR: &str = "main .artikoloj";
/// Text the source shows when a search has no entry.
pub const NO_ENTRY_MARKER: &str = "Neniom da trafoj";

/// What a fetched result page turned out to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// Outer HTML of the results container.
    Entries(String),
    /// The source confirmed that there is no entry.
    NoEntry,
    /// Neither results nor the no-entry marker; the page cannot be trusted.
    Unrecognized,
}

/// Locates the results container and the no-entry marker on a result page.
#[derive(Debug, Clone)]
pub struct ResultPage {
    results: Selector,
    no_entry_marker: String,
}

impl ResultPage {
    fn new(results_selector: &str, no_entry_marker: &str) -> Option<Self> {
        let results = Selector::parse(results_selector).ok()?;
        Some(Self {
            results,
            no_entry_marker: no_entry_marker.to_string(),
        })
    }

    /// Classifies a raw page.
    pub fn classify(&self, page: &str) -> PageContent {
        let document = Html::parse_document(page);
        if let Some(results) = document.select(&self.results).next() {
            return PageContent::Entries(results.html());
        }
        if page.contains(&self.no_entry_marker) {
            PageContent::NoEntry
        } else {
            PageContent::Unrecognized
        }
    }
}

impl Default for ResultPage {
    fn default() -> Self {
        Self::new(RESULTS_SELECTOR, NO_ENTRY_MARKER).expect("results selector")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_container_is_extracted() {
        let page = r#"
            <html><body><main>
              <div id="trovoj"><div class="artikoloj"><strong class="kapvorto">hund/o</strong></div></div>
            </main></body></html>
        "#;
        match ResultPage::default().classify(page) {
            PageContent::Entries(html) => {
                assert!(html.starts_with("<div class=\"artikoloj\">"));
                assert!(html.contains("kapvorto"));
            }
            other => panic!("expected entries, got {other:?}"),
        }
    }

    #[test]
    fn marker_without_results_means_no_entry() {
        let page = "<html><body><main><p>Neniom da trafoj</p></main></body></html>";
        assert_eq!(ResultPage::default().classify(page), PageContent::NoEntry);
    }

    #[test]
    fn empty_page_is_unrecognized() {
        let page = "<html><body><main><p>Ŝargante...</p></main></body></html>";
        assert_eq!(ResultPage::default().classify(page), PageContent::Unrecognized);
    }

    #[test]
    fn results_outside_main_are_ignored() {
        let page = r#"<body><div class="artikoloj">x</div></body>"#;
        assert_eq!(ResultPage::default().classify(page), PageContent::Unrecognized);
    }

    #[test]
    fn invalid_selector_is_rejected() {
        assert!(ResultPage::new("main >>> [", NO_ENTRY_MARKER).is_none());
    }
}
