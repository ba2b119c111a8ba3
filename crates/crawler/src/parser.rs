use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{CrawlerError, Result};

/// Compile a CSS selector, surfacing the error as a crawler error.
pub fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| CrawlerError::ParseError(format!("Invalid selector '{}': {:?}", selector, e)))
}

/// A parsed page plus the base used to resolve relative links in it.
pub struct RecipePage {
    html: Html,
    base_url: Url,
}

impl RecipePage {
    pub fn parse(html: &str, base_url: Url) -> Self {
        Self {
            html: Html::parse_document(html),
            base_url,
        }
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    pub fn select_all<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    /// Resolve an image or link reference against the site base. Absolute
    /// references come back unchanged.
    pub fn absolutize(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }

        self.base_url.join(reference).ok().map(|url| url.to_string())
    }
}

/// Text content of an element with runs of whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The image URL an `img` element points at, lazy-loading attributes included.
pub fn image_source<'a>(img: ElementRef<'a>) -> Option<&'a str> {
    ["src", "data-src", "data-lazy-src"]
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:"))
}
