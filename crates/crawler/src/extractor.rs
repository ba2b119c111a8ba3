use regex::Regex;
use scraper::{ElementRef, Node, Selector};
use tracing::debug;
use url::Url;

use crate::instructions::walk_after;
use crate::parser::{collapse_whitespace, compile, element_text, image_source, RecipePage};
use crate::{CrawlerError, ExtractorConfig, InstructionStep, Recipe, Result};

const PREP_TIME_LABEL: &str = "Tiempo total";

/// Pulls recipe fields out of a page. Every field is looked up on its own;
/// a lookup that finds nothing leaves that field at its default and never
/// affects the others.
pub struct RecipeExtractor {
    config: ExtractorConfig,
    base_url: Url,
    selectors: Selectors,
    digits: Regex,
}

struct Selectors {
    title: Selector,
    any_h1: Selector,
    breadcrumb_items: Selector,
    breadcrumb_links: Selector,
    category_banner: Selector,
    labels: Selector,
    section_headings: Selector,
    media_image: Selector,
    ingredients: Selector,
    img: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            title: compile("h1.m-titulo")?,
            any_h1: compile("h1")?,
            breadcrumb_items: compile(".breadcrumb li")?,
            breadcrumb_links: compile(".breadcrumb a")?,
            category_banner: compile("div.cab-destacado p")?,
            labels: compile("span, strong, b, dt, label")?,
            section_headings: compile("h2, h3")?,
            media_image: compile("div.print_video img")?,
            ingredients: compile("ul.ingredientes li")?,
            img: compile("img")?,
        })
    }
}

impl RecipeExtractor {
    pub fn new(config: ExtractorConfig, base_url: Url) -> Result<Self> {
        let digits = Regex::new(r"[0-9]+").map_err(|e| CrawlerError::ParseError(e.to_string()))?;

        Ok(Self {
            config,
            base_url,
            selectors: Selectors::new()?,
            digits,
        })
    }

    /// Build a record from one page. Fails only when there is no document at
    /// all; missing elements degrade single fields.
    pub fn extract(&self, html: &str, source: &Url) -> Result<Recipe> {
        if html.trim().is_empty() {
            return Err(CrawlerError::EmptyDocument(source.to_string()));
        }

        let page = RecipePage::parse(html, self.base_url.clone());
        let url = source.as_str();

        Ok(Recipe {
            category: isolate(url, "category", self.category(&page)).unwrap_or_default(),
            title: isolate(url, "title", self.title(&page)).unwrap_or_default(),
            prep_time: isolate(url, "prepTime", self.prep_time(&page)).unwrap_or_default(),
            servings: isolate(url, "servings", self.servings(&page)),
            img: isolate(url, "img", self.image(&page)).unwrap_or_default(),
            ingredients: isolate(url, "ingredients", self.ingredients(&page)).unwrap_or_default(),
            instructions: isolate(url, "instructions", self.instructions(&page, url))
                .unwrap_or_default(),
            source: url.to_string(),
        })
    }

    fn title(&self, page: &RecipePage) -> Option<String> {
        page.select_first(&self.selectors.title)
            .or_else(|| page.select_first(&self.selectors.any_h1))
            .map(element_text)
            .filter(|t| !t.is_empty())
    }

    fn category(&self, page: &RecipePage) -> Option<String> {
        let last_crumb = |selector: &Selector| {
            page.select_all(selector)
                .map(element_text)
                .filter(|t| !t.is_empty())
                .last()
        };

        last_crumb(&self.selectors.breadcrumb_items)
            .or_else(|| last_crumb(&self.selectors.breadcrumb_links))
            .or_else(|| {
                page.select_first(&self.selectors.category_banner)
                    .map(element_text)
                    .filter(|t| !t.is_empty())
            })
    }

    fn prep_time(&self, page: &RecipePage) -> Option<String> {
        let label = page
            .select_all(&self.selectors.labels)
            .find(|el| own_text(*el).contains(PREP_TIME_LABEL))?;

        following_text(label)
    }

    fn servings(&self, page: &RecipePage) -> Option<u32> {
        let heading = page.select_all(&self.selectors.section_headings).find(|el| {
            el.value().id().is_some_and(|id| {
                self.config
                    .servings_id_prefixes
                    .iter()
                    .any(|prefix| id.starts_with(prefix.as_str()))
            })
        })?;

        let text = element_text(heading);
        let digits = self.digits.find(&text)?;
        digits.as_str().parse().ok()
    }

    fn image(&self, page: &RecipePage) -> Option<String> {
        page.select_all(&self.selectors.media_image)
            .find_map(image_source)
            .and_then(|src| page.absolutize(src))
    }

    fn ingredients(&self, page: &RecipePage) -> Option<Vec<String>> {
        let items: Vec<String> = page
            .select_all(&self.selectors.ingredients)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect();

        (!items.is_empty()).then_some(items)
    }

    fn instructions(&self, page: &RecipePage, url: &str) -> Option<Vec<InstructionStep>> {
        let heading = &self.config.instructions_heading;
        let anchor = page
            .select_all(&self.selectors.section_headings)
            .find(|el| element_text(*el).starts_with(heading.as_str()))?;

        let (state, steps) = walk_after(page, anchor, &self.config.stops, &self.selectors.img);
        debug!(url, ?state, steps = steps.len(), "Collected instructions");

        (!steps.is_empty()).then_some(steps)
    }
}

/// Field-level error boundary: a missing value is logged with its field name
/// and handed back for the caller to default.
fn isolate<T>(url: &str, field: &'static str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        debug!(url, field, "Field not found, using default");
    }
    value
}

/// Text held directly by `element`, excluding its child elements. Keeps a
/// wrapper around the label from matching before the label itself.
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect()
}

/// Text right after a label: the next non-blank sibling node, text or element.
fn following_text(label: ElementRef<'_>) -> Option<String> {
    for sibling in label.next_siblings() {
        let text = match sibling.value() {
            Node::Text(text) => collapse_whitespace(text),
            Node::Element(_) => ElementRef::wrap(sibling).map(element_text)?,
            _ => continue,
        };

        if !text.is_empty() {
            return Some(text);
        }
    }
    None
}
