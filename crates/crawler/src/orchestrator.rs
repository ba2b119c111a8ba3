use futures::{stream, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::sitemap::{entry_urls, parse_sitemap};
use crate::{filter_recipe_urls, CrawlerError, HttpClient, Recipe, RecipeExtractor, Result};

#[derive(Debug)]
pub enum CrawlResult {
    Success { url: Url, recipe: Recipe },
    Error { url: Url, error: CrawlerError },
}

/// Everything a batch produced. `recipes` is in completion order.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub recipes: Vec<Recipe>,
    pub failures: Vec<(Url, CrawlerError)>,
}

impl CrawlReport {
    pub fn stats(&self) -> CrawlStats {
        CrawlStats {
            attempted: self.recipes.len() + self.failures.len(),
            extracted: self.recipes.len(),
            failed: self.failures.len(),
        }
    }

    fn push(&mut self, result: CrawlResult) {
        match result {
            CrawlResult::Success { recipe, .. } => self.recipes.push(recipe),
            CrawlResult::Error { url, error } => self.failures.push((url, error)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub attempted: usize,
    pub extracted: usize,
    pub failed: usize,
}

/// Fetches and extracts a set of independent recipe pages, at most
/// `max_concurrent` at a time.
pub struct ParallelCrawler {
    client: HttpClient,
    extractor: Arc<RecipeExtractor>,
    max_concurrent: usize,
}

impl ParallelCrawler {
    pub fn new(client: HttpClient, extractor: Arc<RecipeExtractor>, max_concurrent: usize) -> Self {
        Self {
            client,
            extractor,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Fetch one page and extract its record. Extraction runs on the blocking
    /// pool so a panic there surfaces as a task failure for this URL only.
    pub async fn crawl_single(&self, url: Url) -> Result<Recipe> {
        let start = Instant::now();
        let html = self.client.fetch_page(&url).await?;
        debug!("Fetched {} in {:?}", url, start.elapsed());

        let extractor = Arc::clone(&self.extractor);
        let source = url.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&html, &source))
            .await
            .map_err(|e| CrawlerError::TaskFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?
    }

    /// Run every URL to completion and collect what came back. Individual
    /// failures are logged and recorded; they never stop the batch.
    pub async fn crawl_urls(&self, urls: Vec<Url>) -> CrawlReport {
        let total = urls.len();
        let mut report = CrawlReport::default();

        info!(
            "Crawling {} recipe pages (max_concurrent={})",
            total, self.max_concurrent
        );

        let mut results = stream::iter(urls)
            .map(|url| async move {
                match self.crawl_single(url.clone()).await {
                    Ok(recipe) => CrawlResult::Success { url, recipe },
                    Err(error) => CrawlResult::Error { url, error },
                }
            })
            .buffer_unordered(self.max_concurrent);

        let mut done = 0usize;
        while let Some(result) = results.next().await {
            done += 1;
            match &result {
                CrawlResult::Success { url, recipe } => {
                    info!("Processed recipe {}/{}: {}", done, total, url);
                    debug!(url = %url, title = %recipe.title, "Extracted recipe");
                }
                CrawlResult::Error { url, error } => {
                    warn!("Skipping recipe {}/{} at {}: {}", done, total, url, error);
                }
            }
            report.push(result);
        }

        let stats = report.stats();
        info!(
            "Crawl completed: {} extracted, {} failed",
            stats.extracted, stats.failed
        );

        report
    }
}

/// Reads the sitemap and selects the recipe pages in it.
pub struct SitemapCrawler {
    client: HttpClient,
}

impl SitemapCrawler {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// All sitemap locations, in document order. Any failure here is fatal
    /// for the run.
    pub async fn sitemap_urls(&self, sitemap_url: &Url) -> Result<Vec<Url>> {
        let body = self.client.fetch_sitemap(sitemap_url).await?;
        let entries = parse_sitemap(&body)?;
        let urls = entry_urls(&entries);

        info!("Found {} URLs in sitemap", urls.len());
        Ok(urls)
    }

    /// Sitemap locations under `prefix`, first occurrence kept for repeats.
    pub async fn recipe_urls(&self, sitemap_url: &Url, prefix: &str) -> Result<Vec<Url>> {
        let urls = self.sitemap_urls(sitemap_url).await?;
        let recipes = dedup(filter_recipe_urls(urls, prefix));

        info!("{} URLs match recipe prefix {}", recipes.len(), prefix);
        Ok(recipes)
    }
}

fn dedup(urls: Vec<Url>) -> Vec<Url> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| {
            let fresh = seen.insert(url.as_str().to_string());
            if !fresh {
                warn!("Duplicate sitemap entry ignored: {}", url);
            }
            fresh
        })
        .collect()
}
