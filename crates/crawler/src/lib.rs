pub mod client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod instructions;
pub mod orchestrator;
pub mod parser;
pub mod recipe;
pub mod sitemap;
pub mod writer;

pub use client::*;
pub use config::*;
pub use error::*;
pub use extractor::*;
pub use filter::*;
pub use orchestrator::*;
pub use recipe::*;
pub use writer::*;

use std::sync::Arc;
use url::Url;

/// Sitemap to records in one call: read the sitemap, keep the recipe pages,
/// crawl them through the worker pool.
pub struct Crawler {
    site: SiteConfig,
    sitemap: SitemapCrawler,
    pages: ParallelCrawler,
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Self::with_config(CrawlerConfig::default(), SiteConfig::default(), ExtractorConfig::default())
    }

    pub fn with_config(
        config: CrawlerConfig,
        site: SiteConfig,
        extractor: ExtractorConfig,
    ) -> Result<Self> {
        let concurrency = config.max_concurrent;
        let client = HttpClient::new(Arc::new(config))?;
        let extractor = Arc::new(RecipeExtractor::new(extractor, Url::parse(&site.base_url)?)?);

        Ok(Self {
            site,
            sitemap: SitemapCrawler::new(client.clone()),
            pages: ParallelCrawler::new(client, extractor, concurrency),
        })
    }

    /// Recipe page URLs listed in the configured sitemap.
    pub async fn recipe_urls(&self) -> Result<Vec<Url>> {
        let sitemap_url = Url::parse(&self.site.sitemap_url)?;
        self.sitemap
            .recipe_urls(&sitemap_url, &self.site.recipe_prefix)
            .await
    }

    /// Run the whole batch. Only a sitemap failure is returned as an error;
    /// page failures are reported inside the `CrawlReport`.
    pub async fn run(&self) -> Result<CrawlReport> {
        let urls = self.recipe_urls().await?;
        Ok(self.pages.crawl_urls(urls).await)
    }
}
