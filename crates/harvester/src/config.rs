use recipe_crawler::{CrawlerConfig, ExtractorConfig, SiteConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT: &str = "recipes.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    pub extractor: ExtractorConfig,
    pub output: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            site: SiteConfig::default(),
            extractor: ExtractorConfig::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl HarvestConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` knows about. Values that fail
    /// to parse are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("RECIPES_SITEMAP_URL") {
            config.site.sitemap_url = url;
        }

        if let Some(url) = lookup("RECIPES_BASE_URL") {
            config.site.base_url = url;
        }

        if let Some(prefix) = lookup("RECIPES_PATH_PREFIX") {
            config.site.recipe_prefix = prefix;
        }

        if let Some(agent) = lookup("RECIPES_USER_AGENT") {
            config.crawler = config.crawler.with_user_agent(agent);
        }

        if let Some(path) = lookup("RECIPES_OUTPUT") {
            config.output = PathBuf::from(path);
        }

        if let Some(concurrency) = lookup("RECIPES_CONCURRENCY") {
            if let Ok(concurrency) = concurrency.parse() {
                config.crawler = config.crawler.with_concurrency(concurrency);
            }
        }

        if let Some(secs) = lookup("RECIPES_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.crawler = config.crawler.with_timeout(Duration::from_secs(secs));
            }
        }

        config
    }
}
