pub mod config;

pub use config::*;

use anyhow::Context;
use recipe_crawler::{write_recipes, CrawlStats, Crawler};
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestSummary {
    pub stats: CrawlStats,
    pub elapsed_ms: u128,
}

/// One batch run: sitemap, pages, JSON file. The output file is only
/// touched once the sitemap has been read successfully.
pub async fn harvest(config: &HarvestConfig) -> anyhow::Result<HarvestSummary> {
    let start = Instant::now();

    let crawler = Crawler::with_config(
        config.crawler.clone(),
        config.site.clone(),
        config.extractor.clone(),
    )
    .context("Failed to build crawler")?;

    let report = crawler
        .run()
        .await
        .with_context(|| format!("Failed to read sitemap {}", config.site.sitemap_url))?;

    write_recipes(&config.output, &report.recipes)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;

    let summary = HarvestSummary {
        stats: report.stats(),
        elapsed_ms: start.elapsed().as_millis(),
    };

    info!(
        "Harvest finished in {} ms: {} recipes written, {} pages skipped",
        summary.elapsed_ms, summary.stats.extracted, summary.stats.failed
    );

    Ok(summary)
}
