use recipe_harvester::{harvest, HarvestConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_harvester=info,recipe_crawler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HarvestConfig::from_env();
    tracing::info!("Harvesting recipes from {}", config.site.sitemap_url);

    if let Err(e) = harvest(&config).await {
        tracing::error!("Harvest failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}
