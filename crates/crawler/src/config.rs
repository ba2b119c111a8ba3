use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.hogarmania.com";
pub const DEFAULT_SITEMAP_URL: &str = "https://www.hogarmania.com/sitemap.cocina-hogarmania.xml";
pub const DEFAULT_RECIPE_PREFIX: &str = "https://www.hogarmania.com/cocina/recetas/";

/// HTTP behaviour shared by the sitemap fetch and every page worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    pub user_agent: String,
    pub accept_language: String,
    /// Per request, connect through body
    pub request_timeout: Duration,
    pub max_redirects: u32,
    /// Bodies above this many bytes are rejected
    pub max_page_bytes: usize,
    /// Upper bound on pages in flight
    pub max_concurrent: usize,
    /// Content types a recipe page may be served with
    pub page_content_types: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("recipe-harvester/{}", env!("CARGO_PKG_VERSION")),
            accept_language: "es-ES,es;q=0.9".to_string(),
            request_timeout: Duration::from_secs(10),
            max_redirects: 5,
            max_page_bytes: 10 * 1024 * 1024,
            max_concurrent: 10,
            page_content_types: vec!["text/html".to_string(), "application/xhtml+xml".to_string()],
        }
    }
}

impl CrawlerConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Zero is clamped to one worker.
    pub fn with_concurrency(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }
}

/// Where the recipes live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base used to resolve relative image sources
    pub base_url: String,
    pub sitemap_url: String,
    /// Only sitemap entries starting with this string are crawled
    pub recipe_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sitemap_url: DEFAULT_SITEMAP_URL.to_string(),
            recipe_prefix: DEFAULT_RECIPE_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Accepted `id` prefixes for the servings heading. The site has used
    /// both `ingredientes-para-...` and `ingredientes-personas-...`.
    pub servings_id_prefixes: Vec<String>,
    /// Text the preparation heading starts with
    pub instructions_heading: String,
    pub stops: InstructionStops,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            servings_id_prefixes: vec![
                "ingredientes-para".to_string(),
                "ingredientes-personas".to_string(),
            ],
            instructions_heading: "Elaboración".to_string(),
            stops: InstructionStops::default(),
        }
    }
}

/// Conditions that end instruction collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionStops {
    /// Stop at the next section heading
    pub at_heading: bool,
    /// Stop at a paragraph led by this emphasised label
    pub tip_label: Option<String>,
}

impl Default for InstructionStops {
    fn default() -> Self {
        Self {
            at_heading: true,
            tip_label: Some("Consejo".to_string()),
        }
    }
}

impl InstructionStops {
    /// Collect until the siblings run out.
    pub fn never() -> Self {
        Self {
            at_heading: false,
            tip_label: None,
        }
    }
}
