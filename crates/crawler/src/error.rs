use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid sitemap: {0}")]
    Sitemap(String),

    #[error("Content too large: {size} bytes (max: {max})")]
    ContentTooLarge { size: usize, max: usize },

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Empty document at {0}")]
    EmptyDocument(String),

    #[error("Task failed for {url}: {reason}")]
    TaskFailed { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CrawlerError>;
