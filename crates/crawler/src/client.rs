use bytes::BytesMut;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Client, Response};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::{CrawlerConfig, CrawlerError, Result};

const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Shared HTTP client. One instance serves every worker; reqwest pools the
/// connections underneath.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    config: Arc<CrawlerConfig>,
}

impl HttpClient {
    pub fn new(config: Arc<CrawlerConfig>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(PAGE_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| CrawlerError::ParseError(format!("Accept-Language: {}", e)))?,
        );

        let inner = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
            .build()?;

        Ok(Self { inner, config })
    }

    /// Fetch a recipe page. Single attempt; any failure is returned to the
    /// caller, which decides whether it is fatal.
    pub async fn fetch_page(&self, url: &Url) -> Result<String> {
        let response = self.send(url).await?;

        if let Some(value) = response.headers().get(CONTENT_TYPE) {
            let content_type = value.to_str().unwrap_or_default();
            if !self.accepts_page_type(content_type) {
                return Err(CrawlerError::UnsupportedContentType(content_type.to_string()));
            }
        }

        let body = self.read_body(response).await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// Fetch the sitemap document. Sitemaps are served as XML, so the page
    /// content types are not checked; the size cap still applies.
    pub async fn fetch_sitemap(&self, url: &Url) -> Result<String> {
        let response = self.send(url).await?;
        let body = self.read_body(response).await?;
        info!("Fetched sitemap {} ({} bytes)", url, body.len());
        Ok(body)
    }

    async fn send(&self, url: &Url) -> Result<Response> {
        debug!("GET {}", url);
        let response = self.inner.get(url.clone()).send().await?.error_for_status()?;

        let max = self.config.max_page_bytes;
        match response.content_length() {
            Some(declared) if declared > max as u64 => Err(CrawlerError::ContentTooLarge {
                size: declared as usize,
                max,
            }),
            _ => Ok(response),
        }
    }

    /// Buffer the body, giving up as soon as it outgrows the cap. Invalid
    /// UTF-8 is replaced rather than rejected.
    async fn read_body(&self, response: Response) -> Result<String> {
        let max = self.config.max_page_bytes;
        let mut buf = BytesMut::new();
        let mut chunks = response.bytes_stream();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            let size = buf.len() + chunk.len();
            if size > max {
                return Err(CrawlerError::ContentTooLarge { size, max });
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn accepts_page_type(&self, content_type: &str) -> bool {
        let mime = content_type.split(';').next().unwrap_or_default().trim();
        self.config
            .page_content_types
            .iter()
            .any(|allowed| mime.eq_ignore_ascii_case(allowed))
    }
}
