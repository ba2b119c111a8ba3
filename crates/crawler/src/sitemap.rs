use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;
use url::Url;

use crate::{CrawlerError, Result};

/// A `<url>` entry from a sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Loc,
    Lastmod,
}

/// Parse a `<urlset>` sitemap into its entries.
pub fn parse_sitemap(xml: &str) -> Result<Vec<SitemapEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut saw_urlset = false;
    let mut current: Option<SitemapEntry> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                match e.local_name().as_ref() {
                    b"urlset" if depth == 1 => saw_urlset = true,
                    b"url" if saw_urlset => {
                        current = Some(SitemapEntry {
                            loc: String::new(),
                            lastmod: None,
                        });
                    }
                    b"loc" if current.is_some() => field = Some(Field::Loc),
                    b"lastmod" if current.is_some() => field = Some(Field::Lastmod),
                    _ => {}
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match e.local_name().as_ref() {
                    b"url" => {
                        if let Some(entry) = current.take() {
                            if entry.loc.is_empty() {
                                warn!("Skipping sitemap <url> without <loc>");
                            } else {
                                entries.push(entry);
                            }
                        }
                    }
                    b"loc" | b"lastmod" => field = None,
                    _ => {}
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                push_text(&mut current, field, &text);
            }
            Event::CData(e) => {
                let raw = e.into_inner();
                let text = String::from_utf8_lossy(&raw);
                push_text(&mut current, field, &text);
            }
            Event::Empty(e) if depth == 0 && e.local_name().as_ref() == b"urlset" => {
                saw_urlset = true;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(CrawlerError::Sitemap(format!(
            "document ended with {} unclosed element(s)",
            depth
        )));
    }

    if !saw_urlset {
        return Err(CrawlerError::Sitemap("missing <urlset> root element".to_string()));
    }

    Ok(entries)
}

fn push_text(current: &mut Option<SitemapEntry>, field: Option<Field>, text: &str) {
    let Some(entry) = current.as_mut() else {
        return;
    };

    match field {
        Some(Field::Loc) => entry.loc.push_str(text.trim()),
        Some(Field::Lastmod) => {
            entry
                .lastmod
                .get_or_insert_with(String::new)
                .push_str(text.trim());
        }
        None => {}
    }
}

/// Flatten parsed entries into absolute URLs, dropping the ones that do not
/// parse.
pub fn entry_urls(entries: &[SitemapEntry]) -> Vec<Url> {
    entries
        .iter()
        .filter_map(|entry| match Url::parse(&entry.loc) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Skipping sitemap entry '{}': {}", entry.loc, e);
                None
            }
        })
        .collect()
}
