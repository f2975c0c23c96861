use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Links pulled from one page, in document order, plus a count of anchors
/// whose href could not be resolved to an absolute URL.
#[derive(Debug, Default)]
pub struct ExtractedLinks {
    pub links: Vec<Url>,
    pub skipped: usize,
}

/// Collect the absolute URLs referenced by anchor elements in `html`.
///
/// Path-absolute hrefs (`/about`) are glued onto `base_url` exactly as
/// given; everything else must already parse as an absolute URL.
/// Document-relative (`./about`) and fragment-only (`#top`) hrefs fail
/// that parse and are dropped, matching the crawl's intended reach.
/// Malformed HTML never fails; it parses best-effort.
pub fn extract_links(html: &str, base_url: &str) -> ExtractedLinks {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a").unwrap();

    let mut extracted = ExtractedLinks::default();

    for element in document.select(&selector) {
        let href = element.value().attr("href").unwrap_or("");
        if href.is_empty() {
            extracted.skipped += 1;
            continue;
        }

        let resolved = if href.starts_with('/') {
            Url::parse(&format!("{}{}", base_url, href))
        } else {
            Url::parse(href)
        };

        match resolved {
            Ok(url) => extracted.links.push(url),
            Err(e) => {
                debug!("Dropping anchor href {:?}: {}", href, e);
                extracted.skipped += 1;
            }
        }
    }

    extracted
}
