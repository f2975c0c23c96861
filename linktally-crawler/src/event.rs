use serde::{Deserialize, Serialize};

/// What happened to one attempted page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome {
    /// A worker picked the page up and is about to fetch it.
    Started,
    /// Fetched and expanded; tallies cover the anchors on the page.
    Visited {
        links_found: usize,
        links_skipped: usize,
    },
    /// Host differs from the base origin; excluded from the index entirely.
    SkippedExternal,
    /// Fetched but not HTML, so there was nothing to extract.
    SkippedNonHtml { content_type: Option<String> },
    /// Response status was in the error range.
    FailedStatus { status: u16 },
    /// The fetch itself failed (DNS, connection, timeout).
    FailedTransport { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEvent {
    pub url: String,
    pub outcome: PageOutcome,
}

impl PageEvent {
    pub fn new(url: String, outcome: PageOutcome) -> Self {
        Self { url, outcome }
    }
}
