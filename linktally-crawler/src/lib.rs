pub mod crawler;
pub mod error;
pub mod event;
pub mod extract;
pub mod normalize;

pub use crawler::{CancelHandle, Crawler, ProgressCallback};
pub use error::CrawlError;
pub use event::{PageEvent, PageOutcome};
pub use extract::{ExtractedLinks, extract_links};
pub use normalize::normalize_url;
