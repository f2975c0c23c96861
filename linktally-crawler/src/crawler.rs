use crate::error::{CrawlError, Result};
use crate::event::{PageEvent, PageOutcome};
use crate::extract::extract_links;
use crate::normalize::normalize_parsed;
use reqwest::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Cancels a running crawl: no further URLs are dequeued and in-flight
/// fetches are abandoned. Cancellation is sticky for the crawler that
/// issued the handle.
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

pub struct Crawler {
    client: Client,
    index: Arc<Mutex<HashMap<String, u64>>>,
    events: Arc<Mutex<Vec<PageEvent>>>,
    progress_callback: Option<ProgressCallback>,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("linktally/0.1 (https://github.com/trapdoorsec/linktally)")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs / 2))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        let (cancel_tx, cancel_rx) = watch::channel(false);

        Self {
            client,
            index: Arc::new(Mutex::new(HashMap::new())),
            events: Arc::new(Mutex::new(Vec::new())),
            progress_callback: None,
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    /// Walk every same-origin page reachable from `start_url` and return the
    /// visit index: normalized page key mapped to how many times the page
    /// was referenced during the run.
    ///
    /// Per-page failures are recorded as events and stop only that branch;
    /// the run itself fails only when the base or start URL cannot be
    /// parsed, or a worker task dies.
    pub async fn crawl(
        &self,
        base_url: &str,
        start_url: &str,
        workers: usize,
    ) -> Result<HashMap<String, u64>> {
        info!("Starting crawl of {} with {} workers", start_url, workers);

        let base = Url::parse(base_url)
            .map_err(|e| CrawlError::BaseUrl(format!("{}: {}", base_url, e)))?;
        let base_host = base
            .host_str()
            .ok_or_else(|| CrawlError::BaseUrl(format!("no host in {}", base_url)))?
            .to_ascii_lowercase();
        let start = Url::parse(start_url)
            .map_err(|e| CrawlError::BaseUrl(format!("{}: {}", start_url, e)))?;

        // One index per run.
        self.index.lock().await.clear();
        self.events.lock().await.clear();

        let queue: Arc<Mutex<VecDeque<Url>>> = Arc::new(Mutex::new(VecDeque::new()));
        let in_flight = Arc::new(AtomicUsize::new(0));

        // The start URL goes through the same origin and dedup gate as any
        // discovered link; an external start yields an empty index.
        Self::consider(&base_host, start, &self.index, &self.events, &queue).await;

        let mut worker_handles = Vec::new();

        for worker_id in 0..workers {
            let client = self.client.clone();
            let base_host = base_host.clone();
            let base_url = base_url.to_string();
            let progress_cb = self.progress_callback.clone();
            let index = self.index.clone();
            let events = self.events.clone();
            let queue = queue.clone();
            let in_flight = in_flight.clone();
            let mut cancel_rx = self.cancel_rx.clone();

            let handle = tokio::spawn(async move {
                debug!("Worker {} started", worker_id);

                loop {
                    if *cancel_rx.borrow() {
                        debug!("Worker {} cancelled", worker_id);
                        break;
                    }

                    // Claiming work and bumping in_flight happen under the
                    // queue lock, so an idle worker observing an empty queue
                    // with nothing in flight knows the crawl is done.
                    let next = {
                        let mut queue = queue.lock().await;
                        let item = queue.pop_front();
                        if item.is_some() {
                            in_flight.fetch_add(1, Ordering::SeqCst);
                        }
                        item
                    };

                    let url = match next {
                        Some(url) => url,
                        None => {
                            if Self::no_work_left(&queue, &in_flight).await {
                                debug!("Worker {} exiting", worker_id);
                                break;
                            }
                            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
                            continue;
                        }
                    };

                    if let Some(ref callback) = progress_cb {
                        callback(worker_id, url.to_string());
                    }

                    events
                        .lock()
                        .await
                        .push(PageEvent::new(url.to_string(), PageOutcome::Started));
                    debug!("Fetching {}", url);

                    let fetched = tokio::select! {
                        _ = cancel_rx.changed() => {
                            debug!("Worker {} cancelled mid-fetch", worker_id);
                            break;
                        }
                        fetched = Self::fetch_html(&client, &url) => fetched,
                    };

                    let outcome = match fetched {
                        Ok(body) => {
                            let extracted = extract_links(&body, &base_url);
                            let links_found = extracted.links.len();
                            for link in extracted.links {
                                Self::consider(&base_host, link, &index, &events, &queue).await;
                            }
                            PageOutcome::Visited {
                                links_found,
                                links_skipped: extracted.skipped,
                            }
                        }
                        Err(CrawlError::Status(status)) => {
                            warn!("Fetch of {} failed with status {}", url, status);
                            PageOutcome::FailedStatus { status }
                        }
                        Err(CrawlError::NotHtml(content_type)) => {
                            debug!("Non-HTML response at {}: {:?}", url, content_type);
                            PageOutcome::SkippedNonHtml { content_type }
                        }
                        Err(e) => {
                            warn!("Fetch of {} failed: {}", url, e);
                            PageOutcome::FailedTransport {
                                error: e.to_string(),
                            }
                        }
                    };

                    events
                        .lock()
                        .await
                        .push(PageEvent::new(url.to_string(), outcome));
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }

                debug!("Worker {} finished", worker_id);
            });

            worker_handles.push(handle);
        }

        for handle in worker_handles {
            handle.await?;
        }

        let index = self.index.lock().await;
        info!("Crawl complete. {} pages indexed", index.len());
        Ok(index.clone())
    }

    /// The recorded per-page event stream for the most recent run.
    pub async fn events(&self) -> Vec<PageEvent> {
        self.events.lock().await.clone()
    }

    /// Origin and dedup gate for one candidate URL. A first visit enters
    /// the index with count 1 and joins the fetch queue; every later
    /// encounter of the same key only bumps the count. External hosts are
    /// excluded from the index entirely.
    async fn consider(
        base_host: &str,
        candidate: Url,
        index: &Arc<Mutex<HashMap<String, u64>>>,
        events: &Arc<Mutex<Vec<PageEvent>>>,
        queue: &Arc<Mutex<VecDeque<Url>>>,
    ) {
        let same_origin = candidate
            .host_str()
            .map(|host| host.eq_ignore_ascii_case(base_host))
            .unwrap_or(false);
        if !same_origin {
            debug!("Excluding external link {}", candidate);
            events.lock().await.push(PageEvent::new(
                candidate.to_string(),
                PageOutcome::SkippedExternal,
            ));
            return;
        }

        let key = match normalize_parsed(&candidate) {
            Ok(key) => key,
            Err(e) => {
                debug!("Dropping candidate {}: {}", candidate, e);
                return;
            }
        };

        // One lock acquisition covers the check and the insert, so two
        // workers can never both win the first visit for a key.
        let mut index_lock = index.lock().await;
        if let Some(count) = index_lock.get_mut(&key) {
            *count += 1;
            return;
        }
        index_lock.insert(key, 1);
        drop(index_lock);

        queue.lock().await.push_back(candidate);
    }

    async fn no_work_left(queue: &Mutex<VecDeque<Url>>, in_flight: &AtomicUsize) -> bool {
        let queue = queue.lock().await;
        queue.is_empty() && in_flight.load(Ordering::SeqCst) == 0
    }

    async fn fetch_html(client: &Client, url: &Url) -> Result<String> {
        let response = client.get(url.clone()).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if status >= 400 {
            return Err(CrawlError::Status(status));
        }

        // A missing content-type header means "nothing to extract", never
        // a crash.
        let is_html = content_type
            .as_ref()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);
        if !is_html {
            return Err(CrawlError::NotHtml(content_type));
        }

        Ok(response.text().await?)
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}
