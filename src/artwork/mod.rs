pub mod pan;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::DynamicImage;

/// Transport seam for 2D art fetches. Production does a full HTTP GET;
/// tests script bytes, errors, and stalls.
pub trait ArtFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;
}

/// HTTP art fetcher sharing one client with the rest of the core.
#[derive(Debug, Clone)]
pub struct HttpArtFetcher {
    client: reqwest::Client,
}

impl HttpArtFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpArtFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtFetcher for HttpArtFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send {
        let request = self.client.get(url).send();
        async move {
            let response = request.await?.error_for_status()?;
            let bytes = response.bytes().await?;
            Ok(bytes.to_vec())
        }
    }
}

/// Terminal outcome of one art submission, delivered exactly once.
#[derive(Debug)]
pub enum ArtOutcome {
    Loaded { url: String, image: DynamicImage },
    /// Every candidate errored or timed out. Still delivered, so any
    /// "loading" UI state is guaranteed to be dismissed.
    Exhausted,
}

#[derive(Default)]
struct LoaderState {
    urls: Vec<String>,
    done: bool,
    primed: bool,
}

/// Fallback loader for splash/loading art.
///
/// Walks a deduplicated URL chain: each candidate gets a bounded wait; load
/// error, decode error, and timeout all advance to the next candidate.
/// Submitting a list equal by value to the current one is a no-op;
/// a different list resets the walk to the front and supersedes the old one
/// under the same latest-wins discipline as the existence resolver.
pub struct FallbackImageLoader<F> {
    fetcher: Arc<F>,
    wait: Duration,
    generation: Arc<AtomicU64>,
    state: Arc<Mutex<LoaderState>>,
}

impl FallbackImageLoader<HttpArtFetcher> {
    pub fn with_http(config: &crate::config::StageConfig) -> Self {
        Self::new(
            Arc::new(HttpArtFetcher::new()),
            Duration::from_millis(config.art_timeout_ms),
        )
    }
}

impl<F: ArtFetcher> FallbackImageLoader<F> {
    pub fn new(fetcher: Arc<F>, wait: Duration) -> Self {
        Self {
            fetcher,
            wait,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(Mutex::new(LoaderState::default())),
        }
    }

    /// Start loading a candidate chain. `on_done` fires exactly once per
    /// accepted submission, with the first image that loaded or
    /// `Exhausted`. Must be called from within a tokio runtime.
    pub fn submit<D>(&self, urls: Vec<String>, on_done: D)
    where
        D: FnOnce(ArtOutcome) + Send + 'static,
    {
        let urls = dedup(urls);
        let generation = {
            let mut state = self.state.lock().unwrap();
            if state.primed && state.urls == urls {
                // Unchanged by value; keep whatever walk is underway.
                return;
            }
            state.primed = true;
            state.urls = urls.clone();
            state.done = false;
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let fetcher = self.fetcher.clone();
        let wait = self.wait;
        let current = self.generation.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            for url in urls {
                if current.load(Ordering::SeqCst) != generation {
                    return;
                }
                let attempt = tokio::time::timeout(wait, fetcher.fetch(&url)).await;
                match attempt {
                    Ok(Ok(bytes)) => match image::load_from_memory(&bytes) {
                        Ok(image) => {
                            {
                                let mut state = state.lock().unwrap();
                                if current.load(Ordering::SeqCst) != generation || state.done {
                                    return;
                                }
                                state.done = true;
                            }
                            on_done(ArtOutcome::Loaded { url, image });
                            return;
                        }
                        Err(err) => {
                            log::debug!("art decode failed for {}: {}", url, err);
                        }
                    },
                    Ok(Err(err)) => {
                        log::debug!("art fetch failed for {}: {}", url, err);
                    }
                    Err(_) => {
                        log::debug!("art fetch timed out for {}", url);
                    }
                }
            }
            {
                let mut state = state.lock().unwrap();
                if current.load(Ordering::SeqCst) != generation || state.done {
                    return;
                }
                state.done = true;
            }
            on_done(ArtOutcome::Exhausted);
        });
    }

    pub fn is_done(&self) -> bool {
        self.state.lock().unwrap().done
    }
}

fn dedup(urls: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}
