use std::future::Future;

use super::{ExistenceProbe, ProbeOutcome};

/// Existence probe backed by HTTP HEAD against the asset hosts. One client
/// is shared across all axes; reqwest pools connections internally.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ExistenceProbe for HttpProbe {
    fn check(&self, url: &str) -> impl Future<Output = ProbeOutcome> + Send {
        let request = self.client.head(url).send();
        let url = url.to_string();
        async move {
            match request.await {
                Ok(response) if response.status().is_success() => ProbeOutcome::Hit,
                Ok(response) => {
                    log::debug!("probe {} -> {}", url, response.status());
                    ProbeOutcome::Miss
                }
                Err(err) => {
                    // Transport failure is indistinguishable from absence
                    // as far as the fallback chain is concerned.
                    log::debug!("probe {} failed: {}", url, err);
                    ProbeOutcome::Miss
                }
            }
        }
    }
}
