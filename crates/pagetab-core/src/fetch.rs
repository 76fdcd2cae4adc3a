use std::time::{Duration, Instant};

use futures::FutureExt;
use tracing::{debug, info};

use crate::address::{self, AddressKind};
use crate::constants::UNTITLED;
use crate::document;
use crate::runner::TaskFuture;

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub title: String,
    /// Cleaned markup
    pub body: String,
    pub elapsed: Duration,
}

impl FetchedPage {
    /// Seconds with two decimals, as shown on the status line.
    pub fn elapsed_display(&self) -> String {
        format!("{:.2}", self.elapsed.as_secs_f64())
    }
}

/// Produces the work that loads one address. The returned future is the
/// body a tab's runner executes.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, address: &str) -> TaskFuture<FetchedPage>;
}

/// Loads local files from disk and remote documents over HTTP.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: reqwest::Client,
}

impl DocumentFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn load(client: reqwest::Client, address: String) -> Result<FetchedPage, String> {
        let started = Instant::now();
        let raw = match address::kind(&address) {
            AddressKind::Local => {
                let path = address::local_path(&address);
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| e.to_string())?
            }
            AddressKind::Remote => {
                let response = client.get(&address).send().await.map_err(|e| e.to_string())?;
                let status = response.status();
                if !status.is_success() {
                    return Err(format!("HTTP error fetching URL. Status={}", status.as_u16()));
                }
                response.text().await.map_err(|e| e.to_string())?
            }
        };
        let page = FetchedPage {
            title: document::extract_title(&raw).unwrap_or_else(|| UNTITLED.to_string()),
            body: document::clean(&raw).map_err(|e| e.to_string())?,
            elapsed: started.elapsed(),
        };
        debug!(address = %address, bytes = page.body.len(), "document loaded");
        Ok(page)
    }
}

impl Default for DocumentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for DocumentFetcher {
    fn fetch(&self, address: &str) -> TaskFuture<FetchedPage> {
        info!(address, "fetching");
        Self::load(self.client.clone(), address.to_string()).boxed()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Serves canned documents. Unknown addresses fail like a missing file.
    #[derive(Default, Clone)]
    pub struct StaticFetcher {
        pages: Arc<Mutex<HashMap<String, Result<String, String>>>>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(self, address: &str, html: &str) -> Self {
            self.pages
                .lock()
                .unwrap()
                .insert(address.to_string(), Ok(html.to_string()));
            self
        }

        pub fn with_failure(self, address: &str, cause: &str) -> Self {
            self.pages
                .lock()
                .unwrap()
                .insert(address.to_string(), Err(cause.to_string()));
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl Fetcher for StaticFetcher {
        fn fetch(&self, address: &str) -> TaskFuture<FetchedPage> {
            self.requested.lock().unwrap().push(address.to_string());
            let outcome = self
                .pages
                .lock()
                .unwrap()
                .get(address)
                .cloned()
                .unwrap_or_else(|| Err(format!("no document at {address}")))
                .and_then(|raw| {
                    Ok(FetchedPage {
                        title: document::extract_title(&raw)
                            .unwrap_or_else(|| UNTITLED.to_string()),
                        body: document::clean(&raw).map_err(|e| e.to_string())?,
                        elapsed: Duration::from_millis(10),
                    })
                });
            async move { outcome }.boxed()
        }
    }
}
