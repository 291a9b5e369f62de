//! # Key Directory Client
//!
//! Looks keys up on HKP key servers and publishes keys to them.
//!
//! Lookup tries each configured server in order and stops at the first one
//! that answers `200` with something that looks like an armored public key
//! and parses. Every other outcome (timeout, error status, HTML page,
//! unparsable key) is logged and the next server is tried.
//!
//! Publication is fire-and-forget: one detached task per server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::url::normalize_url;
use crate::domain::{parse_keys, DirectoryError, PublicKey};
use crate::ports::outbound::{HkpTransport, KeyLookup, TransportError};

/// Trailer every armored public key block ends with.
pub const PUBLIC_KEY_BLOCK_END: &str = "-----END PGP PUBLIC KEY BLOCK-----";

/// HKP client over an ordered list of key servers.
pub struct KeyDirectoryClient<T: HkpTransport + 'static> {
    transport: Arc<T>,
    servers: Vec<String>,
    timeout: Duration,
}

impl<T: HkpTransport + 'static> KeyDirectoryClient<T> {
    /// Create a client. Server URLs are normalized here, once.
    ///
    /// # Errors
    /// * `DirectoryError::InvalidUrl` - a server URL is unusable
    pub fn new<S: AsRef<str>>(
        transport: Arc<T>,
        servers: &[S],
        timeout: Duration,
    ) -> Result<Self, DirectoryError> {
        let servers = servers
            .iter()
            .map(|s| normalize_url(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            transport,
            servers,
            timeout,
        })
    }

    /// Normalized base URLs, in lookup order.
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Machine-readable HKP lookup URL for `query` on `base`.
    pub fn lookup_url(base: &str, query: &str) -> String {
        format!("{base}pks/lookup?op=get&options=mr&search={query}")
    }

    /// HKP submission URL on `base`.
    pub fn publish_url(base: &str) -> String {
        format!("{base}pks/add")
    }

    async fn fetch(&self, base: &str, query: &str) -> Option<Vec<PublicKey>> {
        let url = Self::lookup_url(base, query);
        let response = tokio::time::timeout(self.timeout, self.transport.get(&url, self.timeout))
            .await
            .unwrap_or(Err(TransportError::Timeout));

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!(server = %base, error = %e, "[hqsl] key server unavailable");
                return None;
            }
        };

        if response.status != 200 {
            debug!(server = %base, status = response.status, query = %query, "[hqsl] key server has no key");
            return None;
        }

        if !response
            .body
            .find(PUBLIC_KEY_BLOCK_END)
            .is_some_and(|index| index > 0)
        {
            warn!(server = %base, "[hqsl] key server returned something other than a public key");
            return None;
        }

        match parse_keys(response.body.as_bytes()) {
            Ok(keys) => Some(keys),
            Err(e) => {
                warn!(server = %base, error = %e, "[hqsl] key server returned an unparsable key");
                None
            }
        }
    }

    /// Upload an armored key to `target`, or to every configured server.
    ///
    /// Returns the handles of the detached upload tasks. Upload failures are
    /// logged, never returned.
    ///
    /// # Errors
    /// * `DirectoryError::InvalidUrl` - `target` is unusable
    pub fn publish(
        &self,
        armored: String,
        target: Option<&str>,
    ) -> Result<Vec<JoinHandle<()>>, DirectoryError> {
        let targets = match target {
            Some(target) => vec![normalize_url(target)?],
            None => self.servers.clone(),
        };

        let armored: Arc<str> = Arc::from(armored);
        let handles = targets
            .into_iter()
            .map(|base| {
                let transport = Arc::clone(&self.transport);
                let armored = Arc::clone(&armored);
                let timeout = self.timeout;
                tokio::spawn(async move {
                    let url = Self::publish_url(&base);
                    let form = [("keytext", &*armored)];
                    match transport.post_form(&url, &form, timeout).await {
                        Ok(response) if (200..300).contains(&response.status) => {
                            info!(server = %base, "[hqsl] key published");
                        }
                        Ok(response) => {
                            warn!(server = %base, status = response.status, "[hqsl] key server refused key");
                        }
                        Err(e) => {
                            warn!(server = %base, error = %e, "[hqsl] key publication failed");
                        }
                    }
                })
            })
            .collect();
        Ok(handles)
    }
}

#[async_trait]
impl<T: HkpTransport + 'static> KeyLookup for KeyDirectoryClient<T> {
    async fn lookup(&self, query: &str) -> Result<Vec<PublicKey>, DirectoryError> {
        for base in &self.servers {
            if let Some(keys) = self.fetch(base, query).await {
                debug!(server = %base, query = %query, count = keys.len(), "[hqsl] key found");
                return Ok(keys);
            }
        }
        Err(DirectoryError::NotFound)
    }
}
