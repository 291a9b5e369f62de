//! # HQSL Service
//!
//! Wires the trusted root keys and the key directory client into the
//! [`QslVerificationApi`].
//!
//! The trusted key set and directory list are fixed at construction and
//! shared read-only by every verification, so one instance may serve
//! concurrent callers.

pub mod directory;
pub mod engine;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hqsl_card::Card;
use tokio::task::JoinHandle;
use tracing::info;

pub use directory::{KeyDirectoryClient, PUBLIC_KEY_BLOCK_END};

use crate::adapters::ReqwestTransport;
use crate::config::{ConfigError, HqslConfig, DEFAULT_KEY_SERVER, DEFAULT_TIMEOUT_MS};
use crate::domain::{
    certification_ranges, CertificationRange, DirectoryError, KeySource, PrivateKey, PublicKey,
    PublishError, SigningError, VerifiedCard, Verification,
};
use crate::ports::inbound::QslVerificationApi;
use crate::ports::outbound::{HkpTransport, KeyLookup};

/// HQSL verifier and signer.
pub struct HqslOpenPgp<T: HkpTransport + 'static = ReqwestTransport> {
    trusted_keys: Vec<PublicKey>,
    directory: KeyDirectoryClient<T>,
}

impl HqslOpenPgp<ReqwestTransport> {
    /// Create a verifier over HTTP(S).
    ///
    /// Trusted roots may be armored text, binary keyrings or parsed keys.
    /// An empty `key_servers` means [`DEFAULT_KEY_SERVER`]; `timeout`
    /// defaults to one second.
    ///
    /// # Errors
    /// * `ConfigError::Key` - a trusted key does not parse
    /// * `ConfigError::KeyServer` - a key server URL is unusable
    pub fn setup<I, K, S>(
        trusted_keys: I,
        key_servers: &[S],
        timeout: Option<Duration>,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = K>,
        K: Into<KeySource>,
        S: AsRef<str>,
    {
        let mut keys = Vec::new();
        for source in trusted_keys {
            let source: KeySource = source.into();
            keys.extend(source.into_keys()?);
        }
        let servers: Vec<String> = if key_servers.is_empty() {
            vec![DEFAULT_KEY_SERVER.to_string()]
        } else {
            key_servers.iter().map(|s| s.as_ref().to_string()).collect()
        };
        let timeout = timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS));
        Self::with_transport(Arc::new(ReqwestTransport::new()), keys, &servers, timeout)
    }

    /// Create a verifier from configuration, reading trusted key files.
    ///
    /// # Errors
    /// * anything [`HqslConfig::validate`] or [`HqslConfig::load_trusted_keys`] rejects
    pub fn from_config(config: &HqslConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let keys = config.load_trusted_keys()?;
        Self::with_transport(
            Arc::new(ReqwestTransport::new()),
            keys,
            &config.effective_key_servers(),
            config.timeout(),
        )
    }
}

impl<T: HkpTransport + 'static> HqslOpenPgp<T> {
    /// Create a verifier over any transport.
    ///
    /// # Errors
    /// * `ConfigError::KeyServer` - a key server URL is unusable
    pub fn with_transport<S: AsRef<str>>(
        transport: Arc<T>,
        trusted_keys: Vec<PublicKey>,
        key_servers: &[S],
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let directory = KeyDirectoryClient::new(transport, key_servers, timeout)?;
        info!(
            trusted = trusted_keys.len(),
            key_servers = directory.servers().len(),
            timeout_ms = timeout.as_millis() as u64,
            "[hqsl] verifier ready"
        );
        Ok(Self {
            trusted_keys,
            directory,
        })
    }

    /// Trusted root keys.
    pub fn trusted_keys(&self) -> &[PublicKey] {
        &self.trusted_keys
    }

    /// The key directory client.
    pub fn directory(&self) -> &KeyDirectoryClient<T> {
        &self.directory
    }

    /// Verify a card and keep the result next to it.
    pub async fn verify_card(&self, card: Card) -> VerifiedCard {
        let verification = self.verify(&card).await;
        VerifiedCard { card, verification }
    }
}

#[async_trait]
impl<T: HkpTransport + 'static> QslVerificationApi for HqslOpenPgp<T> {
    async fn lookup(&self, query: &str) -> Result<Vec<PublicKey>, DirectoryError> {
        self.directory.lookup(query).await
    }

    async fn verify(&self, card: &Card) -> Verification {
        engine::verify(card, &self.directory, &self.trusted_keys).await
    }

    fn certification_ranges(&self, key: &PublicKey) -> Vec<CertificationRange> {
        certification_ranges(key, &self.trusted_keys)
    }

    fn sign(
        &self,
        card: Card,
        key: &PrivateKey,
        passphrase: Option<&str>,
        at: Option<DateTime<Utc>>,
    ) -> Result<Card, SigningError> {
        engine::sign(card, key, passphrase, at)
    }

    fn publish(
        &self,
        key: &PublicKey,
        target: Option<&str>,
    ) -> Result<Vec<JoinHandle<()>>, PublishError> {
        let armored = key.armored()?;
        Ok(self.directory.publish(armored, target)?)
    }
}
