//! # Inbound Ports (Driving Ports / API)
//!
//! The public API of an HQSL verifier and signer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hqsl_card::Card;
use tokio::task::JoinHandle;

use crate::domain::{
    CertificationRange, DirectoryError, PrivateKey, PublicKey, PublishError, SigningError,
    Verification,
};

/// Verify, sign and distribute HQSL cards and keys.
///
/// Implementations must be thread-safe (`Send + Sync`); one instance may
/// serve any number of concurrent verifications.
#[async_trait]
pub trait QslVerificationApi: Send + Sync {
    /// Fetch keys from the configured key servers, first hit wins.
    ///
    /// # Errors
    /// * `DirectoryError::NotFound` - every key server was tried
    async fn lookup(&self, query: &str) -> Result<Vec<PublicKey>, DirectoryError>;

    /// Verify a card. Never fails: every outcome is a verdict.
    async fn verify(&self, card: &Card) -> Verification;

    /// Windows during which trusted roots certify `key` for a callsign.
    ///
    /// Useful on its own to check arbitrary messages signed by a card key.
    fn certification_ranges(&self, key: &PublicKey) -> Vec<CertificationRange>;

    /// Sign a card, replacing any previous signature.
    ///
    /// `at` defaults to now.
    ///
    /// # Errors
    /// * `SigningError::Card` - the card is not signable
    /// * `SigningError::NoSigningKey`, `Decrypt`, `Crypto` - the key could not sign
    fn sign(
        &self,
        card: Card,
        key: &PrivateKey,
        passphrase: Option<&str>,
        at: Option<DateTime<Utc>>,
    ) -> Result<Card, SigningError>;

    /// Upload a key to `target`, or to every configured key server.
    ///
    /// Uploads run as detached tasks whose failures are only logged; the
    /// handles may be awaited to wait for them.
    ///
    /// # Errors
    /// * `PublishError` - the target URL or the key itself is unusable
    fn publish(
        &self,
        key: &PublicKey,
        target: Option<&str>,
    ) -> Result<Vec<JoinHandle<()>>, PublishError>;
}
