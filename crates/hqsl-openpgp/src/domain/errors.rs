//! # Error Types
//!
//! Verification outcomes are not errors: they are [`Verdict`] values.
//! The types here cover malformed keys, unusable directories and failed
//! signing.
//!
//! [`Verdict`]: crate::domain::verdict::Verdict

use hqsl_card::CardError;
use thiserror::Error;

/// Errors from the OpenPGP layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OpenPgpError {
    /// The input held no OpenPGP certificates.
    #[error("No OpenPGP keys found")]
    NoKeys,

    /// A private key was required but the certificate has no secret material.
    #[error("Key {0} carries no secret key material")]
    NotPrivate(String),

    /// The OpenPGP library rejected the input.
    #[error("OpenPGP error: {0}")]
    Backend(String),
}

impl From<anyhow::Error> for OpenPgpError {
    fn from(e: anyhow::Error) -> Self {
        OpenPgpError::Backend(e.to_string())
    }
}

/// Key directory errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// Every configured directory was tried and none returned a key.
    #[error("Key not found")]
    NotFound,

    /// A directory URL could not be parsed.
    #[error("Invalid key server URL {url}: {reason}")]
    InvalidUrl {
        /// URL as given
        url: String,
        /// Parser complaint
        reason: String,
    },
}

/// Errors raised before a key publication is dispatched.
///
/// Failures of the publication requests themselves are only logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    /// The target key server URL is unusable.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The key could not be armored.
    #[error(transparent)]
    Key(#[from] OpenPgpError),
}

/// Errors from signing a card.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// The card is not signable.
    #[error(transparent)]
    Card(#[from] CardError),

    /// The key has no usable signing-capable secret key.
    #[error("No usable signing key")]
    NoSigningKey,

    /// The secret key could not be unlocked with the given passphrase.
    #[error("Failed to decrypt private key: {0}")]
    Decrypt(String),

    /// Signature creation or serialization failed.
    #[error("Signing failed: {0}")]
    Crypto(String),
}
