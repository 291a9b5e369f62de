//! # Outbound Ports (Driven Ports / SPI)
//!
//! Dependencies this crate needs from the outside world: an HTTP transport
//! for HKP key servers, and a key lookup for the verification engine.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::{DirectoryError, PublicKey};

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

/// Transport-level failure talking to one key server.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not finish within its timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection, TLS or protocol failure.
    #[error("Request failed: {0}")]
    Request(String),
}

/// HTTP client used to talk to HKP key servers.
#[async_trait]
pub trait HkpTransport: Send + Sync {
    /// `GET url`, aborted after `timeout`.
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError>;

    /// `POST url` with an `application/x-www-form-urlencoded` body.
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

/// Source of public keys by query (`0x` + key ID, fingerprint, or e-mail).
#[async_trait]
pub trait KeyLookup: Send + Sync {
    /// Every key matching `query`.
    ///
    /// # Errors
    /// * `DirectoryError::NotFound` - no key could be obtained
    async fn lookup(&self, query: &str) -> Result<Vec<PublicKey>, DirectoryError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// `GET` or `POST`
    pub method: &'static str,
    /// Full request URL
    pub url: String,
    /// Form fields of a `POST`
    pub form: Vec<(String, String)>,
}

/// Scripted transport: answers by URL prefix and records every request.
///
/// URLs with no scripted answer fail with a connection error.
#[derive(Debug, Default)]
pub struct MockTransport {
    answers: Vec<(String, Result<HttpResponse, TransportError>)>,
    requests: Mutex<Vec<MockRequest>>,
}

impl MockTransport {
    /// A transport with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose URL starts with `prefix`.
    pub fn with_response(mut self, prefix: &str, status: u16, body: impl Into<String>) -> Self {
        self.answers.push((
            prefix.to_string(),
            Ok(HttpResponse {
                status,
                body: body.into(),
            }),
        ));
        self
    }

    /// Fail requests whose URL starts with `prefix`.
    pub fn with_failure(mut self, prefix: &str, error: TransportError) -> Self {
        self.answers.push((prefix.to_string(), Err(error)));
        self
    }

    /// Requests seen so far, in order.
    pub async fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().await.clone()
    }

    async fn answer(&self, request: MockRequest) -> Result<HttpResponse, TransportError> {
        let answer = self
            .answers
            .iter()
            .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_else(|| Err(TransportError::Request("connection refused".into())));
        self.requests.lock().await.push(request);
        answer
    }
}

#[async_trait]
impl HkpTransport for MockTransport {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, TransportError> {
        self.answer(MockRequest {
            method: "GET",
            url: url.to_string(),
            form: Vec::new(),
        })
        .await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        _timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.answer(MockRequest {
            method: "POST",
            url: url.to_string(),
            form: form
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
        .await
    }
}

/// In-memory key lookup that serves a fixed set of keys.
///
/// Each key answers `0x`-prefixed queries for the key ID of its primary key
/// and of every subkey, ignoring case.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyLookup {
    entries: Vec<(String, PublicKey)>,
}

impl StaticKeyLookup {
    /// A lookup that knows the given keys.
    pub fn serving(keys: impl IntoIterator<Item = PublicKey>) -> Self {
        let mut entries = Vec::new();
        for key in keys {
            for ka in key.cert().keys() {
                entries.push((format!("0x{}", ka.key().keyid().to_hex()), key.clone()));
            }
        }
        Self { entries }
    }
}

#[async_trait]
impl KeyLookup for StaticKeyLookup {
    async fn lookup(&self, query: &str) -> Result<Vec<PublicKey>, DirectoryError> {
        let found: Vec<PublicKey> = self
            .entries
            .iter()
            .filter(|(q, _)| q.eq_ignore_ascii_case(query))
            .map(|(_, key)| key.clone())
            .collect();
        if found.is_empty() {
            Err(DirectoryError::NotFound)
        } else {
            Ok(found)
        }
    }
}
