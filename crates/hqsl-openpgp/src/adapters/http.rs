//! reqwest-backed HKP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::ports::outbound::{HkpTransport, HttpResponse, TransportError};

/// [`HkpTransport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport over an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn transport_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.to_string())
    }
}

async fn into_response(response: reqwest::Response) -> Result<HttpResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(transport_error)?;
    Ok(HttpResponse { status, body })
}

#[async_trait]
impl HkpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport_error)?;
        into_response(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport_error)?;
        into_response(response).await
    }
}
