//! HTTP wire transport for the XNAT protocol
//!
//! Every data request is a clone of the base authenticated POST form with
//! extra parameters appended. The transport adds what the legacy protocol
//! never had: a configurable timeout and a bounded retry with exponential
//! backoff. Client errors (4xx) are never retried; server errors (5xx)
//! and transport failures are retried up to the configured limit.

use std::thread::sleep;
use std::time::Duration;

use tracing::warn;

use crate::error::{DconnError, ProtocolError, Result};

/// Basic-authentication credentials for the XNAT service.
#[derive(Debug, Clone)]
pub struct RemoteAuth {
    pub username: String,
    pub password: String,
}

/// Timeout and retry policy for remote requests.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

enum Attempt {
    Fatal(DconnError),
    Retryable(DconnError),
}

/// Authenticated POST endpoint with a fixed base parameter set.
#[derive(Debug)]
pub struct XnatTransport {
    client: reqwest::blocking::Client,
    url: String,
    base_params: Vec<(String, String)>,
    auth: Option<RemoteAuth>,
    config: TransportConfig,
}

impl XnatTransport {
    pub fn new(
        url: String,
        base_params: Vec<(String, String)>,
        auth: Option<RemoteAuth>,
        config: TransportConfig,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| DconnError::Open(format!("cannot build HTTP client: {err}")))?;
        Ok(Self {
            client,
            url,
            base_params,
            auth,
            config,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send the base form plus `extra` parameters, returning the response
    /// body. Blocks for the full round trip.
    pub fn post_form(&self, extra: &[(&str, String)]) -> Result<Vec<u8>> {
        let mut form = self.base_params.clone();
        form.extend(extra.iter().map(|(key, value)| (key.to_string(), value.clone())));

        let mut attempt = 0u32;
        loop {
            match self.send_once(&form) {
                Ok(body) => return Ok(body),
                Err(Attempt::Fatal(err)) => return Err(err),
                Err(Attempt::Retryable(err)) => {
                    if attempt >= self.config.max_retries {
                        return Err(err);
                    }
                    let backoff = self.config.retry_backoff * 2u32.pow(attempt);
                    warn!(
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "retrying XNAT request after transient failure"
                    );
                    sleep(backoff);
                    attempt += 1;
                }
            }
        }
    }

    fn send_once(&self, form: &[(String, String)]) -> std::result::Result<Vec<u8>, Attempt> {
        let mut request = self.client.post(&self.url).form(form);
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }
        let response = request
            .send()
            .map_err(|err| Attempt::Retryable(err.into()))?;
        let status = response.status();
        if status.is_success() {
            let body = response
                .bytes()
                .map_err(|err| Attempt::Retryable(err.into()))?;
            return Ok(body.to_vec());
        }
        let err = DconnError::Protocol(ProtocolError::HttpStatus {
            status: status.as_u16(),
        });
        if status.is_server_error() {
            Err(Attempt::Retryable(err))
        } else {
            Err(Attempt::Fatal(err))
        }
    }
}
