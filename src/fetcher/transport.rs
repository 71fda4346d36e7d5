//! HTTP seam for the fetcher.

use std::time::Duration;

use log::trace;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use super::{FetchError, Network};
use crate::config::types::FetchConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP 429 Too Many Requests")]
    TooManyRequests,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("{0}")]
    Failed(String),
}

impl TransportError {
    pub fn into_fetch_error(self, network: Network) -> FetchError {
        match self {
            TransportError::TooManyRequests => FetchError::RateLimited { network },
            other => FetchError::NetworkError {
                message: other.to_string(),
            },
        }
    }
}

/// Minimal blocking HTTP surface used by the fetcher. Implementations return the
/// response body for 2xx replies.
pub trait Transport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, TransportError>;

    fn post_json(&self, url: &str, body: &Value) -> Result<String, TransportError>;
}

/// `reqwest` blocking client with a fixed timeout and user agent.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &FetchConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(failed)?;
        Ok(Self { client })
    }

    fn read(response: Response) -> Result<String, TransportError> {
        let status = response.status();
        trace!("HTTP {} from {}", status, response.url());

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TransportError::TooManyRequests);
        }
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        response.text().map_err(failed)
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, TransportError> {
        let response = self.client.get(url).query(query).send().map_err(failed)?;
        Self::read(response)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<String, TransportError> {
        let response = self.client.post(url).json(body).send().map_err(failed)?;
        Self::read(response)
    }
}

fn failed(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Failed(format!("request timed out: {err}"))
    } else {
        TransportError::Failed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_requests_maps_to_rate_limit() {
        let err = TransportError::TooManyRequests.into_fetch_error(Network::Bsc);
        assert_eq!(err, FetchError::RateLimited { network: Network::Bsc });
    }

    #[test]
    fn test_other_failures_map_to_network_error() {
        let err = TransportError::Status(502).into_fetch_error(Network::Ethereum);
        assert_eq!(
            err,
            FetchError::NetworkError {
                message: "HTTP 502".to_string()
            }
        );
    }

    #[test]
    fn test_client_builds_from_defaults() {
        assert!(HttpTransport::new(&FetchConfig::default()).is_ok());
    }
}
