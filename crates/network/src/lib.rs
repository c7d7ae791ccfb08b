use derive_more::{Display, Error};
use miette::Diagnostic;
use pipe_trait::Pipe;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Value of the `user-agent` header sent with every request.
pub const USER_AGENT: &str = concat!("tapster/", env!("CARGO_PKG_VERSION"));

/// Error when fetching a JSON document.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum FetchError {
    #[display("Failed to fetch {url}: {error}")]
    #[diagnostic(code(tapster_network::network_error))]
    Network {
        url: String,
        #[error(source)]
        error: reqwest::Error,
    },

    #[display("Request to {url} timed out")]
    #[diagnostic(code(tapster_network::timeout))]
    Timeout { url: String },

    #[display("{url} responded with status {status}")]
    #[diagnostic(code(tapster_network::status))]
    Status { url: String, status: StatusCode },

    #[display("Failed to decode the response of {url}: {error}")]
    #[diagnostic(code(tapster_network::decode))]
    Decode {
        url: String,
        #[error(source)]
        error: serde_json::Error,
    },
}

impl FetchError {
    /// URL of the request that failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Network { url, .. }
            | FetchError::Timeout { url }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }

    /// Whether the server answered `404 Not Found`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: StatusCode::NOT_FOUND, .. })
    }

    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout { url: url.to_string() }
        } else {
            FetchError::Network { url: url.to_string(), error }
        }
    }
}

/// Wrapper around [`Client`] that only speaks JSON over `GET`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Construct a client whose every request gives up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?
            .pipe(|client| HttpClient { client })
            .pipe(Ok)
    }

    /// Download `url` and decode its body as `Value`.
    ///
    /// Any status outside of `2xx` is an error.
    pub async fn get_json<Value>(&self, url: &str) -> Result<Value, FetchError>
    where
        Value: DeserializeOwned,
    {
        tracing::debug!(target: "tapster::network", ?url, "GET");

        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|error| FetchError::from_reqwest(url, error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status });
        }

        let body = response.bytes().await.map_err(|error| FetchError::from_reqwest(url, error))?;

        serde_json::from_slice(&body)
            .map_err(|error| FetchError::Decode { url: url.to_string(), error })
    }
}

/// This is only necessary for tests.
impl Default for HttpClient {
    fn default() -> Self {
        HttpClient { client: Client::new() }
    }
}
