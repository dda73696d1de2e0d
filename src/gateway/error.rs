use reqwest::StatusCode;
use serde::de::Error;

use crate::gateway::route::Operation;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),
    #[error("{operation} requires an authorization id")]
    MissingAuthorization { operation: Operation },
    #[error("{operation} authorization id is not a single path segment")]
    InvalidAuthorization { operation: Operation },
    #[error("gateway responded with unhandled status {status}: {body}")]
    UnmappedStatus { status: StatusCode, body: String },
    #[error("gateway response has neither message nor acquirer message")]
    MalformedResponse,
    #[error("http request error: {0}")]
    RequestError(reqwest::Error),
    #[error("gateway response deserialization: {0}")]
    GatewayDeserialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            return Self::GatewayDeserialization(serde_json::Error::custom(
                "failed to decode response body",
            ));
        }
        Self::RequestError(value)
    }
}
