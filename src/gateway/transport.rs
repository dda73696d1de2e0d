use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, header::HeaderMap};

use crate::gateway::Result;

/// Single HTTP exchange with the processor
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome {
    /// 2xx exchange with decoded JSON body
    Body {
        status: StatusCode,
        body: serde_json::Value,
    },
    /// Non 2xx status with the raw body text
    Failure { status: StatusCode, body: String },
}

impl TransportOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Body { status, .. } | Self::Failure { status, .. } => *status,
        }
    }
}

#[async_trait]
pub trait Transport: std::fmt::Debug + Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportOutcome>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportOutcome> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let res = builder.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await?;
            return Ok(TransportOutcome::Failure { status, body });
        }
        let body = res.json::<serde_json::Value>().await?;
        Ok(TransportOutcome::Body { status, body })
    }
}
