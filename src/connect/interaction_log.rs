use std::time::Instant;

use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize)]
struct Request {
    method: String,
    url: String,
    params: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct InteractionLog {
    gateway: String,
    request: Option<Request>,
    status: Option<u16>,
    response: Option<serde_json::Value>,
    kind: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: time::OffsetDateTime,
    duration: f32,
}

impl InteractionLog {
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.request.as_ref().map(|r| r.url.as_str())
    }

    pub fn params(&self) -> Option<&serde_json::Value> {
        self.request.as_ref().map(|r| &r.params)
    }
}

#[derive(Debug)]
struct Exchange {
    created: Instant,
    finished: Option<(Instant, OffsetDateTime)>,
    kind: String,
    request: Option<Request>,
    response: Option<serde_json::Value>,
    response_status: Option<u16>,
}

impl Exchange {
    /// First response data stamps the end of the exchange
    fn finish(&mut self) {
        if self.finished.is_none() {
            self.finished = Some((Instant::now(), OffsetDateTime::now_utc()));
        }
    }
}

/// Records every processor exchange made while serving one call
#[derive(Debug, Default)]
pub struct InteractionSpan {
    exchanges: Vec<Exchange>,
}

impl InteractionSpan {
    pub fn enter() -> Self {
        Self::default()
    }

    /// Start a new exchange, later setters apply to it
    pub fn set_request(
        &mut self,
        kind: &str,
        method: &reqwest::Method,
        url: String,
        params: &impl Serialize,
    ) {
        let params = serde_json::to_value(params).unwrap_or(serde_json::Value::Null);
        self.exchanges.push(Exchange {
            created: Instant::now(),
            finished: None,
            kind: kind.into(),
            request: Some(Request {
                method: method.to_string(),
                url,
                params,
            }),
            response: None,
            response_status: None,
        });
    }

    pub fn set_response(&mut self, res: &impl Serialize) {
        if let Some(exchange) = self.exchanges.last_mut() {
            exchange.response = serde_json::to_value(res).ok();
            exchange.finish();
        }
    }

    pub fn set_response_status(&mut self, status: u16) {
        if let Some(exchange) = self.exchanges.last_mut() {
            exchange.response_status = Some(status);
            exchange.finish();
        }
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn interaction_logs(self) -> Vec<InteractionLog> {
        self.exchanges
            .into_iter()
            .map(|exchange| {
                let (finished, created_at) = exchange
                    .finished
                    .unwrap_or_else(|| (Instant::now(), OffsetDateTime::now_utc()));
                InteractionLog {
                    gateway: "mundipagg".into(),
                    request: exchange.request,
                    status: exchange.response_status,
                    response: exchange.response,
                    kind: exchange.kind,
                    created_at,
                    duration: finished.duration_since(exchange.created).as_secs_f32(),
                }
            })
            .collect()
    }
}
