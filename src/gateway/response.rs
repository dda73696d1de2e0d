use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gateway::{Result, error::GatewayError, transport::TransportOutcome};

#[derive(Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Pending,
    Paid,
    Processing,
    Voided,
    Canceled,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ChargeStatus {
    /// Statuses the processor reports for an accepted charge
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Paid | Self::Processing | Self::Voided
        )
    }
}

impl From<&Value> for ChargeStatus {
    /// Anything that is not a known status string is `Unknown`
    fn from(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }
}

fn charge_id(body: &Value) -> Option<String> {
    match body.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn charge_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| {
            body.get("last_transaction")
                .and_then(|t| t.get("acquirer_message"))
                .and_then(Value::as_str)
        })
        .map(ToOwned::to_owned)
}

/// Processor error codes are not catalogued, every failure carries `Unmapped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unmapped,
}

/// Uniform result of a gateway operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayResponse {
    pub success: bool,
    pub message: String,
    pub raw_body: serde_json::Value,
    pub authorization: Option<String>,
    pub avs_code: Option<String>,
    pub cvv_code: Option<String>,
    pub test: bool,
    pub error_code: Option<ErrorCode>,
}

impl GatewayResponse {
    fn failure(message: &str, test: bool) -> Self {
        Self {
            success: false,
            message: message.to_owned(),
            raw_body: serde_json::Value::Object(Default::default()),
            authorization: None,
            avs_code: None,
            cvv_code: None,
            test,
            error_code: Some(ErrorCode::Unmapped),
        }
    }
}

fn failure_message(status: StatusCode) -> Option<&'static str> {
    let message = match status.as_u16() {
        400 => "Invalid request",
        401 => "Invalid API key",
        404 => "The requested resource does not exist",
        412 => "Valid parameters but request failed",
        422 => "Invalid parameters",
        500 => "An internal error occurred",
        _ => return None,
    };
    Some(message)
}

pub fn classify(outcome: TransportOutcome, test: bool) -> Result<GatewayResponse> {
    let raw_body = match outcome {
        TransportOutcome::Body { body, .. } => body,
        TransportOutcome::Failure { status, body } => {
            return match failure_message(status) {
                Some(message) => Ok(GatewayResponse::failure(message, test)),
                None => Err(GatewayError::UnmappedStatus { status, body }),
            };
        }
    };

    let status = raw_body
        .get("status")
        .map(ChargeStatus::from)
        .unwrap_or_default();
    let success = status.is_success();
    let message = charge_message(&raw_body).ok_or(GatewayError::MalformedResponse)?;

    Ok(GatewayResponse {
        success,
        message,
        authorization: charge_id(&raw_body),
        avs_code: None,
        cvv_code: None,
        test,
        error_code: (!success).then_some(ErrorCode::Unmapped),
        raw_body,
    })
}
