use std::fmt::Display;

use reqwest::Method;

use crate::gateway::{Result, error::GatewayError};

const CHARGES: &str = "charges";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Sale,
    AuthOnly,
    Capture,
    Refund,
    Void,
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sale => f.write_str("sale"),
            Self::AuthOnly => f.write_str("authonly"),
            Self::Capture => f.write_str("capture"),
            Self::Refund => f.write_str("refund"),
            Self::Void => f.write_str("void"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: String,
}

impl Route {
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.path)
    }
}

/// Charge ids are spliced into the path as is
fn is_path_segment(id: &str) -> bool {
    !matches!(id, "." | "..")
        && !id
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '\\' | '?' | '#' | '%'))
}

/// Resolve HTTP method and path of an operation relative to the API base url
pub fn route(operation: Operation, authorization: Option<&str>) -> Result<Route> {
    let charge = |authorization: Option<&str>| match authorization {
        Some(id) if id.trim().is_empty() => Err(GatewayError::MissingAuthorization { operation }),
        Some(id) if !is_path_segment(id) => Err(GatewayError::InvalidAuthorization { operation }),
        Some(id) => Ok(id.to_owned()),
        None => Err(GatewayError::MissingAuthorization { operation }),
    };
    let route = match operation {
        Operation::Sale | Operation::AuthOnly => Route {
            method: Method::POST,
            path: format!("{CHARGES}/"),
        },
        Operation::Capture => Route {
            method: Method::POST,
            path: format!("{CHARGES}/{}/capture/", charge(authorization)?),
        },
        Operation::Refund => Route {
            method: Method::POST,
            path: format!("{CHARGES}/{}/", charge(authorization)?),
        },
        Operation::Void => Route {
            method: Method::DELETE,
            path: format!("{CHARGES}/{}/", charge(authorization)?),
        },
    };
    Ok(route)
}
