use axum::http::{HeaderMap, HeaderValue, header};
use axum_extra::headers::{self, HeaderMapExt};
use base64::{Engine, prelude::BASE64_STANDARD};

/// Basic auth with the api key as user and an empty password
pub fn authenticated_headers(api_key: &str) -> HeaderMap {
    let auth = BASE64_STANDARD.encode(format!("{api_key}:"));
    let mut value =
        HeaderValue::from_str(&format!("Basic {auth}")).expect("header value is ascii");
    value.set_sensitive(true);
    let mut map = HeaderMap::new();
    map.insert(header::AUTHORIZATION, value);
    map.typed_insert(headers::ContentType::json());
    map.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    map
}
