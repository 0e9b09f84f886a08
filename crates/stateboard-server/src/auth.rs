//! Identity forwarded by an authenticating reverse proxy.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

pub const USER_HEADER: &str = "X-Forwarded-User";
pub const EMAIL_HEADER: &str = "X-Forwarded-Email";

/// The user a request was made on behalf of.
///
/// Stateboard does no authentication of its own; it trusts whatever the proxy
/// in front of it forwards. Missing headers yield empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub logout_url: String,
}

impl UserInfo {
    pub fn from_headers(headers: &HeaderMap, logout_url: Option<&str>) -> Self {
        Self {
            name: header_value(headers, USER_HEADER),
            email: header_value(headers, EMAIL_HEADER),
            logout_url: logout_url.unwrap_or_default().to_string(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
