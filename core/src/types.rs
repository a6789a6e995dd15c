//! OAuth2 DTOs for the token endpoint.
//!
//! # Design
//! These types mirror the JSON and form payloads exchanged with
//! `/oauth2/token`. Only `access_token` is required in the response; the
//! other fields are kept for callers but never acted upon (no refresh).

use serde::{Deserialize, Serialize};

/// The two supported OAuth2 grant flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    Password,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::Password => "password",
        }
    }
}

/// Body of a successful token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_type_wire_names() {
        assert_eq!(GrantType::AuthorizationCode.as_str(), "authorization_code");
        assert_eq!(
            serde_json::to_value(GrantType::Password).unwrap(),
            serde_json::json!("password")
        );
    }

    #[test]
    fn token_response_only_requires_access_token() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token":"tok123"}"#).unwrap();
        assert_eq!(token.access_token, "tok123");
        assert!(token.scope.is_none());
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn token_response_rejects_missing_access_token() {
        let result: Result<TokenResponse, _> = serde_json::from_str(r#"{"scope":"*"}"#);
        assert!(result.is_err());
    }
}
