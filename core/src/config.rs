//! Client configuration.
//!
//! # Design
//! Everything a `Session` needs before its first call: the application's
//! credentials and the three hosts it talks to. The API, oEmbed and authorize
//! endpoints live on different hosts, so each base is configured separately;
//! tests point them at a local mock server.

use std::time::Duration;

use serde::Deserialize;

pub const API_BASE: &str = "https://api.soundcloud.com";
pub const OEMBED_BASE: &str = "https://soundcloud.com/oembed";
pub const AUTHORIZE_BASE: &str = "https://soundcloud.com/connect";
pub const MAX_RESPONSE_BYTES: u64 = 10 * 1024 * 1024;

/// Credentials and endpoints for a `Session`.
#[derive(Clone, Deserialize, derive_more::Debug)]
#[serde(default)]
pub struct ClientConfig {
    pub client_id: String,
    #[debug(ignore)]
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub api_base: String,
    pub oembed_base: String,
    pub authorize_base: String,
    pub user_agent: String,
    /// Global timeout handed to the default transport.
    #[serde(with = "timeout_secs")]
    pub timeout: Option<Duration>,
    /// Largest response body the default transport reads.
    pub max_response_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            redirect_uri: None,
            api_base: API_BASE.to_string(),
            oembed_base: OEMBED_BASE.to_string(),
            authorize_base: AUTHORIZE_BASE.to_string(),
            user_agent: concat!("soundcloud-core/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Some(Duration::from_secs(30)),
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Points the API at another host; a trailing `/` is stripped.
    #[must_use]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_oembed_base(mut self, oembed_base: impl Into<String>) -> Self {
        self.oembed_base = oembed_base.into();
        self
    }

    #[must_use]
    pub fn with_authorize_base(mut self, authorize_base: impl Into<String>) -> Self {
        self.authorize_base = authorize_base.into();
        self
    }

    /// Reads `SOUNDCLOUD_CLIENT_ID` (required), `SOUNDCLOUD_CLIENT_SECRET`,
    /// `SOUNDCLOUD_REDIRECT_URI` and `SOUNDCLOUD_API_BASE`.
    ///
    /// Returns `None` when no client id is set.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let client_id = lookup("SOUNDCLOUD_CLIENT_ID").filter(|id| !id.is_empty())?;
        let mut config = Self::new(client_id);
        config.client_secret = lookup("SOUNDCLOUD_CLIENT_SECRET");
        config.redirect_uri = lookup("SOUNDCLOUD_REDIRECT_URI");
        if let Some(api_base) = lookup("SOUNDCLOUD_API_BASE") {
            config = config.with_api_base(&api_base);
        }
        Some(config)
    }
}

mod timeout_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}
