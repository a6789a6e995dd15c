//! OAuth2 session and request orchestration for the SoundCloud API.
//!
//! # Design
//! `Session` owns the application credentials, the transport and the current
//! access token. Every call goes through the same three steps:
//! `build_request` (URL with `client_id`, `redirect_uri`, `oauth_token`, plus
//! the standard headers), `send` (execute + `validate`), then body decoding.
//! `build_request` and `send` are public so callers can add headers or
//! inspect a request before it leaves.
//!
//! Grant exchanges take `&mut self`: the token is replaced only after a
//! successful exchange, and the borrow checker keeps other callers out while
//! it happens. A 401 does not clear the stored token.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::body::Body;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use crate::http::{HttpMethod, Transport};
use crate::request::Request;
use crate::response::Response;
use crate::transport::UreqTransport;
use crate::types::{GrantType, TokenResponse};
use crate::url::Url;

const TOKEN_PATH: &str = "/oauth2/token";
const RESOLVE_PATH: &str = "/resolve";

#[derive(derive_more::Debug)]
pub struct Session<T = UreqTransport> {
    config: ClientConfig,
    #[debug(ignore)]
    transport: T,
    #[debug(ignore)]
    access_token: Option<String>,
}

impl Session<UreqTransport> {
    /// A session using the blocking `ureq` transport with the configured
    /// timeout.
    pub fn with_default_transport(config: ClientConfig) -> Self {
        let transport =
            UreqTransport::new(config.timeout).with_body_limit(config.max_response_bytes);
        Self::new(config, transport)
    }
}

impl<T: Transport> Session<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            access_token: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.config.client_secret.as_deref()
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.config.redirect_uri.as_deref()
    }

    pub fn set_client_id(&mut self, client_id: impl Into<String>) {
        self.config.client_id = client_id.into();
    }

    pub fn set_client_secret(&mut self, client_secret: impl Into<String>) {
        self.config.client_secret = Some(client_secret.into());
    }

    pub fn set_redirect_uri(&mut self, redirect_uri: impl Into<String>) {
        self.config.redirect_uri = Some(redirect_uri.into());
    }

    /// The current access token; an empty token counts as none.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|token| !token.is_empty())
    }

    /// The consent page a user-agent must visit to obtain an authorization
    /// code. No network call is made.
    pub fn authorize_url(&self) -> Result<String, ApiError> {
        let redirect_uri = self
            .redirect_uri()
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| ApiError::configuration("no redirect_uri was set"))?;

        let url = Url::new(self.config.authorize_base.as_str())
            .with_param("client_id", self.client_id())
            .with_param("redirect_uri", redirect_uri)
            .with_param("response_type", "code")
            .with_param("scope", "non-expiring")
            .with_param("display", "popup");
        Ok(url.build())
    }

    /// Exchanges an authorization code for an access token.
    pub fn authorize_with_code(&mut self, code: &str) -> Result<&mut Self, ApiError> {
        self.exchange_token(GrantType::AuthorizationCode, &[("code", code)])
    }

    /// Exchanges the user's credentials for an access token.
    pub fn authorize_with_credentials(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<&mut Self, ApiError> {
        self.exchange_token(
            GrantType::Password,
            &[("username", username), ("password", password)],
        )
    }

    fn exchange_token(
        &mut self,
        grant: GrantType,
        grant_params: &[(&str, &str)],
    ) -> Result<&mut Self, ApiError> {
        let client_secret = self
            .client_secret()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| ApiError::configuration("no client_secret was set"))?;
        let redirect_uri = self
            .redirect_uri()
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| ApiError::configuration("no redirect_uri was set"))?;

        let request = self
            .build_request(HttpMethod::Post, TOKEN_PATH, &[])
            .with_header(CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
            .with_body_params([
                ("client_id", self.client_id()),
                ("client_secret", client_secret),
                ("redirect_uri", redirect_uri),
                ("grant_type", grant.as_str()),
            ])
            .with_body_params(grant_params.iter().copied());

        let token: TokenResponse = self.send(request)?.json()?;
        if token.access_token.is_empty() {
            return Err(ApiError::decode("token response has an empty access_token"));
        }
        self.access_token = Some(token.access_token);
        debug!(grant = grant.as_str(), "access token acquired");
        Ok(self)
    }

    /// Builds an API request without sending it.
    ///
    /// `path` is appended to the API base unless it is an absolute URL.
    /// `client_id`, `redirect_uri` (when set) and `oauth_token` (when
    /// authenticated) come first in the query; `params` cannot override them.
    pub fn build_request(&self, method: HttpMethod, path: &str, params: &[(&str, &str)]) -> Request {
        let mut url = Url::new(self.endpoint(path)).with_param("client_id", self.client_id());
        if let Some(redirect_uri) = self.redirect_uri() {
            url = url.with_param("redirect_uri", redirect_uri);
        }
        if let Some(token) = self.access_token() {
            url = url.with_param("oauth_token", token);
        }

        let reserved: Vec<String> = url.params().keys().cloned().collect();
        let url = url.with_params(
            params
                .iter()
                .filter(|(name, _)| !reserved.iter().any(|key| key == name))
                .copied(),
        );

        let mut request = Request::new(method, url)
            .with_header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .with_header(USER_AGENT, self.config.user_agent.as_str());
        if let Some(token) = self.access_token() {
            request = request.with_header(AUTHORIZATION, format!("OAuth {token}"));
        }
        request
    }

    /// Executes `request`, following redirects, and validates the status.
    pub fn send(&self, request: Request) -> Result<Response, ApiError> {
        let response = request.execute(&self.transport, true)?;
        validate(response)
    }

    pub fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Body, ApiError> {
        self.send(self.build_request(HttpMethod::Get, path, params))?
            .body()
    }

    /// Like [`get`](Self::get), deserializing the JSON body into `D`.
    pub fn get_json<D: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<D, ApiError> {
        self.send(self.build_request(HttpMethod::Get, path, params))?
            .json()
    }

    /// Sends `body` as JSON; `params` go in the query string.
    pub fn post(
        &self,
        path: &str,
        body: impl Into<Body>,
        params: &[(&str, &str)],
    ) -> Result<Body, ApiError> {
        self.send_json(HttpMethod::Post, path, body.into(), params)
    }

    /// Sends `body` as JSON; `params` go in the query string.
    pub fn put(
        &self,
        path: &str,
        body: impl Into<Body>,
        params: &[(&str, &str)],
    ) -> Result<Body, ApiError> {
        self.send_json(HttpMethod::Put, path, body.into(), params)
    }

    pub fn delete(&self, path: &str, params: &[(&str, &str)]) -> Result<Body, ApiError> {
        self.send(self.build_request(HttpMethod::Delete, path, params))?
            .body()
    }

    /// Resolves a soundcloud.com permalink to its API resource.
    pub fn resolve(&self, url: &str) -> Result<Body, ApiError> {
        self.get(RESOLVE_PATH, &[("url", url)])
    }

    /// Fetches the oEmbed description of `url` from the oEmbed host.
    ///
    /// `params` may override `format`.
    pub fn oembed(&self, url: &str, params: &[(&str, &str)]) -> Result<Body, ApiError> {
        let query: Vec<(&str, &str)> = [("url", url), ("format", "json")]
            .into_iter()
            .chain(params.iter().copied())
            .collect();
        self.get(&self.config.oembed_base, &query)
    }

    fn send_json(
        &self,
        method: HttpMethod,
        path: &str,
        body: Body,
        params: &[(&str, &str)],
    ) -> Result<Body, ApiError> {
        let request = self
            .build_request(method, path, params)
            .with_header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .with_body(body);
        self.send(request)?.body()
    }

    fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.config.api_base)
        } else {
            format!("{}/{path}", self.config.api_base)
        }
    }
}

/// Maps a response status to success or a typed error.
///
/// `[200, 400)` succeeds, 401 is [`ApiError::AuthorizationRequired`], any
/// other status is [`ApiError::HttpError`].
pub fn validate(response: Response) -> Result<Response, ApiError> {
    match response.status() {
        200..=399 => Ok(response),
        401 => Err(ApiError::AuthorizationRequired {
            response: Box::new(response),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.text(),
            response: Box::new(response),
        }),
    }
}
