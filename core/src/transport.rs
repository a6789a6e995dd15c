//! Blocking transport backed by `ureq`.
//!
//! # Design
//! Status codes are returned as data (`http_status_as_error(false)`) so the
//! session alone decides what counts as a failure. Two agents are built up
//! front, one following redirects and one not, since the choice is made per
//! request. Idle connections are not pooled: every exchange opens and
//! releases its own connection.
//!
//! Response bodies are read up to a byte limit (10 MiB unless changed with
//! `with_body_limit`); a larger body fails as a `TransportError`.

use std::fmt;
use std::time::Duration;

use ureq::Agent;

use crate::config::MAX_RESPONSE_BYTES;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Transport};

const MAX_REDIRECTS: u32 = 10;

#[derive(Clone)]
pub struct UreqTransport {
    following: Agent,
    direct: Agent,
    body_limit: u64,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            following: agent(MAX_REDIRECTS, timeout),
            direct: agent(0, timeout),
            body_limit: MAX_RESPONSE_BYTES,
        }
    }

    /// Caps how many response body bytes are read.
    #[must_use]
    pub fn with_body_limit(mut self, body_limit: u64) -> Self {
        self.body_limit = body_limit;
        self
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

fn agent(max_redirects: u32, timeout: Option<Duration>) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .max_redirects(max_redirects)
        .max_redirects_will_error(false)
        .max_idle_connections(0)
        .timeout_global(timeout)
        .build()
        .new_agent()
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = if request.follow_redirects {
            &self.following
        } else {
            &self.direct
        };

        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = match request.body {
            Some(body) => agent.run(builder.body(body.into_bytes()).map_err(TransportError::new)?),
            None => agent.run(builder.body(()).map_err(TransportError::new)?),
        };
        let mut response = response.map_err(TransportError::new)?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.body_limit)
            .read_to_vec()
            .map_err(TransportError::new)?;

        Ok(HttpResponse::assemble(
            status,
            headers.iter().map(|(name, value)| (name.as_str(), value.as_str())),
            &body,
        ))
    }
}
