//! Verify request building and status validation against the JSON vectors in
//! `test-vectors/`.
//!
//! Authenticated cases obtain their token through a stub transport that
//! answers the token exchange, so no network is involved.

use serde_json::Value;
use soundcloud_core::{
    validate, ApiError, ClientConfig, HeaderSet, HttpMessage, HttpMethod, HttpRequest,
    HttpResponse, Response, Session, Transport, TransportError,
};

const VECTORS: &str = include_str!("../../test-vectors/requests.json");

/// Answers every request with the same token payload.
struct TokenStub(String);

impl Transport for TokenStub {
    fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body = serde_json::json!({ "access_token": self.0 }).to_string();
        Ok(HttpResponse::assemble(
            200,
            [("Content-Type", "application/json")],
            body.as_bytes(),
        ))
    }
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn session(vectors: &Value, access_token: Option<&str>) -> Session<TokenStub> {
    let config = &vectors["config"];
    let config = ClientConfig::new(config["client_id"].as_str().unwrap())
        .with_client_secret("secret")
        .with_redirect_uri(config["redirect_uri"].as_str().unwrap());
    let mut session = Session::new(config, TokenStub(access_token.unwrap_or_default().to_string()));
    if access_token.is_some() {
        session.authorize_with_code("code").unwrap();
    }
    session
}

#[test]
fn build_request_vectors() {
    let vectors: Value = serde_json::from_str(VECTORS).unwrap();

    for case in vectors["build_request"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let session = session(&vectors, case["access_token"].as_str());
        let params = pairs(&case["params"]);
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        let request = session.build_request(
            parse_method(case["method"].as_str().unwrap()),
            case["path"].as_str().unwrap(),
            &params,
        );

        let expected = &case["expected"];
        assert_eq!(request.verb(), expected["verb"].as_str().unwrap(), "{name}: verb");
        assert_eq!(request.url().build(), expected["url"].as_str().unwrap(), "{name}: url");
        for (header, value) in pairs(&expected["headers"]) {
            assert_eq!(request.header(&header), Some(value.as_str()), "{name}: header {header}");
        }
        for header in expected["absent_headers"].as_array().unwrap() {
            let header = header.as_str().unwrap();
            assert!(!request.has_header(header), "{name}: unexpected header {header}");
        }
        assert!(request.raw_body().is_empty(), "{name}: body");
    }
}

#[test]
fn validate_vectors() {
    let vectors: Value = serde_json::from_str(VECTORS).unwrap();

    for case in vectors["validate"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap();
        let response = Response::new(status, HeaderSet::new(), body.as_bytes().to_vec());

        match (case["expected"].as_str().unwrap(), validate(response)) {
            ("ok", Ok(response)) => assert_eq!(response.status(), status, "{name}"),
            ("authorization_required", Err(ApiError::AuthorizationRequired { response })) => {
                assert_eq!(response.status(), status, "{name}");
            }
            ("http_error", Err(ApiError::HttpError { status: got, body: text, .. })) => {
                assert_eq!(got, status, "{name}: status");
                assert_eq!(text, body, "{name}: body");
            }
            (expected, got) => panic!("{name}: expected {expected}, got {got:?}"),
        }
    }
}
