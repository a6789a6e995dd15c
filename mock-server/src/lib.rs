use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const CLIENT_ID: &str = "mock-client";
pub const CLIENT_SECRET: &str = "mock-secret";
pub const AUTH_CODE: &str = "mock-code";
pub const USERNAME: &str = "mock-user";
pub const PASSWORD: &str = "mock-pass";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub id: u64,
    pub title: String,
    pub permalink_url: String,
}

#[derive(Deserialize)]
pub struct TrackInput {
    pub title: String,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub grant_type: String,
    pub code: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Default)]
pub struct Db {
    tokens: HashSet<String>,
    tracks: HashMap<u64, Track>,
    next_id: u64,
}

pub type SharedDb = Arc<RwLock<Db>>;

type Params = Query<HashMap<String, String>>;

pub fn app() -> Router {
    let db: SharedDb = Arc::new(RwLock::new(Db {
        next_id: 1,
        ..Db::default()
    }));
    Router::new()
        .route("/oauth2/token", post(issue_token))
        .route("/me", get(me))
        .route("/resolve", get(resolve))
        .route("/tracks", post(create_track))
        .route("/tracks/{id}", get(get_track).put(update_track).delete(delete_track))
        .route("/oembed", get(oembed))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn client_error(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

/// Accepts `Authorization: OAuth <token>` or an `oauth_token` query parameter.
async fn authorized(db: &SharedDb, headers: &HeaderMap, params: &HashMap<String, String>) -> bool {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("OAuth "));
    let token = from_header.or(params.get("oauth_token").map(String::as_str));
    match token {
        Some(token) => db.read().await.tokens.contains(token),
        None => false,
    }
}

fn known_client(params: &HashMap<String, String>) -> bool {
    params.get("client_id").map(String::as_str) == Some(CLIENT_ID)
}

async fn issue_token(State(db): State<SharedDb>, Form(input): Form<TokenRequest>) -> Response {
    if input.client_id != CLIENT_ID || input.client_secret != CLIENT_SECRET {
        return client_error(StatusCode::UNAUTHORIZED, "invalid_client");
    }
    if input.redirect_uri.is_empty() {
        return client_error(StatusCode::BAD_REQUEST, "invalid_request");
    }
    let granted = match input.grant_type.as_str() {
        "authorization_code" => input.code.as_deref() == Some(AUTH_CODE),
        "password" => {
            input.username.as_deref() == Some(USERNAME)
                && input.password.as_deref() == Some(PASSWORD)
        }
        _ => return client_error(StatusCode::BAD_REQUEST, "unsupported_grant_type"),
    };
    if !granted {
        return client_error(StatusCode::UNAUTHORIZED, "invalid_grant");
    }

    let token = Uuid::new_v4().to_string();
    db.write().await.tokens.insert(token.clone());
    Json(json!({ "access_token": token, "scope": "non-expiring" })).into_response()
}

async fn me(State(db): State<SharedDb>, headers: HeaderMap, Query(params): Params) -> Response {
    if !authorized(&db, &headers, &params).await {
        return client_error(StatusCode::UNAUTHORIZED, "unauthorized");
    }
    Json(json!({ "id": 1, "username": USERNAME })).into_response()
}

/// Answers `302 Found` pointing at the track resource, like the real endpoint.
async fn resolve(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Query(params): Params,
) -> Response {
    if !known_client(&params) {
        return client_error(StatusCode::UNAUTHORIZED, "unknown client");
    }
    let Some(url) = params.get("url") else {
        return client_error(StatusCode::BAD_REQUEST, "missing url");
    };
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let db = db.read().await;
    match db.tracks.values().find(|track| &track.permalink_url == url) {
        Some(track) => {
            let location = format!("http://{host}/tracks/{}?client_id={CLIENT_ID}", track.id);
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        None => client_error(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn create_track(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Query(params): Params,
    Json(input): Json<TrackInput>,
) -> Response {
    if !authorized(&db, &headers, &params).await {
        return client_error(StatusCode::UNAUTHORIZED, "unauthorized");
    }
    let mut db = db.write().await;
    let id = db.next_id;
    db.next_id += 1;
    let track = Track {
        id,
        permalink_url: format!("https://soundcloud.com/{USERNAME}/{}", slug(&input.title)),
        title: input.title,
    };
    db.tracks.insert(id, track.clone());
    (StatusCode::CREATED, Json(track)).into_response()
}

async fn get_track(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
    Query(params): Params,
) -> Response {
    if !known_client(&params) {
        return client_error(StatusCode::UNAUTHORIZED, "unknown client");
    }
    match db.read().await.tracks.get(&id) {
        Some(track) => Json(track.clone()).into_response(),
        None => client_error(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn update_track(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Query(params): Params,
    Json(input): Json<TrackInput>,
) -> Response {
    if !authorized(&db, &headers, &params).await {
        return client_error(StatusCode::UNAUTHORIZED, "unauthorized");
    }
    let mut db = db.write().await;
    match db.tracks.get_mut(&id) {
        Some(track) => {
            track.title = input.title;
            Json(track.clone()).into_response()
        }
        None => client_error(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn delete_track(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Query(params): Params,
) -> Response {
    if !authorized(&db, &headers, &params).await {
        return client_error(StatusCode::UNAUTHORIZED, "unauthorized");
    }
    match db.write().await.tracks.remove(&id) {
        Some(_) => Json(json!({ "status": "200 - OK" })).into_response(),
        None => client_error(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn oembed(Query(params): Params) -> Response {
    let Some(url) = params.get("url") else {
        return client_error(StatusCode::BAD_REQUEST, "missing url");
    };
    if params.get("format").map(String::as_str) != Some("json") {
        return (StatusCode::NOT_IMPLEMENTED, "only json is supported").into_response();
    }
    let height = params.get("maxheight").map(String::as_str).unwrap_or("400");
    Json(json!({
        "version": 1.0,
        "type": "rich",
        "provider_name": "SoundCloud",
        "height": height,
        "html": format!("<iframe height=\"{height}\" src=\"https://w.soundcloud.com/player/?url={url}\"></iframe>"),
    }))
    .into_response()
}

fn slug(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
