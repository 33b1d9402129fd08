//! In-process IMDSv2 stand-in for tests

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::session::{TOKEN_HEADER, TOKEN_TTL_HEADER};

pub(crate) const TEST_TOKEN: &str = "test-token";

#[derive(Clone)]
struct FakeImds {
    token: String,
    values: Arc<HashMap<String, String>>,
}

async fn issue_token(State(imds): State<FakeImds>, headers: HeaderMap) -> (StatusCode, String) {
    if headers.get(TOKEN_TTL_HEADER).is_none() {
        return (StatusCode::BAD_REQUEST, String::new());
    }
    (StatusCode::OK, imds.token.clone())
}

async fn read_metadata(
    State(imds): State<FakeImds>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let authorised = headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|t| t == imds.token);
    if !authorised {
        return (StatusCode::UNAUTHORIZED, "Unauthorized".to_string());
    }

    match imds.values.get(&path) {
        Some(value) => (StatusCode::OK, value.clone()),
        None => (StatusCode::NOT_FOUND, "Not Found".to_string()),
    }
}

/// Serve a fake metadata service on an ephemeral loopback port
pub(crate) async fn spawn_imds(token: &str, values: &[(&str, &str)]) -> SocketAddr {
    let state = FakeImds {
        token: token.to_string(),
        values: Arc::new(
            values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
    };

    let app = Router::new()
        .route("/latest/api/token", put(issue_token))
        .route("/latest/*path", get(read_metadata))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A loopback address nothing listens on
pub(crate) fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}
