//! In-process HTTP server standing in for the LLM providers, the HCX gateway and the FHIR
//! utility in tests.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    Json, Router,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

pub type Seen = Arc<Mutex<Vec<SeenRequest>>>;

/// Answers every request with `status` and `reply`, whatever the path.
pub async fn spawn(status: u16, reply: Value) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .fallback(
            move |State(seen): State<Seen>, uri: Uri, headers: HeaderMap, Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    let authorization = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    seen.lock().unwrap().push(SeenRequest {
                        path: uri.path().to_string(),
                        authorization,
                        body,
                    });
                    (StatusCode::from_u16(status).unwrap(), Json(reply))
                }
            },
        )
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}
