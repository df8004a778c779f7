//! In-process stand-in for the movie API, bound to an ephemeral localhost port.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use moviebox_client::{Moviebox, SessionStore};
use moviebox_config::MemoryPersistence;
use moviebox_models::Identity;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;
use url::Url;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

/// Lets a test observe state while a request is held open by the server.
#[derive(Clone, Default)]
pub struct Gate {
    pub arrived: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[derive(Clone, Default)]
pub struct FakeApi {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responses: Arc<Mutex<HashMap<(String, String), (u16, Value)>>>,
    gates: Arc<Mutex<HashMap<(String, String), Gate>>>,
}

impl FakeApi {
    pub async fn start() -> (Self, Url) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let api = FakeApi::default();
        let app = Router::new().fallback(handle).with_state(api.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (api, Url::parse(&format!("http://{}", addr)).unwrap())
    }

    /// Answer `method path` with `status` and `body` until replaced.
    /// Unscripted routes answer `200 {}`.
    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.responses
            .lock()
            .insert((method.to_string(), path.to_string()), (status, body));
    }

    /// Hold `method path` open until the returned gate is released.
    pub fn hold(&self, method: &str, path: &str) -> Gate {
        let gate = Gate::default();
        self.gates
            .lock()
            .insert((method.to_string(), path.to_string()), gate.clone());
        gate
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

async fn handle(
    State(api): State<FakeApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let key = (method.to_string(), uri.path().to_string());
    api.requests.lock().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    let gate = api.gates.lock().get(&key).cloned();
    if let Some(gate) = gate {
        gate.arrived.notify_one();
        gate.release.notified().await;
    }

    let (status, value) = api
        .responses
        .lock()
        .get(&key)
        .cloned()
        .unwrap_or((200, json!({})));
    (StatusCode::from_u16(status).unwrap(), Json(value)).into_response()
}

pub fn ana() -> Identity {
    Identity {
        email: "ana@example.com".to_string(),
        username: "ana".to_string(),
    }
}

/// Clients for `base` with a fresh, logged-out session.
pub fn guest(base: &Url) -> (Moviebox, Arc<MemoryPersistence>) {
    let persistence = Arc::new(MemoryPersistence::new());
    let session = Arc::new(SessionStore::initialize(persistence.clone()));
    (Moviebox::connect(base.clone(), session), persistence)
}

/// Clients for `base` already logged in as ana with token `tok-1`.
pub fn member(base: &Url) -> (Moviebox, Arc<MemoryPersistence>) {
    let (client, persistence) = guest(base);
    client.session().login(ana(), "tok-1".to_string());
    (client, persistence)
}

pub fn inception_public() -> Value {
    json!({
        "title": "Inception",
        "description": "Dreams within dreams",
        "year": 2010, "month": 7, "day": 16,
        "director": "Christopher Nolan",
        "actors": ["Leonardo DiCaprio"],
        "genres": ["Sci-Fi"],
        "rating": 8.8
    })
}

pub fn inception_user(list_type: &str, user_rating: i64) -> Value {
    json!({
        "title": "Inception",
        "description": "Dreams within dreams",
        "release_date": "2010-07-16",
        "director": "Christopher Nolan",
        "actors": ["Leonardo DiCaprio"],
        "genres": ["Sci-Fi"],
        "rating": 8.8,
        "list_type": list_type,
        "user_rating": user_rating
    })
}

pub fn review(id: &str, is_liked: bool, likes: u32) -> Value {
    json!({
        "id": id,
        "username": "bob",
        "text": "Great movie",
        "review_year": 2024, "review_month": 1, "review_day": 5,
        "user_rating": 8,
        "is_liked": is_liked,
        "likes": likes
    })
}
