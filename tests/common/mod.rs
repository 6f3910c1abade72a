//! mock blynk relay served by axum on an ephemeral port

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use flora_host::relay::RelayClient;

pub const TOKEN: &str = "test-token";

#[derive(Clone, Debug)]
pub enum Reply {
    Json(serde_json::Value),
    Raw(&'static str),
    Status(u16),
    Delayed(u64, Box<Reply>),
}

struct MockState {
    replies: HashMap<String, Reply>,
    hits: AtomicUsize,
}

pub struct MockRelay {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockRelay {
    /// pins without a reply answer 400, like blynk does for unknown pins
    pub async fn start(replies: &[(&str, Reply)]) -> Self {
        let state = Arc::new(MockState {
            replies: replies
                .iter()
                .map(|(pin, reply)| (pin.to_string(), reply.clone()))
                .collect(),
            hits: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/:token/get/:pin", get(pin_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

async fn pin_handler(
    State(state): State<Arc<MockState>>,
    Path((token, pin)): Path<(String, String)>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    if token != TOKEN {
        return (StatusCode::BAD_REQUEST, "Invalid token.").into_response();
    }

    let reply = match state.replies.get(&pin) {
        Some(reply) => reply.clone(),
        None => return (StatusCode::BAD_REQUEST, "Requested pin doesn't exist.").into_response(),
    };
    let reply = match reply {
        Reply::Delayed(ms, inner) => {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            *inner
        }
        other => other,
    };

    match reply {
        Reply::Json(value) => Json(value).into_response(),
        Reply::Raw(body) => body.into_response(),
        Reply::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
        Reply::Delayed(..) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// relay client that never goes through a system proxy
pub fn client() -> RelayClient {
    RelayClient::with_http(reqwest::Client::builder().no_proxy().build().unwrap())
}

/// the readings the flora firmware typically publishes
pub fn device_replies() -> Vec<(&'static str, Reply)> {
    use serde_json::json;
    vec![
        ("v0", Reply::Json(json!(23.5))),
        ("v1", Reply::Json(json!(["60.2"]))),
        ("v4", Reply::Json(json!([45]))),
        ("v7", Reply::Json(json!(612))),
        ("v10", Reply::Json(json!("2024"))),
        ("v13", Reply::Json(json!([14]))),
        ("v14", Reply::Json(json!(30))),
        ("v15", Reply::Json(json!(0))),
    ]
}
