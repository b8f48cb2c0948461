use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub timestamp: Option<String>,
}

#[derive(Clone)]
struct MirrorState {
    token: Value,
    balances: Arc<HashMap<String, Value>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MirrorState {
    fn record(&self, path: String, params: &HashMap<String, String>) {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(RecordedRequest {
                path,
                timestamp: params.get("timestamp").cloned(),
            });
    }
}

/// A mirror node that answers any timestamp and keeps a log of the requests
/// it served, in arrival order.
pub struct RecordingMirror {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RecordingMirror {
    /// `balances` maps an `account.id` to its balances body; unknown
    /// accounts get an empty balance list.
    pub async fn start(token: Value, balances: Vec<(&str, Value)>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MirrorState {
            token,
            balances: Arc::new(
                balances
                    .into_iter()
                    .map(|(account, body)| (account.to_owned(), body))
                    .collect(),
            ),
            requests: requests.clone(),
        };

        let router = Router::new()
            .route("/api/v1/tokens/:token", get(token_info))
            .route("/api/v1/balances", get(account_balances))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind recording mirror");
        let addr = listener.local_addr().expect("Listener has no address");
        tokio::spawn(async move { axum::serve(listener, router).await });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

async fn token_info(
    Path(token): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<MirrorState>,
) -> Json<Value> {
    state.record(format!("/api/v1/tokens/{token}"), &params);

    Json(state.token.clone())
}

async fn account_balances(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<MirrorState>,
) -> Json<Value> {
    state.record("/api/v1/balances".to_owned(), &params);

    let body = params
        .get("account.id")
        .and_then(|account| state.balances.get(account))
        .cloned()
        .unwrap_or_else(|| json!({ "balances": [] }));

    Json(body)
}
