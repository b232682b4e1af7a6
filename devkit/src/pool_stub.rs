/*!
Faux pool HTTP pour tests sans réseau

Serveur Axum local (port éphémère) qui expose :
- GET  /status  → document JSON du pool (modifiable à chaud)
- POST /webhook → enregistre les payloads reçus

Les deux routes peuvent être mises en échec pour tester la gestion d'erreurs.
*/

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
enum StatusBody {
    Json(Value),
    Raw(String),
}

#[derive(Clone)]
struct StubState {
    status_body: Arc<Mutex<StatusBody>>,
    status_code: Arc<Mutex<StatusCode>>,
    status_hits: Arc<Mutex<usize>>,
    webhook_code: Arc<Mutex<StatusCode>>,
    webhook_posts: Arc<Mutex<Vec<Value>>>,
}

/// Pool de test servi en local
pub struct StubPool {
    addr: SocketAddr,
    state: StubState,
    server: JoinHandle<()>,
}

impl StubPool {
    /// Démarre le serveur avec un document de statut initial
    pub async fn start(document: Value) -> Result<Self> {
        let state = StubState {
            status_body: Arc::new(Mutex::new(StatusBody::Json(document))),
            status_code: Arc::new(Mutex::new(StatusCode::OK)),
            status_hits: Arc::new(Mutex::new(0)),
            webhook_code: Arc::new(Mutex::new(StatusCode::NO_CONTENT)),
            webhook_posts: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/status", get(status_handler))
            .route("/webhook", post(webhook_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("❌ [STUB] pool server stopped: {}", e);
            }
        });

        log::info!("🧪 [STUB] pool listening on http://{}", addr);
        Ok(Self { addr, state, server })
    }

    pub fn status_url(&self) -> String {
        format!("http://{}/status", self.addr)
    }

    pub fn webhook_url(&self) -> String {
        format!("http://{}/webhook", self.addr)
    }

    /// Remplace le document servi sur /status
    pub fn set_document(&self, document: Value) {
        *self.state.status_body.lock() = StatusBody::Json(document);
    }

    /// Sert un corps brut (ex: JSON invalide)
    pub fn set_raw_body(&self, body: impl Into<String>) {
        *self.state.status_body.lock() = StatusBody::Raw(body.into());
    }

    /// Code HTTP renvoyé par /status
    pub fn set_status_code(&self, code: StatusCode) {
        *self.state.status_code.lock() = code;
    }

    /// Code HTTP renvoyé par /webhook
    pub fn set_webhook_code(&self, code: StatusCode) {
        *self.state.webhook_code.lock() = code;
    }

    /// Nombre de GET reçus sur /status
    pub fn status_hits(&self) -> usize {
        *self.state.status_hits.lock()
    }

    /// Payloads reçus sur /webhook, acceptés ou non
    pub fn webhook_posts(&self) -> Vec<Value> {
        self.state.webhook_posts.lock().clone()
    }
}

impl Drop for StubPool {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn status_handler(State(state): State<StubState>) -> Response {
    *state.status_hits.lock() += 1;

    let code = *state.status_code.lock();
    if !code.is_success() {
        return (code, "stub pool failure").into_response();
    }

    let body = state.status_body.lock().clone();
    match body {
        StatusBody::Json(document) => Json(document).into_response(),
        StatusBody::Raw(raw) => ([(header::CONTENT_TYPE, "application/json")], raw).into_response(),
    }
}

async fn webhook_handler(State(state): State<StubState>, body: Bytes) -> StatusCode {
    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => state.webhook_posts.lock().push(payload),
        Err(e) => log::warn!("⚠️ [STUB] webhook body is not JSON: {}", e),
    }
    *state.webhook_code.lock()
}
