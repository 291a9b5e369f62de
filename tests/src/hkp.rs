//! # In-Process HKP Key Directory
//!
//! A minimal key server on an ephemeral local port, speaking the two HKP
//! operations the client uses:
//!
//! - `GET /pks/lookup?op=get&options=mr&search=0x<KEYID>` → armored keyring or 404
//! - `POST /pks/add` with form field `keytext` → stores the key
//!
//! It can also be told to misbehave like a web server that is not a key
//! directory, answering every lookup with an HTML page.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use hqsl_openpgp::{parse_keys, PublicKey};
use sequoia_openpgp as openpgp;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use openpgp::armor;
use openpgp::serialize::Serialize;

/// How the server answers lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Serve stored keys
    KeyServer,
    /// Answer every lookup with `200` and an HTML page
    WebPage,
}

#[derive(Default)]
struct Directory {
    keys: RwLock<Vec<PublicKey>>,
    submissions: RwLock<Vec<String>>,
}

#[derive(Clone)]
struct AppState {
    directory: Arc<Directory>,
    behavior: Behavior,
}

#[derive(Debug, Deserialize)]
struct LookupParams {
    op: String,
    search: String,
}

#[derive(Debug, Deserialize)]
struct AddForm {
    keytext: String,
}

/// A running key directory; shut down on drop.
pub struct HkpServer {
    addr: SocketAddr,
    directory: Arc<Directory>,
    handle: JoinHandle<()>,
}

impl HkpServer {
    /// Start a key server holding `keys`.
    pub async fn start(keys: Vec<PublicKey>) -> std::io::Result<Self> {
        Self::start_with(keys, Behavior::KeyServer).await
    }

    /// Start a server with the given lookup behavior.
    pub async fn start_with(keys: Vec<PublicKey>, behavior: Behavior) -> std::io::Result<Self> {
        let directory = Arc::new(Directory {
            keys: RwLock::new(keys),
            submissions: RwLock::new(Vec::new()),
        });
        let state = AppState {
            directory: Arc::clone(&directory),
            behavior,
        };
        let router = Router::new()
            .route("/pks/lookup", get(lookup))
            .route("/pks/add", post(add))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                debug!(error = %e, "[hqsl] test key server stopped");
            }
        });

        Ok(Self {
            addr,
            directory,
            handle,
        })
    }

    /// Base URL, e.g. `http://127.0.0.1:40123`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Same server addressed with the `hkp://` scheme.
    pub fn hkp_url(&self) -> String {
        format!("hkp://{}", self.addr)
    }

    /// Keys currently stored.
    pub async fn keys(&self) -> Vec<PublicKey> {
        self.directory.keys.read().await.clone()
    }

    /// Raw `keytext` of every accepted submission.
    pub async fn submissions(&self) -> Vec<String> {
        self.directory.submissions.read().await.clone()
    }
}

impl Drop for HkpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn key_matches(key: &PublicKey, search: &str) -> bool {
    key.cert().keys().any(|ka| {
        let key = ka.key();
        key.keyid().to_hex().eq_ignore_ascii_case(search)
            || key.fingerprint().to_hex().eq_ignore_ascii_case(search)
    })
}

fn armor_keyring(keys: &[PublicKey]) -> openpgp::Result<String> {
    let mut writer = armor::Writer::new(Vec::new(), armor::Kind::PublicKey)?;
    for key in keys {
        key.cert().serialize(&mut writer)?;
    }
    let bytes = writer.finalize()?;
    Ok(String::from_utf8(bytes)?)
}

async fn lookup(State(state): State<AppState>, Query(params): Query<LookupParams>) -> Response {
    if state.behavior == Behavior::WebPage {
        return (StatusCode::OK, "<html><body>Welcome</body></html>").into_response();
    }
    if params.op != "get" {
        return (StatusCode::NOT_IMPLEMENTED, "Not implemented").into_response();
    }

    let search = params
        .search
        .strip_prefix("0x")
        .unwrap_or(&params.search)
        .to_string();
    let found: Vec<PublicKey> = state
        .directory
        .keys
        .read()
        .await
        .iter()
        .filter(|key| key_matches(key, &search))
        .cloned()
        .collect();
    if found.is_empty() {
        return (StatusCode::NOT_FOUND, "No results found").into_response();
    }

    match armor_keyring(&found) {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn add(State(state): State<AppState>, Form(form): Form<AddForm>) -> Response {
    let keys = match parse_keys(form.keytext.as_bytes()) {
        Ok(keys) => keys,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    state.directory.keys.write().await.extend(keys);
    state.directory.submissions.write().await.push(form.keytext);
    StatusCode::OK.into_response()
}
