//! Admission endpoint and code-entry page.
//!
//! | Route              | Effect                                  |
//! |--------------------|-----------------------------------------|
//! | `GET /alarm?code=` | queue a defuse submission               |
//! | `GET /disable?code=` | queue a disable submission            |
//! | `POST /submit`     | queue `{ "code", "purpose" }`           |
//! | `GET /`            | code-entry page                         |
//! | `GET /styles.css`  | page stylesheet                         |
//!
//! Submission routes answer `200` with an empty body whatever happens to
//! the code: the caller never learns whether it was accepted, blocked,
//! throttled or dropped.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::Router;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::app::commands::{CodeSubmission, Purpose};
use crate::auth::SubmissionLimiter;
use crate::channels::SubmissionInbox;

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const STYLES_CSS: &str = include_str!("../../assets/styles.css");

/// State shared by the submission handlers.
pub struct AdmissionState {
    inbox: SubmissionInbox,
    limiter: Mutex<SubmissionLimiter>,
}

impl AdmissionState {
    pub fn new(inbox: SubmissionInbox, rate_per_sec: u32) -> Self {
        Self {
            inbox,
            limiter: Mutex::new(SubmissionLimiter::new(rate_per_sec)),
        }
    }

    /// Throttle, then hand the submission to the controller.
    fn admit(&self, submission: CodeSubmission) {
        let allowed = match self.limiter.lock() {
            Ok(mut limiter) => limiter.admit(),
            Err(poisoned) => poisoned.into_inner().admit(),
        };
        if !allowed {
            return;
        }
        debug!("http: queued {} submission", submission.purpose);
        self.inbox.submit(submission);
    }
}

type SharedState = Arc<AdmissionState>;

/// A missing `code` parameter is submitted as the empty code, which never
/// matches and is logged as invalid.
#[derive(Debug, Deserialize)]
struct CodeQuery {
    #[serde(default)]
    code: String,
}

pub fn router(state: AdmissionState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/styles.css", get(styles))
        .route("/alarm", get(defuse))
        .route("/disable", get(disable))
        .route("/submit", post(submit))
        .with_state(Arc::new(state))
}

/// Bind `0.0.0.0:port` and serve until the task is dropped.
pub async fn serve(state: AdmissionState, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("http: listening on http://{addr}");
    axum::serve(listener, router(state)).await
}

// ── Handlers ─────────────────────────────────────────────────

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn styles() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], STYLES_CSS)
}

async fn defuse(State(state): State<SharedState>, Query(q): Query<CodeQuery>) -> StatusCode {
    queue_query(&state, q, Purpose::Defuse)
}

async fn disable(State(state): State<SharedState>, Query(q): Query<CodeQuery>) -> StatusCode {
    queue_query(&state, q, Purpose::Disable)
}

/// Malformed bodies are logged and answered like any other submission.
async fn submit(State(state): State<SharedState>, body: Bytes) -> StatusCode {
    match serde_json::from_slice::<CodeSubmission>(&body) {
        Ok(submission) => state.admit(submission),
        Err(e) => warn!("http: malformed submission ignored: {e}"),
    }
    StatusCode::OK
}

fn queue_query(state: &AdmissionState, q: CodeQuery, purpose: Purpose) -> StatusCode {
    if q.code.is_empty() {
        debug!("http: {purpose} request without a code");
    }
    state.admit(CodeSubmission::new(q.code, purpose));
    StatusCode::OK
}
