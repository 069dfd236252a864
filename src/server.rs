//! WhatsApp webhook HTTP server.
//!
//! Twilio posts each inbound WhatsApp message to `/whatsapp` as a
//! form-encoded body and expects TwiML back. The answer is composed inline
//! while the request waits.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/whatsapp` | Answer the message in the `Body` form field |
//! | `GET`  | `/` | Static readiness text |
//! | `GET`  | `/health` | Health check (returns version and index size) |
//!
//! # Status Contract
//!
//! A request without a `Body` field is a protocol error and gets `403` with
//! no composition. Failures while composing are conversational: the sender
//! receives `Sorry, I encountered an error: ...` in a normal `200` TwiML
//! reply.

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::app::AppContext;
use crate::config::Config;
use crate::error::CompositionError;
use crate::models::Answer;
use crate::twiml;

/// Readiness text served on `GET /`.
pub const READY_TEXT: &str = "WhatsApp AI Support Agent is running.";

/// Prefix of replies sent when composition fails.
pub const ERROR_REPLY_PREFIX: &str = "Sorry, I encountered an error:";

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    ctx: Arc<AppContext>,
}

/// Build the router over a ready application context.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/whatsapp", post(handle_whatsapp))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { ctx })
}

/// Bind to `[server].bind` and serve until the process is terminated.
pub async fn run_server(config: &Config, ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(ctx);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Webhook listening on http://{}", listener.local_addr()?);
    tracing::info!("Point the Twilio WhatsApp webhook at POST /whatsapp");

    axum::serve(listener, app).await?;

    Ok(())
}

// ============ GET / ============

async fn handle_root() -> &'static str {
    READY_TEXT
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    /// Number of indexed FAQ documents.
    documents: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        documents: state.ctx.index().len(),
    })
}

// ============ POST /whatsapp ============

/// Fields of Twilio's webhook form this server reads.
///
/// The form is read as ordered pairs; a repeated field keeps its first
/// value.
#[derive(Debug, Default)]
struct InboundMessage {
    body: Option<String>,
    from: Option<String>,
}

impl InboundMessage {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut message = Self::default();
        for (name, value) in pairs {
            match name.as_str() {
                "Body" if message.body.is_none() => message.body = Some(value),
                "From" if message.from.is_none() => message.from = Some(value),
                _ => {}
            }
        }
        message
    }
}

/// Handler for `POST /whatsapp`.
///
/// Returns `403` when the `Body` field is missing or the request is not a
/// form, otherwise `200` with a TwiML reply.
async fn handle_whatsapp(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let message = match form {
        Ok(Form(pairs)) => InboundMessage::from_pairs(pairs),
        Err(rejection) => {
            tracing::warn!("Rejected webhook request: {}", rejection);
            return StatusCode::FORBIDDEN.into_response();
        }
    };

    let Some(body) = message.body else {
        tracing::warn!("Missing 'Body' in webhook form");
        return StatusCode::FORBIDDEN.into_response();
    };

    tracing::info!(
        "Received message from {}: {}",
        message.from.as_deref().unwrap_or("unknown"),
        body
    );

    let reply = reply_text(state.ctx.composer().compose(&body).await);
    twiml_response(&reply)
}

/// Turn a composition result into the text sent back to the user.
fn reply_text(result: Result<Answer, CompositionError>) -> String {
    match result {
        Ok(answer) => {
            tracing::info!(
                "Answered using documents {:?}",
                answer.context_positions
            );
            answer.text
        }
        Err(err) => {
            tracing::error!(kind = err.kind(), "Failed to compose answer: {}", err);
            format!("{} {}", ERROR_REPLY_PREFIX, err)
        }
    }
}

fn twiml_response(text: &str) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, twiml::CONTENT_TYPE)],
        twiml::render_message(text),
    )
        .into_response()
}
