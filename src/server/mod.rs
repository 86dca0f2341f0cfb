//! Webhook HTTP server wiring inbound updates to the command dispatcher.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use crate::api::telegram::{TelegramClient, Update};
use crate::bot::Dispatcher;

/// Chat id used when a command arrives over plain HTTP instead of a chat
const HTTP_CHAT_ID: i64 = 0;

const COMMAND_FORM_HTML: &str = r#"<form method="POST">
    <input type="text" name="input_text">
    <input type="submit" value="Submit">
</form>"#;

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<Dispatcher>,
    telegram: TelegramClient,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, telegram: TelegramClient) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            telegram,
        }
    }
}

/// Form body for the manual command endpoint
#[derive(Debug, Deserialize)]
struct CommandInput {
    input_text: String,
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/command", get(command_form).post(run_command))
        .route("/telegram-webhook", post(telegram_webhook))
        .with_state(state)
}

/// Liveness probe.
async fn index() -> &'static str {
    "worked"
}

/// Serve the manual command form.
async fn command_form() -> Html<&'static str> {
    Html(COMMAND_FORM_HTML)
}

/// Run a bot command submitted over HTTP.
///
/// Input goes through the same parser and dispatcher as chat messages, so
/// only the known command grammar is reachable; nothing is ever executed as
/// a process. Unrecognized input yields an empty body.
async fn run_command(State(state): State<AppState>, Form(input): Form<CommandInput>) -> String {
    state
        .dispatcher
        .dispatch(&input.input_text, HTTP_CHAT_ID)
        .await
        .unwrap_or_default()
}

/// Telegram webhook: parse the update, dispatch, send at most one reply.
///
/// Always acknowledges well-formed updates with 200 so the chat platform
/// does not re-deliver them, even when reply delivery fails.
async fn telegram_webhook(
    State(state): State<AppState>,
    payload: Result<Json<Update>, JsonRejection>,
) -> Response {
    let update = match payload {
        Ok(Json(update)) => update,
        Err(rejection) => {
            warn!(error = %rejection, "rejecting malformed webhook payload");
            return (StatusCode::BAD_REQUEST, "invalid update payload").into_response();
        }
    };

    let Some(message) = update.message else {
        return "OK".into_response();
    };
    let Some(text) = message.text else {
        return "OK".into_response();
    };

    if let Some(reply) = state.dispatcher.dispatch(&text, message.chat.id).await {
        if let Err(e) = state
            .telegram
            .send_message(&reply, message.chat.id, Some(message.message_id))
            .await
        {
            warn!(chat_id = message.chat.id, error = %e, "failed to deliver reply");
        }
    }

    "OK".into_response()
}

/// Bind and serve until the process is stopped.
pub async fn run_server(state: AppState, addr: SocketAddr) -> crate::Result<()> {
    let app = create_router(state);

    info!(%addr, "Starting webhook server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
