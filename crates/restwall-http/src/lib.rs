mod pages;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use restwall_core::control::{
    ControlMode, ControlStore, DEFAULT_LOCK_MINUTES, MAX_LOCK_MINUTES, MIN_LOCK_MINUTES,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
struct ApiState {
    store: Arc<ControlStore>,
    admin_key: Arc<str>,
}

impl ApiState {
    fn key_matches(&self, provided: Option<&str>) -> bool {
        provided == Some(self.admin_key.as_ref())
    }
}

/// Query parameters accepted by the control endpoints. Everything is
/// optional; missing or malformed values fall back to defaults instead of
/// failing the request.
#[derive(Debug, Deserialize)]
struct AdminQuery {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Machine-readable snapshot served by `GET /status`.
#[derive(Serialize)]
struct StatusSnapshot {
    mode: ControlMode,
    duration: u32,
    message: Option<String>,
}

/// Builds the remote control router. All endpoints are GET and idempotent;
/// every request must carry the shared `key` query parameter.
pub fn router(store: Arc<ControlStore>, admin_key: &str) -> Router {
    let state = ApiState {
        store,
        admin_key: Arc::from(admin_key),
    };
    Router::new()
        .route("/", get(admin))
        .route("/admin", get(admin))
        .route("/status", get(status))
        .fallback(not_found)
        .with_state(state)
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Html(pages::error_page(
            "Access denied",
            "The provided key is not valid.",
        )),
    )
        .into_response()
}

async fn admin(State(state): State<ApiState>, Query(q): Query<AdminQuery>) -> Response {
    if !state.key_matches(q.key.as_deref()) {
        return forbidden();
    }

    match q.action.as_deref() {
        Some("force_lock") => {
            let minutes = q
                .duration
                .as_deref()
                .and_then(|d| d.trim().parse::<u32>().ok())
                .unwrap_or(DEFAULT_LOCK_MINUTES)
                .clamp(MIN_LOCK_MINUTES, MAX_LOCK_MINUTES);
            state.store.force_lock(minutes, q.message.as_deref());
            log::info!("remote force_lock for {minutes} min");
            Html(pages::success_page(
                "Locked",
                &format!("The overlay is now shown and will stay up for {minutes} minutes."),
                &state.admin_key,
            ))
            .into_response()
        }
        Some("force_unlock") => {
            state.store.force_unlock();
            log::info!("remote force_unlock");
            Html(pages::success_page(
                "Unlocked",
                "The overlay is now hidden; the device can be used again.",
                &state.admin_key,
            ))
            .into_response()
        }
        Some("auto") => {
            state.store.reset_to_auto();
            log::info!("remote reset to auto");
            Html(pages::success_page(
                "Automatic mode restored",
                "Breaks will again follow the scheduled windows.",
                &state.admin_key,
            ))
            .into_response()
        }
        // No action, or one we do not recognize: render the panel.
        _ => Html(pages::control_page(&state.store.state(), &state.admin_key)).into_response(),
    }
}

async fn status(State(state): State<ApiState>, Query(q): Query<AdminQuery>) -> Response {
    if !state.key_matches(q.key.as_deref()) {
        return forbidden();
    }
    let snapshot = state.store.state();
    Json(StatusSnapshot {
        mode: snapshot.mode,
        duration: snapshot.force_lock_minutes,
        message: snapshot.custom_message,
    })
    .into_response()
}

async fn not_found(State(state): State<ApiState>, Query(q): Query<AdminQuery>) -> Response {
    // The key check comes first everywhere, unknown paths included.
    if !state.key_matches(q.key.as_deref()) {
        return forbidden();
    }
    (
        StatusCode::NOT_FOUND,
        Html(pages::error_page(
            "Not found",
            "The requested page does not exist.",
        )),
    )
        .into_response()
}
