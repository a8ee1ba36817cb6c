use std::sync::Arc;

use actix_web::{
    http::StatusCode,
    web::{Bytes, Data},
    HttpResponse, Responder,
};
use arcade_core::leaderboard::{coerce_score, sanitize_name, SubmitResponse};
use serde_json::Value;

use crate::response::{database_error, database_not_configured, json_error_with_code};
use crate::store::ScoreStore;
use crate::{AppState, HealthResponse};

/// Runs a store call on the blocking pool; SQLite calls never run on the async workers.
async fn run_store<T, F>(store: Arc<ScoreStore>, op: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&ScoreStore) -> Result<T, String> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|err| format!("store worker failure: {err}"))?
}

pub(crate) async fn health(state: Data<AppState>) -> impl Responder {
    let stored_scores = match state.scores.clone() {
        Some(store) => match run_store(store, |store| store.count()).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::error!("health check failed: {e}");
                return database_error();
            }
        },
        None => None,
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        service: "score-server",
        database_configured: state.scores.is_some(),
        stored_scores,
        leaderboard_limit: state.leaderboard_limit,
    })
}

pub(crate) async fn get_leaderboard(state: Data<AppState>) -> impl Responder {
    let Some(store) = state.scores.clone() else {
        return database_not_configured();
    };
    let limit = state.leaderboard_limit;

    match run_store(store, move |store| store.top(limit)).await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(e) => {
            tracing::error!("leaderboard read failed: {e}");
            database_error()
        }
    }
}

/// Accepts any JSON body. Unknown or malformed fields are coerced rather than
/// rejected; only unparseable JSON is a client error.
pub(crate) async fn submit_score(state: Data<AppState>, body: Bytes) -> impl Responder {
    let Some(store) = state.scores.clone() else {
        return database_not_configured();
    };

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::debug!(error = %err, "rejecting malformed score body");
            return json_error_with_code(
                StatusCode::BAD_REQUEST,
                "Invalid JSON",
                Some("invalid_json"),
            );
        }
    };

    let name = sanitize_name(payload.get("name"));
    let score = coerce_score(payload.get("score"));
    let limit = state.leaderboard_limit;
    tracing::info!(name = %name, score, "storing score");

    match run_store(store, move |store| store.submit(&name, score, limit)).await {
        Ok(leaderboard) => HttpResponse::Ok().json(SubmitResponse {
            success: true,
            leaderboard,
        }),
        Err(e) => {
            tracing::error!("score insert failed: {e}");
            database_error()
        }
    }
}

pub(crate) async fn method_not_allowed() -> impl Responder {
    json_error_with_code(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method not allowed",
        Some("method_not_allowed"),
    )
}
