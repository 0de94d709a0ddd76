// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

use crate::web::types::{DataResponse, HealthData};
use crate::web::ServerState;

pub async fn health_handler(state: &State<ServerState>) -> Json<DataResponse<HealthData>> {
    let active_sessions = state.registry.len().await;

    if state.credentials_configured {
        info!("Health check ({} active sessions)", active_sessions);
    } else {
        warn!("Health check: Gemini API key is not configured");
    }

    Json(DataResponse::success(
        "OK",
        HealthData {
            status: "ok",
            credentials_configured: state.credentials_configured,
            model: state.model.clone(),
            active_sessions,
        },
    ))
}
