// src/web/mod.rs
pub mod handlers;
pub mod sessions;
pub mod types;

pub use sessions::SessionRegistry;
pub use types::*;

use anyhow::{Context, Result};
use rocket::data::{Data, Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::analysis::{GeminiClient, OfferAnalyzer};
use crate::core::ConfigManager;
use crate::image_ingest::{ImageError, MAX_DATA_URI_BODY, MAX_IMAGE_SIZE};
use crate::session::SessionView;

/// Shared state managed by Rocket
pub struct ServerState {
    pub registry: SessionRegistry,
    pub credentials_configured: bool,
    pub model: String,
}

impl ServerState {
    pub fn new(analyzer: Arc<dyn OfferAnalyzer>, credentials_configured: bool, model: String) -> Self {
        Self::with_registry(SessionRegistry::new(analyzer), credentials_configured, model)
    }

    pub fn with_registry(
        registry: SessionRegistry,
        credentials_configured: bool,
        model: String,
    ) -> Self {
        Self {
            registry,
            credentials_configured,
            model,
        }
    }
}

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[get("/health")]
pub async fn health(state: &State<ServerState>) -> Json<DataResponse<HealthData>> {
    handlers::health_handler(state).await
}

#[post("/sessions")]
pub async fn create_session(state: &State<ServerState>) -> Json<DataResponse<CreatedSession>> {
    handlers::create_session_handler(state).await
}

#[get("/sessions/<id>")]
pub async fn get_session(id: Uuid, state: &State<ServerState>) -> ApiResult<SessionView> {
    handlers::get_session_handler(id, state).await
}

#[delete("/sessions/<id>")]
pub async fn delete_session(
    id: Uuid,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_session_handler(id, state).await
}

#[post("/sessions/<id>/mode", data = "<request>")]
pub async fn select_mode(
    id: Uuid,
    request: Json<SelectModeRequest>,
    state: &State<ServerState>,
) -> ApiResult<SessionView> {
    handlers::select_mode_handler(id, request, state).await
}

#[post("/sessions/<id>/input", data = "<request>")]
pub async fn set_input(
    id: Uuid,
    request: Json<SetInputRequest>,
    state: &State<ServerState>,
) -> ApiResult<SessionView> {
    handlers::set_input_handler(id, request, state).await
}

#[post("/sessions/<id>/image", data = "<data>")]
pub async fn upload_image(
    id: Uuid,
    data: Data<'_>,
    state: &State<ServerState>,
) -> ApiResult<SessionView> {
    handlers::upload_image_handler(id, data, state).await
}

#[post("/sessions/<id>/image/data-uri", data = "<request>")]
pub async fn upload_image_data_uri(
    id: Uuid,
    request: Json<DataUriRequest>,
    state: &State<ServerState>,
) -> ApiResult<SessionView> {
    handlers::upload_image_data_uri_handler(id, request, state).await
}

#[delete("/sessions/<id>/image")]
pub async fn clear_image(id: Uuid, state: &State<ServerState>) -> ApiResult<SessionView> {
    handlers::clear_image_handler(id, state).await
}

#[post("/sessions/<id>/analyze")]
pub async fn analyze(id: Uuid, state: &State<ServerState>) -> ApiResult<SessionView> {
    handlers::analyze_handler(id, state).await
}

#[post("/sessions/<id>/reset")]
pub async fn reset(id: Uuid, state: &State<ServerState>) -> ApiResult<SessionView> {
    handlers::reset_handler(id, state).await
}

#[get("/sessions/<id>/report")]
pub async fn report(id: Uuid, state: &State<ServerState>) -> Result<String, ApiError> {
    handlers::report_handler(id, state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format",
        "BAD_REQUEST",
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found",
        "NOT_FOUND",
        vec!["Check the endpoint path and session id".to_string()],
    ))
}

#[rocket::catch(413)]
pub fn payload_too_large() -> Json<StandardErrorResponse> {
    let err = ImageError::TooLarge(MAX_IMAGE_SIZE + 1);
    Json(StandardErrorResponse::new(
        "Request body too large (images are limited to 10MB)",
        err.code(),
        vec![err.suggestion().to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be understood",
        "UNPROCESSABLE_ENTITY",
        vec![
            "Use one of the modes: text, image, url".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error",
        "INTERNAL_ERROR",
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// JSON bodies must fit a base64 data URI of the largest accepted image
pub fn request_limits() -> Limits {
    Limits::default().limit("json", MAX_DATA_URI_BODY.bytes())
}

pub fn build_rocket(figment: Figment, state: ServerState) -> Rocket<Build> {
    rocket::custom(figment.merge(("limits", request_limits())))
        .attach(Cors)
        .manage(state)
        .register(
            "/api",
            catchers![
                bad_request,
                not_found,
                payload_too_large,
                unprocessable,
                internal_error
            ],
        )
        .mount(
            "/api",
            routes![
                health,
                create_session,
                get_session,
                delete_session,
                select_mode,
                set_input,
                upload_image,
                upload_image_data_uri,
                clear_image,
                analyze,
                reset,
                report,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    let client = GeminiClient::new(&config.gemini)?;
    let credentials_configured = client.has_credentials();
    let model = client.model().to_string();
    let registry = SessionRegistry::with_limits(
        Arc::new(client),
        std::time::Duration::from_secs(config.server.session_idle_seconds),
        config.server.max_sessions,
    );
    let state = ServerState::with_registry(registry, credentials_configured, model);

    info!("Starting ScamGuard API server");
    info!("Environment: {}", config.environment);
    info!("Gemini model: {}", config.gemini.model);
    info!(
        "Sessions: idle timeout {}s, at most {}",
        config.server.session_idle_seconds, config.server.max_sessions
    );
    info!("Server: http://0.0.0.0:{}", config.server.port);

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.server.port));

    build_rocket(figment, state)
        .launch()
        .await
        .context("Rocket server failed")?;

    Ok(())
}
