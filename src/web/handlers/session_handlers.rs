// src/web/handlers/session_handlers.rs
use rocket::data::{Data, ToByteUnit};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};
use uuid::Uuid;

use crate::controller::Controller;
use crate::image_ingest::{ImageError, ImagePayload, MAX_IMAGE_SIZE};
use crate::session::SessionView;
use crate::web::types::*;
use crate::web::ServerState;

async fn controller_for(state: &ServerState, id: Uuid) -> Result<Controller, ApiError> {
    state
        .registry
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))
}

pub async fn create_session_handler(
    state: &State<ServerState>,
) -> Json<DataResponse<CreatedSession>> {
    let (session_id, controller) = state.registry.create().await;
    let session = controller.snapshot().await;

    Json(DataResponse::success(
        "Session created",
        CreatedSession {
            session_id,
            session,
        },
    ))
}

pub async fn get_session_handler(id: Uuid, state: &State<ServerState>) -> ApiResult<SessionView> {
    let controller = controller_for(state, id).await?;
    Ok(Json(DataResponse::success(
        "Session state",
        controller.snapshot().await,
    )))
}

pub async fn delete_session_handler(
    id: Uuid,
    state: &State<ServerState>,
) -> Result<Json<ActionResponse>, ApiError> {
    if state.registry.remove(id).await {
        Ok(Json(ActionResponse::success(
            format!("Session '{}' deleted", id),
            "session_deleted",
        )))
    } else {
        Err(session_not_found(id))
    }
}

pub async fn select_mode_handler(
    id: Uuid,
    request: Json<SelectModeRequest>,
    state: &State<ServerState>,
) -> ApiResult<SessionView> {
    let controller = controller_for(state, id).await?;
    let view = controller.select_mode(request.mode).await;
    Ok(Json(DataResponse::success(
        format!("Switched to {} mode", request.mode),
        view,
    )))
}

pub async fn set_input_handler(
    id: Uuid,
    request: Json<SetInputRequest>,
    state: &State<ServerState>,
) -> ApiResult<SessionView> {
    let controller = controller_for(state, id).await?;
    let view = controller.set_input(request.into_inner().value).await?;
    Ok(Json(DataResponse::success("Input updated", view)))
}

pub async fn upload_image_handler(
    id: Uuid,
    data: Data<'_>,
    state: &State<ServerState>,
) -> ApiResult<SessionView> {
    let controller = controller_for(state, id).await?;

    let capped = data
        .open(MAX_IMAGE_SIZE.bytes())
        .into_bytes()
        .await
        .map_err(|e| {
            error!("Failed to read image upload for session {}: {}", id, e);
            api_error(
                Status::BadRequest,
                "Failed to read uploaded image",
                "UPLOAD_READ_ERROR",
                &["Try uploading the image again"],
            )
        })?;

    if !capped.is_complete() {
        return Err(ImageError::TooLarge(capped.len()).into());
    }

    let image = ImagePayload::from_bytes(&capped.into_inner())?;
    info!(
        "Session {} loaded {} image ({} bytes)",
        id, image.mime_type, image.byte_len
    );
    let view = controller.load_image(image).await?;
    Ok(Json(DataResponse::success("Image loaded", view)))
}

pub async fn upload_image_data_uri_handler(
    id: Uuid,
    request: Json<DataUriRequest>,
    state: &State<ServerState>,
) -> ApiResult<SessionView> {
    let controller = controller_for(state, id).await?;
    let image = ImagePayload::from_data_uri(&request.data_uri)?;
    let view = controller.load_image(image).await?;
    Ok(Json(DataResponse::success("Image loaded", view)))
}

pub async fn clear_image_handler(id: Uuid, state: &State<ServerState>) -> ApiResult<SessionView> {
    let controller = controller_for(state, id).await?;
    Ok(Json(DataResponse::success(
        "Image cleared",
        controller.clear_image().await,
    )))
}

pub async fn analyze_handler(id: Uuid, state: &State<ServerState>) -> ApiResult<SessionView> {
    let controller = controller_for(state, id).await?;

    info!("Session {} submitted an analysis", id);
    let result = controller.submit().await?;

    Ok(Json(DataResponse::success(
        format!(
            "Analysis complete: {} ({}/100)",
            result.final_verdict, result.credibility_score
        ),
        controller.snapshot().await,
    )))
}

pub async fn reset_handler(id: Uuid, state: &State<ServerState>) -> ApiResult<SessionView> {
    let controller = controller_for(state, id).await?;
    Ok(Json(DataResponse::success(
        "Session reset",
        controller.reset().await,
    )))
}

pub async fn report_handler(id: Uuid, state: &State<ServerState>) -> Result<String, ApiError> {
    let controller = controller_for(state, id).await?;
    controller.report().await.ok_or_else(|| {
        api_error(
            Status::NotFound,
            "No analysis result to report",
            "NO_RESULT",
            &["Run an analysis first"],
        )
    })
}
