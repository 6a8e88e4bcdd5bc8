/// REST API endpoints for the authoring session
/// One controller instance backs the whole server; handlers translate
/// HTTP requests into controller commands and map errors to statuses.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use studio::{EditOutcome, EditTarget, PackageSource, StudioController, StudioError};

use crate::models::{CreatePackageRequest, EditRequest, UpdateSettingsRequest};

/// API error type
pub struct ApiError(StudioError);

impl From<StudioError> for ApiError {
    fn from(err: StudioError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StudioError::Validation(_) => StatusCode::BAD_REQUEST,
            StudioError::NoPackage => StatusCode::CONFLICT,
            StudioError::SceneIndex(_) | StudioError::CharacterIndex(_) => StatusCode::NOT_FOUND,
            StudioError::Generation(_) => StatusCode::BAD_GATEWAY,
            StudioError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// GET /api/session - Current session snapshot
pub async fn get_session(State(controller): State<Arc<StudioController>>) -> Response {
    Json(controller.snapshot()).into_response()
}

/// PUT /api/settings - Replace generation settings
pub async fn update_settings(
    State(controller): State<Arc<StudioController>>,
    Json(req): Json<UpdateSettingsRequest>,
) -> StatusCode {
    controller.update_settings(req.settings);
    if let Some(descriptions) = req.character_descriptions {
        controller.set_character_descriptions(descriptions);
    }
    StatusCode::NO_CONTENT
}

/// POST /api/package - Generate a new package from a topic or script
pub async fn create_package(
    State(controller): State<Arc<StudioController>>,
    Json(req): Json<CreatePackageRequest>,
) -> Result<Response, ApiError> {
    let (source, format) = match req {
        CreatePackageRequest::Topic { topic, format } => (PackageSource::Topic(topic), format),
        CreatePackageRequest::Script {
            text,
            script_format,
            format,
            character_descriptions,
        } => (
            PackageSource::Script {
                text,
                format: script_format,
                character_descriptions,
            },
            format,
        ),
    };
    controller.create_package(source, format).await?;
    Ok(Json(controller.snapshot()).into_response())
}

/// DELETE /api/package - Discard the session's package
pub async fn clear_package(State(controller): State<Arc<StudioController>>) -> StatusCode {
    controller.clear();
    StatusCode::NO_CONTENT
}

/// POST /api/package/thumbnail/regenerate
pub async fn regenerate_thumbnail(
    State(controller): State<Arc<StudioController>>,
) -> Result<Response, ApiError> {
    controller.regenerate_thumbnail().await?;
    Ok(Json(controller.snapshot()).into_response())
}

/// POST /api/package/thumbnail/edit
pub async fn edit_thumbnail(
    State(controller): State<Arc<StudioController>>,
    Json(req): Json<EditRequest>,
) -> Result<Response, ApiError> {
    edit(controller, EditTarget::Thumbnail, &req.instruction).await
}

/// POST /api/scenes/:index/image - First generation for a scene
pub async fn generate_scene_image(
    State(controller): State<Arc<StudioController>>,
    Path(index): Path<usize>,
) -> Result<Response, ApiError> {
    controller.generate_scene_image(index).await?;
    Ok(Json(controller.snapshot()).into_response())
}

/// POST /api/scenes/:index/regenerate
pub async fn regenerate_scene_image(
    State(controller): State<Arc<StudioController>>,
    Path(index): Path<usize>,
) -> Result<Response, ApiError> {
    controller.regenerate_scene_image(index).await?;
    Ok(Json(controller.snapshot()).into_response())
}

/// POST /api/scenes/:index/edit
pub async fn edit_scene_image(
    State(controller): State<Arc<StudioController>>,
    Path(index): Path<usize>,
    Json(req): Json<EditRequest>,
) -> Result<Response, ApiError> {
    edit(controller, EditTarget::Scene(index), &req.instruction).await
}

/// POST /api/characters/:index/image - Generate a portrait
pub async fn generate_character_image(
    State(controller): State<Arc<StudioController>>,
    Path(index): Path<usize>,
) -> Result<Response, ApiError> {
    controller.generate_character_image(index).await?;
    Ok(Json(controller.snapshot()).into_response())
}

/// POST /api/characters/:index/edit
pub async fn edit_character_image(
    State(controller): State<Arc<StudioController>>,
    Path(index): Path<usize>,
    Json(req): Json<EditRequest>,
) -> Result<Response, ApiError> {
    edit(controller, EditTarget::Character(index), &req.instruction).await
}

/// GET /api/export - Download the package as a zip archive
pub async fn export_package(
    State(controller): State<Arc<StudioController>>,
) -> Result<Response, ApiError> {
    let (file_name, bytes) = controller.export()?;
    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

async fn edit(
    controller: Arc<StudioController>,
    target: EditTarget,
    instruction: &str,
) -> Result<Response, ApiError> {
    let outcome = controller.edit_image(target, instruction).await?;
    Ok(Json(json!({
        "applied": outcome == EditOutcome::Applied,
        "session": controller.snapshot(),
    }))
    .into_response())
}
