use axum::{
    Router,
    routing::{get, post},
    Json,
    extract::{rejection::{JsonRejection, QueryRejection}, Multipart, Query, State, DefaultBodyLimit},
    http::HeaderMap,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::db::{DatabaseOperations, ReviewFields};
use crate::middleware::{authorize, AdminSession};
use crate::models::{AppState, Review, ReviewIdQuery, ReviewListQuery, SaveReviewRequest};
use crate::storage::{ImageUpload, UploadedImage, MAX_IMAGE_BYTES};
use crate::types::{AppError, AppResult};

/// Multipart framing on top of the image itself
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/reviews", get(list_reviews).post(save_review).delete(delete_review))
        .route(
            "/api/upload-image",
            post(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .with_state(state)
}

/// GET /api/reviews - `?active=true` is public, the full list is admin-only
async fn list_reviews(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ReviewListQuery>, QueryRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Query(query) = query?;

    if !query.active {
        authorize(&headers, &state.config.auth)?;
    }

    let reviews: Vec<Review> = DatabaseOperations::list_reviews(&state.pool, query.active).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "reviews": reviews,
    })))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// POST /api/reviews - insert, or update when `id` is present
async fn save_review(
    _admin: AdminSession,
    State(state): State<AppState>,
    payload: Result<Json<SaveReviewRequest>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Json(request) = payload?;

    let image_url = non_blank(&request.image_url)
        .ok_or_else(|| AppError::InvalidRequest("Image is required".to_string()))?;

    let fields = ReviewFields {
        image_url,
        title: non_blank(&request.title),
        text_content: non_blank(&request.text_content),
        display_order: request.display_order.unwrap_or(0),
        is_active: request.is_active,
    };

    let id = match request.id {
        Some(id) => {
            if !DatabaseOperations::update_review(&state.pool, id, &fields).await? {
                return Err(AppError::NotFound(format!("Review {} not found", id)));
            }
            info!(id, "Review updated");
            id
        }
        None => {
            let id = DatabaseOperations::create_review(&state.pool, &fields).await?;
            info!(id, "Review created");
            id
        }
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "id": id,
    })))
}

/// DELETE /api/reviews?id=
async fn delete_review(
    _admin: AdminSession,
    State(state): State<AppState>,
    query: Result<Query<ReviewIdQuery>, QueryRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Query(query) = query?;
    let id = query
        .id
        .ok_or_else(|| AppError::InvalidRequest("Review id is required".to_string()))?;

    if !DatabaseOperations::delete_review(&state.pool, id).await? {
        return Err(AppError::NotFound(format!("Review {} not found", id)));
    }

    info!(id, "Review deleted");

    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    success: bool,
    #[serde(flatten)]
    image: UploadedImage,
}

/// POST /api/upload-image - multipart field `image`
async fn upload_image(
    _admin: AdminSession,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let storage = state
        .storage
        .clone()
        .ok_or_else(|| AppError::Storage("Image storage is not configured".to_string()))?;

    let mut upload: Option<ImageUpload> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(e.body_text()))?;

        upload = Some(ImageUpload {
            file_name,
            content_type,
            data,
        });
        break;
    }

    let upload = upload.ok_or_else(|| AppError::InvalidRequest("Image file is required".to_string()))?;
    let image = storage.upload_image(upload).await?;

    Ok(Json(UploadResponse {
        success: true,
        image,
    }))
}
