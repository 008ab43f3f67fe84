//! Media, promo image and banner endpoints: listing, multipart uploads,
//! partial updates, and serving stored payloads.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{error, info, warn};
use validator::Validate;

use crate::api::routes::{ApiState, ListQuery};
use crate::api::upload::{UploadForm, UploadRules};
use crate::config::display_defaults;
use crate::config::upload_limits::{
    BANNER_MAX_BYTES, BANNER_MIME_TYPES, MAX_FILES, MEDIA_MAX_BYTES, MEDIA_MIME_TYPES, PROMO_MAX_BYTES,
    PROMO_MIME_TYPES,
};
use crate::db::models::PayloadRow;
use crate::db::store::{banner_file_url, media_file_url, promo_file_url, NewMedia, NewPromo};
use crate::error::AppError;
use crate::types::{
    BannerSettings, BannerUploadResponse, MediaItem, MediaPatch, MediaType, MediaUploadItem,
    MediaUploadResponse, MessageResponse, PromoImage, PromoPatch, TransitionEffect,
};

const MEDIA_RULES: UploadRules = UploadRules {
    file_field: "files",
    max_files: MAX_FILES,
    max_bytes: MEDIA_MAX_BYTES,
    mime_types: MEDIA_MIME_TYPES,
    accepted_label: "images and videos",
};

const PROMO_RULES: UploadRules = UploadRules {
    file_field: "files",
    max_files: MAX_FILES,
    max_bytes: PROMO_MAX_BYTES,
    mime_types: PROMO_MIME_TYPES,
    accepted_label: "images",
};

const BANNER_RULES: UploadRules = UploadRules {
    file_field: "banner",
    max_files: 1,
    max_bytes: BANNER_MAX_BYTES,
    mime_types: BANNER_MIME_TYPES,
    accepted_label: "JPEG and PNG images",
};

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

pub async fn list_media(
    State(state): State<ApiState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<MediaItem>>, AppError> {
    let active_only = ListQuery::active_only(query)?;
    Ok(Json(state.store.list_media(active_only).await?))
}

pub async fn upload_media(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MediaUploadResponse>), AppError> {
    let form = UploadForm::read(multipart, MEDIA_RULES).await?;
    if form.files.is_empty() {
        return Err(AppError::BadRequest("No files uploaded".to_string()));
    }

    let duration = form.duration_or("duration_seconds", display_defaults::MEDIA_DURATION_SECS);
    let is_active = form.flag("autoActivate");
    let mut next_order = state.store.max_media_order().await? + 1;
    let mut items = Vec::with_capacity(form.files.len());

    for file in &form.files {
        if file.bytes.is_empty() {
            warn!(name = %file.name, "Skipping empty media upload");
            continue;
        }

        let new = NewMedia {
            name: file.name.clone(),
            data: file.to_base64(),
            media_type: MediaType::from_mime(&file.mime_type),
            duration_seconds: duration,
            order_index: next_order,
            is_active,
            file_size: file.size(),
            mime_type: file.mime_type.clone(),
        };

        match state.store.create_media(&new).await {
            Ok(item) => {
                info!(
                    event = "MEDIA_UPLOADED",
                    id = item.id,
                    name = %item.name,
                    media_type = %item.media_type,
                    bytes = new.file_size,
                    active = item.is_active,
                    "Stored media item {}",
                    item.id,
                );
                next_order += 1;
                items.push(MediaUploadItem { id: item.id, name: item.name, file_data_present: true });
            }
            Err(e) => error!(name = %file.name, "Failed to store media upload: {e}"),
        }
    }

    if items.is_empty() {
        return Err(AppError::Internal("Failed to upload any files".to_string()));
    }

    Ok((
        StatusCode::CREATED,
        Json(MediaUploadResponse { message: "Files uploaded successfully".to_string(), items }),
    ))
}

pub async fn update_media(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    body: Result<Json<MediaPatch>, JsonRejection>,
) -> Result<Json<MediaItem>, AppError> {
    let Json(patch) = body?;
    patch.validate().map_err(|e| AppError::invalid("Invalid media data", e))?;

    state
        .store
        .update_media(id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Media item not found".to_string()))
}

pub async fn delete_media(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_media(id).await? {
        return Err(AppError::NotFound("Media item not found".to_string()));
    }
    info!(event = "MEDIA_DELETED", id, "Deleted media item {id}");
    Ok(Json(MessageResponse::new("Media item deleted successfully")))
}

pub async fn media_file(State(state): State<ApiState>, Path(id): Path<i64>) -> Result<Response, AppError> {
    let payload = state.store.media_payload(id).await?;
    serve_payload(payload, &media_file_url(id))
}

// ---------------------------------------------------------------------------
// Promo images
// ---------------------------------------------------------------------------

pub async fn list_promos(
    State(state): State<ApiState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<PromoImage>>, AppError> {
    let active_only = ListQuery::active_only(query)?;
    Ok(Json(state.store.list_promos(active_only).await?))
}

pub async fn upload_promos(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<PromoImage>>), AppError> {
    let form = UploadForm::read(multipart, PROMO_RULES).await?;
    if form.files.is_empty() {
        return Err(AppError::BadRequest("No files uploaded".to_string()));
    }

    let duration = form.duration_or("duration_seconds", display_defaults::PROMO_DURATION_SECS);
    let transition = match form.text("transition") {
        Some(raw) => TransitionEffect::parse(raw).unwrap_or_else(|| {
            warn!(transition = raw, "Unknown transition effect, using fade");
            TransitionEffect::default()
        }),
        None => TransitionEffect::default(),
    };
    let is_active = form.flag("autoActivate");
    let mut next_order = state.store.max_promo_order().await? + 1;
    let mut created = Vec::with_capacity(form.files.len());

    for file in &form.files {
        if file.bytes.is_empty() {
            warn!(name = %file.name, "Skipping empty promo upload");
            continue;
        }

        let new = NewPromo {
            name: file.name.clone(),
            data: file.to_base64(),
            duration_seconds: duration,
            transition_effect: transition,
            order_index: next_order,
            is_active,
            file_size: file.size(),
            mime_type: file.mime_type.clone(),
        };

        match state.store.create_promo(&new).await {
            Ok(promo) => {
                info!(
                    event = "PROMO_UPLOADED",
                    id = promo.id,
                    name = %promo.name,
                    transition = %promo.transition_effect,
                    duration_seconds = promo.duration_seconds,
                    "Stored promo image {}",
                    promo.id,
                );
                next_order += 1;
                created.push(promo);
            }
            Err(e) => error!(name = %file.name, "Failed to store promo upload: {e}"),
        }
    }

    if created.is_empty() {
        return Err(AppError::Internal("Failed to upload any files".to_string()));
    }

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_promo(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    body: Result<Json<PromoPatch>, JsonRejection>,
) -> Result<Json<PromoImage>, AppError> {
    let Json(patch) = body?;
    patch.validate().map_err(|e| AppError::invalid("Invalid promo data", e))?;

    state
        .store
        .update_promo(id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Promo image not found".to_string()))
}

pub async fn delete_promo(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_promo(id).await? {
        return Err(AppError::NotFound("Promo image not found".to_string()));
    }
    info!(event = "PROMO_DELETED", id, "Deleted promo image {id}");
    Ok(Json(MessageResponse::new("Promo image deleted successfully")))
}

pub async fn promo_file(State(state): State<ApiState>, Path(id): Path<i64>) -> Result<Response, AppError> {
    let payload = state.store.promo_payload(id).await?;
    serve_payload(payload, &promo_file_url(id))
}

// ---------------------------------------------------------------------------
// Banner
// ---------------------------------------------------------------------------

pub async fn get_banner(State(state): State<ApiState>) -> Result<Json<Option<BannerSettings>>, AppError> {
    Ok(Json(state.store.banner().await?))
}

pub async fn upload_banner(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<BannerUploadResponse>), AppError> {
    let form = UploadForm::read(multipart, BANNER_RULES).await?;
    let Some(file) = form.files.first().filter(|f| !f.bytes.is_empty()) else {
        return Err(AppError::BadRequest("No banner file uploaded".to_string()));
    };

    let height = match form.text("banner_height").map(|v| v.trim().parse::<i64>()) {
        Some(Ok(h)) if h > 0 => Some(h),
        Some(_) => {
            warn!("Ignoring unusable banner_height");
            None
        }
        None => None,
    };

    let banner = state.store.save_banner(&file.to_base64(), &file.mime_type, height).await?;
    info!(
        event = "BANNER_UPLOADED",
        id = banner.id,
        height = banner.banner_height,
        bytes = file.size(),
        "Banner image saved",
    );

    Ok((
        StatusCode::CREATED,
        Json(BannerUploadResponse {
            banner_image_url: banner.banner_image_url,
            message: "Banner uploaded successfully".to_string(),
        }),
    ))
}

pub async fn banner_file(State(state): State<ApiState>, Path(id): Path<i64>) -> Result<Response, AppError> {
    let payload = state.store.banner_payload(id).await?;
    serve_payload(payload, &banner_file_url(id))
}

// ---------------------------------------------------------------------------
// Payload serving
// ---------------------------------------------------------------------------

/// Stored bytes win; otherwise redirect to an external location. A URL that
/// points back at `self_url` is never followed.
fn serve_payload(payload: Option<PayloadRow>, self_url: &str) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound("File not found".to_string());
    let payload = payload.ok_or_else(not_found)?;

    if let Some(data) = payload.data.as_deref().filter(|d| !d.is_empty()) {
        let bytes = STANDARD
            .decode(data)
            .map_err(|e| AppError::Internal(format!("Stored file is corrupt: {e}")))?;
        let mime = payload.mime_type.unwrap_or_else(|| "image/jpeg".to_string());
        return Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response());
    }

    match payload.url {
        Some(url) if !url.is_empty() && url != self_url => Ok(Redirect::temporary(&url).into_response()),
        _ => Err(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
