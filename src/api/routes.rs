use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono_tz::Tz;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use validator::Validate;

use crate::api::{media, system};
use crate::config::upload_limits::{body_limit, BANNER_MAX_BYTES, MAX_FILES, MEDIA_MAX_BYTES, PROMO_MAX_BYTES};
use crate::db::SignageStore;
use crate::error::AppError;
use crate::types::{DisplaySettings, NewRateSnapshot, RatePatch, RateSnapshot, SaleRates, SettingsInput};

#[derive(Clone)]
pub struct ApiState {
    pub store: SignageStore,
    pub started_at: Instant,
    pub timezone: Tz,
}

impl ApiState {
    pub fn new(store: SignageStore, timezone: Tz) -> Self {
        Self { store, started_at: Instant::now(), timezone }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/rates/current", get(get_current_rates))
        .route("/api/rates/sale", get(get_sale_rates))
        .route("/api/rates", post(create_rates))
        .route("/api/rates/:id", put(update_rates))
        .route("/api/settings/display", get(get_display_settings).post(create_display_settings).put(upsert_display_settings))
        .route("/api/settings/display/:id", put(upsert_display_settings))
        .route("/api/media", get(media::list_media))
        .route(
            "/api/media/upload",
            post(media::upload_media).layer(DefaultBodyLimit::max(body_limit(MEDIA_MAX_BYTES, MAX_FILES))),
        )
        .route("/api/media/:id", put(media::update_media).delete(media::delete_media))
        .route("/api/media/:id/file", get(media::media_file))
        .route("/api/promo", get(media::list_promos))
        .route(
            "/api/promo/upload",
            post(media::upload_promos).layer(DefaultBodyLimit::max(body_limit(PROMO_MAX_BYTES, MAX_FILES))),
        )
        .route("/api/promo/:id", put(media::update_promo).delete(media::delete_promo))
        .route("/api/promo/:id/file", get(media::promo_file))
        .route("/api/banner", get(media::get_banner))
        .route(
            "/api/banner/upload",
            post(media::upload_banner).layer(DefaultBodyLimit::max(body_limit(BANNER_MAX_BYTES, 1))),
        )
        .route("/api/banner/:id/file", get(media::banner_file))
        .route("/api/system/info", get(system::get_system_info))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub active: Option<String>,
}

impl ListQuery {
    /// `?active=true` narrows the list; any other value lists everything.
    pub fn active_only(query: Result<Query<ListQuery>, QueryRejection>) -> Result<bool, AppError> {
        let Query(q) = query?;
        Ok(q.active.as_deref() == Some("true"))
    }
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

async fn get_current_rates(State(state): State<ApiState>) -> Result<Json<Option<RateSnapshot>>, AppError> {
    Ok(Json(state.store.current_rates().await?))
}

async fn get_sale_rates(State(state): State<ApiState>) -> Result<Json<Option<SaleRates>>, AppError> {
    let rates = state.store.current_rates().await?;
    Ok(Json(rates.as_ref().map(SaleRates::from)))
}

async fn create_rates(
    State(state): State<ApiState>,
    body: Result<Json<NewRateSnapshot>, JsonRejection>,
) -> Result<(StatusCode, Json<RateSnapshot>), AppError> {
    let Json(rates) = body?;
    rates.validate().map_err(|e| AppError::invalid("Invalid rate data", e))?;

    let created = state.store.create_rates(&rates).await?;
    info!(
        event = "RATES_POSTED",
        id = created.id,
        gold_24k_sale = created.gold_24k_sale,
        silver_per_kg_sale = created.silver_per_kg_sale,
        "New rate snapshot {} is now active",
        created.id,
    );
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_rates(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    body: Result<Json<RatePatch>, JsonRejection>,
) -> Result<Json<RateSnapshot>, AppError> {
    let Json(patch) = body?;
    patch.validate().map_err(|e| AppError::invalid("Invalid rate data", e))?;

    state
        .store
        .update_rates(id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Rate snapshot not found".to_string()))
}

// ---------------------------------------------------------------------------
// Display settings
// ---------------------------------------------------------------------------

/// Latest settings, or `{}` when none have been saved.
async fn get_display_settings(State(state): State<ApiState>) -> Result<Json<serde_json::Value>, AppError> {
    let body = match state.store.display_settings().await? {
        Some(settings) => serde_json::to_value(settings)?,
        None => serde_json::json!({}),
    };
    Ok(Json(body))
}

async fn create_display_settings(
    State(state): State<ApiState>,
    body: Result<Json<SettingsInput>, JsonRejection>,
) -> Result<(StatusCode, Json<DisplaySettings>), AppError> {
    let Json(input) = body?;
    input.validate().map_err(|e| AppError::invalid("Invalid settings data", e))?;

    let created = state.store.create_settings(input).await?;
    info!(event = "SETTINGS_CREATED", id = ?created.id, "Display settings created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Serves both `/api/settings/display` and `/api/settings/display/:id`; the
/// latest row is always the one updated.
async fn upsert_display_settings(
    State(state): State<ApiState>,
    body: Result<Json<SettingsInput>, JsonRejection>,
) -> Result<Json<DisplaySettings>, AppError> {
    let Json(input) = body?;
    input.validate().map_err(|e| AppError::invalid("Invalid settings data", e))?;

    let saved = state.store.upsert_settings(input).await?;
    info!(
        event = "SETTINGS_SAVED",
        id = ?saved.id,
        orientation = %saved.orientation,
        show_media = saved.show_media,
        "Display settings saved",
    );
    Ok(Json(saved))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
