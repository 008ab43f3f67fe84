//! Row types matching `migrations/0001_initial.sql`, and their conversion into
//! the API-facing types. Payload columns are never selected into these rows.

use chrono::{DateTime, Utc};

use crate::types::{
    BannerSettings, DisplaySettings, FontSize, MediaItem, MediaType, Orientation, PromoImage,
    RateSnapshot, TransitionEffect,
};

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

#[derive(Debug, sqlx::FromRow)]
pub struct RateRow {
    pub id: i64,
    pub gold_24k_sale: f64,
    pub gold_24k_purchase: f64,
    pub gold_22k_sale: f64,
    pub gold_22k_purchase: f64,
    pub gold_18k_sale: f64,
    pub gold_18k_purchase: f64,
    pub silver_per_kg_sale: f64,
    pub silver_per_kg_purchase: f64,
    pub is_active: bool,
    pub created_at: i64,
}

impl From<RateRow> for RateSnapshot {
    fn from(r: RateRow) -> Self {
        Self {
            id: r.id,
            gold_24k_sale: r.gold_24k_sale,
            gold_24k_purchase: r.gold_24k_purchase,
            gold_22k_sale: r.gold_22k_sale,
            gold_22k_purchase: r.gold_22k_purchase,
            gold_18k_sale: r.gold_18k_sale,
            gold_18k_purchase: r.gold_18k_purchase,
            silver_per_kg_sale: r.silver_per_kg_sale,
            silver_per_kg_purchase: r.silver_per_kg_purchase,
            is_active: r.is_active,
            created_date: from_millis(r.created_at),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct SettingsRow {
    pub id: i64,
    pub orientation: String,
    pub background_color: String,
    pub text_color: String,
    pub rate_number_font_size: String,
    pub show_media: bool,
    pub rates_display_duration_seconds: i64,
    pub refresh_interval: i64,
    pub created_at: i64,
}

impl From<SettingsRow> for DisplaySettings {
    fn from(r: SettingsRow) -> Self {
        Self {
            id: Some(r.id),
            orientation: Orientation::parse_lenient(&r.orientation),
            background_color: r.background_color,
            text_color: r.text_color,
            rate_number_font_size: FontSize::parse_lenient(&r.rate_number_font_size),
            show_media: r.show_media,
            rates_display_duration_seconds: r.rates_display_duration_seconds,
            refresh_interval: r.refresh_interval,
            created_date: Some(from_millis(r.created_at)),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct MediaRow {
    pub id: i64,
    pub name: String,
    pub file_url: Option<String>,
    pub media_type: String,
    pub duration_seconds: i64,
    pub order_index: i64,
    pub is_active: bool,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub created_at: i64,
}

impl From<MediaRow> for MediaItem {
    fn from(r: MediaRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            file_url: r.file_url,
            media_type: MediaType::parse_lenient(&r.media_type),
            duration_seconds: r.duration_seconds,
            order_index: r.order_index,
            is_active: r.is_active,
            file_size: r.file_size,
            mime_type: r.mime_type,
            created_date: from_millis(r.created_at),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PromoRow {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
    pub duration_seconds: i64,
    pub transition_effect: String,
    pub order_index: i64,
    pub is_active: bool,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub created_at: i64,
}

impl From<PromoRow> for PromoImage {
    fn from(r: PromoRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            image_url: r.image_url,
            duration_seconds: r.duration_seconds,
            transition_effect: TransitionEffect::parse_lenient(&r.transition_effect),
            order_index: r.order_index,
            is_active: r.is_active,
            file_size: r.file_size,
            mime_type: r.mime_type,
            created_date: from_millis(r.created_at),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct BannerRow {
    pub id: i64,
    pub banner_image_url: Option<String>,
    pub banner_height: i64,
    pub is_active: bool,
    pub created_at: i64,
}

impl From<BannerRow> for BannerSettings {
    fn from(r: BannerRow) -> Self {
        Self {
            id: r.id,
            banner_image_url: r.banner_image_url,
            banner_height: r.banner_height,
            is_active: r.is_active,
            created_date: from_millis(r.created_at),
        }
    }
}

/// Stored payload of a media item, promo image, or banner, aliased to common names.
#[derive(Debug, sqlx::FromRow)]
pub struct PayloadRow {
    /// base64 bytes
    pub data: Option<String>,
    /// External location, used when no bytes are stored
    pub url: Option<String>,
    pub mime_type: Option<String>,
}
