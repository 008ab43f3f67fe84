use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::{BannerRow, MediaRow, PayloadRow, PromoRow, RateRow, SettingsRow};
use crate::error::Result;
use crate::types::{
    BannerSettings, DisplaySettings, MediaItem, MediaPatch, MediaType, NewRateSnapshot, PromoImage,
    PromoPatch, RatePatch, RateSnapshot, SettingsInput, TransitionEffect,
};

const RATE_COLUMNS: &str = "id, gold_24k_sale, gold_24k_purchase, gold_22k_sale, gold_22k_purchase, \
     gold_18k_sale, gold_18k_purchase, silver_per_kg_sale, silver_per_kg_purchase, is_active, created_at";

const SETTINGS_COLUMNS: &str = "id, orientation, background_color, text_color, rate_number_font_size, \
     show_media, rates_display_duration_seconds, refresh_interval, created_at";

const MEDIA_COLUMNS: &str = "id, name, file_url, media_type, duration_seconds, order_index, is_active, \
     file_size, mime_type, created_at";

const PROMO_COLUMNS: &str = "id, name, image_url, duration_seconds, transition_effect, order_index, \
     is_active, file_size, mime_type, created_at";

const BANNER_COLUMNS: &str = "id, banner_image_url, banner_height, is_active, created_at";

pub fn media_file_url(id: i64) -> String {
    format!("/api/media/{id}/file")
}

pub fn promo_file_url(id: i64) -> String {
    format!("/api/promo/{id}/file")
}

pub fn banner_file_url(id: i64) -> String {
    format!("/api/banner/{id}/file")
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A media upload ready to persist. `data` is base64.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub name: String,
    pub data: String,
    pub media_type: MediaType,
    pub duration_seconds: i64,
    pub order_index: i64,
    pub is_active: bool,
    pub file_size: i64,
    pub mime_type: String,
}

/// A promo upload ready to persist. `data` is base64.
#[derive(Debug, Clone)]
pub struct NewPromo {
    pub name: String,
    pub data: String,
    pub duration_seconds: i64,
    pub transition_effect: TransitionEffect,
    pub order_index: i64,
    pub is_active: bool,
    pub file_size: i64,
    pub mime_type: String,
}

/// All reads and writes of the signage tables.
#[derive(Clone)]
pub struct SignageStore {
    pool: SqlitePool,
}

impl SignageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Rates
    // -----------------------------------------------------------------------

    pub async fn current_rates(&self) -> Result<Option<RateSnapshot>> {
        let row = sqlx::query_as::<_, RateRow>(&format!(
            "SELECT {RATE_COLUMNS} FROM gold_rates WHERE is_active = 1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Insert a snapshot and make it the only active one.
    pub async fn create_rates(&self, rates: &NewRateSnapshot) -> Result<RateSnapshot> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE gold_rates SET is_active = 0 WHERE is_active = 1")
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, RateRow>(&format!(
            "INSERT INTO gold_rates (gold_24k_sale, gold_24k_purchase, gold_22k_sale, gold_22k_purchase, \
             gold_18k_sale, gold_18k_purchase, silver_per_kg_sale, silver_per_kg_purchase, is_active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?) RETURNING {RATE_COLUMNS}"
        ))
        .bind(rates.gold_24k_sale)
        .bind(rates.gold_24k_purchase)
        .bind(rates.gold_22k_sale)
        .bind(rates.gold_22k_purchase)
        .bind(rates.gold_18k_sale)
        .bind(rates.gold_18k_purchase)
        .bind(rates.silver_per_kg_sale)
        .bind(rates.silver_per_kg_purchase)
        .bind(now_ms())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Partial update. Re-activating a snapshot deactivates every other one,
    /// so at most one snapshot is ever active.
    pub async fn update_rates(&self, id: i64, patch: &RatePatch) -> Result<Option<RateSnapshot>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RateRow>(&format!(
            "UPDATE gold_rates SET \
             gold_24k_sale = COALESCE(?, gold_24k_sale), \
             gold_24k_purchase = COALESCE(?, gold_24k_purchase), \
             gold_22k_sale = COALESCE(?, gold_22k_sale), \
             gold_22k_purchase = COALESCE(?, gold_22k_purchase), \
             gold_18k_sale = COALESCE(?, gold_18k_sale), \
             gold_18k_purchase = COALESCE(?, gold_18k_purchase), \
             silver_per_kg_sale = COALESCE(?, silver_per_kg_sale), \
             silver_per_kg_purchase = COALESCE(?, silver_per_kg_purchase), \
             is_active = COALESCE(?, is_active) \
             WHERE id = ? RETURNING {RATE_COLUMNS}"
        ))
        .bind(patch.gold_24k_sale)
        .bind(patch.gold_24k_purchase)
        .bind(patch.gold_22k_sale)
        .bind(patch.gold_22k_purchase)
        .bind(patch.gold_18k_sale)
        .bind(patch.gold_18k_purchase)
        .bind(patch.silver_per_kg_sale)
        .bind(patch.silver_per_kg_purchase)
        .bind(patch.is_active)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        if patch.is_active == Some(true) {
            sqlx::query("UPDATE gold_rates SET is_active = 0 WHERE id != ? AND is_active = 1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(row.into()))
    }

    // -----------------------------------------------------------------------
    // Display settings
    // -----------------------------------------------------------------------

    /// The most recently created settings row.
    pub async fn display_settings(&self) -> Result<Option<DisplaySettings>> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM display_settings ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    pub async fn create_settings(&self, input: SettingsInput) -> Result<DisplaySettings> {
        let settings = input.merged_onto(&DisplaySettings::default());
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            "INSERT INTO display_settings (orientation, background_color, text_color, rate_number_font_size, \
             show_media, rates_display_duration_seconds, refresh_interval, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {SETTINGS_COLUMNS}"
        ))
        .bind(settings.orientation.to_string())
        .bind(&settings.background_color)
        .bind(&settings.text_color)
        .bind(settings.rate_number_font_size.token())
        .bind(settings.show_media)
        .bind(settings.rates_display_duration_seconds)
        .bind(settings.refresh_interval)
        .bind(now_ms())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    /// Apply `input` to the latest settings row, or create one from the
    /// defaults table when none exists.
    pub async fn upsert_settings(&self, input: SettingsInput) -> Result<DisplaySettings> {
        let Some(existing) = self.display_settings().await? else {
            return self.create_settings(input).await;
        };
        let Some(id) = existing.id else {
            return self.create_settings(input).await;
        };

        let merged = input.merged_onto(&existing);
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            "UPDATE display_settings SET orientation = ?, background_color = ?, text_color = ?, \
             rate_number_font_size = ?, show_media = ?, rates_display_duration_seconds = ?, \
             refresh_interval = ? WHERE id = ? RETURNING {SETTINGS_COLUMNS}"
        ))
        .bind(merged.orientation.to_string())
        .bind(&merged.background_color)
        .bind(&merged.text_color)
        .bind(merged.rate_number_font_size.token())
        .bind(merged.show_media)
        .bind(merged.rates_display_duration_seconds)
        .bind(merged.refresh_interval)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    // -----------------------------------------------------------------------
    // Media
    // -----------------------------------------------------------------------

    pub async fn list_media(&self, active_only: bool) -> Result<Vec<MediaItem>> {
        let filter = if active_only { "WHERE is_active = 1" } else { "" };
        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media_items {filter} ORDER BY order_index ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn max_media_order(&self) -> Result<i64> {
        let max: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(order_index), 0) FROM media_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(max)
    }

    pub async fn count_media(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Store an uploaded item and point its `file_url` at the serving endpoint.
    pub async fn create_media(&self, item: &NewMedia) -> Result<MediaItem> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO media_items (name, file_data, media_type, duration_seconds, order_index, is_active, \
             file_size, mime_type, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&item.name)
        .bind(&item.data)
        .bind(item.media_type.to_string())
        .bind(item.duration_seconds)
        .bind(item.order_index)
        .bind(item.is_active)
        .bind(item.file_size)
        .bind(&item.mime_type)
        .bind(now_ms())
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "UPDATE media_items SET file_url = ? WHERE id = ? RETURNING {MEDIA_COLUMNS}"
        ))
        .bind(media_file_url(id))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    pub async fn update_media(&self, id: i64, patch: &MediaPatch) -> Result<Option<MediaItem>> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "UPDATE media_items SET \
             name = COALESCE(?, name), \
             file_url = COALESCE(?, file_url), \
             media_type = COALESCE(?, media_type), \
             duration_seconds = COALESCE(?, duration_seconds), \
             order_index = COALESCE(?, order_index), \
             is_active = COALESCE(?, is_active) \
             WHERE id = ? RETURNING {MEDIA_COLUMNS}"
        ))
        .bind(patch.name.as_deref())
        .bind(patch.file_url.as_deref())
        .bind(patch.media_type.map(|t| t.to_string()))
        .bind(patch.duration_seconds)
        .bind(patch.order_index)
        .bind(patch.is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    pub async fn delete_media(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn media_payload(&self, id: i64) -> Result<Option<PayloadRow>> {
        let row = sqlx::query_as::<_, PayloadRow>(
            "SELECT file_data AS data, file_url AS url, mime_type FROM media_items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // -----------------------------------------------------------------------
    // Promo images
    // -----------------------------------------------------------------------

    pub async fn list_promos(&self, active_only: bool) -> Result<Vec<PromoImage>> {
        let filter = if active_only { "WHERE is_active = 1" } else { "" };
        let rows = sqlx::query_as::<_, PromoRow>(&format!(
            "SELECT {PROMO_COLUMNS} FROM promo_images {filter} ORDER BY order_index ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn max_promo_order(&self) -> Result<i64> {
        let max: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(order_index), 0) FROM promo_images")
            .fetch_one(&self.pool)
            .await?;
        Ok(max)
    }

    pub async fn count_promos(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM promo_images")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn create_promo(&self, promo: &NewPromo) -> Result<PromoImage> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO promo_images (name, image_data, duration_seconds, transition_effect, order_index, \
             is_active, file_size, mime_type, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&promo.name)
        .bind(&promo.data)
        .bind(promo.duration_seconds)
        .bind(promo.transition_effect.as_str())
        .bind(promo.order_index)
        .bind(promo.is_active)
        .bind(promo.file_size)
        .bind(&promo.mime_type)
        .bind(now_ms())
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, PromoRow>(&format!(
            "UPDATE promo_images SET image_url = ? WHERE id = ? RETURNING {PROMO_COLUMNS}"
        ))
        .bind(promo_file_url(id))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    pub async fn update_promo(&self, id: i64, patch: &PromoPatch) -> Result<Option<PromoImage>> {
        let row = sqlx::query_as::<_, PromoRow>(&format!(
            "UPDATE promo_images SET \
             name = COALESCE(?, name), \
             image_url = COALESCE(?, image_url), \
             duration_seconds = COALESCE(?, duration_seconds), \
             transition_effect = COALESCE(?, transition_effect), \
             order_index = COALESCE(?, order_index), \
             is_active = COALESCE(?, is_active) \
             WHERE id = ? RETURNING {PROMO_COLUMNS}"
        ))
        .bind(patch.name.as_deref())
        .bind(patch.image_url.as_deref())
        .bind(patch.duration_seconds)
        .bind(patch.transition_effect.map(|e| e.as_str()))
        .bind(patch.order_index)
        .bind(patch.is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    pub async fn delete_promo(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM promo_images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn promo_payload(&self, id: i64) -> Result<Option<PayloadRow>> {
        let row = sqlx::query_as::<_, PayloadRow>(
            "SELECT image_data AS data, image_url AS url, mime_type FROM promo_images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // -----------------------------------------------------------------------
    // Banner
    // -----------------------------------------------------------------------

    /// The most recent active banner.
    pub async fn banner(&self) -> Result<Option<BannerSettings>> {
        let row = sqlx::query_as::<_, BannerRow>(&format!(
            "SELECT {BANNER_COLUMNS} FROM banner_settings WHERE is_active = 1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Replace the active banner's image, or create the banner row if there is none.
    pub async fn save_banner(&self, data: &str, mime_type: &str, height: Option<i64>) -> Result<BannerSettings> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM banner_settings WHERE is_active = 1 ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?;

        let id = match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE banner_settings SET banner_image_data = ?, mime_type = ?, \
                     banner_height = COALESCE(?, banner_height), is_active = 1 WHERE id = ?",
                )
                .bind(data)
                .bind(mime_type)
                .bind(height)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => {
                sqlx::query_scalar(
                    "INSERT INTO banner_settings (banner_image_data, mime_type, banner_height, is_active, created_at) \
                     VALUES (?, ?, COALESCE(?, ?), 1, ?) RETURNING id",
                )
                .bind(data)
                .bind(mime_type)
                .bind(height)
                .bind(crate::config::display_defaults::BANNER_HEIGHT_PX)
                .bind(now_ms())
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let row = sqlx::query_as::<_, BannerRow>(&format!(
            "UPDATE banner_settings SET banner_image_url = ? WHERE id = ? RETURNING {BANNER_COLUMNS}"
        ))
        .bind(banner_file_url(id))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    pub async fn banner_payload(&self, id: i64) -> Result<Option<PayloadRow>> {
        let row = sqlx::query_as::<_, PayloadRow>(
            "SELECT banner_image_data AS data, banner_image_url AS url, mime_type FROM banner_settings WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_memory;
    use crate::types::Orientation;

    fn rates(base: f64) -> NewRateSnapshot {
        NewRateSnapshot {
            gold_24k_sale: base,
            gold_24k_purchase: base - 500.0,
            gold_22k_sale: base - 1000.0,
            gold_22k_purchase: base - 1500.0,
            gold_18k_sale: base - 2000.0,
            gold_18k_purchase: base - 2500.0,
            silver_per_kg_sale: 92000.0,
            silver_per_kg_purchase: 90000.0,
        }
    }

    fn media(name: &str, order_index: i64, is_active: bool) -> NewMedia {
        NewMedia {
            name: name.to_string(),
            data: "aGVsbG8=".to_string(),
            media_type: MediaType::Image,
            duration_seconds: 30,
            order_index,
            is_active,
            file_size: 5,
            mime_type: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn creating_rates_deactivates_previous_snapshot() {
        let store = SignageStore::new(connect_memory().await.unwrap());
        assert!(store.current_rates().await.unwrap().is_none());

        let first = store.create_rates(&rates(74000.0)).await.unwrap();
        let second = store.create_rates(&rates(74850.0)).await.unwrap();
        assert_ne!(first.id, second.id);

        let current = store.current_rates().await.unwrap().unwrap();
        assert_eq!(current.id, second.id);
        assert_eq!(current.gold_24k_sale, 74850.0);

        let active: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM gold_rates WHERE is_active = 1")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn rate_patch_touches_only_given_fields() {
        let store = SignageStore::new(connect_memory().await.unwrap());
        let created = store.create_rates(&rates(74000.0)).await.unwrap();

        let patch = RatePatch { gold_22k_sale: Some(68000.0), ..Default::default() };
        let updated = store.update_rates(created.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.gold_22k_sale, 68000.0);
        assert_eq!(updated.gold_24k_sale, 74000.0);

        assert!(store.update_rates(created.id + 100, &patch).await.unwrap().is_none());
    }

    async fn active_count(store: &SignageStore) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM gold_rates WHERE is_active = 1")
            .fetch_one(&store.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn reactivating_old_snapshot_deactivates_current_one() {
        let store = SignageStore::new(connect_memory().await.unwrap());
        let first = store.create_rates(&rates(74000.0)).await.unwrap();
        let second = store.create_rates(&rates(74850.0)).await.unwrap();

        let patch = RatePatch { is_active: Some(true), ..Default::default() };
        let updated = store.update_rates(first.id, &patch).await.unwrap().unwrap();
        assert!(updated.is_active);
        assert_eq!(active_count(&store).await, 1);

        let current = store.current_rates().await.unwrap().unwrap();
        assert_eq!(current.id, first.id);
        assert_ne!(current.id, second.id);
    }

    #[tokio::test]
    async fn patching_missing_snapshot_leaves_active_one_alone() {
        let store = SignageStore::new(connect_memory().await.unwrap());
        let created = store.create_rates(&rates(74850.0)).await.unwrap();

        let patch = RatePatch { is_active: Some(true), ..Default::default() };
        assert!(store.update_rates(created.id + 100, &patch).await.unwrap().is_none());
        assert_eq!(active_count(&store).await, 1);
        assert_eq!(store.current_rates().await.unwrap().unwrap().id, created.id);
    }

    #[tokio::test]
    async fn settings_upsert_creates_then_updates_latest_row() {
        let store = SignageStore::new(connect_memory().await.unwrap());
        assert!(store.display_settings().await.unwrap().is_none());

        let created = store
            .upsert_settings(SettingsInput { show_media: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert!(!created.show_media);
        assert_eq!(created.background_color, "#FFF8E1");
        assert_eq!(created.rates_display_duration_seconds, 15);

        let updated = store
            .upsert_settings(SettingsInput { orientation: Some(Orientation::Vertical), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.orientation, Orientation::Vertical);
        assert!(!updated.show_media, "unspecified fields keep stored values");
    }

    #[tokio::test]
    async fn newest_settings_row_wins() {
        let store = SignageStore::new(connect_memory().await.unwrap());
        store.create_settings(SettingsInput { refresh_interval: Some(60), ..Default::default() }).await.unwrap();
        let newer = store
            .create_settings(SettingsInput { refresh_interval: Some(20), ..Default::default() })
            .await
            .unwrap();

        let current = store.display_settings().await.unwrap().unwrap();
        assert_eq!(current.id, newer.id);
        assert_eq!(current.refresh_interval, 20);
    }

    #[tokio::test]
    async fn media_listing_is_ordered_and_filters_inactive() {
        let store = SignageStore::new(connect_memory().await.unwrap());
        store.create_media(&media("third", 3, true)).await.unwrap();
        store.create_media(&media("first", 1, true)).await.unwrap();
        store.create_media(&media("hidden", 2, false)).await.unwrap();

        let active = store.list_media(true).await.unwrap();
        let names: Vec<_> = active.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["first", "third"]);

        assert_eq!(store.list_media(false).await.unwrap().len(), 3);
        assert_eq!(store.max_media_order().await.unwrap(), 3);
        assert_eq!(store.count_media().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn created_media_points_at_its_file_endpoint() {
        let store = SignageStore::new(connect_memory().await.unwrap());
        let item = store.create_media(&media("ad", 1, true)).await.unwrap();
        assert_eq!(item.file_url.as_deref(), Some(media_file_url(item.id).as_str()));

        let payload = store.media_payload(item.id).await.unwrap().unwrap();
        assert_eq!(payload.data.as_deref(), Some("aGVsbG8="));
        assert_eq!(payload.mime_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn media_update_and_delete_report_missing_rows() {
        let store = SignageStore::new(connect_memory().await.unwrap());
        let item = store.create_media(&media("ad", 1, true)).await.unwrap();

        let patch = MediaPatch { is_active: Some(false), duration_seconds: Some(12), ..Default::default() };
        let updated = store.update_media(item.id, &patch).await.unwrap().unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.duration_seconds, 12);
        assert_eq!(updated.name, "ad");

        assert!(store.update_media(999, &patch).await.unwrap().is_none());
        assert!(store.delete_media(item.id).await.unwrap());
        assert!(!store.delete_media(item.id).await.unwrap());
    }

    #[tokio::test]
    async fn promo_effect_survives_storage() {
        let store = SignageStore::new(connect_memory().await.unwrap());
        let promo = store
            .create_promo(&NewPromo {
                name: "diwali".to_string(),
                data: "aGVsbG8=".to_string(),
                duration_seconds: 5,
                transition_effect: TransitionEffect::RotateOut,
                order_index: 1,
                is_active: true,
                file_size: 5,
                mime_type: "image/jpeg".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(promo.transition_effect, TransitionEffect::RotateOut);
        assert_eq!(promo.image_url.as_deref(), Some(promo_file_url(promo.id).as_str()));

        let patch = PromoPatch { transition_effect: Some(TransitionEffect::Bounce), ..Default::default() };
        let updated = store.update_promo(promo.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.transition_effect, TransitionEffect::Bounce);
    }

    #[tokio::test]
    async fn banner_upload_creates_then_replaces() {
        let store = SignageStore::new(connect_memory().await.unwrap());
        assert!(store.banner().await.unwrap().is_none());

        let created = store.save_banner("AAAA", "image/png", None).await.unwrap();
        assert_eq!(created.banner_height, 120);
        assert_eq!(created.banner_image_url.as_deref(), Some(banner_file_url(created.id).as_str()));

        let replaced = store.save_banner("BBBB", "image/jpeg", Some(90)).await.unwrap();
        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.banner_height, 90);

        let payload = store.banner_payload(created.id).await.unwrap().unwrap();
        assert_eq!(payload.data.as_deref(), Some("BBBB"));
        assert_eq!(payload.mime_type.as_deref(), Some("image/jpeg"));
    }
}
