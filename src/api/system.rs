use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::api::routes::ApiState;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub status: &'static str,
    /// Wall clock in the display timezone, `dd/mm/yyyy, HH:MM:SS`.
    pub server_time: String,
    pub timezone: String,
    pub uptime_secs: u64,
    pub uptime: String,
    pub database_status: &'static str,
    pub media_count: i64,
    pub promo_count: i64,
    pub rates_last_updated: Option<DateTime<Utc>>,
    pub version: &'static str,
    pub last_sync: DateTime<Utc>,
}

pub async fn get_system_info(State(state): State<ApiState>) -> Result<Json<SystemInfo>, AppError> {
    let now = Utc::now();
    let uptime_secs = state.started_at.elapsed().as_secs();

    let (database_status, media_count, promo_count, rates_last_updated) = match state.store.ping().await {
        Ok(()) => {
            let (media, promos, rates) = tokio::join!(
                state.store.count_media(),
                state.store.count_promos(),
                state.store.current_rates(),
            );
            ("connected", media?, promos?, rates?.map(|r| r.created_date))
        }
        Err(e) => {
            warn!("Database ping failed: {e}");
            ("disconnected", 0, 0, None)
        }
    };

    Ok(Json(SystemInfo {
        status: "online",
        server_time: now.with_timezone(&state.timezone).format("%d/%m/%Y, %H:%M:%S").to_string(),
        timezone: state.timezone.name().to_string(),
        uptime_secs,
        uptime: format_uptime(uptime_secs),
        database_status,
        media_count,
        promo_count,
        rates_last_updated,
        version: env!("CARGO_PKG_VERSION"),
        last_sync: now,
    }))
}

fn format_uptime(secs: u64) -> String {
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let minutes = rem / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m {}s", rem % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::api::routes::tests::{body_json, get, send, test_app};

    #[test]
    fn uptime_formats_by_magnitude() {
        assert_eq!(format_uptime(42), "0m 42s");
        assert_eq!(format_uptime(3_725), "1h 2m");
        assert_eq!(format_uptime(90_061), "1d 1h 1m");
    }

    #[tokio::test]
    async fn reports_counts_and_timezone() {
        let app = test_app().await;
        let res = send(&app, get("/api/system/info")).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body = body_json(res).await;
        assert_eq!(body["status"], "online");
        assert_eq!(body["database_status"], "connected");
        assert_eq!(body["media_count"], 0);
        assert_eq!(body["promo_count"], 0);
        assert!(body["rates_last_updated"].is_null());
        assert_eq!(body["timezone"], "Asia/Kolkata");
        assert_eq!(body["server_time"].as_str().unwrap().len(), "16/10/2026, 10:30:00".len());
    }
}
