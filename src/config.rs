use chrono_tz::Tz;

use crate::error::{AppError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Display clock tick (seconds).
pub const CLOCK_TICK_SECS: u64 = 1;

/// Lower bound for the display poll period, whatever the settings row says.
pub const MIN_POLL_INTERVAL_SECS: u64 = 1;

/// Per-request timeout for the display's data fetches.
pub const FETCH_TIMEOUT_SECS: u64 = 5;

/// Channel capacity for poll results flowing back to the display loop.
pub const CHANNEL_CAPACITY: usize = 16;

/// Longest the display loop blocks on terminal input before re-checking timers.
pub const INPUT_POLL_MS: u64 = 250;

/// Multipart upload limits, mirrored from the admin UI.
pub mod upload_limits {
    pub const MAX_FILES: usize = 10;
    pub const MEDIA_MAX_BYTES: usize = 50 * 1024 * 1024;
    pub const PROMO_MAX_BYTES: usize = 10 * 1024 * 1024;
    pub const BANNER_MAX_BYTES: usize = 5 * 1024 * 1024;

    pub const MEDIA_MIME_TYPES: &[&str] = &[
        "image/jpeg",
        "image/png",
        "image/gif",
        "video/mp4",
        "video/avi",
        "video/mov",
    ];
    pub const PROMO_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];
    pub const BANNER_MIME_TYPES: &[&str] = &["image/jpeg", "image/png"];

    /// Request body ceiling for an upload route: every file at its limit plus form overhead.
    pub const fn body_limit(per_file: usize, files: usize) -> usize {
        per_file * files + 1024 * 1024
    }
}

/// The single table of display defaults. Anything that needs a fallback for a
/// missing settings row or a missing per-item value reads it from here.
pub mod display_defaults {
    pub const ORIENTATION: &str = "horizontal";
    pub const BACKGROUND_COLOR: &str = "#FFF8E1";
    pub const TEXT_COLOR: &str = "#212529";
    pub const RATE_FONT_SIZE: &str = "text-4xl";
    pub const SHOW_MEDIA: bool = true;
    pub const RATES_DISPLAY_DURATION_SECS: i64 = 15;
    pub const REFRESH_INTERVAL_SECS: i64 = 30;
    pub const MEDIA_DURATION_SECS: i64 = 30;
    pub const PROMO_DURATION_SECS: i64 = 5;
    pub const PROMO_TRANSITION: &str = "fade";
    pub const BANNER_HEIGHT_PX: i64 = 120;
}

/// Admin-form bounds enforced on settings writes.
pub mod settings_bounds {
    pub const REFRESH_MIN_SECS: i64 = 10;
    pub const REFRESH_MAX_SECS: i64 = 300;
    pub const RATES_DURATION_MIN_SECS: i64 = 5;
    pub const RATES_DURATION_MAX_SECS: i64 = 60;
}

/// Backend configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Timezone used for server-side timestamps shown to the admin (DISPLAY_TIMEZONE)
    pub timezone: Tz,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "rate-board.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            timezone: timezone_from_env()?,
        })
    }
}

/// TV display client configuration.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub api_url: String,
    pub timezone: Tz,
    pub log_level: String,
    /// Log destination (LOG_FILE). The terminal is owned by the UI, so no file means no logs.
    pub log_file: Option<String>,
}

impl DisplayConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_url: std::env::var("API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timezone: timezone_from_env()?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_file: std::env::var("LOG_FILE").ok().filter(|s| !s.is_empty()),
        })
    }
}

/// Sale-rate webhook pusher configuration.
#[derive(Debug, Clone)]
pub struct PusherConfig {
    pub webhook_url: String,
    pub local_base_url: String,
    pub interval_secs: u64,
    pub log_level: String,
}

impl PusherConfig {
    pub fn from_env() -> Result<Self> {
        let webhook_url = std::env::var("RATES_WEBHOOK_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::Config("RATES_WEBHOOK_URL is not set".to_string()))?;

        let interval_secs = std::env::var("INTERVAL_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|_| AppError::Config("INTERVAL_SECONDS must be a whole number".to_string()))?;
        if interval_secs == 0 {
            return Err(AppError::Config("INTERVAL_SECONDS must be at least 1".to_string()));
        }

        Ok(Self {
            webhook_url,
            local_base_url: std::env::var("LOCAL_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LOCAL_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            interval_secs,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn timezone_from_env() -> Result<Tz> {
    let name = std::env::var("DISPLAY_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());
    parse_timezone(&name)
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| AppError::Config(format!("DISPLAY_TIMEZONE {name:?} is not a known timezone: {e}")))
}
