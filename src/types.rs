use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::config::{display_defaults, settings_bounds};

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

/// One set of posted gold/silver prices. Gold is per 10 g, silver per kg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
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
    pub created_date: DateTime<Utc>,
}

/// Sale side only, for consumers that must not see purchase prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRates {
    pub gold_24k_sale: f64,
    pub gold_22k_sale: f64,
    pub gold_18k_sale: f64,
    pub silver_per_kg_sale: f64,
    pub created_date: DateTime<Utc>,
}

impl From<&RateSnapshot> for SaleRates {
    fn from(r: &RateSnapshot) -> Self {
        Self {
            gold_24k_sale: r.gold_24k_sale,
            gold_22k_sale: r.gold_22k_sale,
            gold_18k_sale: r.gold_18k_sale,
            silver_per_kg_sale: r.silver_per_kg_sale,
            created_date: r.created_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewRateSnapshot {
    #[validate(range(min = 0.0))]
    pub gold_24k_sale: f64,
    #[validate(range(min = 0.0))]
    pub gold_24k_purchase: f64,
    #[validate(range(min = 0.0))]
    pub gold_22k_sale: f64,
    #[validate(range(min = 0.0))]
    pub gold_22k_purchase: f64,
    #[validate(range(min = 0.0))]
    pub gold_18k_sale: f64,
    #[validate(range(min = 0.0))]
    pub gold_18k_purchase: f64,
    #[validate(range(min = 0.0))]
    pub silver_per_kg_sale: f64,
    #[validate(range(min = 0.0))]
    pub silver_per_kg_purchase: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RatePatch {
    #[validate(range(min = 0.0))]
    pub gold_24k_sale: Option<f64>,
    #[validate(range(min = 0.0))]
    pub gold_24k_purchase: Option<f64>,
    #[validate(range(min = 0.0))]
    pub gold_22k_sale: Option<f64>,
    #[validate(range(min = 0.0))]
    pub gold_22k_purchase: Option<f64>,
    #[validate(range(min = 0.0))]
    pub gold_18k_sale: Option<f64>,
    #[validate(range(min = 0.0))]
    pub gold_18k_purchase: Option<f64>,
    #[validate(range(min = 0.0))]
    pub silver_per_kg_sale: Option<f64>,
    #[validate(range(min = 0.0))]
    pub silver_per_kg_purchase: Option<f64>,
    pub is_active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Display settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Stored values outside the known set read as the default.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "vertical" => Orientation::Vertical,
            _ => Orientation::Horizontal,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "horizontal"),
            Orientation::Vertical => write!(f, "vertical"),
        }
    }
}

/// Rate number size token. The tier is the numeric step (`text-4xl` is tier 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontSize {
    #[serde(rename = "text-xl")]
    Xl,
    #[serde(rename = "text-2xl")]
    Xl2,
    #[serde(rename = "text-3xl")]
    Xl3,
    #[serde(rename = "text-4xl")]
    Xl4,
    #[serde(rename = "text-5xl")]
    Xl5,
    #[serde(rename = "text-6xl")]
    Xl6,
}

impl FontSize {
    pub fn tier(self) -> u8 {
        match self {
            FontSize::Xl => 1,
            FontSize::Xl2 => 2,
            FontSize::Xl3 => 3,
            FontSize::Xl4 => 4,
            FontSize::Xl5 => 5,
            FontSize::Xl6 => 6,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            FontSize::Xl => "text-xl",
            FontSize::Xl2 => "text-2xl",
            FontSize::Xl3 => "text-3xl",
            FontSize::Xl4 => "text-4xl",
            FontSize::Xl5 => "text-5xl",
            FontSize::Xl6 => "text-6xl",
        }
    }

    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "text-xl" => FontSize::Xl,
            "text-2xl" => FontSize::Xl2,
            "text-3xl" => FontSize::Xl3,
            "text-5xl" => FontSize::Xl5,
            "text-6xl" => FontSize::Xl6,
            _ => FontSize::Xl4,
        }
    }
}

impl Default for FontSize {
    fn default() -> Self {
        FontSize::parse_lenient(display_defaults::RATE_FONT_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// None when these are the built-in defaults rather than a stored row.
    #[serde(default)]
    pub id: Option<i64>,
    pub orientation: Orientation,
    pub background_color: String,
    pub text_color: String,
    pub rate_number_font_size: FontSize,
    pub show_media: bool,
    pub rates_display_duration_seconds: i64,
    pub refresh_interval: i64,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            id: None,
            orientation: Orientation::parse_lenient(display_defaults::ORIENTATION),
            background_color: display_defaults::BACKGROUND_COLOR.to_string(),
            text_color: display_defaults::TEXT_COLOR.to_string(),
            rate_number_font_size: FontSize::default(),
            show_media: display_defaults::SHOW_MEDIA,
            rates_display_duration_seconds: display_defaults::RATES_DISPLAY_DURATION_SECS,
            refresh_interval: display_defaults::REFRESH_INTERVAL_SECS,
            created_date: None,
        }
    }
}

/// Body of both settings create and settings update. Missing fields keep the
/// stored value on update and take the defaults table value on create.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SettingsInput {
    pub orientation: Option<Orientation>,
    #[validate(custom(function = "hex_color"))]
    pub background_color: Option<String>,
    #[validate(custom(function = "hex_color"))]
    pub text_color: Option<String>,
    pub rate_number_font_size: Option<FontSize>,
    pub show_media: Option<bool>,
    #[validate(range(
        min = settings_bounds::RATES_DURATION_MIN_SECS,
        max = settings_bounds::RATES_DURATION_MAX_SECS
    ))]
    pub rates_display_duration_seconds: Option<i64>,
    #[validate(range(min = settings_bounds::REFRESH_MIN_SECS, max = settings_bounds::REFRESH_MAX_SECS))]
    pub refresh_interval: Option<i64>,
}

impl SettingsInput {
    /// Fill every missing field from `base`.
    pub fn merged_onto(self, base: &DisplaySettings) -> DisplaySettings {
        DisplaySettings {
            id: base.id,
            orientation: self.orientation.unwrap_or(base.orientation),
            background_color: self.background_color.unwrap_or_else(|| base.background_color.clone()),
            text_color: self.text_color.unwrap_or_else(|| base.text_color.clone()),
            rate_number_font_size: self.rate_number_font_size.unwrap_or(base.rate_number_font_size),
            show_media: self.show_media.unwrap_or(base.show_media),
            rates_display_duration_seconds: self
                .rates_display_duration_seconds
                .unwrap_or(base.rates_display_duration_seconds),
            refresh_interval: self.refresh_interval.unwrap_or(base.refresh_interval),
            created_date: base.created_date,
        }
    }
}

fn hex_color(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('#').unwrap_or("");
    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color"))
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            MediaType::Image
        } else {
            MediaType::Video
        }
    }

    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "video" => MediaType::Video,
            _ => MediaType::Image,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: i64,
    pub name: String,
    pub file_url: Option<String>,
    pub media_type: MediaType,
    pub duration_seconds: i64,
    pub order_index: i64,
    pub is_active: bool,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MediaPatch {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub file_url: Option<String>,
    pub media_type: Option<MediaType>,
    #[validate(range(min = 1))]
    pub duration_seconds: Option<i64>,
    pub order_index: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaUploadItem {
    pub id: i64,
    pub name: String,
    pub file_data_present: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaUploadResponse {
    pub message: String,
    pub items: Vec<MediaUploadItem>,
}

// ---------------------------------------------------------------------------
// Promo slideshow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionEffect {
    #[default]
    Fade,
    SlideLeft,
    SlideRight,
    ZoomIn,
    ZoomOut,
    FlipX,
    FlipY,
    RotateIn,
    RotateOut,
    Bounce,
}

impl TransitionEffect {
    pub const ALL: [TransitionEffect; 10] = [
        TransitionEffect::Fade,
        TransitionEffect::SlideLeft,
        TransitionEffect::SlideRight,
        TransitionEffect::ZoomIn,
        TransitionEffect::ZoomOut,
        TransitionEffect::FlipX,
        TransitionEffect::FlipY,
        TransitionEffect::RotateIn,
        TransitionEffect::RotateOut,
        TransitionEffect::Bounce,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransitionEffect::Fade => "fade",
            TransitionEffect::SlideLeft => "slide-left",
            TransitionEffect::SlideRight => "slide-right",
            TransitionEffect::ZoomIn => "zoom-in",
            TransitionEffect::ZoomOut => "zoom-out",
            TransitionEffect::FlipX => "flip-x",
            TransitionEffect::FlipY => "flip-y",
            TransitionEffect::RotateIn => "rotate-in",
            TransitionEffect::RotateOut => "rotate-out",
            TransitionEffect::Bounce => "bounce",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == s)
    }

    /// Unknown names fall back to fade.
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

impl std::fmt::Display for TransitionEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoImage {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
    pub duration_seconds: i64,
    pub transition_effect: TransitionEffect,
    pub order_index: i64,
    pub is_active: bool,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PromoPatch {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub image_url: Option<String>,
    #[validate(range(min = 1))]
    pub duration_seconds: Option<i64>,
    pub transition_effect: Option<TransitionEffect>,
    pub order_index: Option<i64>,
    pub is_active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Banner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerSettings {
    pub id: i64,
    pub banner_image_url: Option<String>,
    pub banner_height: i64,
    pub is_active: bool,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerUploadResponse {
    pub banner_image_url: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_follow_defaults_table() {
        let s = DisplaySettings::default();
        assert_eq!(s.orientation, Orientation::Horizontal);
        assert_eq!(s.background_color, "#FFF8E1");
        assert_eq!(s.text_color, "#212529");
        assert_eq!(s.rate_number_font_size.tier(), 4);
        assert!(s.show_media);
        assert_eq!(s.rates_display_duration_seconds, 15);
        assert_eq!(s.refresh_interval, 30);
        assert!(s.id.is_none());
    }

    #[test]
    fn transition_effects_use_kebab_names() {
        let json = serde_json::to_string(&TransitionEffect::SlideLeft).unwrap();
        assert_eq!(json, "\"slide-left\"");
        for effect in TransitionEffect::ALL {
            let parsed: TransitionEffect =
                serde_json::from_str(&format!("\"{}\"", effect.as_str())).unwrap();
            assert_eq!(parsed, effect);
        }
    }

    #[test]
    fn unknown_stored_effect_reads_as_fade() {
        assert_eq!(TransitionEffect::parse_lenient("wipe"), TransitionEffect::Fade);
        assert_eq!(TransitionEffect::parse_lenient("flip-y"), TransitionEffect::FlipY);
    }

    #[test]
    fn font_size_tokens_round_trip_through_serde() {
        let parsed: FontSize = serde_json::from_str("\"text-6xl\"").unwrap();
        assert_eq!(parsed, FontSize::Xl6);
        assert_eq!(parsed.token(), "text-6xl");
        assert!(serde_json::from_str::<FontSize>("\"text-9xl\"").is_err());
    }

    #[test]
    fn settings_input_rejects_bad_color_and_out_of_range_timing() {
        let input = SettingsInput {
            background_color: Some("yellow".to_string()),
            refresh_interval: Some(5),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("background_color"));
        assert!(fields.contains_key("refresh_interval"));

        let ok = SettingsInput {
            background_color: Some("#1a2B3c".to_string()),
            rates_display_duration_seconds: Some(20),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn settings_input_merges_missing_fields_from_base() {
        let base = DisplaySettings::default();
        let merged = SettingsInput {
            orientation: Some(Orientation::Vertical),
            show_media: Some(false),
            ..Default::default()
        }
        .merged_onto(&base);
        assert_eq!(merged.orientation, Orientation::Vertical);
        assert!(!merged.show_media);
        assert_eq!(merged.text_color, base.text_color);
        assert_eq!(merged.refresh_interval, base.refresh_interval);
    }

    #[test]
    fn negative_rate_fails_validation() {
        let rates = NewRateSnapshot {
            gold_24k_sale: -1.0,
            gold_24k_purchase: 1.0,
            gold_22k_sale: 1.0,
            gold_22k_purchase: 1.0,
            gold_18k_sale: 1.0,
            gold_18k_purchase: 1.0,
            silver_per_kg_sale: 1.0,
            silver_per_kg_purchase: 1.0,
        };
        assert!(rates.validate().is_err());
    }

    #[test]
    fn media_type_from_mime() {
        assert_eq!(MediaType::from_mime("image/png"), MediaType::Image);
        assert_eq!(MediaType::from_mime("video/mp4"), MediaType::Video);
    }
}
