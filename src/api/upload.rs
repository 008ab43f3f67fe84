//! Multipart form parsing shared by the media, promo and banner upload routes.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

use crate::error::{AppError, Result};

/// Per-route acceptance rules for uploaded files.
#[derive(Debug, Clone, Copy)]
pub struct UploadRules {
    /// Form field carrying the files.
    pub file_field: &'static str,
    pub max_files: usize,
    pub max_bytes: usize,
    pub mime_types: &'static [&'static str],
    /// Used in the rejection message, e.g. "images and videos".
    pub accepted_label: &'static str,
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> i64 {
        self.bytes.len() as i64
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Read every part. Files are checked against `rules` as they arrive;
    /// other text parts are kept as plain fields.
    pub async fn read(mut multipart: Multipart, rules: UploadRules) -> Result<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let Some(field_name) = field.name().map(str::to_string) else {
                continue;
            };

            if field_name != rules.file_field {
                let value = field.text().await.map_err(|e| AppError::BadRequest(e.body_text()))?;
                form.fields.insert(field_name, value);
                continue;
            }

            if form.files.len() >= rules.max_files {
                return Err(AppError::BadRequest(format!(
                    "Too many files. At most {} per upload.",
                    rules.max_files
                )));
            }

            let name = field.file_name().unwrap_or("upload").to_string();
            let mime_type = field.content_type().unwrap_or("application/octet-stream").to_string();
            if !rules.mime_types.contains(&mime_type.as_str()) {
                return Err(AppError::BadRequest(format!(
                    "Invalid file type. Only {} are allowed.",
                    rules.accepted_label
                )));
            }

            let bytes = field.bytes().await.map_err(|e| AppError::BadRequest(e.body_text()))?;
            if bytes.len() > rules.max_bytes {
                return Err(AppError::BadRequest(format!(
                    "File {name} is too large. Limit is {} MB.",
                    rules.max_bytes / (1024 * 1024)
                )));
            }

            form.files.push(UploadedFile { name, mime_type, bytes });
        }

        Ok(form)
    }

    /// A positive whole number of seconds, else `default`.
    pub fn duration_or(&self, key: &str, default: i64) -> i64 {
        match self.fields.get(key).map(|v| v.trim().parse::<i64>()) {
            Some(Ok(v)) if v > 0 => v,
            Some(_) => {
                warn!(field = key, "Ignoring unusable duration, using {default}s");
                default
            }
            None => default,
        }
    }

    /// Checkbox-style flag: only the literal "true" turns it on.
    pub fn flag(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|v| v == "true")
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> UploadForm {
        UploadForm {
            files: Vec::new(),
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn duration_falls_back_on_missing_zero_or_garbage() {
        assert_eq!(form(&[]).duration_or("duration_seconds", 30), 30);
        assert_eq!(form(&[("duration_seconds", "0")]).duration_or("duration_seconds", 30), 30);
        assert_eq!(form(&[("duration_seconds", "ten")]).duration_or("duration_seconds", 30), 30);
        assert_eq!(form(&[("duration_seconds", " 12 ")]).duration_or("duration_seconds", 30), 12);
    }

    #[test]
    fn only_literal_true_activates() {
        assert!(form(&[("autoActivate", "true")]).flag("autoActivate"));
        assert!(!form(&[("autoActivate", "on")]).flag("autoActivate"));
        assert!(!form(&[]).flag("autoActivate"));
    }

    #[test]
    fn base64_encodes_raw_bytes() {
        let file = UploadedFile {
            name: "a.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"hello"),
        };
        assert_eq!(file.to_base64(), "aGVsbG8=");
        assert_eq!(file.size(), 5);
    }
}
