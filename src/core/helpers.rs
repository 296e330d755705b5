use ammonia::Builder;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;
use rand::rngs::OsRng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use spin_sdk::http::Response;
use uuid::Uuid;

use crate::core::errors::{ApiError, ApiResult};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn validate_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Strips all markup, leaving plain text. Entities ammonia escapes on the
/// way out are decoded again so `&` and `<` survive as typed.
pub fn sanitize_text(text: &str) -> String {
    let cleaned = Builder::default()
        .tags(std::collections::HashSet::new())
        .clean(text.trim())
        .to_string();
    decode_html_entities(&cleaned).trim().to_string()
}

/// Validates a required free-text field and returns its sanitized form.
/// Both checks run on the text that will actually be stored.
pub fn required_text(field: &str, value: &str, max_len: usize) -> ApiResult<String> {
    let clean = sanitize_text(value);
    if clean.is_empty() {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    if clean.chars().count() > max_len {
        return Err(ApiError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(clean)
}

pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    if body.is_empty() {
        return Ok(serde_json::from_slice(b"{}")?);
    }
    Ok(serde_json::from_slice(body)?)
}

pub fn json_response<T: Serialize>(status: u16, value: &T) -> anyhow::Result<Response> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(value)?)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("password123").unwrap();
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("password124", &hash));
        assert!(!verify_password("password123", "not-a-phc-string"));
    }

    #[test]
    fn sanitize_strips_markup() {
        assert_eq!(sanitize_text("<b>hi</b> there"), "hi there");
        assert_eq!(sanitize_text("<script>alert(1)</script>ok"), "ok");
    }

    #[test]
    fn sanitize_keeps_ampersands_and_angle_brackets() {
        assert_eq!(sanitize_text("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(sanitize_text("Tom & Jerry <3"), "Tom & Jerry <3");
        assert_eq!(sanitize_text("1 < 2 > 0"), "1 < 2 > 0");
    }

    #[test]
    fn length_bound_applies_to_the_stored_text() {
        let at_limit = "&".repeat(1000);
        assert_eq!(required_text("Content", &at_limit, 1000).unwrap(), at_limit);

        let over = format!("a{}", "&".repeat(1000));
        assert!(matches!(
            required_text("Content", &over, 1000),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn required_text_rejects_blank_and_oversized() {
        assert!(matches!(
            required_text("Text", "   ", 10),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            required_text("Text", &"a".repeat(11), 10),
            Err(ApiError::Validation(_))
        ));
        assert_eq!(required_text("Text", " hello ", 10).unwrap(), "hello");
    }

    #[test]
    fn uuid_validation() {
        assert!(validate_uuid(&new_id()));
        assert!(!validate_uuid("123"));
    }
}
