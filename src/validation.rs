//! Boundary checks applied to caller input before any external call.

use crate::{Error, Result};
use url::Url;

pub const MAX_PROMPT_CHARS: usize = 500;
pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_TEMPLATE_PROMPT_CHARS: usize = 1000;

/// Require a non-empty string of at most `max` characters (not bytes).
pub fn bounded_text(field: &str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    let len = value.chars().count();
    if len > max {
        return Err(Error::validation(
            field,
            format!("must be at most {} characters (got {})", max, len),
        ));
    }
    Ok(())
}

pub fn prompt(field: &str, value: &str) -> Result<()> {
    bounded_text(field, value, MAX_PROMPT_CHARS)
}

pub fn api_key(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation("apiKey", "API key is required"));
    }
    Ok(())
}

/// Require a well-formed http(s) URL.
pub fn http_url(field: &str, raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|e| Error::validation(field, format!("invalid URL: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(Error::validation(
            field,
            format!("unsupported URL scheme '{}'", scheme),
        )),
    }
}

pub fn limit(value: i64) -> Result<u32> {
    if value <= 0 {
        return Err(Error::validation("limit", "must be a positive integer"));
    }
    Ok(u32::try_from(value).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: Error) -> String {
        match err {
            Error::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_prompt_rejects_empty_and_blank() {
        assert_eq!(field_of(prompt("prompt", "").unwrap_err()), "prompt");
        assert_eq!(
            field_of(prompt("editPrompt", "   ").unwrap_err()),
            "editPrompt"
        );
    }

    #[test]
    fn test_prompt_counts_characters_not_bytes() {
        let wide = "鞋".repeat(MAX_PROMPT_CHARS);
        assert!(prompt("prompt", &wide).is_ok());

        let too_long = "a".repeat(MAX_PROMPT_CHARS + 1);
        assert!(prompt("prompt", &too_long).is_err());
    }

    #[test]
    fn test_http_url() {
        assert!(http_url("imageUrl", "https://cdn.example.com/a.png").is_ok());
        assert_eq!(
            field_of(http_url("imageUrl", "not a url").unwrap_err()),
            "imageUrl"
        );
        assert!(http_url("imageUrl", "ftp://example.com/a.png").is_err());
    }

    #[test]
    fn test_limit() {
        assert_eq!(limit(20).unwrap(), 20);
        assert!(limit(0).is_err());
        assert!(limit(-3).is_err());
    }

    #[test]
    fn test_api_key() {
        assert!(api_key("sk-or-123").is_ok());
        assert_eq!(field_of(api_key("").unwrap_err()), "apiKey");
    }
}
