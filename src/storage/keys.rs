//! Storage key derivation.
//!
//! Keys never embed caller-supplied file names: object stores reject many
//! non-ASCII keys, so only a generated stem and a sanitized extension are
//! used.

use crate::ids;
use crate::models::ImageOperation;

const DEFAULT_UPLOAD_EXTENSION: &str = "jpg";
const MAX_EXTENSION_LEN: usize = 8;

pub fn normalize_key(key: &str) -> &str {
    key.trim_start_matches('/')
}

/// Key for an embedded upstream image, e.g. `images/generated/<stem>.png`.
pub fn rehost_key(operation: ImageOperation, extension: &str) -> String {
    format!(
        "{}/{}.{}",
        operation.key_namespace(),
        ids::unique_stem(),
        extension
    )
}

/// Key for a user upload, e.g. `images/<user>/<stem>.jpg`.
pub fn upload_key(user_id: &str, file_name: &str) -> String {
    format!(
        "images/{}/{}.{}",
        sanitize_segment(user_id),
        ids::unique_stem(),
        file_extension(file_name)
    )
}

/// Lowercase ASCII extension of `file_name`, or `jpg` when it has none
/// usable.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| DEFAULT_UPLOAD_EXTENSION.to_string())
}

fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_strips_leading_slashes() {
        assert_eq!(normalize_key("///images/a.png"), "images/a.png");
        assert_eq!(normalize_key("images/a.png"), "images/a.png");
    }

    #[test]
    fn test_rehost_key_namespaces() {
        let generated = rehost_key(ImageOperation::Generate, "png");
        assert!(generated.starts_with("images/generated/"));
        assert!(generated.ends_with(".png"));

        let edited = rehost_key(ImageOperation::Edit, "webp");
        assert!(edited.starts_with("images/edited/"));
        assert!(edited.ends_with(".webp"));
    }

    #[test]
    fn test_upload_key_never_contains_original_name() {
        let key = upload_key("user_42", "新品连衣裙照片.PNG");
        assert!(key.starts_with("images/user_42/"));
        assert!(key.ends_with(".png"));
        assert!(key.is_ascii());
        assert!(!key.contains("连衣裙"));

        let file = key.rsplit('/').next().unwrap();
        let stem = file.strip_suffix(".png").unwrap();
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert!(millis.chars().all(|c| c.is_ascii_digit()));
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_file_extension_fallbacks() {
        assert_eq!(file_extension("photo.JPEG"), "jpeg");
        assert_eq!(file_extension("no-extension"), "jpg");
        assert_eq!(file_extension("照片"), "jpg");
        assert_eq!(file_extension("archive.图片"), "jpg");
        assert_eq!(file_extension("trailing."), "jpg");
    }

    #[test]
    fn test_upload_key_sanitizes_user_segment() {
        let key = upload_key("../evil user", "a.png");
        assert!(key.starts_with("images/eviluser/"));
    }
}
