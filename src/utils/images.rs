use std::path::{Component, Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use tokio::fs;
use uuid::Uuid;

use crate::errors::ServiceError;

const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Decoded `data:image/<ext>;base64,<payload>` value
#[derive(Debug, PartialEq)]
pub struct DecodedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

pub fn decode_data_uri(data: &str) -> Result<DecodedImage, ServiceError> {
    let invalid = |reason: &str| ServiceError::ValidationError(format!("Invalid image: {}", reason));

    let rest = data
        .trim()
        .strip_prefix("data:image/")
        .ok_or_else(|| invalid("expected a data:image/... URI"))?;
    let (extension, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| invalid("expected base64 encoded content"))?;

    let extension = extension.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(invalid(&format!("unsupported format '{}'", extension)));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| invalid("content is not valid base64"))?;
    if bytes.is_empty() {
        return Err(invalid("content is empty"));
    }

    Ok(DecodedImage { extension, bytes })
}

/// Uploaded files live under `root`; the database keeps paths relative to it.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Decodes `data` and writes it to `<root>/<subdir>/<uuid>.<ext>`, returning the relative path
    pub async fn save_data_uri(&self, subdir: &str, data: &str) -> Result<String, ServiceError> {
        let image = decode_data_uri(data)?;
        let relative = format!("{}/{}.{}", subdir, Uuid::new_v4(), image.extension);
        let target = self.root.join(&relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ServiceError::InternalError(format!("Failed to prepare media directory: {}", e))
            })?;
        }
        fs::write(&target, &image.bytes).await.map_err(|e| {
            ServiceError::InternalError(format!("Failed to store image: {}", e))
        })?;

        debug!("Stored {} bytes at {}", image.bytes.len(), target.display());
        Ok(relative)
    }

    /// Reads a stored file, `None` if it does not exist or the path escapes the root
    pub async fn read(&self, relative: &str) -> Result<Option<Vec<u8>>, ServiceError> {
        if !is_safe_relative(relative) {
            return Ok(None);
        }
        match fs::read(self.root.join(relative)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServiceError::InternalError(format!(
                "Failed to read media file: {}",
                e
            ))),
        }
    }

    /// Removes a stored file; a file that is already gone is fine
    pub async fn delete(&self, relative: &str) {
        if !is_safe_relative(relative) {
            warn!("Refusing to delete media path '{}'", relative);
            return;
        }
        let target = self.root.join(relative);
        match fs::remove_file(&target).await {
            Ok(()) => debug!("Deleted {}", target.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to delete {}: {}", target.display(), e),
        }
    }
}

/// MIME type for a stored file, by extension
pub fn content_type_for(relative: &str) -> &'static str {
    let extension = Path::new(relative)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn is_safe_relative(relative: &str) -> bool {
    let path = Path::new(relative);
    !relative.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[test]
    fn test_decode_data_uri() {
        let image = decode_data_uri(PIXEL).unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(&image.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(decode_data_uri("").is_err());
        assert!(decode_data_uri("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(decode_data_uri("data:image/png,raw").is_err());
        assert!(decode_data_uri("data:image/exe;base64,aGVsbG8=").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
        assert!(decode_data_uri("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("users/a.PNG"), "image/png");
        assert_eq!(content_type_for("recipes/images/b.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("notes.txt"), "application/octet-stream");
    }

    #[test]
    fn test_is_safe_relative() {
        assert!(is_safe_relative("recipes/images/a.png"));
        assert!(!is_safe_relative("../etc/passwd"));
        assert!(!is_safe_relative("/etc/passwd"));
        assert!(!is_safe_relative(""));
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let root = std::env::temp_dir().join(format!("recipe-share-test-{}", Uuid::new_v4()));
        let store = ImageStore::new(&root);

        let relative = store.save_data_uri("recipes/images", PIXEL).await.unwrap();
        assert!(relative.starts_with("recipes/images/"));
        assert!(relative.ends_with(".png"));
        assert!(root.join(&relative).exists());

        let bytes = store.read(&relative).await.unwrap().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert!(store.read("../secret.png").await.unwrap().is_none());

        store.delete(&relative).await;
        assert!(!root.join(&relative).exists());
        assert!(store.read(&relative).await.unwrap().is_none());
        // second delete is a no-op
        store.delete(&relative).await;

        let _ = std::fs::remove_dir_all(&root);
    }
}
