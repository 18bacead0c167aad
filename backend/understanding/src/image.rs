//! Loading label images from disk for the vision collaborator.

use std::path::Path;

use shelfscan_core::{LabelImage, ShelfError};
use tracing::debug;

/// Detect an image MIME type by file extension.
///
/// Returns `None` for anything a vision model will not accept.
pub fn detect_image_mime(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// Read an image file into a [`LabelImage`].
pub async fn load_label_image(path: &Path) -> Result<LabelImage, ShelfError> {
    let mime_type = detect_image_mime(path).ok_or_else(|| {
        ShelfError::UnsupportedImage(format!("{} (unknown image extension)", path.display()))
    })?;
    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(ShelfError::UnsupportedImage(format!("{} is empty", path.display())));
    }
    debug!(path = %path.display(), mime = mime_type, size = bytes.len(), "Loaded label image");
    Ok(LabelImage {
        source: path.display().to_string(),
        mime_type: mime_type.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_jpeg_case_insensitively() {
        assert_eq!(detect_image_mime(&PathBuf::from("shelf/IMG_001.JPG")), Some("image/jpeg"));
    }

    #[test]
    fn rejects_non_images() {
        assert_eq!(detect_image_mime(&PathBuf::from("notes.txt")), None);
        assert_eq!(detect_image_mime(&PathBuf::from("no_extension")), None);
    }

    #[tokio::test]
    async fn load_rejects_unknown_extension() {
        let err = load_label_image(&PathBuf::from("label.pdf")).await.unwrap_err();
        assert!(matches!(err, ShelfError::UnsupportedImage(_)));
    }

    #[tokio::test]
    async fn load_reads_bytes() {
        let path = std::env::temp_dir().join(format!("shelfscan-image-{}.png", std::process::id()));
        tokio::fs::write(&path, [0x89, b'P', b'N', b'G']).await.unwrap();
        let image = load_label_image(&path).await.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes.len(), 4);
        let _ = tokio::fs::remove_file(&path).await;
    }
}
