/// Upload encoder
///
/// Converts a user-picked file into the transport form the edit service
/// expects: the file's full bytes as standard base64, plus its media type.
/// The media type must be `image/*` or the upload is rejected before any
/// byte is read.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::task;

use crate::state::data::SelectedImage;

/// Upload failures, worded exactly as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadError {
    /// The picked file is not an image type
    #[error("Please select a valid image file.")]
    NotAnImage,
    /// The file could not be read or decoded
    #[error("Failed to read the image file.")]
    ReadFailed,
}

/// Media type for a picked file, if it is an image.
pub fn media_type_for(path: &Path) -> Option<String> {
    let mime = mime_guess::from_path(path).first()?;
    (mime.type_() == mime_guess::mime::IMAGE).then(|| mime.essence_str().to_string())
}

/// Read and encode the file behind `path`.
///
/// The read is the single suspension point; decoding and encoding are CPU
/// work and run on the blocking pool.
pub async fn read_image(path: PathBuf) -> Result<SelectedImage, UploadError> {
    let media_type = media_type_for(&path).ok_or(UploadError::NotAnImage)?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| UploadError::ReadFailed)?;

    task::spawn_blocking(move || {
        // A file that does not decode as an image counts as unreadable.
        image::load_from_memory(&bytes).map_err(|_| UploadError::ReadFailed)?;

        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let payload = encode_payload(&bytes);

        Ok(SelectedImage {
            path,
            filename,
            media_type,
            payload,
            bytes,
        })
    })
    .await
    .map_err(|_| UploadError::ReadFailed)?
}

/// Standard base64 of the raw bytes, no data-URI prefix.
fn encode_payload(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    // No drivers needed: reads go through the blocking pool.
    fn block_on<F: Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_media_type_for_images() {
        assert_eq!(
            media_type_for(Path::new("photo.png")).as_deref(),
            Some("image/png")
        );
        assert_eq!(
            media_type_for(Path::new("upload/Photo.JPG")).as_deref(),
            Some("image/jpeg")
        );
    }

    #[test]
    fn test_media_type_rejects_non_images() {
        assert_eq!(media_type_for(Path::new("notes.txt")), None);
        assert_eq!(media_type_for(Path::new("movie.mp4")), None);
        assert_eq!(media_type_for(Path::new("no_extension")), None);
    }

    #[test]
    fn test_encode_payload_is_prefix_free_base64() {
        let payload = encode_payload(b"hello");
        assert_eq!(payload, "aGVsbG8=");
        assert!(!payload.starts_with("data:"));
    }

    #[test]
    fn test_read_image_encodes_a_real_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        image::RgbImage::new(2, 2).save(&path).unwrap();

        let selected = block_on(read_image(path.clone())).unwrap();

        assert_eq!(selected.path, path);
        assert_eq!(selected.filename, "pixel.png");
        assert_eq!(selected.media_type, "image/png");
        assert!(!selected.payload.is_empty());
        assert!(!selected.payload.starts_with("data:"));
        assert_eq!(selected.payload, encode_payload(&selected.bytes));
    }

    #[test]
    fn test_read_image_rejects_wrong_type_before_reading() {
        // The path does not exist; rejection must come from the type
        // check, not from the read.
        let result = block_on(read_image(PathBuf::from("missing/notes.txt")));
        assert_eq!(result, Err(UploadError::NotAnImage));
    }

    #[test]
    fn test_read_image_missing_file() {
        let result = block_on(read_image(PathBuf::from("missing/photo.png")));
        assert_eq!(result, Err(UploadError::ReadFailed));
    }

    #[test]
    fn test_read_image_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"this is not a png").unwrap();

        let result = block_on(read_image(path));
        assert_eq!(result, Err(UploadError::ReadFailed));
    }
}
