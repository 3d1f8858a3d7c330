use std::path::Path;

use color_probe_application::{ApplicationError, FileStore, UploadProbe};
use color_probe_domain::media_type_for_path;

#[derive(Debug, Default)]
pub struct FsFileStore;

impl FileStore for FsFileStore {
    fn probe(&self, path: &Path) -> Result<UploadProbe, ApplicationError> {
        if !path.is_file() {
            return Err(ApplicationError::Io(format!(
                "file does not exist or is not a regular file: {}",
                path.display()
            )));
        }
        let canonical = path
            .canonicalize()
            .map_err(|error| ApplicationError::Io(error.to_string()))?;
        let metadata = path
            .metadata()
            .map_err(|error| ApplicationError::Io(error.to_string()))?;

        Ok(UploadProbe {
            media_type: media_type_for_path(path).map(|media_type| media_type.to_string()),
            byte_size: metadata.len(),
            canonical_path: canonical,
        })
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, ApplicationError> {
        std::fs::read(path).map_err(|error| ApplicationError::Io(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn probe_reports_declared_type_and_size() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("swatch.png");
        let pixels = ImageBuffer::from_pixel(4, 4, Rgb([200_u8, 100_u8, 50_u8]));
        pixels.save(&path).expect("save png");

        let store = FsFileStore;
        let probe = store.probe(&path).expect("probe");
        assert_eq!(probe.media_type.as_deref(), Some("image/png"));
        assert_eq!(probe.byte_size, path.metadata().expect("metadata").len());
        assert!(probe.canonical_path.ends_with("swatch.png"));
    }

    #[test]
    fn probe_leaves_media_type_empty_for_unknown_extension() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"not an image").expect("write");

        let store = FsFileStore;
        let probe = store.probe(&path).expect("probe");
        assert_eq!(probe.media_type, None);
    }

    #[test]
    fn probe_fails_for_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsFileStore;
        let result = store.probe(&dir.path().join("missing.png"));
        assert!(matches!(result, Err(ApplicationError::Io(_))));
    }

    #[test]
    fn read_bytes_round_trips_file_content() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("blob.webp");
        std::fs::write(&path, [1_u8, 2, 3, 4]).expect("write");

        let store = FsFileStore;
        let bytes = store.read_bytes(&path).expect("read");
        assert_eq!(bytes, vec![1, 2, 3, 4]);
    }
}
