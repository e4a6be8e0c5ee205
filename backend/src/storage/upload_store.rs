use chrono::Utc;
use log::info;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No selected file")]
    EmptyFileName,
    #[error("File too large")]
    FileTooLarge,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An upload written to disk, plus what the analyzer needs to name its
/// outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUpload {
    pub file_name: String,
    pub stamp: String,
    pub bytes: Vec<u8>,
}

impl StoredUpload {
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.file_name)
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    upload_dir: PathBuf,
}

impl UploadStore {
    pub const MAX_SIZE: usize = 50 * 1024 * 1024;

    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn calculate_image_hash(image_data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(image_data);
        hex::encode(hasher.finalize())
    }

    /// Keeps ASCII letters, digits, `.` and `_`.
    pub fn sanitize_file_name(file_name: &str) -> String {
        file_name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_'))
            .collect()
    }

    pub fn validate_image_size(image_data: &[u8]) -> Result<(), UploadError> {
        if image_data.len() > Self::MAX_SIZE {
            return Err(UploadError::FileTooLarge);
        }
        Ok(())
    }

    /// Writes the upload as `original_{timestamp}_{safe_name}`.
    pub fn save(&self, file_name: &str, image_data: Vec<u8>) -> Result<StoredUpload, UploadError> {
        if file_name.is_empty() {
            return Err(UploadError::EmptyFileName);
        }
        Self::validate_image_size(&image_data)?;

        let timestamp = Utc::now().timestamp();
        let hash = Self::calculate_image_hash(&image_data);
        let stored_name = format!("original_{}_{}", timestamp, Self::sanitize_file_name(file_name));

        std::fs::write(self.upload_dir.join(&stored_name), &image_data)?;
        info!("Stored upload {} ({} bytes)", stored_name, image_data.len());

        Ok(StoredUpload {
            file_name: stored_name,
            stamp: format!("{}_{}", timestamp, &hash[..12]),
            bytes: image_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_lose_everything_but_safe_characters() {
        assert_eq!(UploadStore::sanitize_file_name("../teluk bay (1).PNG"), "..telukbay1.PNG");
        assert_eq!(UploadStore::sanitize_file_name("mangrove_2024.jpg"), "mangrove_2024.jpg");
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            UploadStore::calculate_image_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let data = vec![0u8; UploadStore::MAX_SIZE + 1];
        assert!(matches!(UploadStore::validate_image_size(&data), Err(UploadError::FileTooLarge)));
    }

    #[test]
    fn save_names_file_and_stamp() {
        let dir = std::env::temp_dir().join(format!("mangrove-upload-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let store = UploadStore::new(&dir);

        let stored = store.save("bay photo.png", b"abc".to_vec()).unwrap();

        assert!(stored.file_name.starts_with("original_"));
        assert!(stored.file_name.ends_with("_bayphoto.png"));
        assert!(stored.stamp.ends_with("_ba7816bf8f01"));
        assert_eq!(stored.url(), format!("/uploads/{}", stored.file_name));
        assert_eq!(std::fs::read(dir.join(&stored.file_name)).unwrap(), b"abc");

        assert!(matches!(store.save("", b"abc".to_vec()), Err(UploadError::EmptyFileName)));
        std::fs::remove_dir_all(dir).ok();
    }
}
