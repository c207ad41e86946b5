//! Storage for identity-verification selfies.

use hireline_config::UploadConfig;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SelfieError {
    #[error("selfie upload is empty")]
    Empty,

    #[error("selfie is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("unsupported selfie content type: {0}")]
    UnsupportedType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A selfie written to disk.
#[derive(Debug, Clone)]
pub struct StoredSelfie {
    /// File name relative to the upload directory.
    pub file_name: String,
    /// Hex-encoded SHA-256 of the file contents.
    pub sha256: String,
    pub size: usize,
}

/// Validates and writes selfie images under a single directory.
#[derive(Debug, Clone)]
pub struct SelfieStore {
    dir: PathBuf,
    max_bytes: usize,
    allowed_types: Vec<String>,
}

impl SelfieStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            max_bytes: config.max_bytes,
            allowed_types: config
                .allowed_types
                .iter()
                .map(|t| t.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate and persist a selfie, returning where it was stored.
    pub async fn store(&self, content_type: &str, data: &[u8]) -> Result<StoredSelfie, SelfieError> {
        let content_type = normalize_content_type(content_type);
        if !self.allowed_types.iter().any(|t| *t == content_type) {
            return Err(SelfieError::UnsupportedType(content_type));
        }
        if data.is_empty() {
            return Err(SelfieError::Empty);
        }
        if data.len() > self.max_bytes {
            return Err(SelfieError::TooLarge {
                size: data.len(),
                max: self.max_bytes,
            });
        }

        let file_name = format!("{}.{}", uuid::Uuid::now_v7(), extension_for(&content_type));
        let sha256 = hex::encode(Sha256::digest(data));

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&file_name), data).await?;
        debug!(file = %file_name, size = data.len(), "Stored selfie");

        Ok(StoredSelfie {
            file_name,
            sha256,
            size: data.len(),
        })
    }

    /// Remove a stored selfie. Missing files are not an error.
    pub async fn remove(&self, file_name: &str) -> Result<(), SelfieError> {
        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(file = %file_name, "Selfie already removed");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Strip parameters (`; charset=...`) and lowercase.
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn extension_for(content_type: &str) -> String {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg".to_string(),
        other => {
            let subtype: String = other
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect();
            if subtype.is_empty() {
                "bin".to_string()
            } else {
                subtype
            }
        }
    }
}
