//! Storage for KYC scans and tenant photos.
//!
//! Files land flat in the configured upload directory and are referenced
//! from tenant rows by filename only.

use anyhow::Context;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::UploadConfig;
use crate::domain::error::{DomainError, DomainResult};

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "png", "pdf"];
const ALLOWED_TYPE_MARKERS: [&str; 4] = ["jpeg", "jpg", "png", "pdf"];

#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_file_bytes: usize,
}

impl UploadStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            max_file_bytes: config.max_file_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", self.dir.display()))
    }

    /// Check and write one uploaded file, returning the stored filename
    pub async fn save(
        &self,
        field: &str,
        client_filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> DomainResult<String> {
        let extension = Self::accepted_extension(client_filename, content_type).ok_or_else(|| {
            warn!("Rejected upload {} ({}) for {}", client_filename, content_type, field);
            DomainError::invalid(field, "Only image and PDF files are allowed!")
        })?;

        if bytes.len() > self.max_file_bytes {
            warn!("Rejected upload {} for {}: {} bytes", client_filename, field, bytes.len());
            return Err(DomainError::invalid(
                field,
                format!(
                    "File too large, the limit is {} MB",
                    self.max_file_bytes / (1024 * 1024)
                ),
            ));
        }

        let filename = Self::stored_name(field, &extension);
        self.ensure_dir().await?;
        tokio::fs::write(self.dir.join(&filename), bytes)
            .await
            .with_context(|| format!("Failed to write upload {}", filename))?;

        info!("Stored {} upload as {} ({} bytes)", field, filename, bytes.len());
        Ok(filename)
    }

    /// Best-effort removal of files stored for a request that then failed
    pub async fn discard(&self, filenames: &[String]) {
        for name in filenames {
            if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
                warn!("Failed to remove orphaned upload {}: {}", name, e);
            }
        }
    }

    /// Extension and declared type must both name an image or PDF format
    fn accepted_extension(client_filename: &str, content_type: &str) -> Option<String> {
        let extension = Path::new(client_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)?;

        let content_type = content_type.to_ascii_lowercase();
        let type_ok = ALLOWED_TYPE_MARKERS.iter().any(|m| content_type.contains(m));

        (ALLOWED_EXTENSIONS.contains(&extension.as_str()) && type_ok).then_some(extension)
    }

    fn stored_name(field: &str, extension: &str) -> String {
        let suffix = uuid::Uuid::new_v4().as_u128() % 1_000_000_000;
        format!("{}-{}-{}.{}", field, Utc::now().timestamp_millis(), suffix, extension)
    }
}
