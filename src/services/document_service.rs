use anyhow::Result;
use bytes::Bytes;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::models::AthleteDocument;

const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

/// Stores athlete documents (medical forms, photo consent) on local disk
/// and their metadata in the database.
#[derive(Clone)]
pub struct DocumentService {
    db: PgPool,
    upload_dir: PathBuf,
}

impl DocumentService {
    pub fn new(db: PgPool, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            upload_dir: upload_dir.into(),
        }
    }

    /// Persist one uploaded document; None when the athlete is unknown.
    pub async fn save(
        &self,
        athlete_id: Uuid,
        filename: &str,
        content_type: &str,
        data: Bytes,
        uploaded_by: Option<Uuid>,
    ) -> Result<Option<AthleteDocument>> {
        let athlete_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM athletes WHERE id = $1)",
        )
        .bind(athlete_id)
        .fetch_one(&self.db)
        .await?;

        if !athlete_exists {
            return Ok(None);
        }

        let extension = file_extension(filename).unwrap_or("bin");
        let stored_name = format!("{}_{}.{}", athlete_id, Uuid::new_v4(), extension);
        let stored_path = self.upload_dir.join(&stored_name);
        let stored_path_str = stored_path.to_string_lossy().into_owned();

        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::write(&stored_path, &data).await?;

        let document = sqlx::query_as::<_, AthleteDocument>(
            r#"
            INSERT INTO athlete_documents
                (athlete_id, filename, stored_path, content_type, size_bytes, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(athlete_id)
        .bind(filename)
        .bind(stored_path_str)
        .bind(content_type)
        .bind(data.len() as i64)
        .bind(uploaded_by)
        .fetch_one(&self.db)
        .await?;

        Ok(Some(document))
    }

    pub async fn list(&self, athlete_id: Uuid) -> Result<Vec<AthleteDocument>> {
        let documents = sqlx::query_as::<_, AthleteDocument>(
            "SELECT * FROM athlete_documents WHERE athlete_id = $1 ORDER BY created_at DESC",
        )
        .bind(athlete_id)
        .fetch_all(&self.db)
        .await?;

        Ok(documents)
    }
}

/// Request-level checks before touching disk or database.
pub fn validate_document(filename: &str, content_type: &str, size: usize) -> Result<(), String> {
    if size == 0 {
        return Err("File is empty".to_string());
    }
    if size > MAX_DOCUMENT_BYTES {
        return Err(format!(
            "File exceeds the {} MB limit",
            MAX_DOCUMENT_BYTES / (1024 * 1024)
        ));
    }

    let Some(extension) = file_extension(filename) else {
        return Err("File has no extension".to_string());
    };
    if !ALLOWED_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
        return Err(format!(
            "File type '.{}' is not allowed (allowed: {})",
            extension,
            ALLOWED_EXTENSIONS.join(", ")
        ));
    }

    if content_type.parse::<mime::Mime>().is_err() {
        return Err(format!("Invalid content type '{}'", content_type));
    }

    Ok(())
}

fn file_extension(filename: &str) -> Option<&str> {
    Path::new(filename).extension().and_then(|ext| ext.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_document() {
        assert!(validate_document("consent.pdf", "application/pdf", 1024).is_ok());
        assert!(validate_document("photo.JPG", "image/jpeg", 1024).is_ok());

        assert!(validate_document("empty.pdf", "application/pdf", 0).is_err());
        assert!(validate_document("malware.exe", "application/octet-stream", 1024).is_err());
        assert!(validate_document("noextension", "application/pdf", 1024).is_err());
        assert!(
            validate_document("big.pdf", "application/pdf", MAX_DOCUMENT_BYTES + 1).is_err()
        );
    }
}
