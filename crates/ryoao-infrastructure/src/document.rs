//! Loading contract documents from disk.

use ryoao_core::document::Document;
use ryoao_core::{Result, RyoaoError};
use std::path::Path;

/// Reads a document and guesses its MIME type from the extension.
pub async fn load_document(path: &Path) -> Result<Document> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        RyoaoError::validation(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contract".to_string());
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    tracing::debug!(%file_name, %mime_type, size = bytes.len(), "Loaded document");
    Ok(Document::new(file_name, mime_type, bytes))
}
