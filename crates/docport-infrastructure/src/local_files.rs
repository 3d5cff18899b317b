//! Reading local files selected for upload.

use docport_core::document::UploadFile;
use docport_core::{PortalError, Result};
use std::path::Path;

/// Reads `path` into an [`UploadFile`], guessing the MIME type from the
/// extension.
///
/// # Errors
///
/// - `PortalError::Precondition` if the path is not a regular file
/// - `PortalError::Io` if reading fails
pub async fn read_upload_file(path: &Path) -> Result<UploadFile> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        PortalError::precondition(format!("Cannot open '{}': {}", path.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(PortalError::precondition(format!(
            "'{}' is not a file",
            path.display()
        )));
    }

    let bytes = tokio::fs::read(path).await?;
    let mime = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Ok(UploadFile::new(UploadFile::file_name_of(path), mime, bytes))
}
