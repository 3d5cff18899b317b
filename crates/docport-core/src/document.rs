//! Uploaded documents as reported by `/files/me`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// Server-assigned document identifier.
///
/// The portal may send ids as JSON numbers or strings; both are kept as the
/// text that goes into `DELETE /files/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => DocumentId(n.to_string()),
            RawId::Text(s) => DocumentId(s),
        })
    }
}

/// A document owned by the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
}

/// A local file selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// File name component of `path`, or `"upload"` when it has none.
    pub fn file_name_of(path: &Path) -> String {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string()
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("filename", &self.filename)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_accepts_numbers_and_strings() {
        let docs: Vec<Document> = serde_json::from_str(
            r#"[{"id": 42, "filename": "report.pdf"},
                {"id": "b7c1", "filename": "notes.txt", "uploaded_at": "2024-01-01"}]"#,
        )
        .unwrap();

        assert_eq!(docs[0].id, DocumentId::new("42"));
        assert_eq!(docs[0].id.to_string(), "42");
        assert_eq!(docs[1].id.as_str(), "b7c1");
        assert_eq!(docs[1].filename, "notes.txt");
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(
            UploadFile::file_name_of(Path::new("/tmp/report.pdf")),
            "report.pdf"
        );
        assert_eq!(UploadFile::file_name_of(Path::new("/")), "upload");
    }
}
