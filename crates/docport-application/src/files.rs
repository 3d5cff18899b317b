//! File Manager View: the user's uploaded documents.
//!
//! The list is refreshed on mount and whenever the owning chat view reports a
//! document change. Each refresh is tagged with the revision it was issued
//! for so that an older listing arriving late cannot overwrite a newer one.

use crate::Request;
use crate::events::{Alert, DocumentChange};
use docport_core::api::PortalApi;
use docport_core::document::{Document, DocumentId};
use docport_core::session::AccessToken;
use docport_core::{PortalError, Result};
use futures::FutureExt;
use std::sync::Arc;

pub const HEADING: &str = "Your Uploaded Documents";
pub const LOADING_TEXT: &str = "Loading files...";
pub const EMPTY_TEXT: &str = "You haven't uploaded any documents yet.";
pub const DELETE_REJECTED: &str = "Failed to delete file.";
pub const DELETE_FAILED: &str = "An error occurred while deleting the file.";

/// Completion of a request issued by [`FileManager`].
#[derive(Debug)]
pub enum FilesCompletion {
    Listed {
        revision: u64,
        result: Result<Vec<Document>>,
    },
    Deleted {
        document: Document,
        result: Result<()>,
    },
}

/// What applying a [`FilesCompletion`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilesOutcome {
    Listed,
    /// A newer refresh was issued after this one; the listing was dropped.
    StaleListing,
    Deleted(DocumentChange),
    DeleteFailed(Alert),
}

/// Asks the user before a document is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub document: Document,
}

impl DeleteConfirmation {
    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete '{}'? This cannot be undone.",
            self.document.filename
        )
    }
}

/// What the list area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileListView<'a> {
    Loading,
    Empty,
    Documents(&'a [Document]),
}

pub struct FileManager {
    api: Arc<dyn PortalApi>,
    token: AccessToken,
    documents: Vec<Document>,
    loading: bool,
    latest_revision: u64,
}

impl FileManager {
    /// Starts in the loading state; the first [`refresh`](Self::refresh)
    /// is issued by the chat view when it mounts.
    pub fn new(api: Arc<dyn PortalApi>, token: AccessToken) -> Self {
        Self {
            api,
            token,
            documents: Vec::new(),
            loading: true,
            latest_revision: 0,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> FileListView<'_> {
        if self.loading {
            FileListView::Loading
        } else if self.documents.is_empty() {
            FileListView::Empty
        } else {
            FileListView::Documents(&self.documents)
        }
    }

    pub fn find(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| &doc.id == id)
    }

    /// Fetches the document list for `revision`.
    pub fn refresh(&mut self, revision: u64) -> Request<FilesCompletion> {
        self.loading = true;
        self.latest_revision = self.latest_revision.max(revision);

        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        async move {
            FilesCompletion::Listed {
                revision,
                result: api.list_documents(&token).await,
            }
        }
        .boxed()
    }

    /// First half of a delete: names the file so the user can confirm.
    ///
    /// # Errors
    ///
    /// `PortalError::Precondition` if no listed document has `id`.
    pub fn request_delete(&self, id: &DocumentId) -> Result<DeleteConfirmation> {
        self.find(id)
            .cloned()
            .map(|document| DeleteConfirmation { document })
            .ok_or_else(|| PortalError::precondition(format!("No document with id {}", id)))
    }

    /// Issues the delete after the user accepted `confirmation`.
    ///
    /// Declining needs no call at all: dropping the confirmation leaves the
    /// list untouched.
    pub fn confirm_delete(&self, confirmation: DeleteConfirmation) -> Request<FilesCompletion> {
        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        let document = confirmation.document;
        tracing::debug!("Deleting document {} ('{}')", document.id, document.filename);
        async move {
            let result = api.delete_document(&token, &document.id).await;
            FilesCompletion::Deleted { document, result }
        }
        .boxed()
    }

    pub fn apply(&mut self, completion: FilesCompletion) -> FilesOutcome {
        match completion {
            FilesCompletion::Listed { revision, result } => {
                if revision < self.latest_revision {
                    tracing::debug!(
                        "Dropping file listing for revision {} (latest {})",
                        revision,
                        self.latest_revision
                    );
                    return FilesOutcome::StaleListing;
                }
                self.loading = false;
                match result {
                    Ok(documents) => self.documents = documents,
                    Err(e) => {
                        tracing::warn!("Failed to fetch files: {}", e);
                        self.documents.clear();
                    }
                }
                FilesOutcome::Listed
            }
            FilesCompletion::Deleted { document, result } => match result {
                Ok(()) => {
                    self.documents.retain(|doc| doc.id != document.id);
                    tracing::info!("Deleted '{}'", document.filename);
                    FilesOutcome::Deleted(DocumentChange::Deleted { document })
                }
                Err(e) => {
                    tracing::warn!("Failed to delete file '{}': {}", document.filename, e);
                    let text = if e.is_server() {
                        DELETE_REJECTED
                    } else {
                        DELETE_FAILED
                    };
                    FilesOutcome::DeleteFailed(Alert::new(text))
                }
            },
        }
    }
}
