//! Portal API trait.
//!
//! Defines the contract of the remote document question-answering service.
//! Token issuance, indexing, answering and webhook routing all happen on the
//! other side of this trait.

use crate::document::{Document, DocumentId, UploadFile};
use crate::error::Result;
use crate::message::HistoryEntry;
use crate::route::Language;
use crate::session::{AccessToken, Credentials};
use async_trait::async_trait;

/// An abstract client for the portal's REST API.
///
/// Every method except [`PortalApi::login`] and [`PortalApi::register`]
/// authenticates with the bearer token it is given.
///
/// # Errors
///
/// Implementations report failures as:
/// - `PortalError::Network`: the request never reached the server
/// - `PortalError::Server`: non-2xx status, with the body's `detail` if any
/// - `PortalError::InvalidResponse`: 2xx status with an unreadable body
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// `POST /token` with form-encoded credentials.
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken>;

    /// `POST /register` with JSON credentials.
    async fn register(&self, credentials: &Credentials) -> Result<AccessToken>;

    /// `GET /files/me`, in server order.
    async fn list_documents(&self, token: &AccessToken) -> Result<Vec<Document>>;

    /// `POST /upload` as a multipart form with a single `file` part.
    async fn upload_document(&self, token: &AccessToken, file: &UploadFile) -> Result<()>;

    /// `DELETE /files/{id}`.
    async fn delete_document(&self, token: &AccessToken, id: &DocumentId) -> Result<()>;

    /// `GET /chat/history`, oldest first.
    async fn chat_history(&self, token: &AccessToken) -> Result<Vec<HistoryEntry>>;

    /// `POST /chat` with `{question, language}`; returns the answer text.
    async fn ask(&self, token: &AccessToken, question: &str, language: &Language)
    -> Result<String>;

    /// `GET /webhooks/me`; returns the public webhook URL.
    async fn webhook_url(&self, token: &AccessToken) -> Result<String>;
}
