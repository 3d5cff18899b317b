//! HttpPortalApi - reqwest implementation of [`PortalApi`].
//!
//! All calls go to the configured base URL. Authenticated calls carry the
//! session token as a bearer header; `/token` and `/register` do not.

use crate::dto::{ChatRequest, ChatResponse, ErrorBody, TokenResponse, WebhookResponse};
use async_trait::async_trait;
use docport_core::api::PortalApi;
use docport_core::config::PortalConfig;
use docport_core::document::{Document, DocumentId, UploadFile};
use docport_core::message::HistoryEntry;
use docport_core::route::Language;
use docport_core::session::{AccessToken, Credentials};
use docport_core::{PortalError, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for the portal REST API.
#[derive(Clone)]
pub struct HttpPortalApi {
    client: Client,
    config: PortalConfig,
}

impl HttpPortalApi {
    /// Creates a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::Config` if the HTTP client cannot be built
    /// (e.g. no TLS backend available).
    pub fn new(config: PortalConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| PortalError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    /// Sends the request and turns non-2xx statuses into `PortalError::Server`.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("{} request failed: {}", what, e);
            if e.is_timeout() {
                PortalError::network(format!("{} timed out", what))
            } else {
                PortalError::network(format!("{} request failed: {}", what, e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = ErrorBody::parse(&body).detail_text();
        tracing::warn!(
            "{} rejected by portal ({}): {}",
            what,
            status,
            detail.as_deref().unwrap_or("<no detail>")
        );
        Err(PortalError::server(status.as_u16(), detail))
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            PortalError::InvalidResponse(format!("Failed to parse {} response: {}", what, e))
        })
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken> {
        let request = self.client.post(self.url("/token")).form(&[
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ]);
        let response = self.send(request, "login").await?;
        let body: TokenResponse = Self::decode(response, "login").await?;
        Ok(AccessToken::new(body.access_token))
    }

    async fn register(&self, credentials: &Credentials) -> Result<AccessToken> {
        let request = self.client.post(self.url("/register")).json(credentials);
        let response = self.send(request, "register").await?;
        let body: TokenResponse = Self::decode(response, "register").await?;
        Ok(AccessToken::new(body.access_token))
    }

    async fn list_documents(&self, token: &AccessToken) -> Result<Vec<Document>> {
        let request = self
            .client
            .get(self.url("/files/me"))
            .bearer_auth(token.as_str());
        let response = self.send(request, "list documents").await?;
        Self::decode(response, "list documents").await
    }

    async fn upload_document(&self, token: &AccessToken, file: &UploadFile) -> Result<()> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.mime)
            .map_err(|e| PortalError::precondition(format!("Invalid MIME type: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = self
            .client
            .post(self.url("/upload"))
            .bearer_auth(token.as_str())
            .multipart(form);
        self.send(request, "upload").await?;
        tracing::info!("Uploaded '{}' ({} bytes)", file.filename, file.bytes.len());
        Ok(())
    }

    async fn delete_document(&self, token: &AccessToken, id: &DocumentId) -> Result<()> {
        let request = self
            .client
            .delete(self.url(&format!("/files/{}", id)))
            .bearer_auth(token.as_str());
        self.send(request, "delete document").await?;
        Ok(())
    }

    async fn chat_history(&self, token: &AccessToken) -> Result<Vec<HistoryEntry>> {
        let request = self
            .client
            .get(self.url("/chat/history"))
            .bearer_auth(token.as_str());
        let response = self.send(request, "chat history").await?;
        Self::decode(response, "chat history").await
    }

    async fn ask(
        &self,
        token: &AccessToken,
        question: &str,
        language: &Language,
    ) -> Result<String> {
        let request = self
            .client
            .post(self.url("/chat"))
            .bearer_auth(token.as_str())
            .json(&ChatRequest {
                question,
                language: language.as_str(),
            });
        let response = self.send(request, "ask").await?;
        let body: ChatResponse = Self::decode(response, "ask").await?;
        Ok(body.answer)
    }

    async fn webhook_url(&self, token: &AccessToken) -> Result<String> {
        let request = self
            .client
            .get(self.url("/webhooks/me"))
            .bearer_auth(token.as_str());
        let response = self.send(request, "webhook").await?;
        let body: WebhookResponse = Self::decode(response, "webhook").await?;
        Ok(body.webhook_url)
    }
}
