//! Chat View: transcript, upload panel, question input and webhook panel.
//!
//! The chat view owns the [`FileManager`] it composes and the document
//! revision counter. Upload, ask, webhook and file-list requests are
//! independent: each has its own pending flag and each completion only
//! touches its own slice of state.

use crate::Request;
use crate::events::{Alert, DocumentChange, rejection_detail};
use crate::files::{DeleteConfirmation, FileManager, FilesCompletion, FilesOutcome};
use docport_core::api::PortalApi;
use docport_core::document::{Document, DocumentId, UploadFile};
use docport_core::message::{HistoryEntry, PendingTurn, Transcript, TurnSettlement};
use docport_core::route::Language;
use docport_core::session::AccessToken;
use docport_core::storage::Clipboard;
use docport_core::webhook::WebhookDisplay;
use docport_core::{PortalError, Result};
use futures::FutureExt;
use std::collections::VecDeque;
use std::sync::Arc;

pub const SELECT_FILE_FIRST: &str = "Please select a file first.";
pub const UPLOADING: &str = "Uploading and indexing...";
pub const UPLOAD_FAILED: &str = "An error occurred during upload.";
pub const ASK_FAILED: &str = "An error occurred while asking the question.";
pub const THINKING: &str = "Thinking...";
pub const HISTORY_LOADING: &str = "Loading chat history...";
pub const WEBHOOK_REJECTED: &str = "Could not fetch webhook URL.";
pub const WEBHOOK_FAILED: &str = "An error occurred.";
pub const WEBHOOK_COPIED: &str = "Webhook URL copied to clipboard!";
pub const HISTORY_CLEARED: &str = "File deleted. The chat history has been cleared.";

/// Completion of a request issued by [`ChatView`].
#[derive(Debug)]
pub enum ChatCompletion {
    History(Result<Vec<HistoryEntry>>),
    Files(FilesCompletion),
    Uploaded {
        filename: String,
        result: Result<()>,
    },
    Answered {
        turn: PendingTurn,
        result: Result<String>,
    },
    Webhook(Result<String>),
}

/// Side effects of applying a completion.
#[derive(Default)]
pub struct ChatUpdate {
    pub alerts: Vec<Alert>,
    /// Follow-up requests, e.g. the file-list refresh after an upload.
    pub requests: Vec<Request<ChatCompletion>>,
}

impl ChatUpdate {
    fn alert(mut self, alert: Alert) -> Self {
        self.alerts.push(alert);
        self
    }

    fn request(mut self, request: Request<ChatCompletion>) -> Self {
        self.requests.push(request);
        self
    }
}

pub struct ChatView {
    api: Arc<dyn PortalApi>,
    token: AccessToken,
    language: Language,
    files: FileManager,
    revision: u64,
    transcript: Transcript,
    history_loading: bool,
    draft: String,
    selection: Option<UploadFile>,
    upload_status: Option<String>,
    uploading: bool,
    asking: bool,
    webhook: WebhookDisplay,
    webhook_loading: bool,
}

impl ChatView {
    pub fn new(api: Arc<dyn PortalApi>, token: AccessToken, language: Language) -> Self {
        let files = FileManager::new(Arc::clone(&api), token.clone());
        Self {
            api,
            token,
            language,
            files,
            revision: 0,
            transcript: Transcript::new(),
            history_loading: false,
            draft: String::new(),
            selection: None,
            upload_status: None,
            uploading: false,
            asking: false,
            webhook: WebhookDisplay::Empty,
            webhook_loading: false,
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Changes the language sent with subsequent questions.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn files(&self) -> &FileManager {
        &self.files
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_history_loading(&self) -> bool {
        self.history_loading
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn selection(&self) -> Option<&UploadFile> {
        self.selection.as_ref()
    }

    pub fn upload_status(&self) -> Option<&str> {
        self.upload_status.as_deref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn upload_label(&self) -> &'static str {
        if self.uploading { "Processing..." } else { "Upload" }
    }

    pub fn is_asking(&self) -> bool {
        self.asking
    }

    /// Whether the ask control is enabled.
    pub fn can_ask(&self) -> bool {
        !self.asking && !self.history_loading
    }

    /// Whether the "Thinking..." placeholder follows the transcript.
    pub fn thinking(&self) -> bool {
        self.asking && !self.transcript.is_empty()
    }

    pub fn webhook(&self) -> &WebhookDisplay {
        &self.webhook
    }

    pub fn is_webhook_loading(&self) -> bool {
        self.webhook_loading
    }

    pub fn webhook_label(&self) -> &'static str {
        if self.webhook_loading {
            "Generating..."
        } else {
            "Get My Webhook URL"
        }
    }

    // ============================================================================
    // Mount
    // ============================================================================

    /// Loads chat history and the document list.
    pub fn begin_mount(&mut self) -> Vec<Request<ChatCompletion>> {
        self.history_loading = true;
        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        let history = async move { ChatCompletion::History(api.chat_history(&token).await) }.boxed();
        vec![history, self.refresh_files()]
    }

    fn refresh_files(&mut self) -> Request<ChatCompletion> {
        self.files
            .refresh(self.revision)
            .map(ChatCompletion::Files)
            .boxed()
    }

    // ============================================================================
    // Upload
    // ============================================================================

    /// Replaces the upload selection and clears the status line.
    pub fn select_file(&mut self, file: UploadFile) {
        self.selection = Some(file);
        self.upload_status = None;
    }

    /// Uploads the selected file.
    ///
    /// Returns `Ok(None)` when nothing is selected; the status line then asks
    /// for a file and no request is made.
    ///
    /// # Errors
    ///
    /// `PortalError::Precondition` while an upload is already running.
    pub fn begin_upload(&mut self) -> Result<Option<Request<ChatCompletion>>> {
        if self.uploading {
            return Err(PortalError::precondition("An upload is already running"));
        }
        let Some(file) = self.selection.clone() else {
            self.upload_status = Some(SELECT_FILE_FIRST.to_string());
            return Ok(None);
        };

        self.uploading = true;
        self.upload_status = Some(UPLOADING.to_string());

        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        Ok(Some(
            async move {
                let result = api.upload_document(&token, &file).await;
                ChatCompletion::Uploaded {
                    filename: file.filename,
                    result,
                }
            }
            .boxed(),
        ))
    }

    // ============================================================================
    // Ask
    // ============================================================================

    /// Sends the current draft as a question.
    ///
    /// A blank draft is a no-op (`Ok(None)`). Otherwise the question is
    /// appended as a tentative turn and the draft is cleared before the
    /// request goes out.
    ///
    /// # Errors
    ///
    /// `PortalError::Precondition` while a question is in flight or the
    /// history is still loading. The draft is kept in both cases.
    pub fn begin_ask(&mut self) -> Result<Option<Request<ChatCompletion>>> {
        if self.asking {
            return Err(PortalError::precondition(
                "Wait for the current answer before asking again",
            ));
        }
        // history replaces the transcript when it lands
        if self.history_loading {
            return Err(PortalError::precondition(
                "Chat history is still loading, ask again in a moment",
            ));
        }
        if self.draft.trim().is_empty() {
            return Ok(None);
        }

        let question = std::mem::take(&mut self.draft);
        let turn = self.transcript.begin_turn(question.clone());
        self.asking = true;

        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        let language = self.language.clone();
        Ok(Some(
            async move {
                let result = api.ask(&token, &question, &language).await;
                ChatCompletion::Answered { turn, result }
            }
            .boxed(),
        ))
    }

    /// Enter in the question input. Ignored while a question is in flight
    /// or the history is loading.
    pub fn press_enter(&mut self) -> Option<Request<ChatCompletion>> {
        if !self.can_ask() {
            return None;
        }
        self.begin_ask().ok().flatten()
    }

    // ============================================================================
    // Webhook
    // ============================================================================

    /// # Errors
    ///
    /// `PortalError::Precondition` while the previous fetch is running.
    pub fn begin_fetch_webhook(&mut self) -> Result<Request<ChatCompletion>> {
        if self.webhook_loading {
            return Err(PortalError::precondition("Webhook URL is being generated"));
        }
        self.webhook_loading = true;

        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        Ok(async move { ChatCompletion::Webhook(api.webhook_url(&token).await) }.boxed())
    }

    /// Copies the displayed URL.
    ///
    /// # Errors
    ///
    /// `PortalError::Precondition` when no URL is displayed, or the clipboard
    /// error.
    pub fn copy_webhook(&self, clipboard: &mut dyn Clipboard) -> Result<Alert> {
        let url = self
            .webhook
            .url()
            .ok_or_else(|| PortalError::precondition("No webhook URL to copy"))?;
        clipboard.set_text(url)?;
        Ok(Alert::new(WEBHOOK_COPIED))
    }

    // ============================================================================
    // Documents
    // ============================================================================

    pub fn request_delete(&self, id: &DocumentId) -> Result<DeleteConfirmation> {
        self.files.request_delete(id)
    }

    pub fn confirm_delete(&self, confirmation: DeleteConfirmation) -> Request<ChatCompletion> {
        self.files
            .confirm_delete(confirmation)
            .map(ChatCompletion::Files)
            .boxed()
    }

    /// Reacts to a change of the document set: bumps the revision and
    /// refreshes the file list. Deletions also drop the transcript.
    pub fn on_documents_changed(&mut self, change: &DocumentChange) -> ChatUpdate {
        self.revision += 1;
        let update = ChatUpdate::default().request(self.refresh_files());
        match change {
            DocumentChange::Uploaded { .. } => update,
            DocumentChange::Deleted { .. } => {
                self.transcript.clear();
                update.alert(Alert::new(HISTORY_CLEARED))
            }
        }
    }

    // ============================================================================
    // Completions
    // ============================================================================

    pub fn apply(&mut self, completion: ChatCompletion) -> ChatUpdate {
        match completion {
            ChatCompletion::History(result) => {
                self.history_loading = false;
                match result {
                    Ok(entries) => {
                        tracing::debug!("Loaded {} history entries", entries.len());
                        self.transcript.replace_with_history(entries);
                    }
                    Err(e) => tracing::warn!("Failed to fetch history: {}", e),
                }
                ChatUpdate::default()
            }

            ChatCompletion::Files(completion) => match self.files.apply(completion) {
                FilesOutcome::Listed | FilesOutcome::StaleListing => ChatUpdate::default(),
                FilesOutcome::Deleted(change) => self.on_documents_changed(&change),
                FilesOutcome::DeleteFailed(alert) => ChatUpdate::default().alert(alert),
            },

            ChatCompletion::Uploaded { filename, result } => {
                self.uploading = false;
                match result {
                    Ok(()) => {
                        self.upload_status =
                            Some(format!("File '{}' uploaded successfully!", filename));
                        self.on_documents_changed(&DocumentChange::Uploaded { filename })
                    }
                    Err(e) => {
                        tracing::warn!("Upload of '{}' failed: {}", filename, e);
                        self.upload_status = Some(match rejection_detail(&e) {
                            Some(detail) => format!("Upload failed: {}", detail),
                            None => UPLOAD_FAILED.to_string(),
                        });
                        ChatUpdate::default()
                    }
                }
            }

            ChatCompletion::Answered { turn, result } => {
                self.asking = false;
                let settlement = match result {
                    Ok(answer) => self.transcript.confirm(turn, answer),
                    Err(e) => {
                        tracing::warn!("Question failed: {}", e);
                        let reply = match rejection_detail(&e) {
                            Some(detail) => format!("Error: {}", detail),
                            None => ASK_FAILED.to_string(),
                        };
                        self.transcript.fail(turn, reply)
                    }
                };
                if settlement == TurnSettlement::Stale {
                    tracing::debug!("Answer arrived after the transcript was cleared");
                }
                ChatUpdate::default()
            }

            ChatCompletion::Webhook(result) => {
                self.webhook_loading = false;
                self.webhook = match result {
                    Ok(url) => WebhookDisplay::Url(url),
                    Err(e) => {
                        tracing::warn!("Failed to fetch webhook URL: {}", e);
                        let text = if e.is_server() {
                            WEBHOOK_REJECTED
                        } else {
                            WEBHOOK_FAILED
                        };
                        WebhookDisplay::Unavailable(text.to_string())
                    }
                };
                ChatUpdate::default()
            }
        }
    }

    // ============================================================================
    // Awaiting helpers
    // ============================================================================

    /// Awaits `requests` one by one, applying each completion and any
    /// follow-up requests it produces. Returns the alerts raised on the way.
    pub async fn drive(&mut self, requests: Vec<Request<ChatCompletion>>) -> Vec<Alert> {
        let mut queue: VecDeque<_> = requests.into();
        let mut alerts = Vec::new();
        while let Some(request) = queue.pop_front() {
            let completion = request.await;
            let update = self.apply(completion);
            alerts.extend(update.alerts);
            queue.extend(update.requests);
        }
        alerts
    }

    pub async fn mount(&mut self) {
        let requests = self.begin_mount();
        self.drive(requests).await;
    }

    pub async fn upload(&mut self) -> Result<Vec<Alert>> {
        match self.begin_upload()? {
            Some(request) => Ok(self.drive(vec![request]).await),
            None => Ok(Vec::new()),
        }
    }

    pub async fn ask(&mut self) -> Result<()> {
        if let Some(request) = self.begin_ask()? {
            self.drive(vec![request]).await;
        }
        Ok(())
    }

    pub async fn fetch_webhook(&mut self) -> Result<()> {
        let request = self.begin_fetch_webhook()?;
        self.drive(vec![request]).await;
        Ok(())
    }

    /// Deletes after confirmation; `accepted == false` changes nothing.
    pub async fn delete(&mut self, confirmation: DeleteConfirmation, accepted: bool) -> Vec<Alert> {
        if !accepted {
            tracing::debug!("Delete of '{}' declined", confirmation.document.filename);
            return Vec::new();
        }
        let request = self.confirm_delete(confirmation);
        self.drive(vec![request]).await
    }

    /// Handles a successful deletion reported by the file manager.
    pub fn on_file_deleted(&mut self, document: Document) -> ChatUpdate {
        self.on_documents_changed(&DocumentChange::Deleted { document })
    }
}
