use async_trait::async_trait;
use docport_application::chat::{
    ASK_FAILED, HISTORY_CLEARED, SELECT_FILE_FIRST, UPLOAD_FAILED, UPLOADING, WEBHOOK_COPIED,
    WEBHOOK_FAILED, WEBHOOK_REJECTED,
};
use docport_application::files::{DELETE_FAILED, DELETE_REJECTED};
use docport_application::login::{CONNECT_FAILED, GENERIC_FAILURE};
use docport_application::{
    ActiveView, Alert, ChatView, FileListView, FileManager, FilesOutcome, LoginView, Portal,
    PortalUpdate, Reload, SessionController,
};
use docport_core::api::PortalApi;
use docport_core::document::{Document, DocumentId, UploadFile};
use docport_core::message::{HistoryEntry, Message};
use docport_core::route::{Language, Route};
use docport_core::session::{AccessToken, Credentials};
use docport_core::storage::{Clipboard, TokenStore};
use docport_core::webhook::WebhookDisplay;
use docport_core::{PortalError, Result};
use std::sync::{Arc, Mutex};

// ============================================================================
// Stub collaborators
// ============================================================================

struct StubPortalApi {
    calls: Mutex<Vec<String>>,
    auth_reply: Mutex<Result<String>>,
    documents: Mutex<Vec<Document>>,
    list_fails: Mutex<bool>,
    history: Mutex<Vec<HistoryEntry>>,
    upload_reply: Mutex<Result<()>>,
    delete_reply: Mutex<Result<()>>,
    ask_reply: Mutex<Result<String>>,
    webhook_reply: Mutex<Result<String>>,
    next_id: Mutex<u64>,
}

impl StubPortalApi {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            auth_reply: Mutex::new(Ok("abc123".to_string())),
            documents: Mutex::new(Vec::new()),
            list_fails: Mutex::new(false),
            history: Mutex::new(Vec::new()),
            upload_reply: Mutex::new(Ok(())),
            delete_reply: Mutex::new(Ok(())),
            ask_reply: Mutex::new(Ok("It contains X.".to_string())),
            webhook_reply: Mutex::new(Ok("https://portal.example.com/hook/u1".to_string())),
            next_id: Mutex::new(100),
        }
    }

    fn with_documents(self, docs: &[(&str, &str)]) -> Self {
        *self.documents.lock().unwrap() = docs.iter().map(|(id, name)| doc(id, name)).collect();
        self
    }

    fn with_history(self, entries: &[(&str, &str)]) -> Self {
        *self.history.lock().unwrap() = entries
            .iter()
            .map(|(q, a)| HistoryEntry {
                question: q.to_string(),
                answer: a.to_string(),
            })
            .collect();
        self
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[async_trait]
impl PortalApi for StubPortalApi {
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken> {
        self.record(format!("login {}", credentials.username));
        self.auth_reply.lock().unwrap().clone().map(AccessToken::new)
    }

    async fn register(&self, credentials: &Credentials) -> Result<AccessToken> {
        self.record(format!("register {}", credentials.username));
        self.auth_reply.lock().unwrap().clone().map(AccessToken::new)
    }

    async fn list_documents(&self, token: &AccessToken) -> Result<Vec<Document>> {
        self.record(format!("list {}", token.as_str()));
        if *self.list_fails.lock().unwrap() {
            return Err(PortalError::network("connection reset"));
        }
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn upload_document(&self, _token: &AccessToken, file: &UploadFile) -> Result<()> {
        self.record(format!("upload {}", file.filename));
        self.upload_reply.lock().unwrap().clone()?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        self.documents.lock().unwrap().push(Document {
            id: DocumentId::new(next_id.to_string()),
            filename: file.filename.clone(),
        });
        Ok(())
    }

    async fn delete_document(&self, _token: &AccessToken, id: &DocumentId) -> Result<()> {
        self.record(format!("delete {}", id));
        self.delete_reply.lock().unwrap().clone()?;
        self.documents.lock().unwrap().retain(|d| &d.id != id);
        Ok(())
    }

    async fn chat_history(&self, _token: &AccessToken) -> Result<Vec<HistoryEntry>> {
        self.record("history");
        Ok(self.history.lock().unwrap().clone())
    }

    async fn ask(&self, _token: &AccessToken, question: &str, language: &Language) -> Result<String> {
        self.record(format!("ask {}|{}", question, language));
        self.ask_reply.lock().unwrap().clone()
    }

    async fn webhook_url(&self, _token: &AccessToken) -> Result<String> {
        self.record("webhook");
        self.webhook_reply.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct MemoryTokenStore {
    value: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    fn holding(token: &str) -> Self {
        Self {
            value: Mutex::new(Some(token.to_string())),
        }
    }

    fn value(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.value())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.value.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.value.lock().unwrap() = None;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingClipboard {
    text: Option<String>,
}

impl Clipboard for RecordingClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.text = Some(text.to_string());
        Ok(())
    }
}

fn doc(id: &str, name: &str) -> Document {
    Document {
        id: DocumentId::new(id),
        filename: name.to_string(),
    }
}

fn token() -> AccessToken {
    AccessToken::new("abc123")
}

fn en() -> Language {
    Language::default()
}

async fn mounted_chat(api: &Arc<StubPortalApi>) -> ChatView {
    let mut chat = ChatView::new(api.clone(), token(), en());
    chat.mount().await;
    chat
}

fn filenames(chat: &ChatView) -> Vec<String> {
    chat.files()
        .documents()
        .iter()
        .map(|d| d.filename.clone())
        .collect()
}

// ============================================================================
// Session and login
// ============================================================================

#[tokio::test]
async fn test_login_authenticates_and_navigates_to_chat() {
    let api = Arc::new(StubPortalApi::new());
    let store = Arc::new(MemoryTokenStore::default());
    let session = SessionController::restore(store.clone(), en());
    let mut portal = Portal::new(api.clone(), session);
    assert_eq!(portal.route(), &Route::Login);

    let login = portal.login_view().unwrap();
    login.set_username("alice");
    login.set_password("pw");
    let request = portal.submit_login().unwrap();
    let alerts = portal
        .drive(PortalUpdate {
            alerts: Vec::new(),
            requests: vec![request],
        })
        .await;

    assert!(alerts.is_empty());
    assert_eq!(portal.session().token().unwrap().as_str(), "abc123");
    assert_eq!(portal.route().path(), "/en");
    assert_eq!(store.value().as_deref(), Some("abc123"));
    assert!(matches!(portal.view(), ActiveView::Chat(_)));
    // the chat surface mounted and loaded its data
    assert_eq!(api.count("history"), 1);
    assert_eq!(api.count("list abc123"), 1);
    assert_eq!(api.calls()[0], "login alice");
}

#[tokio::test]
async fn test_failed_login_shows_server_detail() {
    let api = Arc::new(StubPortalApi::new());
    *api.auth_reply.lock().unwrap() = Err(PortalError::server(
        401,
        Some("Incorrect username or password".into()),
    ));
    let session = SessionController::restore(Arc::new(MemoryTokenStore::default()), en());
    let mut portal = Portal::new(api.clone(), session);

    let login = portal.login_view().unwrap();
    login.set_username("alice");
    login.set_password("wrong");
    let request = portal.submit_login().unwrap();
    portal
        .drive(PortalUpdate {
            alerts: Vec::new(),
            requests: vec![request],
        })
        .await;

    assert!(!portal.session().is_authenticated());
    assert_eq!(portal.route(), &Route::Login);
    let login = portal.login_view().unwrap();
    assert_eq!(login.error(), Some("Incorrect username or password"));
    assert!(!login.is_pending());
}

#[tokio::test]
async fn test_login_error_texts() {
    let api = Arc::new(StubPortalApi::new());
    let mut login = LoginView::new(api.clone());
    login.set_username("alice");
    login.set_password("pw");

    *api.auth_reply.lock().unwrap() = Err(PortalError::network("connection refused"));
    assert_eq!(login.submit().await.unwrap(), None);
    assert_eq!(login.error(), Some(CONNECT_FAILED));

    *api.auth_reply.lock().unwrap() = Err(PortalError::server(500, None));
    assert_eq!(login.submit().await.unwrap(), None);
    assert_eq!(login.error(), Some(GENERIC_FAILURE));

    *api.auth_reply.lock().unwrap() = Ok("abc123".into());
    let issued = login.submit().await.unwrap();
    assert_eq!(issued.map(|t| t.as_str().to_string()), Some("abc123".into()));
    assert_eq!(login.error(), None);
}

#[tokio::test]
async fn test_register_mode_uses_register_endpoint() {
    let api = Arc::new(StubPortalApi::new());
    let mut login = LoginView::new(api.clone());
    login.toggle_mode();
    assert_eq!(login.heading(), "Register New Account");
    assert_eq!(login.toggle_hint(), ("Already have an account?", "Login"));

    login.set_username("bob");
    login.set_password("secret");
    login.submit().await.unwrap();
    assert_eq!(api.calls(), vec!["register bob".to_string()]);
}

#[tokio::test]
async fn test_blank_credentials_make_no_request() {
    let api = Arc::new(StubPortalApi::new());
    let mut login = LoginView::new(api.clone());
    login.set_username("  ");
    login.set_password("pw");

    let err = login.submit().await.unwrap_err();
    assert!(matches!(err, PortalError::Precondition(_)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_restored_session_mounts_chat() {
    let api = Arc::new(StubPortalApi::new().with_history(&[("Q1", "A1")]));
    let session =
        SessionController::restore(Arc::new(MemoryTokenStore::holding("abc123")), en());
    let mut portal = Portal::new(api.clone(), session);

    let update = portal.start();
    portal.drive(update).await;

    let chat = portal.chat_view().unwrap();
    assert_eq!(chat.transcript().len(), 2);
}

#[tokio::test]
async fn test_logout_requires_reload_and_forgets_token() {
    let api = Arc::new(StubPortalApi::new());
    let store = Arc::new(MemoryTokenStore::holding("abc123"));
    let session = SessionController::restore(store.clone(), en());
    let mut portal = Portal::new(api.clone(), session);

    assert_eq!(portal.logout(), Reload);
    assert_eq!(store.value(), None);

    let rebuilt = Portal::new(api, SessionController::restore(store, en()));
    assert!(matches!(rebuilt.view(), ActiveView::Login(_)));
}

#[tokio::test]
async fn test_language_route_drives_question_language() {
    let api = Arc::new(StubPortalApi::new());
    let session =
        SessionController::restore(Arc::new(MemoryTokenStore::holding("abc123")), en());
    let mut portal = Portal::new(api.clone(), session);
    let update = portal.start();
    portal.drive(update).await;

    let update = portal.navigate("/fr");
    assert!(update.requests.is_empty());
    assert_eq!(portal.route().path(), "/fr");

    let chat = portal.chat_view().unwrap();
    chat.set_draft("Bonjour?");
    chat.ask().await.unwrap();
    assert!(api.calls().contains(&"ask Bonjour?|fr".to_string()));
}

// ============================================================================
// Chat history and asking
// ============================================================================

#[tokio::test]
async fn test_history_is_flattened_in_order() {
    let api = Arc::new(StubPortalApi::new().with_history(&[("Q1", "A1")]));
    let chat = mounted_chat(&api).await;

    assert_eq!(
        chat.transcript().messages(),
        &[Message::user("Q1"), Message::bot("A1")]
    );
    assert!(!chat.is_history_loading());
}

#[tokio::test]
async fn test_ask_appends_question_and_answer() {
    let api = Arc::new(StubPortalApi::new());
    let mut chat = mounted_chat(&api).await;

    chat.set_draft("What is in my document?");
    chat.ask().await.unwrap();

    let messages = chat.transcript().messages();
    assert_eq!(
        &messages[messages.len() - 2..],
        &[
            Message::user("What is in my document?"),
            Message::bot("It contains X.")
        ]
    );
    assert_eq!(chat.draft(), "");
    assert!(!chat.is_asking());
    assert!(!chat.transcript().has_tentative());
}

#[tokio::test]
async fn test_question_is_shown_before_the_answer() {
    let api = Arc::new(StubPortalApi::new().with_history(&[("Q1", "A1")]));
    let mut chat = mounted_chat(&api).await;

    chat.set_draft("Next?");
    let request = chat.begin_ask().unwrap().unwrap();

    assert_eq!(chat.draft(), "");
    assert_eq!(chat.transcript().last(), Some(&Message::user("Next?")));
    assert!(chat.transcript().is_tentative(2));
    assert!(chat.thinking());
    assert!(chat.press_enter().is_none());
    assert!(matches!(
        chat.begin_ask(),
        Err(PortalError::Precondition(_))
    ));

    let completion = request.await;
    chat.apply(completion);
    assert!(!chat.thinking());
    assert_eq!(chat.transcript().len(), 4);
}

#[tokio::test]
async fn test_question_waits_for_history() {
    let api = Arc::new(StubPortalApi::new().with_history(&[("Q1", "A1")]));
    let mut chat = ChatView::new(api.clone(), token(), en());

    let mount = chat.begin_mount();
    assert!(chat.is_history_loading());
    assert!(!chat.can_ask());

    chat.set_draft("New question?");
    assert!(chat.press_enter().is_none());
    assert!(matches!(
        chat.begin_ask(),
        Err(PortalError::Precondition(_))
    ));
    assert_eq!(chat.draft(), "New question?");
    assert!(chat.transcript().is_empty());

    chat.drive(mount).await;
    assert_eq!(api.count("ask"), 0);
    assert!(chat.can_ask());

    let request = chat.press_enter().unwrap();
    chat.drive(vec![request]).await;
    assert_eq!(
        chat.transcript().messages(),
        &[
            Message::user("Q1"),
            Message::bot("A1"),
            Message::user("New question?"),
            Message::bot("It contains X."),
        ]
    );
    assert!(api.calls().contains(&"ask New question?|en".to_string()));
}

#[tokio::test]
async fn test_blank_question_is_a_no_op() {
    let api = Arc::new(StubPortalApi::new().with_history(&[("Q1", "A1")]));
    let mut chat = mounted_chat(&api).await;
    let calls_before = api.calls().len();

    for blank in ["", "   ", "\t\n"] {
        chat.set_draft(blank);
        chat.ask().await.unwrap();
        assert!(chat.press_enter().is_none());
    }

    assert_eq!(chat.transcript().len(), 2);
    assert_eq!(api.calls().len(), calls_before);
}

#[tokio::test]
async fn test_failed_question_reply_texts() {
    let api = Arc::new(StubPortalApi::new());
    let mut chat = mounted_chat(&api).await;

    *api.ask_reply.lock().unwrap() =
        Err(PortalError::server(400, Some("No documents indexed".into())));
    chat.set_draft("Q");
    chat.ask().await.unwrap();
    assert_eq!(
        chat.transcript().last(),
        Some(&Message::bot("Error: No documents indexed"))
    );

    *api.ask_reply.lock().unwrap() = Err(PortalError::network("timed out"));
    chat.set_draft("Q again");
    chat.ask().await.unwrap();
    assert_eq!(chat.transcript().last(), Some(&Message::bot(ASK_FAILED)));
    // questions stay next to their error replies
    assert_eq!(chat.transcript().len(), 4);
}

// ============================================================================
// Documents
// ============================================================================

#[tokio::test]
async fn test_confirmed_delete_removes_document_and_clears_transcript() {
    let api = Arc::new(
        StubPortalApi::new()
            .with_documents(&[("42", "report.pdf"), ("7", "notes.txt")])
            .with_history(&[("Q1", "A1")]),
    );
    let mut chat = mounted_chat(&api).await;
    assert_eq!(chat.transcript().len(), 2);
    let revision = chat.revision();

    let confirmation = chat.request_delete(&DocumentId::new("42")).unwrap();
    assert_eq!(
        confirmation.prompt(),
        "Are you sure you want to delete 'report.pdf'? This cannot be undone."
    );
    let alerts = chat.delete(confirmation, true).await;

    assert_eq!(alerts, vec![Alert::new(HISTORY_CLEARED)]);
    assert!(chat.files().find(&DocumentId::new("42")).is_none());
    assert_eq!(filenames(&chat), vec!["notes.txt".to_string()]);
    assert!(chat.transcript().is_empty());
    assert_eq!(chat.revision(), revision + 1);
    assert_eq!(api.count("delete 42"), 1);
}

#[tokio::test]
async fn test_declined_delete_changes_nothing() {
    let api = Arc::new(
        StubPortalApi::new()
            .with_documents(&[("42", "report.pdf")])
            .with_history(&[("Q1", "A1")]),
    );
    let mut chat = mounted_chat(&api).await;

    let confirmation = chat.request_delete(&DocumentId::new("42")).unwrap();
    let alerts = chat.delete(confirmation, false).await;

    assert!(alerts.is_empty());
    assert_eq!(filenames(&chat), vec!["report.pdf".to_string()]);
    assert_eq!(chat.transcript().len(), 2);
    assert_eq!(api.count("delete"), 0);
}

#[tokio::test]
async fn test_failed_delete_keeps_list() {
    let api = Arc::new(
        StubPortalApi::new()
            .with_documents(&[("42", "report.pdf")])
            .with_history(&[("Q1", "A1")]),
    );
    let mut chat = mounted_chat(&api).await;

    *api.delete_reply.lock().unwrap() = Err(PortalError::server(404, None));
    let confirmation = chat.request_delete(&DocumentId::new("42")).unwrap();
    assert_eq!(
        chat.delete(confirmation, true).await,
        vec![Alert::new(DELETE_REJECTED)]
    );

    *api.delete_reply.lock().unwrap() = Err(PortalError::network("reset"));
    let confirmation = chat.request_delete(&DocumentId::new("42")).unwrap();
    assert_eq!(
        chat.delete(confirmation, true).await,
        vec![Alert::new(DELETE_FAILED)]
    );

    assert_eq!(filenames(&chat), vec!["report.pdf".to_string()]);
    assert_eq!(chat.transcript().len(), 2);
}

#[tokio::test]
async fn test_delete_unknown_id_is_rejected() {
    let api = Arc::new(StubPortalApi::new());
    let chat = mounted_chat(&api).await;
    assert!(matches!(
        chat.request_delete(&DocumentId::new("999")),
        Err(PortalError::Precondition(_))
    ));
}

#[tokio::test]
async fn test_upload_then_refresh_lists_file_once() {
    let api = Arc::new(StubPortalApi::new().with_documents(&[("7", "notes.txt")]));
    let mut chat = mounted_chat(&api).await;

    chat.select_file(UploadFile::new("report.txt", "text/plain", b"numbers".to_vec()));
    let request = chat.begin_upload().unwrap().unwrap();
    assert_eq!(chat.upload_status(), Some(UPLOADING));
    assert!(chat.is_uploading());
    assert_eq!(chat.upload_label(), "Processing...");
    assert!(matches!(
        chat.begin_upload(),
        Err(PortalError::Precondition(_))
    ));

    let alerts = chat.drive(vec![request]).await;

    assert!(alerts.is_empty());
    assert_eq!(
        chat.upload_status(),
        Some("File 'report.txt' uploaded successfully!")
    );
    assert!(!chat.is_uploading());
    let names = filenames(&chat);
    assert_eq!(names.iter().filter(|n| *n == "report.txt").count(), 1);
    assert_eq!(chat.revision(), 1);
    assert_eq!(api.count("list"), 2);
}

#[tokio::test]
async fn test_upload_without_selection() {
    let api = Arc::new(StubPortalApi::new());
    let mut chat = mounted_chat(&api).await;

    let alerts = chat.upload().await.unwrap();
    assert!(alerts.is_empty());
    assert_eq!(chat.upload_status(), Some(SELECT_FILE_FIRST));
    assert_eq!(api.count("upload"), 0);

    chat.select_file(UploadFile::new("a.txt", "text/plain", Vec::new()));
    assert_eq!(chat.upload_status(), None);
}

#[tokio::test]
async fn test_upload_failure_texts() {
    let api = Arc::new(StubPortalApi::new());
    let mut chat = mounted_chat(&api).await;
    chat.select_file(UploadFile::new("a.exe", "application/octet-stream", vec![0]));

    *api.upload_reply.lock().unwrap() =
        Err(PortalError::server(400, Some("Unsupported file type".into())));
    chat.upload().await.unwrap();
    assert_eq!(
        chat.upload_status(),
        Some("Upload failed: Unsupported file type")
    );

    *api.upload_reply.lock().unwrap() = Err(PortalError::network("broken pipe"));
    chat.upload().await.unwrap();
    assert_eq!(chat.upload_status(), Some(UPLOAD_FAILED));
    assert_eq!(chat.revision(), 0);
}

#[tokio::test]
async fn test_file_list_states() {
    let api = Arc::new(StubPortalApi::new());
    let mut chat = ChatView::new(api.clone(), token(), en());
    assert_eq!(chat.files().view(), FileListView::Loading);

    chat.mount().await;
    assert_eq!(chat.files().view(), FileListView::Empty);

    *api.list_fails.lock().unwrap() = true;
    let mut manager = FileManager::new(api.clone(), token());
    let completion = manager.refresh(0).await;
    assert_eq!(manager.apply(completion), FilesOutcome::Listed);
    assert_eq!(manager.view(), FileListView::Empty);
    assert!(!manager.is_loading());
}

// ============================================================================
// Webhook
// ============================================================================

#[tokio::test]
async fn test_webhook_fetch_and_copy() {
    let api = Arc::new(StubPortalApi::new());
    let mut chat = mounted_chat(&api).await;
    let mut clipboard = RecordingClipboard::default();

    assert!(matches!(
        chat.copy_webhook(&mut clipboard),
        Err(PortalError::Precondition(_))
    ));

    let request = chat.begin_fetch_webhook().unwrap();
    assert_eq!(chat.webhook_label(), "Generating...");
    assert!(chat.begin_fetch_webhook().is_err());
    chat.drive(vec![request]).await;

    assert_eq!(
        chat.webhook(),
        &WebhookDisplay::Url("https://portal.example.com/hook/u1".into())
    );
    let alert = chat.copy_webhook(&mut clipboard).unwrap();
    assert_eq!(alert, Alert::new(WEBHOOK_COPIED));
    assert_eq!(
        clipboard.text.as_deref(),
        Some("https://portal.example.com/hook/u1")
    );
}

#[tokio::test]
async fn test_webhook_failure_texts() {
    let api = Arc::new(StubPortalApi::new());
    let mut chat = mounted_chat(&api).await;

    *api.webhook_reply.lock().unwrap() = Err(PortalError::server(500, None));
    chat.fetch_webhook().await.unwrap();
    assert_eq!(chat.webhook().text(), Some(WEBHOOK_REJECTED));
    assert_eq!(chat.webhook().url(), None);

    *api.webhook_reply.lock().unwrap() = Err(PortalError::network("dns"));
    chat.fetch_webhook().await.unwrap();
    assert_eq!(chat.webhook().text(), Some(WEBHOOK_FAILED));
    assert!(!chat.is_webhook_loading());
}

// ============================================================================
// Interleaving
// ============================================================================

#[tokio::test]
async fn test_answer_after_delete_is_dropped() {
    let api = Arc::new(
        StubPortalApi::new()
            .with_documents(&[("42", "report.pdf")])
            .with_history(&[("Q1", "A1")]),
    );
    let mut chat = mounted_chat(&api).await;

    chat.set_draft("About the report?");
    let ask = chat.begin_ask().unwrap().unwrap();

    let confirmation = chat.request_delete(&DocumentId::new("42")).unwrap();
    chat.delete(confirmation, true).await;
    assert!(chat.transcript().is_empty());

    let completion = ask.await;
    chat.apply(completion);
    assert!(chat.transcript().is_empty());
    assert!(!chat.is_asking());
}

#[tokio::test]
async fn test_upload_and_ask_run_independently() {
    let api = Arc::new(StubPortalApi::new());
    let mut chat = mounted_chat(&api).await;

    chat.select_file(UploadFile::new("report.txt", "text/plain", b"x".to_vec()));
    let upload = chat.begin_upload().unwrap().unwrap();
    chat.set_draft("Q");
    let ask = chat.begin_ask().unwrap().unwrap();
    assert!(chat.is_uploading() && chat.is_asking());

    chat.drive(vec![ask]).await;
    assert!(chat.is_uploading());
    assert!(!chat.is_asking());

    chat.drive(vec![upload]).await;
    assert!(!chat.is_uploading());
    assert_eq!(chat.transcript().len(), 2);
}

#[tokio::test]
async fn test_older_listing_is_discarded() {
    let api = Arc::new(StubPortalApi::new().with_documents(&[("1", "old.txt")]));
    let mut manager = FileManager::new(api.clone(), token());

    let first = manager.refresh(1);
    api.documents.lock().unwrap().push(doc("2", "new.txt"));
    let second = manager.refresh(2);

    let second = second.await;
    assert_eq!(manager.apply(second), FilesOutcome::Listed);
    let first = first.await;
    assert_eq!(manager.apply(first), FilesOutcome::StaleListing);
    assert_eq!(manager.documents().len(), 2);
}
