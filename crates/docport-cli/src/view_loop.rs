//! The task that owns the portal.
//!
//! Everything that mutates view state happens here, one event at a time:
//! commands from the REPL thread and completions of spawned requests. The
//! network calls themselves run as separate tokio tasks.

use crate::commands::{Command, help_text};
use crate::render::{self, Renderer};
use docport_application::{
    ChatCompletion, ChatView, DeleteConfirmation, Portal, PortalCompletion, PortalUpdate, Reload,
    Request, SessionController,
};
use docport_core::api::PortalApi;
use docport_core::route::Language;
use docport_core::storage::TokenStore;
use docport_infrastructure::SystemClipboard;
use docport_infrastructure::local_files::read_upload_file;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// What the REPL sends.
#[derive(Debug)]
pub enum UserInput {
    Command(Command),
    ConfirmDelete {
        confirmation: DeleteConfirmation,
        accepted: bool,
    },
}

/// Reply to a [`UserInput`], sent once its synchronous part is done.
#[derive(Debug)]
pub enum Ack {
    Done,
    /// The REPL must ask the user and answer with `UserInput::ConfirmDelete`.
    Confirm(DeleteConfirmation),
}

#[derive(Debug)]
pub struct Envelope {
    pub input: UserInput,
    pub reply: oneshot::Sender<Ack>,
}

pub struct ViewLoop {
    api: Arc<dyn PortalApi>,
    store: Arc<dyn TokenStore>,
    default_language: Language,
    portal: Portal,
    renderer: Renderer,
    clipboard: Option<SystemClipboard>,
    completions_tx: mpsc::UnboundedSender<PortalCompletion>,
    completions_rx: mpsc::UnboundedReceiver<PortalCompletion>,
}

impl ViewLoop {
    pub fn new(
        api: Arc<dyn PortalApi>,
        store: Arc<dyn TokenStore>,
        default_language: Language,
    ) -> Self {
        let portal = Self::build_portal(&api, &store, &default_language);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            api,
            store,
            default_language,
            portal,
            renderer: Renderer::new(),
            clipboard: None,
            completions_tx,
            completions_rx,
        }
    }

    fn build_portal(
        api: &Arc<dyn PortalApi>,
        store: &Arc<dyn TokenStore>,
        default_language: &Language,
    ) -> Portal {
        let session = SessionController::restore(Arc::clone(store), default_language.clone());
        Portal::new(Arc::clone(api), session)
    }

    /// Processes events until the REPL hangs up.
    pub async fn run(mut self, initial_route: &str, mut inputs: mpsc::Receiver<Envelope>) {
        let update = self.portal.start();
        self.dispatch(update);
        let update = self.portal.navigate(initial_route);
        self.dispatch(update);
        self.renderer.render(&self.portal);

        loop {
            tokio::select! {
                envelope = inputs.recv() => {
                    let Some(Envelope { input, reply }) = envelope else {
                        break;
                    };
                    let ack = self.handle(input).await;
                    self.renderer.render(&self.portal);
                    let _ = reply.send(ack);
                }
                Some(completion) = self.completions_rx.recv() => {
                    let update = self.portal.apply(completion);
                    self.dispatch(update);
                    self.renderer.render(&self.portal);
                }
            }
        }
        tracing::debug!("View loop stopped");
    }

    /// Prints alerts and spawns requests; completions come back through
    /// `completions_rx`.
    fn dispatch(&self, update: PortalUpdate) {
        for alert in &update.alerts {
            render::print_alert(alert);
        }
        for request in update.requests {
            let tx = self.completions_tx.clone();
            tokio::spawn(async move {
                // receiver is gone after a reload
                let _ = tx.send(request.await);
            });
        }
    }

    fn spawn_chat(&self, request: Request<ChatCompletion>) {
        let request = self.portal.lift_request(request);
        self.dispatch(PortalUpdate {
            alerts: Vec::new(),
            requests: vec![request],
        });
    }

    /// The chat view, or a hint when the user is not signed in.
    fn chat(&mut self) -> Option<&mut ChatView> {
        let chat = self.portal.chat_view();
        if chat.is_none() {
            render::print_info("Sign in first: /login <username> <password>");
        }
        chat
    }

    /// Drops the portal and everything in flight and starts over.
    fn reload(&mut self, _: Reload) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.completions_tx = tx;
        self.completions_rx = rx;
        self.portal = Self::build_portal(&self.api, &self.store, &self.default_language);
        self.renderer = Renderer::new();
        let update = self.portal.start();
        self.dispatch(update);
    }

    async fn handle(&mut self, input: UserInput) -> Ack {
        match input {
            UserInput::Command(command) => self.handle_command(command).await,
            UserInput::ConfirmDelete {
                confirmation,
                accepted,
            } => {
                if !accepted {
                    render::print_info("Nothing was deleted.");
                    return Ack::Done;
                }
                if let Some(chat) = self.chat() {
                    let request = chat.confirm_delete(confirmation);
                    self.spawn_chat(request);
                }
                Ack::Done
            }
        }
    }

    async fn handle_command(&mut self, command: Command) -> Ack {
        match command {
            Command::Help => println!("{}", help_text()),
            Command::Quit => {}

            Command::Login { username, password } => {
                let Some(login) = self.portal.login_view() else {
                    render::print_info("Already signed in. Use /logout first.");
                    return Ack::Done;
                };
                login.set_username(username);
                login.set_password(password);
                match self.portal.submit_login() {
                    Ok(request) => {
                        render::print_info("Signing in...");
                        self.dispatch(PortalUpdate {
                            alerts: Vec::new(),
                            requests: vec![request],
                        });
                    }
                    Err(e) => render::print_error(&e.to_string()),
                }
            }

            Command::ToggleRegister => match self.portal.login_view() {
                Some(login) => {
                    login.toggle_mode();
                    render::print_login_form(login);
                }
                None => render::print_info("Already signed in."),
            },

            Command::Files => {
                if let Some(chat) = self.chat() {
                    render::print_files(chat);
                }
            }

            Command::Select(path) => {
                self.select(&path).await;
            }

            Command::Upload(path) => {
                if let Some(path) = path {
                    if !self.select(&path).await {
                        return Ack::Done;
                    }
                }
                let result = match self.chat() {
                    Some(chat) => chat.begin_upload(),
                    None => return Ack::Done,
                };
                match result {
                    Ok(Some(request)) => self.spawn_chat(request),
                    // the status line tells the user to select a file
                    Ok(None) => {}
                    Err(e) => render::print_error(&e.to_string()),
                }
            }

            Command::Delete(id) => {
                if let Some(chat) = self.chat() {
                    match chat.request_delete(&id) {
                        Ok(confirmation) => return Ack::Confirm(confirmation),
                        Err(e) => render::print_error(&e.to_string()),
                    }
                }
            }

            Command::Webhook => {
                let result = match self.chat() {
                    Some(chat) => chat.begin_fetch_webhook(),
                    None => return Ack::Done,
                };
                match result {
                    Ok(request) => self.spawn_chat(request),
                    Err(e) => render::print_error(&e.to_string()),
                }
            }

            Command::Copy => self.copy_webhook(),

            Command::History => {
                if let Some(chat) = self.portal.chat_view() {
                    self.renderer.replay(chat);
                } else {
                    render::print_info("Sign in first: /login <username> <password>");
                }
            }

            Command::Navigate(path) => {
                let update = self.portal.navigate(&path);
                self.dispatch(update);
            }

            Command::Logout => {
                if self.portal.session().is_authenticated() {
                    let reload = self.portal.logout();
                    self.reload(reload);
                    render::print_info("Signed out.");
                } else {
                    render::print_info("Not signed in.");
                }
            }

            Command::Ask(question) => {
                let request = match self.chat() {
                    Some(chat) => {
                        chat.set_draft(question);
                        let request = chat.press_enter();
                        if request.is_none() {
                            if chat.is_asking() {
                                render::print_info("Still waiting for the previous answer.");
                            } else if chat.is_history_loading() {
                                render::print_info(
                                    "Chat history is still loading, ask again in a moment.",
                                );
                            }
                        }
                        request
                    }
                    None => None,
                };
                if let Some(request) = request {
                    self.spawn_chat(request);
                }
            }
        }
        Ack::Done
    }

    /// Reads `path` and makes it the upload selection.
    async fn select(&mut self, path: &Path) -> bool {
        if self.chat().is_none() {
            return false;
        }
        match read_upload_file(path).await {
            Ok(file) => {
                render::print_info(&format!(
                    "Selected '{}' ({} bytes, {})",
                    file.filename,
                    file.bytes.len(),
                    file.mime
                ));
                if let Some(chat) = self.portal.chat_view() {
                    chat.select_file(file);
                }
                true
            }
            Err(e) => {
                render::print_error(&e.to_string());
                false
            }
        }
    }

    fn copy_webhook(&mut self) {
        if self.clipboard.is_none() {
            match SystemClipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    render::print_error(&e.to_string());
                    return;
                }
            }
        }
        let (Some(chat), Some(clipboard)) = (self.portal.chat_view(), self.clipboard.as_mut())
        else {
            render::print_info("Sign in first: /login <username> <password>");
            return;
        };
        match chat.copy_webhook(clipboard) {
            Ok(alert) => render::print_alert(&alert),
            Err(e) => render::print_error(&e.to_string()),
        }
    }
}
