//! Portal: the session controller plus whichever view the route mounts.

use crate::Request;
use crate::chat::{ChatCompletion, ChatUpdate, ChatView};
use crate::events::{Alert, Reload};
use crate::login::LoginView;
use crate::session::SessionController;
use docport_core::api::PortalApi;
use docport_core::route::Route;
use docport_core::session::AccessToken;
use docport_core::{PortalError, Result};
use futures::FutureExt;
use std::collections::VecDeque;
use std::sync::Arc;

/// The mounted top-level view.
pub enum ActiveView {
    Login(LoginView),
    Chat(Box<ChatView>),
}

/// A completion tagged with the mount it was issued under.
#[derive(Debug)]
pub struct PortalCompletion {
    mount: u64,
    event: ViewCompletion,
}

#[derive(Debug)]
enum ViewCompletion {
    Login(Result<AccessToken>),
    Chat(ChatCompletion),
}

/// Side effects of a portal action.
#[derive(Default)]
pub struct PortalUpdate {
    pub alerts: Vec<Alert>,
    pub requests: Vec<Request<PortalCompletion>>,
}

pub struct Portal {
    api: Arc<dyn PortalApi>,
    session: SessionController,
    view: ActiveView,
    mount: u64,
}

impl Portal {
    /// Mounts the view for the session's current route. Call
    /// [`start`](Self::start) to issue the mount requests.
    pub fn new(api: Arc<dyn PortalApi>, session: SessionController) -> Self {
        let view = Self::view_for(&api, &session);
        Self {
            api,
            session,
            view,
            mount: 0,
        }
    }

    fn view_for(api: &Arc<dyn PortalApi>, session: &SessionController) -> ActiveView {
        match (session.current_route(), session.token()) {
            (Route::Chat(language), Some(token)) => ActiveView::Chat(Box::new(ChatView::new(
                Arc::clone(api),
                token.clone(),
                language.clone(),
            ))),
            _ => ActiveView::Login(LoginView::new(Arc::clone(api))),
        }
    }

    pub fn start(&mut self) -> PortalUpdate {
        match &mut self.view {
            ActiveView::Chat(chat) => {
                let requests = chat.begin_mount();
                self.lift(ChatUpdate {
                    alerts: Vec::new(),
                    requests,
                })
            }
            ActiveView::Login(_) => PortalUpdate::default(),
        }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn route(&self) -> &Route {
        self.session.current_route()
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    pub fn login_view(&mut self) -> Option<&mut LoginView> {
        match &mut self.view {
            ActiveView::Login(login) => Some(login),
            ActiveView::Chat(_) => None,
        }
    }

    pub fn chat_view(&mut self) -> Option<&mut ChatView> {
        match &mut self.view {
            ActiveView::Chat(chat) => Some(chat.as_mut()),
            ActiveView::Login(_) => None,
        }
    }

    /// Tags a chat request with the current mount.
    pub fn lift_request(&self, request: Request<ChatCompletion>) -> Request<PortalCompletion> {
        let mount = self.mount;
        request
            .map(move |completion| PortalCompletion {
                mount,
                event: ViewCompletion::Chat(completion),
            })
            .boxed()
    }

    pub fn lift(&self, update: ChatUpdate) -> PortalUpdate {
        PortalUpdate {
            alerts: update.alerts,
            requests: update
                .requests
                .into_iter()
                .map(|request| self.lift_request(request))
                .collect(),
        }
    }

    /// Submits the login form.
    ///
    /// # Errors
    ///
    /// `PortalError::Precondition` when the login view is not mounted or
    /// rejects the submission.
    pub fn submit_login(&mut self) -> Result<Request<PortalCompletion>> {
        let mount = self.mount;
        let login = self
            .login_view()
            .ok_or_else(|| PortalError::precondition("Already signed in"))?;
        let request = login.begin_submit()?;
        Ok(request
            .map(move |result| PortalCompletion {
                mount,
                event: ViewCompletion::Login(result),
            })
            .boxed())
    }

    pub fn apply(&mut self, completion: PortalCompletion) -> PortalUpdate {
        if completion.mount != self.mount {
            tracing::debug!(
                "Dropping completion for mount {} (current {})",
                completion.mount,
                self.mount
            );
            return PortalUpdate::default();
        }

        match (completion.event, &mut self.view) {
            (ViewCompletion::Login(result), ActiveView::Login(login)) => {
                match login.apply(result) {
                    Some(token) => {
                        self.session.set_token(token);
                        self.remount()
                    }
                    None => PortalUpdate::default(),
                }
            }
            (ViewCompletion::Chat(completion), ActiveView::Chat(chat)) => {
                let update = chat.apply(completion);
                self.lift(update)
            }
            _ => PortalUpdate::default(),
        }
    }

    /// Navigates to `path`, remounting when the surface changes.
    pub fn navigate(&mut self, path: &str) -> PortalUpdate {
        let route = self.session.navigate(path).clone();
        match (&route, &mut self.view) {
            (Route::Chat(language), ActiveView::Chat(chat)) => {
                chat.set_language(language.clone());
                PortalUpdate::default()
            }
            (Route::Login, ActiveView::Login(_)) => PortalUpdate::default(),
            _ => self.remount(),
        }
    }

    fn remount(&mut self) -> PortalUpdate {
        self.mount += 1;
        self.view = Self::view_for(&self.api, &self.session);
        tracing::debug!("Mounted {} (mount {})", self.route(), self.mount);
        self.start()
    }

    /// Signs out. The shell must drop this portal and build a new one.
    pub fn logout(&mut self) -> Reload {
        self.session.logout()
    }

    /// Awaits `update.requests` in order, applying each completion and its
    /// follow-ups. Returns every alert raised.
    pub async fn drive(&mut self, update: PortalUpdate) -> Vec<Alert> {
        let mut alerts = update.alerts;
        let mut queue: VecDeque<_> = update.requests.into();
        while let Some(request) = queue.pop_front() {
            let completion = request.await;
            let next = self.apply(completion);
            alerts.extend(next.alerts);
            queue.extend(next.requests);
        }
        alerts
    }
}
