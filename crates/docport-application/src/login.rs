//! Login/Register View.

use crate::Request;
use docport_core::api::PortalApi;
use docport_core::session::{AccessToken, AuthMode, Credentials};
use docport_core::{PortalError, Result};
use futures::FutureExt;
use std::sync::Arc;

pub const CONNECT_FAILED: &str = "Failed to connect to the server.";
pub const GENERIC_FAILURE: &str = "An error occurred.";

/// Credential form with a login/registration toggle.
pub struct LoginView {
    api: Arc<dyn PortalApi>,
    mode: AuthMode,
    username: String,
    password: String,
    error: Option<String>,
    pending: bool,
}

impl LoginView {
    pub fn new(api: Arc<dyn PortalApi>) -> Self {
        Self {
            api,
            mode: AuthMode::default(),
            username: String::new(),
            password: String::new(),
            error: None,
            pending: false,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn toggle_mode(&mut self) -> AuthMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register New Account",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register",
        }
    }

    /// Prompt and button text offered for switching modes.
    pub fn toggle_hint(&self) -> (&'static str, &'static str) {
        match self.mode {
            AuthMode::Login => ("Don't have an account?", "Register"),
            AuthMode::Register => ("Already have an account?", "Login"),
        }
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Starts a login or registration request with the current fields.
    ///
    /// # Errors
    ///
    /// `PortalError::Precondition` when a field is blank or a submission is
    /// already in flight. No request is made in that case.
    pub fn begin_submit(&mut self) -> Result<Request<Result<AccessToken>>> {
        if self.pending {
            return Err(PortalError::precondition("A sign-in request is already running"));
        }
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(PortalError::precondition(
                "Username and password are required",
            ));
        }

        self.error = None;
        self.pending = true;

        let api = Arc::clone(&self.api);
        let mode = self.mode;
        let credentials = Credentials::new(self.username.clone(), self.password.clone());
        tracing::debug!("Submitting {:?} for '{}'", mode, credentials.username);

        Ok(async move {
            match mode {
                AuthMode::Login => api.login(&credentials).await,
                AuthMode::Register => api.register(&credentials).await,
            }
        }
        .boxed())
    }

    /// Applies the outcome of [`begin_submit`](Self::begin_submit).
    ///
    /// Returns the issued token on success; the caller hands it to the
    /// session controller. On failure the error line is set and `None` is
    /// returned.
    pub fn apply(&mut self, result: Result<AccessToken>) -> Option<AccessToken> {
        self.pending = false;
        match result {
            Ok(token) => {
                self.password.clear();
                Some(token)
            }
            Err(e) => {
                tracing::warn!("Sign-in failed: {}", e);
                self.error = Some(error_text(&e));
                None
            }
        }
    }

    pub async fn submit(&mut self) -> Result<Option<AccessToken>> {
        let request = self.begin_submit()?;
        let result = request.await;
        Ok(self.apply(result))
    }
}

fn error_text(err: &PortalError) -> String {
    match err {
        PortalError::Server {
            detail: Some(detail),
            ..
        } => detail.clone(),
        PortalError::Server { detail: None, .. } => GENERIC_FAILURE.to_string(),
        _ => CONNECT_FAILED.to_string(),
    }
}
