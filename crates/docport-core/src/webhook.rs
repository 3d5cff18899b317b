//! Public webhook URL shown in the chat view.

/// What the webhook panel currently displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WebhookDisplay {
    /// Nothing fetched yet.
    #[default]
    Empty,
    /// The URL returned by `/webhooks/me`.
    Url(String),
    /// A placeholder explaining why no URL is available.
    Unavailable(String),
}

impl WebhookDisplay {
    /// The text shown in the read-only field, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            WebhookDisplay::Empty => None,
            WebhookDisplay::Url(url) => Some(url),
            WebhookDisplay::Unavailable(reason) => Some(reason),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            WebhookDisplay::Url(url) => Some(url),
            _ => None,
        }
    }
}
