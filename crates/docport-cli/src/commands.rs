//! Parsing REPL input into commands.

use docport_core::document::DocumentId;
use std::path::PathBuf;

/// Slash commands offered for completion, in help order.
pub const SLASH_COMMANDS: &[&str] = &[
    "/login", "/register", "/files", "/select", "/upload", "/delete", "/webhook", "/copy",
    "/history", "/lang", "/go", "/logout", "/help",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit the login or registration form.
    Login { username: String, password: String },
    /// Switch between login and registration.
    ToggleRegister,
    Files,
    Select(PathBuf),
    /// Upload the selection, selecting `path` first when given.
    Upload(Option<PathBuf>),
    Delete(DocumentId),
    Webhook,
    Copy,
    History,
    Navigate(String),
    Logout,
    Help,
    Quit,
    /// Anything that is not a command is a question.
    Ask(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            return Ok(Command::Quit);
        }
        if !line.starts_with('/') {
            return Ok(Command::Ask(line.to_string()));
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name {
            "/login" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(username), Some(password), None) => Ok(Command::Login {
                        username: username.to_string(),
                        password: password.to_string(),
                    }),
                    _ => Err("Usage: /login <username> <password>".to_string()),
                }
            }
            "/register" => Ok(Command::ToggleRegister),
            "/files" => Ok(Command::Files),
            "/select" if !rest.is_empty() => Ok(Command::Select(PathBuf::from(rest))),
            "/select" => Err("Usage: /select <path>".to_string()),
            "/upload" if rest.is_empty() => Ok(Command::Upload(None)),
            "/upload" => Ok(Command::Upload(Some(PathBuf::from(rest)))),
            "/delete" if !rest.is_empty() && !rest.contains(char::is_whitespace) => {
                Ok(Command::Delete(DocumentId::new(rest)))
            }
            "/delete" => Err("Usage: /delete <id>".to_string()),
            "/webhook" => Ok(Command::Webhook),
            "/copy" => Ok(Command::Copy),
            "/history" => Ok(Command::History),
            "/lang" if !rest.is_empty() => Ok(Command::Navigate(format!("/{}", rest))),
            "/lang" => Err("Usage: /lang <code>".to_string()),
            "/go" if !rest.is_empty() => Ok(Command::Navigate(rest.to_string())),
            "/go" => Err("Usage: /go <path>".to_string()),
            "/logout" => Ok(Command::Logout),
            "/help" => Ok(Command::Help),
            other => Err(format!("Unknown command: {}", other)),
        }
    }

    /// Whether the line may be kept in readline history.
    pub fn is_sensitive(line: &str) -> bool {
        line.trim_start().starts_with("/login")
    }
}

pub fn help_text() -> &'static str {
    "\
/login <user> <pass>  sign in (or register, see /register)
/register             switch between login and registration
/files                show your uploaded documents
/select <path>        choose a file to upload
/upload [path]        upload the selected file
/delete <id>          delete a document
/webhook              get your public webhook URL
/copy                 copy the webhook URL to the clipboard
/history              show the whole transcript again
/lang <code>          ask questions in another language
/go <path>            open a route, e.g. /go /login
/logout               sign out
quit                  exit
Anything else is sent as a question."
}
