//! Terminal rendering of portal state.
//!
//! The renderer remembers what it printed last and only prints what changed,
//! so it can be called after every command and every completion.

use colored::Colorize;
use docport_application::chat::{HISTORY_LOADING, THINKING};
use docport_application::files::{EMPTY_TEXT, HEADING, LOADING_TEXT};
use docport_application::{ActiveView, Alert, ChatView, FileListView, LoginView, Portal};
use docport_core::message::{Message, ScrollAnchor, Sender};
use docport_core::webhook::WebhookDisplay;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Renders a message body written in Markdown for the terminal.
pub fn render_markdown(source: &str) -> String {
    let mut out = String::new();
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut links: Vec<String> = Vec::new();
    let mut heading = false;
    let mut strong = 0usize;
    let mut emphasis = 0usize;
    let mut code_block = false;

    for event in Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                block_gap(&mut out);
                heading = true;
            }
            Event::End(TagEnd::Heading(_)) => {
                heading = false;
                out.push('\n');
            }
            Event::Start(Tag::Paragraph) if lists.is_empty() => block_gap(&mut out),
            Event::End(TagEnd::Paragraph) if lists.is_empty() => out.push('\n'),
            Event::Start(Tag::List(start)) => {
                if lists.is_empty() {
                    block_gap(&mut out);
                } else {
                    line_break(&mut out);
                }
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
            }
            Event::Start(Tag::Item) => {
                let indent = "  ".repeat(lists.len().saturating_sub(1));
                let marker = match lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                out.push_str(&indent);
                out.push_str(&marker);
            }
            Event::End(TagEnd::Item) => line_break(&mut out),
            Event::Start(Tag::CodeBlock(_)) => {
                block_gap(&mut out);
                code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                code_block = false;
                line_break(&mut out);
            }
            Event::Start(Tag::Strong) => strong += 1,
            Event::End(TagEnd::Strong) => strong = strong.saturating_sub(1),
            Event::Start(Tag::Emphasis) => emphasis += 1,
            Event::End(TagEnd::Emphasis) => emphasis = emphasis.saturating_sub(1),
            Event::Start(Tag::Link { dest_url, .. }) => links.push(dest_url.to_string()),
            Event::End(TagEnd::Link) => {
                if let Some(url) = links.pop() {
                    out.push_str(&format!(" <{}>", url).dimmed().to_string());
                }
            }
            Event::Text(text) if code_block => {
                for line in text.lines() {
                    out.push_str("    ");
                    out.push_str(&line.cyan().to_string());
                    out.push('\n');
                }
            }
            Event::Text(text) => {
                let styled = if heading || strong > 0 {
                    text.bold()
                } else if emphasis > 0 {
                    text.italic()
                } else {
                    text.normal()
                };
                out.push_str(&styled.to_string());
            }
            Event::Code(code) => out.push_str(&code.cyan().to_string()),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => {
                block_gap(&mut out);
                out.push_str("---\n");
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

fn line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn block_gap(out: &mut String) {
    if out.is_empty() || out.ends_with("\n\n") {
        return;
    }
    line_break(out);
    out.push('\n');
}

pub fn print_alert(alert: &Alert) {
    println!("{}", format!("! {}", alert).bright_yellow().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}

pub fn print_info(message: &str) {
    println!("{}", message.bright_black());
}

fn print_message(message: &Message) {
    match message.sender {
        Sender::User => println!("{}", format!("> {}", message.text).green()),
        Sender::Bot => {
            for line in render_markdown(&message.text).lines() {
                println!("  {}", line.bright_blue());
            }
        }
    }
}

pub fn print_files(chat: &ChatView) {
    match chat.files().view() {
        FileListView::Loading => print_info(LOADING_TEXT),
        FileListView::Empty => print_info(EMPTY_TEXT),
        FileListView::Documents(documents) => {
            println!("{}", HEADING.bright_magenta().bold());
            for document in documents {
                println!(
                    "  {} {}",
                    format!("[{}]", document.id).bright_black(),
                    document.filename
                );
            }
        }
    }
}

pub fn print_login_form(login: &LoginView) {
    println!("{}", login.heading().bright_magenta().bold());
    let (question, action) = login.toggle_hint();
    print_info(&format!(
        "/login <username> <password> to {}. {} /register to {}.",
        login.submit_label().to_lowercase(),
        question,
        action.to_lowercase()
    ));
}

/// Background work of the chat view that shows an indicator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Pending {
    history: bool,
    upload: bool,
    webhook: bool,
}

impl Pending {
    fn of(chat: &ChatView) -> Self {
        Self {
            history: chat.is_history_loading(),
            upload: chat.is_uploading(),
            webhook: chat.is_webhook_loading(),
        }
    }

    /// The flags that switched on since `previous`.
    fn started_since(self, previous: Pending) -> Pending {
        Pending {
            history: self.history && !previous.history,
            upload: self.upload && !previous.upload,
            webhook: self.webhook && !previous.webhook,
        }
    }
}

/// What was on screen after the last render.
#[derive(Default)]
pub struct Renderer {
    anchor: ScrollAnchor,
    route: Option<String>,
    login_error: Option<String>,
    files: Option<Vec<String>>,
    files_loading: bool,
    upload_status: Option<String>,
    thinking: bool,
    pending: Pending,
    webhook: WebhookDisplay,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints everything that changed since the previous call.
    pub fn render(&mut self, portal: &Portal) {
        let route = portal.route().path();
        let remounted = self.route.as_deref() != Some(route.as_str());
        if remounted {
            let previous_language_only = matches!(
                (&self.route, portal.view()),
                (Some(previous), ActiveView::Chat(_)) if previous != "/login"
            );
            if previous_language_only {
                print_info(&format!("Questions are now asked in '{}'", &route[1..]));
                self.route = Some(route);
            } else {
                // new surface, nothing printed yet
                *self = Self::new();
                self.route = Some(route);
                if let ActiveView::Login(login) = portal.view() {
                    print_login_form(login);
                }
            }
        }

        match portal.view() {
            ActiveView::Login(login) => self.render_login(login),
            ActiveView::Chat(chat) => self.render_chat(chat),
        }
    }

    fn render_login(&mut self, login: &LoginView) {
        let error = login.error().map(str::to_string);
        if error != self.login_error {
            if let Some(error) = &error {
                print_error(error);
            }
            self.login_error = error;
        }
    }

    fn render_chat(&mut self, chat: &ChatView) {
        let pending = Pending::of(chat);
        let started = pending.started_since(self.pending);
        if started.history {
            print_info(HISTORY_LOADING);
        }
        if started.upload {
            print_info(&format!("[{}]", chat.upload_label()));
        }
        if started.webhook {
            print_info(&format!("[{}]", chat.webhook_label()));
        }
        self.pending = pending;

        let files: Option<Vec<String>> = match chat.files().view() {
            FileListView::Loading => None,
            FileListView::Empty => Some(Vec::new()),
            FileListView::Documents(documents) => Some(
                documents
                    .iter()
                    .map(|d| format!("{}:{}", d.id, d.filename))
                    .collect(),
            ),
        };
        let loading = files.is_none();
        if loading != self.files_loading || (!loading && files != self.files) {
            print_files(chat);
            self.files_loading = loading;
            if !loading {
                self.files = files;
            }
        }

        let transcript = chat.transcript();
        if self.anchor.is_reset(transcript) && !transcript.is_empty() {
            println!();
        }
        for message in self.anchor.unseen(transcript) {
            print_message(message);
        }

        let thinking = chat.thinking();
        if thinking && !self.thinking {
            println!("  {}", THINKING.bright_black().italic());
        }
        self.thinking = thinking;

        let status = chat.upload_status().map(str::to_string);
        if status != self.upload_status {
            if let Some(status) = &status {
                println!("{}", status.yellow());
            }
            self.upload_status = status;
        }

        if chat.webhook() != &self.webhook {
            match chat.webhook() {
                WebhookDisplay::Url(url) => {
                    println!("{}", "Your public URL is:".bright_magenta());
                    println!("  {}", url.underline());
                }
                WebhookDisplay::Unavailable(reason) => print_error(reason),
                WebhookDisplay::Empty => {}
            }
            self.webhook = chat.webhook().clone();
        }
    }

    /// Prints the whole transcript again and pins the anchor to its end.
    pub fn replay(&mut self, chat: &ChatView) {
        self.anchor = ScrollAnchor::new();
        if chat.transcript().is_empty() {
            print_info("No messages yet.");
        }
        for message in self.anchor.unseen(chat.transcript()) {
            print_message(message);
        }
    }
}
