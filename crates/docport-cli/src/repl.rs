//! rustyline front end. Runs on its own thread and talks to the view loop
//! over channels.

use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::{mpsc, oneshot};

use crate::commands::{Command, SLASH_COMMANDS};
use crate::render;
use crate::view_loop::{Ack, Envelope, UserInput};

/// Completion, highlighting and hints for slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: SLASH_COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: format!("{} ", cmd),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Sends `input` and waits until the view loop has applied it.
fn send(tx: &mpsc::Sender<Envelope>, input: UserInput) -> Option<Ack> {
    let (reply, ack) = oneshot::channel();
    tx.blocking_send(Envelope { input, reply }).ok()?;
    ack.blocking_recv().ok()
}

/// Reads lines until `quit` or end of input. Returning drops `tx`, which
/// stops the view loop.
pub fn run(tx: mpsc::Sender<Envelope>) -> rustyline::Result<()> {
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== docport ===".bright_magenta().bold());
    render::print_info("Type /help for commands, or 'quit' to exit.");
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if !Command::is_sensitive(trimmed) {
                    let _ = rl.add_history_entry(trimmed);
                }

                let command = match Command::parse(trimmed) {
                    Ok(Command::Quit) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Ok(command) => command,
                    Err(message) => {
                        render::print_error(&message);
                        continue;
                    }
                };

                match send(&tx, UserInput::Command(command)) {
                    Some(Ack::Done) => {}
                    Some(Ack::Confirm(confirmation)) => {
                        let accepted = confirm(&mut rl, &confirmation.prompt())?;
                        send(
                            &tx,
                            UserInput::ConfirmDelete {
                                confirmation,
                                accepted,
                            },
                        );
                    }
                    None => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

/// Asks a yes/no question; anything but yes declines.
fn confirm(rl: &mut Editor<CliHelper, DefaultHistory>, prompt: &str) -> rustyline::Result<bool> {
    println!("{}", prompt.bright_yellow());
    match rl.readline("[y/N] ") {
        Ok(answer) => Ok(is_yes(&answer)),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(false),
        Err(err) => Err(err),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
