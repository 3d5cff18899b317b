//! Conversation transcript types.
//!
//! # Module Structure
//!
//! - [`Message`] / [`Sender`]: a single rendered chat bubble
//! - [`HistoryEntry`]: one question/answer pair from `/chat/history`
//! - [`Transcript`]: the in-memory, append-only message sequence
//! - [`PendingTurn`]: handle for an optimistically appended question
//! - [`ScrollAnchor`]: tracks which messages a renderer has already shown

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// A question/answer pair as stored by the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
}

/// Handle for a question that was appended before the portal answered.
///
/// The turn is tied to the transcript epoch it was created in; once the
/// transcript is cleared the handle goes stale and settling it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTurn {
    epoch: u64,
    index: usize,
}

/// How a pending turn was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnSettlement {
    /// The reply was appended after the question.
    Appended,
    /// The transcript was cleared while the question was in flight.
    Stale,
}

/// Ordered user/bot messages for the current session.
///
/// Messages are only ever appended, except for [`Transcript::clear`], which
/// drops everything and starts a new epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
    tentative: Vec<usize>,
    epoch: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens server history into alternating user/bot messages, keeping
    /// the server order.
    pub fn from_history(entries: impl IntoIterator<Item = HistoryEntry>) -> Self {
        let messages = entries
            .into_iter()
            .flat_map(|entry| [Message::user(entry.question), Message::bot(entry.answer)])
            .collect();
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Replaces the contents with server history, starting a new epoch.
    pub fn replace_with_history(&mut self, entries: impl IntoIterator<Item = HistoryEntry>) {
        let epoch = self.epoch + 1;
        *self = Self::from_history(entries);
        self.epoch = epoch;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Appends the user's question as a tentative entry.
    pub fn begin_turn(&mut self, question: impl Into<String>) -> PendingTurn {
        let index = self.messages.len();
        self.messages.push(Message::user(question));
        self.tentative.push(index);
        PendingTurn {
            epoch: self.epoch,
            index,
        }
    }

    /// Whether the message at `index` is a question still awaiting its reply.
    pub fn is_tentative(&self, index: usize) -> bool {
        self.tentative.contains(&index)
    }

    pub fn has_tentative(&self) -> bool {
        !self.tentative.is_empty()
    }

    /// Confirms the turn and appends the bot's answer.
    pub fn confirm(&mut self, turn: PendingTurn, answer: impl Into<String>) -> TurnSettlement {
        self.settle(turn, Message::bot(answer))
    }

    /// Settles a failed turn.
    ///
    /// The question stays in place and `reply` (the formatted error) is
    /// appended as a bot message so the failure reads next to the question
    /// it belongs to.
    pub fn fail(&mut self, turn: PendingTurn, reply: impl Into<String>) -> TurnSettlement {
        self.settle(turn, Message::bot(reply))
    }

    fn settle(&mut self, turn: PendingTurn, reply: Message) -> TurnSettlement {
        if turn.epoch != self.epoch {
            return TurnSettlement::Stale;
        }
        self.tentative.retain(|&i| i != turn.index);
        self.messages.push(reply);
        TurnSettlement::Appended
    }

    /// Drops every message. Pending turns from before the clear go stale.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.tentative.clear();
        self.epoch += 1;
    }
}

/// Keeps a renderer pinned to the newest transcript entries.
///
/// Each call to [`ScrollAnchor::unseen`] returns the messages appended since
/// the previous call. When the transcript starts a new epoch the anchor
/// snaps back to its beginning.
#[derive(Debug, Clone, Default)]
pub struct ScrollAnchor {
    epoch: u64,
    seen: usize,
}

impl ScrollAnchor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unseen<'a>(&mut self, transcript: &'a Transcript) -> &'a [Message] {
        if transcript.epoch() != self.epoch {
            self.epoch = transcript.epoch();
            self.seen = 0;
        }
        let start = self.seen.min(transcript.len());
        self.seen = transcript.len();
        &transcript.messages()[start..]
    }

    /// True when the transcript was cleared or replaced since the last render.
    pub fn is_reset(&self, transcript: &Transcript) -> bool {
        transcript.epoch() != self.epoch
    }
}
