//! State of the floating chat box.
//!
//! The widget never performs I/O. [`ChatWidget::submit`] hands back a
//! [`ChatRequest`] for the caller to send, and the caller reports progress
//! through [`ChatWidget::apply`]. Every request carries a [`RequestTag`];
//! events for anything but the current tag are dropped, so a superseded or
//! torn-down request can never write into the answer.

use outletmap_client::ClientError;

use crate::format::format_response;

pub const LOADING_TEXT: &str = "⏳ Thinking...";

/// Monotonic identifier of one submitted question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestTag(u64);

impl std::fmt::Display for RequestTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chat#{}", self.0)
    }
}

/// Why a chat request ended without a complete answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFailure {
    /// The request never got a response (network failure or timeout).
    Transport,
    /// The server responded with a non-success status or no body.
    BadResponse,
    /// The body broke off or stalled while being read.
    Stream,
}

impl ChatFailure {
    /// The fixed text shown in place of the answer.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ChatFailure::BadResponse => "⚠️ Failed to get response from AI.",
            ChatFailure::Transport | ChatFailure::Stream => {
                "❌ Error occurred while fetching response."
            }
        }
    }
}

/// Classifies an error from opening the chat request. Errors raised after the
/// body started arriving are always [`ChatFailure::Stream`].
impl From<&ClientError> for ChatFailure {
    fn from(err: &ClientError) -> Self {
        if err.is_bad_response() {
            ChatFailure::BadResponse
        } else {
            ChatFailure::Transport
        }
    }
}

/// A question ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub tag: RequestTag,
    pub message: String,
    /// The in-flight request this one replaces; its transfer should be aborted.
    pub supersedes: Option<RequestTag>,
}

/// Progress report for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Chunk { tag: RequestTag, text: String },
    Finished { tag: RequestTag },
    Failed { tag: RequestTag, failure: ChatFailure },
}

impl ChatEvent {
    #[must_use]
    pub fn tag(&self) -> RequestTag {
        match self {
            ChatEvent::Chunk { tag, .. }
            | ChatEvent::Finished { tag }
            | ChatEvent::Failed { tag, .. } => *tag,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Answer {
    #[default]
    Empty,
    Text(String),
    Failed(ChatFailure),
}

#[derive(Debug, Default)]
pub struct ChatWidget {
    input: String,
    answer: Answer,
    loading: bool,
    active: Option<RequestTag>,
    next_tag: u64,
}

impl ChatWidget {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh widget whose tags continue after `issued`, so events from a
    /// previous instance's requests can never match this one's.
    #[must_use]
    pub(crate) fn continuing_after(issued: u64) -> Self {
        Self {
            next_tag: issued,
            ..Self::default()
        }
    }

    /// Number of tags handed out so far, including by earlier instances.
    #[must_use]
    pub(crate) fn issued(&self) -> u64 {
        self.next_tag
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Handles a key press in the input field. Only Enter submits.
    pub fn key_press(&mut self, key: &str) -> Option<ChatRequest> {
        if key == "Enter" {
            self.submit()
        } else {
            None
        }
    }

    /// Submits the current input.
    ///
    /// Returns `None` without touching any state when the trimmed input is
    /// empty. Otherwise clears the input and the previous answer, shows the
    /// loading indicator, and supersedes any request still in flight.
    pub fn submit(&mut self) -> Option<ChatRequest> {
        let message = self.input.trim();
        if message.is_empty() {
            return None;
        }
        let message = message.to_owned();

        self.next_tag += 1;
        let tag = RequestTag(self.next_tag);
        let supersedes = self.active.replace(tag);

        self.input.clear();
        self.answer = Answer::Empty;
        self.loading = true;

        if let Some(old) = supersedes {
            tracing::debug!(%old, new = %tag, "chat request superseded");
        }

        Some(ChatRequest {
            tag,
            message,
            supersedes,
        })
    }

    /// Applies a progress event. Returns `false` if the event was stale.
    pub fn apply(&mut self, event: ChatEvent) -> bool {
        if self.active != Some(event.tag()) {
            tracing::trace!(tag = %event.tag(), "dropping stale chat event");
            return false;
        }

        match event {
            ChatEvent::Chunk { text, .. } => {
                self.loading = false;
                match &mut self.answer {
                    Answer::Text(acc) => acc.push_str(&text),
                    other => *other = Answer::Text(text),
                }
            }
            ChatEvent::Finished { .. } => {
                self.loading = false;
                self.active = None;
            }
            ChatEvent::Failed { failure, .. } => {
                self.loading = false;
                self.active = None;
                self.answer = Answer::Failed(failure);
            }
        }
        true
    }

    /// Abandons the in-flight request, if any, and returns its tag.
    pub fn cancel(&mut self) -> Option<RequestTag> {
        self.loading = false;
        self.active.take()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn active_request(&self) -> Option<RequestTag> {
        self.active
    }

    /// The unformatted answer received so far.
    #[must_use]
    pub fn raw_answer(&self) -> &str {
        match &self.answer {
            Answer::Text(text) => text,
            Answer::Empty | Answer::Failed(_) => "",
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<ChatFailure> {
        match self.answer {
            Answer::Failed(failure) => Some(failure),
            Answer::Empty | Answer::Text(_) => None,
        }
    }

    /// Markup for the answer region: the formatted answer, or the fixed
    /// failure message.
    #[must_use]
    pub fn rendered_answer(&self) -> String {
        match &self.answer {
            Answer::Empty => String::new(),
            Answer::Text(text) => format_response(text),
            Answer::Failed(failure) => failure.message().to_owned(),
        }
    }
}
