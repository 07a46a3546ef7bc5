//! Finance assistant chat placeholder.
//!
//! There is no model behind it yet: every question gets a canned answer
//! quoting the question back.

/// Who wrote a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "You:",
            Speaker::Assistant => "Finance Assistant:",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Speaker::User => "mb-3",
            Speaker::Assistant => "ai-assistant-message",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub speaker: Speaker,
    /// Paragraphs, displayed one per block
    pub lines: Vec<String>,
}

/// Canned answer for a question.
pub fn placeholder_reply(query: &str) -> ChatMessage {
    ChatMessage {
        speaker: Speaker::Assistant,
        lines: vec![
            format!(
                "I'm analyzing your financial data based on your question: \"{}\"",
                query
            ),
            "This is a placeholder response. In the real app, this would be connected to your AI backend."
                .to_string(),
        ],
    }
}

/// Ordered chat history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append the user's question.
    ///
    /// Blank questions are ignored and yield `None`; otherwise the question
    /// to answer is returned.
    pub fn submit(&mut self, query: &str) -> Option<String> {
        if query.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage {
            speaker: Speaker::User,
            lines: vec![query.to_string()],
        });
        Some(query.to_string())
    }

    /// Append the placeholder answer to `query`.
    pub fn answer(&mut self, query: &str) {
        self.messages.push(placeholder_reply(query));
    }
}
