//! Prompt - the message pair sent to a text-generation service

/// A chat-style prompt: a system instruction plus a user message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prompt {
    /// System instruction
    pub system: String,

    /// User message (instructions with the documentation text substituted)
    pub user: String,
}

impl Prompt {
    /// Create a new prompt
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Combined byte length of both messages
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    /// Whether both messages are empty
    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}
