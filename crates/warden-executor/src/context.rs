//! The executor context: `(messages, iteration, retry)`.

use warden_core::{Conversation, Message};

/// The evolving per-activation state mutated only through executor
/// transitions.
#[derive(Debug, Clone)]
pub struct Context {
    pub conversation: Conversation,
    /// Successful-step counter; monotonically non-decreasing within a loop
    /// activation, reset to 0 on `continue` entry.
    pub iteration: u32,
    /// Consecutive-failure counter; reset to 0 on any success or on
    /// `continue` entry.
    pub retry: u32,
}

impl Context {
    /// Start a fresh context for `run`: `[system_prompt, user(task)]`,
    /// counters at zero.
    pub fn fresh(system_prompt: impl Into<String>, task: impl Into<String>) -> Self {
        Self { conversation: Conversation::new(system_prompt, task), iteration: 0, retry: 0 }
    }

    /// Append `message` and reset both counters, for `continue` entry.
    pub fn resume(&mut self, message: Option<Message>) {
        if let Some(message) = message {
            self.conversation.push(message);
        }
        self.iteration = 0;
        self.retry = 0;
    }
}
