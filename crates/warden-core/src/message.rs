//! Conversation messages.
//!
//! A [`Message`] is the unit of exchange between the executor loop and the
//! LLM transport. Every conversation carried by an [`crate::context`]
//! begins with exactly one [`Role::System`] message immediately followed by
//! at least one [`Role::User`] message (enforced by [`Conversation::new`]).

use serde::{Deserialize, Serialize};

/// The role of a participant in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions that shape model behavior.
    System,
    /// Input from the human user, or fed-back execution results/errors.
    User,
    /// Output from the LLM.
    Assistant,
}

/// A single message in a conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who produced this message.
    pub role: Role,
    /// The textual content of the message.
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// An ordered, append-only conversation history.
///
/// Invariant: the first message is always [`Role::System`] and is
/// immediately followed by at least one [`Role::User`] message. This is
/// enforced at construction time; later appends via [`Conversation::push`]
/// are unrestricted (the executor is responsible for only ever appending
/// `user`/`assistant` turns after the initial two).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a new conversation with the required `system` + `user` prefix.
    pub fn new(system_prompt: impl Into<String>, first_user_message: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(first_user_message)],
        }
    }

    /// Append a message to the end of the conversation.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Borrow the full message sequence.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages currently in the conversation.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation has no messages (never true once constructed
    /// via [`Conversation::new`], but relevant to generic callers).
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_conversation_starts_with_system_then_user() {
        let convo = Conversation::new("be helpful", "do the thing");
        assert_eq!(convo.len(), 2);
        assert_eq!(convo.messages()[0].role, Role::System);
        assert_eq!(convo.messages()[1].role, Role::User);
    }

    #[test]
    fn push_appends_in_order() {
        let mut convo = Conversation::new("sys", "task");
        convo.push(Message::assistant("thinking"));
        convo.push(Message::user("feedback"));
        assert_eq!(convo.len(), 4);
        assert_eq!(convo.messages()[2].role, Role::Assistant);
        assert_eq!(convo.messages()[3].content, "feedback");
    }

    #[test]
    fn message_constructors_set_role() {
        assert_eq!(Message::system("s").role, Role::System);
        assert_eq!(Message::user("u").role, Role::User);
        assert_eq!(Message::assistant("a").role, Role::Assistant);
    }
}
