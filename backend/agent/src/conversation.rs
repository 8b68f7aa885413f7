//! Per-request conversation history.
//!
//! Append-only: entries are pushed by the dispatch loop and never edited or
//! removed while the request runs.

use uuid::Uuid;

use lexdesk_core::{Message, Role};

#[derive(Debug, Clone)]
pub struct Conversation {
    id: String,
    messages: Vec<Message>,
}

impl Conversation {
    /// A conversation that starts with the given system prompt.
    pub fn new(system: Message) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: vec![system],
        }
    }

    /// System prompt followed by client-supplied history.
    pub fn with_history(system: Message, history: Vec<Message>) -> Self {
        let mut conversation = Self::new(system);
        conversation.messages.extend(history);
        conversation
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Content of the most recent assistant entry.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_follows_system_prompt() {
        let mut conversation = Conversation::with_history(
            Message::system("sys"),
            vec![Message::user("hi"), Message::assistant("hello"), Message::user("book me")],
        );
        conversation.push(Message::assistant("Booked."));

        assert_eq!(conversation.len(), 5);
        assert_eq!(conversation.messages()[0].role, Role::System);
        assert_eq!(conversation.last_assistant_text(), Some("Booked."));
    }
}
