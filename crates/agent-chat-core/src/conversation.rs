//! The ordered transcript of a chat session.

use thiserror::Error;

use crate::state::Message;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("conversation has no removable messages")]
    EmptyConversation,
    #[error("a reply placeholder is already pending")]
    PlaceholderPending,
}

/// Transcript with a permanent assistant seed at index 0.
///
/// The only non-append mutation is `remove_last`, and the seed can never be
/// removed. At most one placeholder exists and it is always the last element.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    pending: bool,
}

impl Conversation {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::assistant(seed)],
            pending: false,
        }
    }

    /// Add a message after every real message. A pending placeholder stays
    /// last.
    pub fn append(&mut self, message: Message) {
        if self.pending {
            let at = self.messages.len() - 1;
            self.messages.insert(at, message);
        } else {
            self.messages.push(message);
        }
    }

    pub fn append_placeholder(&mut self) -> Result<(), ConversationError> {
        if self.pending {
            return Err(ConversationError::PlaceholderPending);
        }
        self.messages.push(Message::placeholder());
        self.pending = true;
        Ok(())
    }

    pub fn remove_last(&mut self) -> Result<Message, ConversationError> {
        if self.messages.len() <= 1 {
            return Err(ConversationError::EmptyConversation);
        }
        let removed = self
            .messages
            .pop()
            .ok_or(ConversationError::EmptyConversation)?;
        self.pending = false;
        Ok(removed)
    }

    /// Messages to send to the reply service: everything but the seed and a
    /// trailing placeholder.
    pub fn visible_slice(&self) -> &[Message] {
        let end = self.messages.len() - usize::from(self.pending);
        &self.messages[1..end]
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn seed(&self) -> &Message {
        &self.messages[0]
    }

    pub fn has_placeholder(&self) -> bool {
        self.pending
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Role, PENDING_MARKER};

    #[test]
    fn test_new_holds_only_seed() {
        let conversation = Conversation::new("Ask me anything.");
        assert_eq!(conversation.all().len(), 1);
        assert_eq!(conversation.seed(), &Message::assistant("Ask me anything."));
        assert!(conversation.visible_slice().is_empty());
        assert!(!conversation.has_placeholder());
    }

    #[test]
    fn test_visible_slice_skips_seed_and_placeholder() {
        let mut conversation = Conversation::new("seed");
        conversation.append(Message::user("hello"));
        conversation.append_placeholder().unwrap();

        assert_eq!(conversation.all().len(), 3);
        assert_eq!(conversation.visible_slice(), &[Message::user("hello")]);

        let last = conversation.all().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, PENDING_MARKER);
    }

    #[test]
    fn test_second_placeholder_is_refused() {
        let mut conversation = Conversation::new("seed");
        conversation.append(Message::user("hello"));
        conversation.append_placeholder().unwrap();

        assert_eq!(
            conversation.append_placeholder(),
            Err(ConversationError::PlaceholderPending)
        );
        assert_eq!(conversation.all().len(), 3);
    }

    #[test]
    fn test_remove_last_drops_placeholder() {
        let mut conversation = Conversation::new("seed");
        conversation.append(Message::user("hello"));
        conversation.append_placeholder().unwrap();

        let removed = conversation.remove_last().unwrap();
        assert_eq!(removed, Message::placeholder());
        assert!(!conversation.has_placeholder());
        assert_eq!(conversation.visible_slice(), &[Message::user("hello")]);
    }

    #[test]
    fn test_seed_is_never_removed() {
        let mut conversation = Conversation::new("seed");
        conversation.append(Message::user("hello"));

        conversation.remove_last().unwrap();
        assert_eq!(
            conversation.remove_last(),
            Err(ConversationError::EmptyConversation)
        );
        assert_eq!(conversation.all(), &[Message::assistant("seed")]);
    }

    #[test]
    fn test_append_while_pending_keeps_placeholder_last() {
        let mut conversation = Conversation::new("seed");
        conversation.append(Message::user("hello"));
        conversation.append_placeholder().unwrap();

        conversation.append(Message::user("late"));

        assert!(conversation.has_placeholder());
        assert_eq!(
            conversation.all(),
            &[
                Message::assistant("seed"),
                Message::user("hello"),
                Message::user("late"),
                Message::placeholder(),
            ]
        );
        assert_eq!(
            conversation.visible_slice(),
            &[Message::user("hello"), Message::user("late")]
        );

        assert_eq!(conversation.remove_last().unwrap(), Message::placeholder());
        assert_eq!(conversation.all().last(), Some(&Message::user("late")));
    }

    #[test]
    fn test_reply_that_reads_like_marker_is_not_a_placeholder() {
        let mut conversation = Conversation::new("seed");
        conversation.append(Message::user("say the marker"));
        conversation.append(Message::assistant(PENDING_MARKER));

        assert!(!conversation.has_placeholder());
        assert_eq!(conversation.visible_slice().len(), 2);
    }
}
