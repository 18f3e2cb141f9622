use crate::error::ConvoError;
use crate::llm::{Message, Role};

/// Append-only record of one session's turns.
///
/// The same sequence feeds both the display and prompt assembly. Nothing is
/// ever evicted or rewritten; trimming what the model sees is the job of
/// [`ContextWindow`].
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only user and assistant turns are stored; system text belongs to assembled input.
    pub fn append(&mut self, message: Message) -> Result<(), ConvoError> {
        if message.role() == Role::System {
            return Err(ConvoError::Other(
                "system turns cannot be stored in conversation history".into(),
            ));
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn append_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn all(&self) -> &[Message] {
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

    pub fn latest_user(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role() == Role::User)
    }

    pub fn estimate_tokens(&self) -> usize {
        self.messages.iter().map(|m| m.content().len() / 4).sum()
    }
}

/// Bound on how many stored turns are replayed to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextWindow {
    max_turns: Option<usize>,
}

impl ContextWindow {
    pub fn unbounded() -> Self {
        Self { max_turns: None }
    }

    pub fn last_turns(max_turns: usize) -> Self {
        Self {
            max_turns: Some(max_turns),
        }
    }

    /// Settings use 0 to mean "no limit".
    pub fn from_setting(max_turns: usize) -> Self {
        if max_turns == 0 {
            Self::unbounded()
        } else {
            Self::last_turns(max_turns)
        }
    }

    pub fn max_turns(&self) -> Option<usize> {
        self.max_turns
    }

    /// The suffix of `turns` to replay. Once a bound cuts in, leading assistant
    /// turns are dropped so the window opens on a user turn.
    pub fn select<'a>(&self, turns: &'a [Message]) -> &'a [Message] {
        let Some(max) = self.max_turns else {
            return turns;
        };
        if turns.len() <= max {
            return turns;
        }

        let mut window = &turns[turns.len() - max..];
        while let Some(first) = window.first() {
            if first.role() == Role::User {
                break;
            }
            window = &window[1..];
        }
        window
    }
}
