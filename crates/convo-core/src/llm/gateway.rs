use crate::error::ConvoError;
use crate::llm::provider::UsageTracker;
use crate::llm::traits::{LlmClient, Message};

/// What gets handed to the model: a single flattened prompt or a message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelInput {
    Prompt(String),
    Conversation(Vec<Message>),
}

impl ModelInput {
    fn into_messages(self) -> Vec<Message> {
        match self {
            ModelInput::Prompt(text) => vec![Message::user(text)],
            ModelInput::Conversation(messages) => messages,
        }
    }
}

/// Boundary to the text-generation backend.
///
/// Every call is exactly one request: no retry, no streaming, no timeout of
/// its own. Errors from the client are returned to the caller untouched.
pub struct ModelGateway {
    llm: Box<dyn LlmClient>,
    usage: UsageTracker,
}

impl ModelGateway {
    pub fn new(llm: Box<dyn LlmClient>) -> Self {
        Self {
            llm,
            usage: UsageTracker::default(),
        }
    }

    pub async fn generate(&mut self, input: ModelInput) -> Result<String, ConvoError> {
        let messages = input.into_messages();
        let response = self.llm.chat(&messages).await?;

        match response.usage {
            Some(usage) => self.usage.track(usage.input_tokens, usage.output_tokens),
            None => self.usage.track(0, 0),
        }

        Ok(response.message.content().to_string())
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }
}
