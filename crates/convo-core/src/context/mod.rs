mod history;
mod builder;

pub use history::{ContextWindow, ConversationHistory};
pub use builder::{ContextBlock, PromptAssembler};
