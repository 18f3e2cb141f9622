mod traits;
mod gemini;
mod openai;
mod gateway;
pub mod provider;

pub use traits::*;
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
pub use gateway::{ModelGateway, ModelInput};
pub use provider::{GenerationOptions, ProviderConfig, ProviderId, ProviderRegistry, UsageTracker};
