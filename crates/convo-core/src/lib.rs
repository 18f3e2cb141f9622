pub mod error;
pub mod constants;
pub mod llm;
pub mod context;
pub mod config;
pub mod templates;
pub mod response;
pub mod document;
pub mod poster;
pub mod session;

// Re-export key types
pub use error::ConvoError;
pub use llm::{LlmClient, LlmResponse, Message, ModelGateway, ModelInput, Role};
pub use context::{ContextBlock, ContextWindow, ConversationHistory, PromptAssembler};
pub use config::Settings;
pub use templates::{BudgetTier, MovieRequest, TripRequest};
pub use response::{parse_agent_response, parse_movie_list, ParsedAgentResponse};
pub use document::{DocumentTextExtractor, PdfTextExtractor};
pub use poster::{Poster, PosterLookup, TmdbPosterLookup};
pub use session::{ChatSession, MovieRecommendation};
