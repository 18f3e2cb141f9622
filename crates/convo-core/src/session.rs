use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::{ContextBlock, ConversationHistory, PromptAssembler};
use crate::document::DocumentTextExtractor;
use crate::error::ConvoError;
use crate::llm::{ModelGateway, ModelInput, UsageTracker};
use crate::poster::{Poster, PosterLookup};
use crate::response::{parse_agent_response, parse_movie_list, ParsedAgentResponse};
use crate::templates::{movie_prompt, trip_prompt, MovieRequest, TripRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecommendation {
    pub title: String,
    pub poster: Option<Poster>,
}

/// One user's conversation: created at start, dropped at the end, never shared.
///
/// Every operation takes `&mut self`, so a session has at most one model call
/// in flight. A turn pair is recorded only after the model answers; a failed
/// call leaves the history exactly as it was.
pub struct ChatSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    gateway: ModelGateway,
    assembler: PromptAssembler,
    history: ConversationHistory,
    document: Option<ContextBlock>,
    posters: Option<Box<dyn PosterLookup>>,
}

impl ChatSession {
    pub fn new(gateway: ModelGateway) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            gateway,
            assembler: PromptAssembler::default(),
            history: ConversationHistory::new(),
            document: None,
            posters: None,
        }
    }

    pub fn with_assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_poster_lookup(mut self, lookup: Box<dyn PosterLookup>) -> Self {
        self.posters = Some(lookup);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn document(&self) -> Option<&ContextBlock> {
        self.document.as_ref()
    }

    pub fn assembler(&self) -> &PromptAssembler {
        &self.assembler
    }

    pub fn model(&self) -> &str {
        self.gateway.model()
    }

    pub fn usage(&self) -> &UsageTracker {
        self.gateway.usage()
    }

    /// Message-list chat: the history (through the context window) plus this message.
    pub async fn send(&mut self, user_text: &str) -> Result<String, ConvoError> {
        let messages = self.assembler.assemble_messages(&self.history, user_text);
        let reply = self
            .gateway
            .generate(ModelInput::Conversation(messages))
            .await?;
        self.record(user_text, &reply);
        Ok(reply)
    }

    /// Flattened chat over the loaded document: only the header, the document and this question go out.
    pub async fn ask_document(&mut self, user_text: &str) -> Result<String, ConvoError> {
        let prompt = self
            .assembler
            .assemble_flattened(self.document.as_ref(), user_text);
        let reply = self.gateway.generate(ModelInput::Prompt(prompt)).await?;
        self.record(user_text, &reply);
        Ok(reply)
    }

    /// Replace the document context. Extraction failures leave an empty block behind.
    pub fn load_document(
        &mut self,
        bytes: &[u8],
        extractor: &dyn DocumentTextExtractor,
    ) -> &ContextBlock {
        let text = match extractor.extract(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("document extraction failed, continuing without it: {e}");
                String::new()
            }
        };
        self.set_document_text(text)
    }

    pub fn set_document_text(&mut self, text: impl Into<String>) -> &ContextBlock {
        let block = self.assembler.context_block(text);
        tracing::info!(chars = block.char_len(), "document context set");
        self.document.insert(block)
    }

    pub fn clear_document(&mut self) {
        self.document = None;
    }

    /// Render the trip template, ask once, split the reply into reasoning and itinerary.
    pub async fn plan_trip(
        &mut self,
        request: &TripRequest,
    ) -> Result<ParsedAgentResponse, ConvoError> {
        let prompt = trip_prompt(request);
        let raw = self
            .gateway
            .generate(ModelInput::Prompt(prompt.clone()))
            .await?;
        self.record(&prompt, &raw);
        Ok(parse_agent_response(&raw))
    }

    /// Ask for five titles, then look each one up. Lookup misses and errors leave `poster` empty.
    pub async fn recommend_movies(
        &mut self,
        request: &MovieRequest,
    ) -> Result<Vec<MovieRecommendation>, ConvoError> {
        let prompt = movie_prompt(request);
        let raw = self
            .gateway
            .generate(ModelInput::Prompt(prompt.clone()))
            .await?;
        self.record(&prompt, &raw);

        let mut picks = Vec::new();
        for title in parse_movie_list(&raw) {
            let poster = match self.posters {
                Some(ref lookup) => match lookup.lookup(&title).await {
                    Ok(poster) => poster,
                    Err(e) => {
                        tracing::warn!(%title, "poster lookup failed: {e}");
                        None
                    }
                },
                None => None,
            };
            picks.push(MovieRecommendation { title, poster });
        }
        Ok(picks)
    }

    /// Start over: fresh id, empty history, no document. Usage counters keep running.
    pub fn reset(&mut self) {
        self.id = Uuid::new_v4();
        self.created_at = Utc::now();
        self.history = ConversationHistory::new();
        self.document = None;
    }

    fn record(&mut self, user_text: &str, reply: &str) {
        self.history.append_user(user_text);
        self.history.append_assistant(reply);
    }
}
