/// Centralized constants for convo.
/// Endpoints, defaults, and the literal strings of the prompt/response contracts.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
    pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
    pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-2.5-flash";
    pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai";
    pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api";
    pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
    pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org";
    pub const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const TEMPERATURE: f32 = 0.9;
    pub const GEMINI_API_KEY_ENV: &str = "GOOGLE_API_KEY";
    pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";
    /// Document excerpts are cut to this many characters before prompting.
    pub const MAX_DOCUMENT_CHARS: usize = 8000;
    /// Turns replayed to the model in message-list mode. 0 disables the window.
    pub const MAX_HISTORY_TURNS: usize = 40;
    pub const MOVIE_PICKS: usize = 5;
}

// ─── Prompt / Response Contracts ──────────────────────────────────────────────

pub mod markers {
    pub const PDF_HEADER: &str = "You are helping analyze a PDF document. PDF CONTENT: ";
    pub const USER_QUESTION: &str = "\nUser question: ";
    pub const THINKING: &str = "THINKING:";
    pub const FINAL_ITINERARY: &str = "FINAL ITINERARY:";
}

// ─── Config Paths ─────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "convo";
    pub const CONFIG_FILE: &str = "config.toml";
}
