use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod app;
mod commands;
mod render;

#[derive(Parser)]
#[command(name = "convo")]
#[command(about = "convo - chat with a hosted LLM, ask about PDFs, plan trips, pick movies")]
#[command(version)]
struct Cli {
    /// Run a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// LLM model to use
    #[arg(short, long)]
    model: Option<String>,

    /// LLM provider (gemini, openai, groq, openrouter, ollama)
    #[arg(long)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Multi-turn chat (default)
    Chat,
    /// Ask questions about a PDF
    Pdf {
        /// Path to the document
        file: PathBuf,
    },
    /// Plan a trip and show the agent's reasoning separately
    Trip {
        #[arg(long)]
        destination: String,
        #[arg(long, default_value_t = 3)]
        days: u32,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        budget: String,
        /// Comma-separated interests
        #[arg(long, value_delimiter = ',')]
        interests: Vec<String>,
    },
    /// Get five movie picks with posters
    Movies {
        #[arg(long)]
        genre: String,
        #[arg(long, default_value = "relaxed")]
        mood: String,
        #[arg(long, default_value = "English")]
        language: String,
        #[arg(long, default_value_t = 7.0)]
        min_rating: f32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; keys may already be in the environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut settings = convo_core::Settings::load();

    if let Some(ref provider) = cli.provider {
        match convo_core::llm::ProviderId::parse(provider) {
            Some(id) => settings.set_provider(id),
            None => bail!("unknown provider '{provider}'"),
        }
    }
    if let Some(ref model) = cli.model {
        settings.llm.model = model.clone();
    }

    if let Some(prompt) = cli.prompt {
        return app::run_single_prompt(&settings, &prompt).await;
    }

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => app::run_chat(&settings, None).await?,
        Command::Pdf { file } => app::run_chat(&settings, Some(file)).await?,
        Command::Trip {
            destination,
            days,
            budget,
            interests,
        } => {
            let request = convo_core::TripRequest {
                destination,
                days,
                budget: budget.parse()?,
                interests: interests
                    .into_iter()
                    .map(|i| i.trim().to_string())
                    .filter(|i| !i.is_empty())
                    .collect(),
            };
            app::run_trip(&settings, &request).await?;
        }
        Command::Movies {
            genre,
            mood,
            language,
            min_rating,
        } => {
            let request = convo_core::MovieRequest {
                genre,
                mood,
                language,
                min_rating,
            };
            app::run_movies(&settings, &request).await?;
        }
    }

    Ok(())
}
