use anyhow::{Context, Result};
use convo_core::document::extractor_for;
use convo_core::{ChatSession, MovieRequest, Settings, TripRequest};
use crossterm::style::Stylize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{self, CommandResult};
use crate::render;

fn build_session(settings: &Settings) -> Result<ChatSession> {
    let gateway = settings.build_gateway()?;
    let mut session = ChatSession::new(gateway).with_assembler(settings.prompt_assembler());
    if let Some(lookup) = settings.build_poster_lookup() {
        session = session.with_poster_lookup(Box::new(lookup));
    }
    tracing::debug!(session = %session.id(), model = session.model(), "session started");
    Ok(session)
}

// ── Single-prompt mode ──────────────────────────────────────────────────

pub async fn run_single_prompt(settings: &Settings, prompt: &str) -> Result<()> {
    let mut session = build_session(settings)?;
    let reply = session.send(prompt).await?;
    println!("{reply}");
    Ok(())
}

// ── Template flows ──────────────────────────────────────────────────────

pub async fn run_trip(settings: &Settings, request: &TripRequest) -> Result<()> {
    let mut session = build_session(settings)?;
    eprintln!("{}", "Planning your trip...".dim());
    let parsed = session.plan_trip(request).await?;
    println!("{}", render::format_parsed(&parsed));
    Ok(())
}

pub async fn run_movies(settings: &Settings, request: &MovieRequest) -> Result<()> {
    let mut session = build_session(settings)?;
    eprintln!("{}", "Finding movies...".dim());
    let picks = session.recommend_movies(request).await?;
    print!("{}", render::format_recommendations(&picks));
    Ok(())
}

// ── Interactive chat ────────────────────────────────────────────────────

/// REPL. With a document loaded each question goes out flattened with the
/// document; without one the full conversation is replayed.
pub async fn run_chat(settings: &Settings, document: Option<PathBuf>) -> Result<()> {
    let mut session = build_session(settings)?;

    println!(
        "{} {}",
        "convo".bold().cyan(),
        format!("({}) - type /help for commands, 'exit' to stop", session.model()).dim()
    );

    if let Some(ref path) = document {
        load_document(&mut session, path).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "You:".bold().green());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match commands::handle_command(input) {
            CommandResult::Quit => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
            CommandResult::Message(msg) => println!("{msg}"),
            CommandResult::Clear => {
                session.reset();
                println!("{}", "Started a new conversation.".dim());
            }
            CommandResult::ShowHistory => {
                println!("{}", render::format_history(session.history().all()));
            }
            CommandResult::ShowStatus => print_status(&session),
            CommandResult::LoadDocument(path) => {
                if let Err(e) = load_document(&mut session, Path::new(&path)).await {
                    eprintln!("{} {e:#}", "Error:".red().bold());
                }
            }
            CommandResult::UnloadDocument => {
                session.clear_document();
                println!("{}", "Document unloaded.".dim());
            }
            CommandResult::NotACommand => {
                eprint!("{}", "Thinking...\r".dim());
                let result = if session.document().is_some() {
                    session.ask_document(input).await
                } else {
                    session.send(input).await
                };
                match result {
                    Ok(reply) => println!("{} {reply}\n", "Assistant:".bold().magenta()),
                    // History is untouched on failure; the user can simply retry
                    Err(e) => eprintln!("{} {e}", "Error:".red().bold()),
                }
            }
        }
    }

    Ok(())
}

async fn load_document(session: &mut ChatSession, path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let extractor = extractor_for(&name);
    let block = session.load_document(&bytes, extractor.as_ref());

    if block.is_empty() {
        println!(
            "{}",
            format!("No text could be extracted from {name}; questions go out without it.").yellow()
        );
    } else {
        println!(
            "{}",
            format!("Loaded {name} ({} characters of context).", block.char_len()).dim()
        );
    }
    Ok(())
}

fn print_status(session: &ChatSession) {
    let usage = session.usage();
    let window = match session.assembler().window().max_turns() {
        Some(n) => format!("last {n} turns"),
        None => "unbounded".to_string(),
    };
    println!("Session:  {}", session.id());
    println!("Started:  {}", session.created_at().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Model:    {}", session.model());
    println!("Turns:    {} (window: {window})", session.history().len());
    println!(
        "Tokens:   ~{} in history, {} in / {} out over {} requests",
        session.history().estimate_tokens(),
        render::format_tokens(usage.total_input_tokens),
        render::format_tokens(usage.total_output_tokens),
        usage.request_count
    );
    match session.document() {
        Some(doc) => println!("Document: {} characters", doc.char_len()),
        None => println!("Document: none"),
    }
}
