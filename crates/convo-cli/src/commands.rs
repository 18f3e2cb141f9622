/// Result of processing one line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// End the session.
    Quit,
    /// Drop the conversation and start a new session.
    Clear,
    /// Print every turn so far.
    ShowHistory,
    /// Show model, turn count and token usage.
    ShowStatus,
    /// Load a document (PDF or text) as context.
    LoadDocument(String),
    /// Forget the loaded document.
    UnloadDocument,
    /// Not a command - send to the model.
    NotACommand,
}

/// Bare words that end the chat, matched case-insensitively.
pub const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();

    if EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w)) {
        return CommandResult::Quit;
    }

    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/clear" | "/new" => CommandResult::Clear,
        "/history" => CommandResult::ShowHistory,
        "/status" => CommandResult::ShowStatus,
        "/load" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /load <file.pdf>".into())
            } else {
                CommandResult::LoadDocument(arg.to_string())
            }
        }
        "/unload" => CommandResult::UnloadDocument,
        "/version" => CommandResult::Message(format!("convo v{}", env!("CARGO_PKG_VERSION"))),

        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ convo commands ───────────────────────────────────────────────╮

  CHAT
    /clear, /new              Start a fresh conversation
    /history                  Show every turn so far
    /status                   Show model, turns and token usage

  DOCUMENTS
    /load <file>              Use a PDF (or text file) as context
    /unload                   Forget the loaded document

  OTHER
    /help, /h                 Show this help message
    /version                  Show version information
    /exit, /quit, /q          Quit (or type exit, quit, bye)

╰────────────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
