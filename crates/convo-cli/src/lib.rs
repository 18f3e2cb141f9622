// Library interface for convo-cli so integration tests can reach the
// command parser and renderers. main.rs declares the same files, hence #[path].

#[path = "commands.rs"]
pub mod commands;

#[path = "render.rs"]
pub mod render;

pub use commands::{handle_command, CommandResult};
