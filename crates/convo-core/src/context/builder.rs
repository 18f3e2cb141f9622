use super::history::{ContextWindow, ConversationHistory};
use crate::constants::{defaults, markers};
use crate::llm::Message;

/// Document text merged into a prompt, already cut to its maximum length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBlock {
    text: String,
}

impl ContextBlock {
    /// Hard-truncate `text` to its first `max_chars` characters. No summary, no warning.
    pub fn new(text: impl Into<String>, max_chars: usize) -> Self {
        let text = text.into();
        let text = match text.char_indices().nth(max_chars) {
            Some((cut, _)) => {
                tracing::debug!(
                    original_chars = text.chars().count(),
                    max_chars,
                    "document text truncated"
                );
                text[..cut].to_string()
            }
            None => text,
        };
        Self { text }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Builds what is sent to the model from history and injected context.
#[derive(Debug, Clone, Copy)]
pub struct PromptAssembler {
    window: ContextWindow,
    max_document_chars: usize,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self {
            window: ContextWindow::unbounded(),
            max_document_chars: defaults::MAX_DOCUMENT_CHARS,
        }
    }
}

impl PromptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: ContextWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_max_document_chars(mut self, max: usize) -> Self {
        self.max_document_chars = max;
        self
    }

    pub fn window(&self) -> ContextWindow {
        self.window
    }

    pub fn max_document_chars(&self) -> usize {
        self.max_document_chars
    }

    /// Wrap extracted document text as a context block using this assembler's limit.
    pub fn context_block(&self, text: impl Into<String>) -> ContextBlock {
        ContextBlock::new(text, self.max_document_chars)
    }

    /// Message-list mode: stored turns (through the window) followed by the pending user turn.
    pub fn assemble_messages(
        &self,
        history: &ConversationHistory,
        pending_user: &str,
    ) -> Vec<Message> {
        let replayed = self.window.select(history.all());
        tracing::debug!(
            stored = history.len(),
            replayed = replayed.len(),
            "assembling message list"
        );

        let mut messages = Vec::with_capacity(replayed.len() + 1);
        messages.extend_from_slice(replayed);
        messages.push(Message::user(pending_user));
        messages
    }

    /// Flattened mode: optional PDF header + content, the question separator, the latest question.
    ///
    /// Earlier turns are not replayed even though the session still shows them.
    pub fn assemble_flattened(&self, context: Option<&ContextBlock>, latest_user: &str) -> String {
        let mut prompt = String::new();

        if let Some(block) = context.filter(|b| !b.is_empty()) {
            prompt.push_str(markers::PDF_HEADER);
            prompt.push_str(block.text());
        }

        prompt.push_str(markers::USER_QUESTION);
        prompt.push_str(latest_user);
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_block_counts_chars_not_bytes() {
        let block = ContextBlock::new("héllo wörld", 4);
        assert_eq!(block.text(), "héll");
        assert_eq!(block.char_len(), 4);
    }

    #[test]
    fn short_context_block_is_untouched() {
        let block = ContextBlock::new("abc", 8000);
        assert_eq!(block.text(), "abc");
    }

    #[test]
    fn flattened_without_context_has_no_header() {
        let prompt = PromptAssembler::new().assemble_flattened(None, "what is this?");
        assert_eq!(prompt, "\nUser question: what is this?");
    }

    #[test]
    fn flattened_skips_blank_context() {
        let block = ContextBlock::new("   \n  ", 100);
        let prompt = PromptAssembler::new().assemble_flattened(Some(&block), "q");
        assert!(!prompt.contains("PDF CONTENT"));
    }

    #[test]
    fn flattened_orders_header_block_question() {
        let block = ContextBlock::new("page text", 100);
        let prompt = PromptAssembler::new().assemble_flattened(Some(&block), "summarize");
        assert_eq!(
            prompt,
            "You are helping analyze a PDF document. PDF CONTENT: page text\nUser question: summarize"
        );
    }
}
