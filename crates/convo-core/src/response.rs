//! Splitting raw model replies into the fields the front-end displays.

use crate::constants::{defaults, markers};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAgentResponse {
    pub reasoning: String,
    pub final_answer: String,
}

impl ParsedAgentResponse {
    pub fn has_reasoning(&self) -> bool {
        !self.reasoning.is_empty()
    }
}

/// Split a trip-planner reply on the first `FINAL ITINERARY:` marker.
///
/// Matching is ASCII case-insensitive. Text after the first marker is kept
/// whole, including any later markers. Without a marker the raw text becomes
/// the final answer unmodified and the reasoning is empty.
pub fn parse_agent_response(raw: &str) -> ParsedAgentResponse {
    let Some(at) = find_ignore_ascii_case(raw, markers::FINAL_ITINERARY) else {
        return ParsedAgentResponse {
            reasoning: String::new(),
            final_answer: raw.to_string(),
        };
    };

    let before = raw[..at].trim();
    let after = raw[at + markers::FINAL_ITINERARY.len()..].trim();

    let reasoning = match strip_prefix_ignore_ascii_case(before, markers::THINKING) {
        Some(rest) => rest.trim(),
        None => before,
    };

    ParsedAgentResponse {
        reasoning: reasoning.to_string(),
        final_answer: after.to_string(),
    }
}

/// Comma-separated titles, trimmed, first five kept.
///
/// Blank tokens are dropped before counting, so `"A,,B"` yields two titles.
pub fn parse_movie_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .take(defaults::MOVIE_PICKS)
        .map(str::to_string)
        .collect()
}

// ASCII lowercasing keeps byte offsets identical, so indices map back onto `haystack`.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

fn strip_prefix_ignore_ascii_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_thinking_and_itinerary() {
        let parsed = parse_agent_response("THINKING:\nfoo\nFINAL ITINERARY:\nbar");
        assert_eq!(parsed.reasoning, "foo");
        assert_eq!(parsed.final_answer, "bar");
    }

    #[test]
    fn missing_marker_falls_back_to_raw() {
        let parsed = parse_agent_response("just some text");
        assert_eq!(parsed.reasoning, "");
        assert_eq!(parsed.final_answer, "just some text");
        assert!(!parsed.has_reasoning());
    }

    #[test]
    fn fallback_keeps_whitespace() {
        let parsed = parse_agent_response("  padded \n");
        assert_eq!(parsed.final_answer, "  padded \n");
    }

    #[test]
    fn splits_on_first_marker_only() {
        let parsed =
            parse_agent_response("THINKING: plan\nFINAL ITINERARY: day 1\nFINAL ITINERARY: day 2");
        assert_eq!(parsed.reasoning, "plan");
        assert_eq!(parsed.final_answer, "day 1\nFINAL ITINERARY: day 2");
    }

    #[test]
    fn marker_match_ignores_case() {
        let parsed = parse_agent_response("Thinking: hmm\nFinal Itinerary: go");
        assert_eq!(parsed.reasoning, "hmm");
        assert_eq!(parsed.final_answer, "go");
    }

    #[test]
    fn reasoning_without_thinking_label_is_kept() {
        let parsed = parse_agent_response("Some preamble\nFINAL ITINERARY:\nDay 1");
        assert_eq!(parsed.reasoning, "Some preamble");
        assert_eq!(parsed.final_answer, "Day 1");
    }

    #[test]
    fn non_ascii_text_before_marker_is_safe() {
        let parsed = parse_agent_response("THINKING: café ☕\nFINAL ITINERARY: Paris");
        assert_eq!(parsed.reasoning, "café ☕");
        assert_eq!(parsed.final_answer, "Paris");
    }

    #[test]
    fn movie_list_keeps_first_five_trimmed() {
        let titles = parse_movie_list("Inception, The Matrix, Up, Her, Arrival, Coco");
        assert_eq!(titles, vec!["Inception", "The Matrix", "Up", "Her", "Arrival"]);
    }

    #[test]
    fn movie_list_drops_blank_tokens() {
        let titles = parse_movie_list(" Heat ,, Ronin ,\n");
        assert_eq!(titles, vec!["Heat", "Ronin"]);
    }

    #[test]
    fn movie_list_blank_tokens_do_not_count_toward_five() {
        assert_eq!(parse_movie_list("A,,B"), vec!["A", "B"]);
        let titles = parse_movie_list("A, ,B,C,,D,E,F");
        assert_eq!(titles, vec!["A", "B", "C", "D", "E"]);
    }
}
