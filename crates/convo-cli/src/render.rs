//! Plain-text rendering of session data. Styling is applied by the caller.

use convo_core::{Message, MovieRecommendation, ParsedAgentResponse, Role};

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
        Role::System => "System",
    }
}

pub fn format_turn(message: &Message) -> String {
    format!("{}: {}", role_label(message.role()), message.content())
}

pub fn format_history(turns: &[Message]) -> String {
    if turns.is_empty() {
        return "No messages yet.".to_string();
    }
    turns
        .iter()
        .map(format_turn)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_parsed(parsed: &ParsedAgentResponse) -> String {
    let mut out = String::new();
    if parsed.has_reasoning() {
        out.push_str("── Agent thinking ──\n");
        out.push_str(&parsed.reasoning);
        out.push_str("\n\n");
    }
    out.push_str("── Final itinerary ──\n");
    out.push_str(&parsed.final_answer);
    out
}

pub fn format_recommendations(picks: &[MovieRecommendation]) -> String {
    if picks.is_empty() {
        return "No recommendations returned.".to_string();
    }

    let mut out = String::new();
    for (i, pick) in picks.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, pick.title));
        let rating = pick.poster.as_ref().and_then(|p| p.rating);
        let url = pick.poster.as_ref().and_then(|p| p.url.as_deref());
        if let Some(rating) = rating {
            out.push_str(&format!("   Rating: {rating:.1}/10\n"));
        }
        match url {
            Some(url) => out.push_str(&format!("   Poster: {url}\n")),
            None => out.push_str("   (no poster found)\n"),
        }
    }
    out
}

pub fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
