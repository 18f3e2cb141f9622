//! Fixed-format prompts rendered from form input.
//!
//! Each template spells out the output contract the reply is parsed against
//! in [`crate::response`].

use crate::constants::{defaults, markers};
use crate::error::ConvoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Medium,
    High,
}

impl BudgetTier {
    pub fn describe(&self) -> &'static str {
        match self {
            BudgetTier::Low => "low (budget travel)",
            BudgetTier::Medium => "medium (moderate spending)",
            BudgetTier::High => "high (luxury)",
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BudgetTier::Low => "low",
            BudgetTier::Medium => "medium",
            BudgetTier::High => "high",
        };
        f.write_str(name)
    }
}

impl FromStr for BudgetTier {
    type Err = ConvoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "budget" | "cheap" => Ok(BudgetTier::Low),
            "medium" | "moderate" | "mid" => Ok(BudgetTier::Medium),
            "high" | "luxury" => Ok(BudgetTier::High),
            other => Err(ConvoError::Other(format!(
                "unknown budget tier '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

/// Trip-planner form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub destination: String,
    pub days: u32,
    pub budget: BudgetTier,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Movie-recommender form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRequest {
    pub genre: String,
    pub mood: String,
    pub language: String,
    pub min_rating: f32,
}

pub fn trip_prompt(request: &TripRequest) -> String {
    let interests = if request.interests.is_empty() {
        "no particular preference".to_string()
    } else {
        request.interests.join(", ")
    };
    let day_word = if request.days == 1 { "day" } else { "days" };

    format!(
        "You are an expert AI travel planning agent.\n\
         \n\
         Plan a trip with these details:\n\
         - Destination: {destination}\n\
         - Duration: {days} {day_word}\n\
         - Budget: {budget}\n\
         - Interests: {interests}\n\
         \n\
         First reason step by step about the best areas, pacing and costs for this traveller. \
         Then write a day-by-day itinerary with morning, afternoon and evening activities.\n\
         \n\
         Respond in exactly this format:\n\
         \n\
         {thinking}\n\
         <your step-by-step reasoning>\n\
         \n\
         {final_marker}\n\
         <the day-by-day itinerary>",
        destination = request.destination.trim(),
        days = request.days,
        budget = request.budget.describe(),
        thinking = markers::THINKING,
        final_marker = markers::FINAL_ITINERARY,
    )
}

pub fn movie_prompt(request: &MovieRequest) -> String {
    format!(
        "Recommend exactly {count} movies.\n\
         Genre: {genre}\n\
         Mood: {mood}\n\
         Language: {language}\n\
         Minimum rating: {rating:.1}/10\n\
         \n\
         Return ONLY the movie titles as a single comma-separated list. \
         No numbering, no years, no explanations.",
        count = defaults::MOVIE_PICKS,
        genre = request.genre.trim(),
        mood = request.mood.trim(),
        language = request.language.trim(),
        rating = request.min_rating,
    )
}
