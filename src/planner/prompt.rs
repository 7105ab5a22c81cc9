//! Prompt construction for the trip planner

use crate::models::TripParameters;
use crate::models::trip::format_js_number;

/// System message sent ahead of every planning prompt
pub const SYSTEM_INSTRUCTION: &str =
    "You are a travel planner AI. Respond with plain text. No JSON. No markdown.";

/// Travel modes offered to the model
pub const TRAVEL_MODES: [&str; 2] = ["train", "car"];

/// Render trip parameters into the user prompt
#[must_use]
pub fn build_prompt(params: &TripParameters, currency_symbol: &str) -> String {
    format!(
        "Plan a {days}-day trek for the {trek} starting from {location}.
Budget: {currency_symbol}{budget}
Travel Mode: {modes}

Return the full plan as simple, readable text.

Include:
- Trek name, location, short description
- Budget breakdown (list format)
- Recommended hotels with price and ratings
- Local dishes to try
- Tips or recommendations
- Day-wise itinerary (clearly mention Day 1, Day 2, etc.)

Use clear bullet points or headings. DO NOT return JSON or any code — only plain English text.",
        days = format_js_number(params.trip_days),
        trek = params.trek,
        location = params.location,
        budget = format_js_number(params.budget),
        modes = TRAVEL_MODES.join(", "),
    )
    .trim()
    .to_string()
}
