//! Generated plan model

use serde::{Deserialize, Serialize};

/// Plain-text itinerary produced by the completion provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPlan {
    pub text: String,
}

impl GeneratedPlan {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Count the `Day N` markers for `N` in `1..=days`
    #[must_use]
    pub fn day_markers(&self, days: u32) -> usize {
        (1..=days).filter(|day| self.mentions_day(*day)).count()
    }

    /// `Day 1` must not be satisfied by `Day 12`
    fn mentions_day(&self, day: u32) -> bool {
        let marker = format!("Day {day}");
        self.text.match_indices(&marker).any(|(start, _)| {
            !self.text[start + marker.len()..].starts_with(|c: char| c.is_ascii_digit())
        })
    }
}
