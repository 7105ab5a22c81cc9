//! Featured listing models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

/// Catalog listings that can be featured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKind {
    /// Featured by rotating the listing
    Treks,
    /// Featured by shuffling the listing
    Blogs,
}

impl ListingKind {
    /// Path of the listing on the catalog backend
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            ListingKind::Treks => "trek",
            ListingKind::Blogs => "blog",
        }
    }

    /// Cache key for the raw listing
    #[must_use]
    pub fn cache_key(self) -> String {
        format!("listing:{}", self.path())
    }
}

impl Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingKind::Treks => write!(f, "treks"),
            ListingKind::Blogs => write!(f, "blogs"),
        }
    }
}

/// A seeded selection of catalog items. Items are opaque backend documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedItems {
    /// Seed that reproduces this ordering
    pub seed: u64,
    pub items: Vec<Value>,
}
