//! Data models for the trekplan service
//!
//! This module contains the request and response models organized by concern:
//! - Trip: inbound trip requests, coercion and validation into prompt parameters
//! - Plan: the generated itinerary relayed back to the caller
//! - Featured: rotated catalog listings

pub mod featured;
pub mod plan;
pub mod trip;

// Re-export all public types for convenient access
pub use featured::{FeaturedItems, ListingKind};
pub use plan::GeneratedPlan;
pub use trip::{FieldIssue, TripParameters, TripRequest};
