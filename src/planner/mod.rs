//! Trip planner
//!
//! Turns a trip request into a plain-text itinerary:
//! - Prompt construction from trip parameters
//! - Strict or lenient handling of the inbound fields
//! - One call to the completion provider per request

pub mod prompt;
pub mod service;

pub use prompt::{SYSTEM_INSTRUCTION, build_prompt};
pub use service::{PlanError, PlannerService};
