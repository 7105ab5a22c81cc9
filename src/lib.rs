//! `trekplan` - Trip budget planner relay for trekking and adventure travel
//!
//! This library turns trip requests into planning prompts, relays them to an
//! OpenAI-compatible completion provider and serves featured treks and blog
//! posts from an external catalog.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod completion;
pub mod config;
pub mod error;
pub mod models;
pub mod planner;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use api::{ApiError, AppState};
pub use cache::PersistentCache;
pub use catalog::{CatalogClient, FeaturedCatalog};
pub use completion::{CompletionProvider, GatewayError, GroqClient};
pub use config::TrekPlanConfig;
pub use error::TrekPlanError;
pub use models::{FeaturedItems, GeneratedPlan, ListingKind, TripParameters, TripRequest};
pub use planner::{PlanError, PlannerService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
