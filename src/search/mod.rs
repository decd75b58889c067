//! Search layer facade.
//!
//! - **[`scoring`]**: fuzzy + recency blend that ranks directory entries for a query.

pub mod scoring;

pub use scoring::{ScoringEngine, time_decay};
