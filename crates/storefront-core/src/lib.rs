// Public fallible APIs in this crate share one concrete error contract (`StorefrontError`).
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod architecture;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod scoring;
pub mod search;
pub mod state;

pub use architecture::{NaturalCodeOrder, NodeOrdering, SectionOrder, build_tree};
pub use cache::TypeCache;
pub use client::Storefront;
pub use config::AppConfig;
pub use error::{Result, StorefrontError};
pub use scoring::RelevanceScorer;
