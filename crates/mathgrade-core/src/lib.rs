//! mathgrade-core — exam-result ingestion, evaluation, and merge pipeline.
//!
//! This crate defines the data model, the arithmetic evaluator, the
//! document loader, the scoring engine, the store abstraction, and the
//! merge and query services that the rest of mathgrade builds on.

pub mod error;
pub mod expr;
pub mod loader;
pub mod merge;
pub mod model;
pub mod query;
pub mod scoring;
pub mod statistics;
pub mod store;
pub mod task;
