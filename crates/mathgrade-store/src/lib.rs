//! mathgrade-store — [`ExamStore`](mathgrade_core::store::ExamStore)
//! backends.
//!
//! Two implementations: [`MemoryStore`] as the test double, and
//! [`SqliteStore`] for durable storage with cascade deletes and the dedup
//! indexes the merge relies on.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
