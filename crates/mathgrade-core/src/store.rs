//! Persistence abstraction.
//!
//! The merge and query services never talk to a database directly; they go
//! through [`ExamStore`], and backend crates implement it. Row types carry
//! the store-assigned `i64` id plus the external identifier — parent links
//! are plain foreign-key ids, never owning references, so the tree shape
//! lives only in the loader's records.
//!
//! Methods return `anyhow::Result` so backend errors propagate to the
//! caller unchanged; the core never swallows storage failures.
//!
//! Find-or-create across these methods is not atomic between concurrent
//! callers. Serialize merges per store (single writer); concurrent reads
//! are fine and may observe pre-merge state.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ScoredTask;

/// A persisted teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherRow {
    pub id: i64,
    /// Globally unique in the store.
    pub external_id: String,
}

/// A persisted student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRow {
    pub id: i64,
    /// Unique within the owning teacher.
    pub external_id: String,
    pub teacher_id: i64,
}

/// A persisted exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRow {
    pub id: i64,
    /// `(student_id, external_id)` is the dedup key.
    pub external_id: String,
    pub student_id: i64,
    /// When this exam was first ingested.
    pub loaded_at: DateTime<Utc>,
}

/// A persisted task joined with the external ids of its exam and student,
/// the shape every read-side projection starts from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub student_external_id: String,
    pub exam_external_id: String,
    pub task_external_id: String,
    pub expression: String,
    pub student_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Entity counts, used by idempotency checks and status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    pub teachers: usize,
    pub students: usize,
    pub exams: usize,
    pub tasks: usize,
}

/// Backend-neutral persistence operations for the four entity kinds.
pub trait ExamStore: Send + Sync {
    fn find_teacher(&self, external_id: &str) -> Result<Option<TeacherRow>>;
    fn insert_teacher(&self, external_id: &str) -> Result<TeacherRow>;

    fn find_student(&self, teacher_id: i64, external_id: &str) -> Result<Option<StudentRow>>;
    fn insert_student(&self, teacher_id: i64, external_id: &str) -> Result<StudentRow>;

    fn find_exam(&self, student_id: i64, external_id: &str) -> Result<Option<ExamRow>>;

    /// Insert an exam together with all its tasks.
    ///
    /// Atomic: either the exam row and every task row are committed, or
    /// nothing is. This is the per-exam transactional unit of the merge.
    fn insert_exam(
        &self,
        student_id: i64,
        external_id: &str,
        loaded_at: DateTime<Utc>,
        tasks: &[ScoredTask],
    ) -> Result<ExamRow>;

    /// Every task row in the store, in unspecified order.
    fn result_rows(&self) -> Result<Vec<ResultRow>>;

    /// Task rows for one student (by external id), in unspecified order.
    /// An unknown student yields an empty vector, not an error.
    fn result_rows_for_student(&self, student_external_id: &str) -> Result<Vec<ResultRow>>;

    /// All student external ids, sorted.
    fn student_ids(&self) -> Result<Vec<String>>;

    fn has_any_data(&self) -> Result<bool>;

    fn counts(&self) -> Result<StoreCounts>;

    /// Remove every teacher, cascading to students, exams, and tasks.
    fn clear(&self) -> Result<()>;
}
