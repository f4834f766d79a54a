//! Core data model types for mathgrade.
//!
//! These are the in-memory tree types the loader produces and the scoring
//! and merge stages consume. They carry only external identifiers — the
//! human-assigned ids that appear in the source document. Store-assigned
//! ids live on the row types in [`crate::store`].

use serde::{Deserialize, Serialize};

/// A teacher and everything loaded under them from one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherRecord {
    /// External identifier from the document root (e.g. "T1").
    pub external_id: String,
    /// Students in document order.
    #[serde(default)]
    pub students: Vec<StudentRecord>,
}

/// A student belonging to one teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    /// External identifier, unique within the teacher.
    pub external_id: String,
    /// Exams in document order.
    #[serde(default)]
    pub exams: Vec<ExamRecord>,
}

/// One exam sat by one student.
///
/// `(student, external_id)` is the dedup key: re-importing an exam that the
/// store already holds under the same pair is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRecord {
    /// External identifier, unique within the student.
    pub external_id: String,
    /// Tasks in document order.
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

/// A single task as parsed from `<expression> = <answer>` text.
///
/// The submitted answer stays a string as it appeared in the document; it
/// may be non-numeric or malformed, which is a scoring-time concern, not a
/// parse-time one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// External identifier; not required to be globally unique.
    pub external_id: String,
    /// The arithmetic expression, trimmed.
    pub expression: String,
    /// The student's answer exactly as submitted, trimmed.
    pub student_answer: String,
}

/// A task after scoring.
///
/// `is_correct` is derived once here and never recomputed; `correct_answer`
/// holds the evaluated value formatted for display, or the `"Error"`
/// sentinel when the expression could not be evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredTask {
    pub external_id: String,
    pub expression: String,
    pub student_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// A fully scored teacher tree, same shape as the input tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredTeacher {
    pub external_id: String,
    pub students: Vec<ScoredStudent>,
}

/// A student's exams after scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredStudent {
    pub external_id: String,
    pub exams: Vec<ScoredExam>,
}

/// An exam's tasks after scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredExam {
    pub external_id: String,
    pub tasks: Vec<ScoredTask>,
}

impl TeacherRecord {
    /// Total number of tasks across all students and exams.
    pub fn task_count(&self) -> usize {
        self.students
            .iter()
            .flat_map(|s| &s.exams)
            .map(|e| e.tasks.len())
            .sum()
    }
}
