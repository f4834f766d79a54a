//! Typed error kinds for the ingestion pipeline.
//!
//! These are defined centrally so callers can classify failures without
//! string matching: evaluation and task-parse errors are contained to one
//! task, load errors abort the whole ingestion call.

use thiserror::Error;

/// Errors from evaluating an arithmetic expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A character outside the grammar (digits, `+ - * / ( )`, `.`).
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    /// The expression ended where an operand or `)` was required.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// Input remained after a complete expression (e.g. `1+2)3`).
    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },

    /// A numeric literal that does not parse as f64 (e.g. `1.2.3`).
    #[error("malformed number {literal:?}")]
    MalformedNumber { literal: String },

    /// Division with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// The result overflowed to a non-finite value.
    #[error("expression result is not finite")]
    NonFinite,

    /// Expression longer than the evaluator accepts.
    #[error("expression exceeds {max} bytes")]
    TooLong { max: usize },

    /// Parentheses nested deeper than the evaluator accepts.
    #[error("expression nests deeper than {max} levels")]
    TooDeep { max: usize },
}

/// Errors from splitting a raw task string into expression and answer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskParseError {
    /// Not of the form `<expression> = <answer>` with exactly one `=`
    /// and both sides non-empty after trimming.
    #[error("task {task_id}: malformed task text {raw:?}")]
    MalformedTask { task_id: String, raw: String },
}

impl TaskParseError {
    /// The external id of the offending task.
    pub fn task_id(&self) -> &str {
        match self {
            TaskParseError::MalformedTask { task_id, .. } => task_id,
        }
    }
}

/// Fatal errors from loading a results document.
///
/// Any of these aborts the ingestion call before the store is touched;
/// malformed *individual* student/exam/task nodes are instead collected as
/// [`SkippedNode`](crate::loader::SkippedNode)s and do not abort siblings.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The root node carries no teacher identifier attribute.
    #[error("teacher ID not found in document")]
    MissingTeacherId,

    /// The document has no student collection under the root.
    #[error("no students found in document")]
    MissingStudents,

    /// The document is not well-formed XML.
    #[error("malformed document: {0}")]
    Malformed(#[from] roxmltree::Error),

    /// More task nodes than the loader's defensive bound allows.
    #[error("document contains more than {max} tasks")]
    TooManyTasks { max: usize },
}

impl LoadError {
    /// Returns `true` when the document structure (rather than its syntax)
    /// is at fault, i.e. the file parsed but is not a results document.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            LoadError::MissingTeacherId | LoadError::MissingStudents
        )
    }
}
