//! Raw task text parsing.
//!
//! Task nodes carry literal text of the form `<expression> = <answer>`.
//! The split is strict — exactly one `=`, both sides non-empty after
//! trimming — but the answer side is kept as a string. Whether it is a
//! number the expression actually equals is decided at scoring time, so a
//! student who submitted `"seven"` still ingests (and scores incorrect)
//! instead of being dropped.

use crate::error::TaskParseError;
use crate::model::TaskRecord;

/// Split raw task text into a [`TaskRecord`].
pub fn parse_task(raw: &str, external_id: &str) -> Result<TaskRecord, TaskParseError> {
    let malformed = || TaskParseError::MalformedTask {
        task_id: external_id.to_string(),
        raw: raw.to_string(),
    };

    let mut parts = raw.splitn(3, '=');
    let expression = parts.next().unwrap_or("").trim();
    let answer = parts.next().ok_or_else(malformed)?.trim();

    if parts.next().is_some() || expression.is_empty() || answer.is_empty() {
        return Err(malformed());
    }

    Ok(TaskRecord {
        external_id: external_id.to_string(),
        expression: expression.to_string(),
        student_answer: answer.to_string(),
    })
}
