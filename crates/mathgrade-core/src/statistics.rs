//! Query-time summary statistics.
//!
//! Percentages are computed from the persisted `is_correct` flags whenever
//! a projection is rendered; nothing here is ever written back to a store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::ResultRow;

/// Correct/total counts with a percentage to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub correct: usize,
    /// `correct / total * 100`, rounded half away from zero to one decimal.
    /// Zero when there are no results.
    pub percentage: f64,
}

impl Summary {
    pub fn from_flags(flags: impl IntoIterator<Item = bool>) -> Self {
        let mut total = 0usize;
        let mut correct = 0usize;
        for flag in flags {
            total += 1;
            if flag {
                correct += 1;
            }
        }
        let percentage = if total == 0 {
            0.0
        } else {
            round1(correct as f64 * 100.0 / total as f64)
        };
        Self {
            total,
            correct,
            percentage,
        }
    }
}

/// Per-student rollup of result rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub student_id: String,
    pub total: usize,
    pub correct: usize,
    pub percentage: f64,
}

/// Aggregate a flat result listing, one summary per student, sorted by
/// student external id.
pub fn summarize_by_student(rows: &[ResultRow]) -> Vec<StudentSummary> {
    let mut grouped: BTreeMap<&str, Vec<bool>> = BTreeMap::new();
    for row in rows {
        grouped
            .entry(row.student_external_id.as_str())
            .or_default()
            .push(row.is_correct);
    }

    grouped
        .into_iter()
        .map(|(student_id, flags)| {
            let summary = Summary::from_flags(flags);
            StudentSummary {
                student_id: student_id.to_string(),
                total: summary.total,
                correct: summary.correct,
                percentage: summary.percentage,
            }
        })
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
