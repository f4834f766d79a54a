//! Task scoring.
//!
//! For each task the engine evaluates the expression, records the computed
//! answer, and judges the submission under *tolerant equality*: both values
//! are rounded to a fixed number of decimal places (two, by domain policy)
//! before comparison. The rounding absorbs floating-point representation
//! noise when judging correctness; it is intentional, not a bug workaround.
//! Evaluation failure is never fatal — the task scores incorrect with a
//! sentinel answer and the pipeline moves on.

use serde::{Deserialize, Serialize};

use crate::expr::{evaluate, parse_literal};
use crate::model::{
    ScoredExam, ScoredStudent, ScoredTask, ScoredTeacher, TaskRecord, TeacherRecord,
};

/// Sentinel recorded as the correct answer when evaluation fails.
pub const ERROR_ANSWER: &str = "Error";

/// Scores tasks under tolerant equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringEngine {
    /// Decimal places both operands are rounded to before comparison.
    pub decimals: u32,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

impl ScoringEngine {
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    /// Score one task. Infallible: evaluation and answer-parse failures
    /// surface as `is_correct = false`, never as errors.
    pub fn score(&self, task: &TaskRecord) -> ScoredTask {
        let (correct_answer, is_correct) = match evaluate(&task.expression) {
            Ok(value) => {
                let is_correct = parse_literal(&task.student_answer)
                    .map(|submitted| {
                        round_to(submitted, self.decimals) == round_to(value, self.decimals)
                    })
                    .unwrap_or(false);
                (format_answer(value), is_correct)
            }
            Err(err) => {
                tracing::debug!(
                    task = %task.external_id,
                    expression = %task.expression,
                    %err,
                    "expression did not evaluate"
                );
                (ERROR_ANSWER.to_string(), false)
            }
        };

        ScoredTask {
            external_id: task.external_id.clone(),
            expression: task.expression.clone(),
            student_answer: task.student_answer.clone(),
            correct_answer,
            is_correct,
        }
    }

    /// Score every task of a loaded tree, preserving document order.
    ///
    /// Shared by both entry points: the merge path persists the result, the
    /// score-and-discard path projects it directly.
    pub fn score_tree(&self, teacher: &TeacherRecord) -> ScoredTeacher {
        ScoredTeacher {
            external_id: teacher.external_id.clone(),
            students: teacher
                .students
                .iter()
                .map(|student| ScoredStudent {
                    external_id: student.external_id.clone(),
                    exams: student
                        .exams
                        .iter()
                        .map(|exam| ScoredExam {
                            external_id: exam.external_id.clone(),
                            tasks: exam.tasks.iter().map(|t| self.score(t)).collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Round to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Render a computed value the way the source documents write answers:
/// whole values without a decimal point, everything else via the shortest
/// round-trip representation.
pub fn format_answer(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(expression: &str, answer: &str) -> TaskRecord {
        TaskRecord {
            external_id: "t".into(),
            expression: expression.into(),
            student_answer: answer.into(),
        }
    }

    #[test]
    fn correct_and_incorrect_answers() {
        let engine = ScoringEngine::default();
        let good = engine.score(&task("2+2", "4"));
        assert!(good.is_correct);
        assert_eq!(good.correct_answer, "4");

        let bad = engine.score(&task("3*3", "8"));
        assert!(!bad.is_correct);
        assert_eq!(bad.correct_answer, "9");
    }

    #[test]
    fn fractional_results_format_and_compare() {
        let engine = ScoringEngine::default();
        let scored = engine.score(&task("10/4", "2.5"));
        assert!(scored.is_correct);
        assert_eq!(scored.correct_answer, "2.5");
    }

    #[test]
    fn tolerant_equality_absorbs_representation_noise() {
        let engine = ScoringEngine::default();
        // 1/3 = 0.333... rounds to 0.33, matching a two-decimal submission.
        assert!(engine.score(&task("1/3", "0.33")).is_correct);
        assert!(!engine.score(&task("1/3", "0.34")).is_correct);
        // 0.1 + 0.2 is not exactly 0.3 in f64; rounding makes them agree.
        assert!(engine.score(&task("0.1+0.2", "0.3")).is_correct);
    }

    #[test]
    fn rounding_mode_is_half_away_from_zero() {
        // 2.125 fits f64 exactly; scaling gives exactly 212.5, so the
        // rounding mode alone decides. Bankers' rounding would give 2.12.
        assert_eq!(round_to(2.125, 2), 2.13);
        assert_eq!(round_to(-2.125, 2), -2.13);
        assert_eq!(round_to(2.375, 2), 2.38);
    }

    #[test]
    fn literal_2_005_vs_2_00() {
        // 2.005 has no exact f64 representation (it sits just below), so it
        // rounds down to 2.00 and matches a submitted "2.00".
        let engine = ScoringEngine::default();
        assert!(engine.score(&task("2.005", "2.00")).is_correct);
    }

    #[test]
    fn evaluation_failure_scores_incorrect_with_sentinel() {
        let engine = ScoringEngine::default();
        for bad in ["5/0", "2+", "2+x", ""] {
            let scored = engine.score(&task(bad, "1"));
            assert!(!scored.is_correct, "expression {bad:?} must not score");
            assert_eq!(scored.correct_answer, ERROR_ANSWER);
        }
    }

    #[test]
    fn non_numeric_submission_scores_incorrect() {
        let engine = ScoringEngine::default();
        let scored = engine.score(&task("2+2", "four"));
        assert!(!scored.is_correct);
        // The computed value is still recorded.
        assert_eq!(scored.correct_answer, "4");
    }

    #[test]
    fn format_answer_renders_whole_values_as_integers() {
        assert_eq!(format_answer(4.0), "4");
        assert_eq!(format_answer(-12.0), "-12");
        assert_eq!(format_answer(2.5), "2.5");
        assert_eq!(format_answer(0.0), "0");
    }

    #[test]
    fn score_tree_preserves_document_order() {
        use crate::model::{ExamRecord, StudentRecord};

        let tree = TeacherRecord {
            external_id: "T1".into(),
            students: vec![StudentRecord {
                external_id: "S1".into(),
                exams: vec![ExamRecord {
                    external_id: "E1".into(),
                    tasks: vec![task("2+2", "4"), task("3*3", "8")],
                }],
            }],
        };

        let scored = ScoringEngine::default().score_tree(&tree);
        let tasks = &scored.students[0].exams[0].tasks;
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].is_correct);
        assert!(!tasks[1].is_correct);
    }
}
