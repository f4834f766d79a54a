//! Read-side projections.
//!
//! Pure reads with no side effects. Ordering is applied here, not in the
//! backends, so every store renders identically: teacher view by
//! `(student, exam, task)` external id, student view by `(exam, task)`
//! with a 1-based task number assigned per call and never persisted.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::model::{ScoredTeacher, TeacherRecord};
use crate::scoring::ScoringEngine;
use crate::statistics::{summarize_by_student, StudentSummary, Summary};
use crate::store::{ExamStore, ResultRow};

/// One row of the per-student view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentTaskResult {
    /// Sequential 1-based number within this projection call.
    pub task_number: usize,
    pub exam_external_id: String,
    pub task_external_id: String,
    pub expression: String,
    pub student_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Read-only query service over a store.
pub struct ResultQuery<'a> {
    store: &'a dyn ExamStore,
}

impl<'a> ResultQuery<'a> {
    pub fn new(store: &'a dyn ExamStore) -> Self {
        Self { store }
    }

    /// All results in the store, ordered by student, exam, then task
    /// external id.
    pub fn all_results(&self) -> Result<Vec<ResultRow>> {
        let mut rows = self.store.result_rows()?;
        sort_rows(&mut rows);
        Ok(rows)
    }

    /// One student's results ordered by exam then task external id, with
    /// sequential task numbers. Unknown students yield an empty vector.
    pub fn results_for_student(&self, student_external_id: &str) -> Result<Vec<StudentTaskResult>> {
        let mut rows = self.store.result_rows_for_student(student_external_id)?;
        sort_rows(&mut rows);
        Ok(number_rows(rows))
    }

    /// Sorted external ids of every student in the store.
    pub fn student_ids(&self) -> Result<Vec<String>> {
        self.store.student_ids()
    }

    pub fn has_any_data(&self) -> Result<bool> {
        self.store.has_any_data()
    }

    /// Overall correct/total summary across the whole store.
    pub fn summary(&self) -> Result<Summary> {
        let rows = self.store.result_rows()?;
        Ok(Summary::from_flags(rows.iter().map(|r| r.is_correct)))
    }

    /// Per-student summaries, sorted by student external id.
    pub fn student_summaries(&self) -> Result<Vec<StudentSummary>> {
        Ok(summarize_by_student(&self.store.result_rows()?))
    }
}

/// Score a freshly loaded tree and project it without persisting anything —
/// the score-and-discard entry point, sharing the ordering rules of the
/// store-backed view.
pub fn transient_results(engine: &ScoringEngine, teacher: &TeacherRecord) -> Vec<ResultRow> {
    let mut rows = flatten(&engine.score_tree(teacher));
    sort_rows(&mut rows);
    rows
}

fn flatten(scored: &ScoredTeacher) -> Vec<ResultRow> {
    let mut rows = Vec::new();
    for student in &scored.students {
        for exam in &student.exams {
            for task in &exam.tasks {
                rows.push(ResultRow {
                    student_external_id: student.external_id.clone(),
                    exam_external_id: exam.external_id.clone(),
                    task_external_id: task.external_id.clone(),
                    expression: task.expression.clone(),
                    student_answer: task.student_answer.clone(),
                    correct_answer: task.correct_answer.clone(),
                    is_correct: task.is_correct,
                });
            }
        }
    }
    rows
}

fn sort_rows(rows: &mut [ResultRow]) {
    rows.sort_by(|a, b| {
        (
            &a.student_external_id,
            &a.exam_external_id,
            &a.task_external_id,
        )
            .cmp(&(
                &b.student_external_id,
                &b.exam_external_id,
                &b.task_external_id,
            ))
    });
}

fn number_rows(rows: Vec<ResultRow>) -> Vec<StudentTaskResult> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| StudentTaskResult {
            task_number: i + 1,
            exam_external_id: row.exam_external_id,
            task_external_id: row.task_external_id,
            expression: row.expression,
            student_answer: row.student_answer,
            correct_answer: row.correct_answer,
            is_correct: row.is_correct,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_document;

    const DOC: &str = r#"
<Teacher ID="T1">
  <Students>
    <Student ID="S2">
      <Exam Id="E1">
        <Task id="1">5-2 = 3</Task>
      </Exam>
    </Student>
    <Student ID="S1">
      <Exam Id="E2">
        <Task id="2">3*3 = 8</Task>
      </Exam>
      <Exam Id="E1">
        <Task id="1">2+2 = 4</Task>
      </Exam>
    </Student>
  </Students>
</Teacher>
"#;

    #[test]
    fn transient_results_are_scored_and_ordered() {
        let loaded = load_document(DOC).unwrap();
        let rows = transient_results(&ScoringEngine::default(), &loaded.teacher);

        let keys: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|r| {
                (
                    r.student_external_id.as_str(),
                    r.exam_external_id.as_str(),
                    r.task_external_id.as_str(),
                )
            })
            .collect();
        assert_eq!(
            keys,
            vec![("S1", "E1", "1"), ("S1", "E2", "2"), ("S2", "E1", "1")]
        );

        assert!(rows[0].is_correct); // 2+2 = 4
        assert!(!rows[1].is_correct); // 3*3 = 8
        assert!(rows[2].is_correct); // 5-2 = 3
        assert_eq!(rows[1].correct_answer, "9");
    }

    #[test]
    fn numbering_is_sequential_from_one() {
        let rows = vec![
            ResultRow {
                student_external_id: "S1".into(),
                exam_external_id: "E1".into(),
                task_external_id: "1".into(),
                expression: "2+2".into(),
                student_answer: "4".into(),
                correct_answer: "4".into(),
                is_correct: true,
            },
            ResultRow {
                student_external_id: "S1".into(),
                exam_external_id: "E1".into(),
                task_external_id: "2".into(),
                expression: "3*3".into(),
                student_answer: "8".into(),
                correct_answer: "9".into(),
                is_correct: false,
            },
        ];
        let numbered = number_rows(rows);
        assert_eq!(numbered[0].task_number, 1);
        assert_eq!(numbered[1].task_number, 2);
    }
}
