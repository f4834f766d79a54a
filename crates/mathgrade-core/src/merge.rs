//! Incremental merge of a loaded document into a store.
//!
//! Re-importing the same source file never duplicates already-recorded
//! entities: teachers and students are found-or-created by external id,
//! and an exam already present under its `(student, exam id)` dedup key is
//! skipped wholesale — none of its tasks are re-scored or re-inserted,
//! even if the incoming copy differs. Idempotency is keyed on identity,
//! not content; content changes under an unchanged exam id are invisible
//! to re-import. That is a known limitation of the format, not of this
//! implementation.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::TeacherRecord;
use crate::scoring::ScoringEngine;
use crate::store::ExamStore;

/// What one merge run added to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    /// Unique id of this ingestion run.
    pub run_id: Uuid,
    /// External id of the teacher the document belonged to.
    pub teacher_id: String,
    pub new_students: usize,
    pub new_exams: usize,
    pub new_tasks: usize,
    pub merged_at: DateTime<Utc>,
}

impl MergeReport {
    /// True when the run added nothing (a pure re-import).
    pub fn is_noop(&self) -> bool {
        self.new_students == 0 && self.new_exams == 0 && self.new_tasks == 0
    }
}

/// A merge run that stopped on a storage failure.
///
/// Carries the report of everything committed before the failing point, so
/// callers can still account for the exams that made it into the store.
#[derive(Debug, Error)]
#[error("merge stopped after partial commit: {source:#}")]
pub struct MergeError {
    /// What was committed before the failure.
    pub committed: MergeReport,
    pub source: anyhow::Error,
}

/// Merge a loaded teacher tree into the store, scoring tasks on the way in.
///
/// Exams are inserted one at a time through the store's atomic
/// [`insert_exam`](ExamStore::insert_exam), so a storage failure part-way
/// through leaves whole exams either fully present or fully absent. On
/// failure the returned [`MergeError`] carries the counts committed up to
/// the failing exam.
pub fn merge(
    store: &dyn ExamStore,
    engine: &ScoringEngine,
    teacher: &TeacherRecord,
) -> Result<MergeReport, MergeError> {
    let mut report = MergeReport {
        run_id: Uuid::new_v4(),
        teacher_id: teacher.external_id.clone(),
        new_students: 0,
        new_exams: 0,
        new_tasks: 0,
        merged_at: Utc::now(),
    };

    if let Err(source) = merge_into(store, engine, teacher, &mut report) {
        return Err(MergeError {
            committed: report,
            source,
        });
    }

    tracing::info!(
        teacher = %report.teacher_id,
        new_students = report.new_students,
        new_exams = report.new_exams,
        new_tasks = report.new_tasks,
        "merge complete"
    );

    Ok(report)
}

fn merge_into(
    store: &dyn ExamStore,
    engine: &ScoringEngine,
    teacher: &TeacherRecord,
    report: &mut MergeReport,
) -> anyhow::Result<()> {
    let teacher_row = match store.find_teacher(&teacher.external_id)? {
        Some(row) => row,
        None => store
            .insert_teacher(&teacher.external_id)
            .with_context(|| format!("failed to create teacher {}", teacher.external_id))?,
    };

    for student in &teacher.students {
        let student_row = match store.find_student(teacher_row.id, &student.external_id)? {
            Some(row) => row,
            None => {
                let row = store
                    .insert_student(teacher_row.id, &student.external_id)
                    .with_context(|| {
                        format!("failed to create student {}", student.external_id)
                    })?;
                report.new_students += 1;
                row
            }
        };

        for exam in &student.exams {
            if store
                .find_exam(student_row.id, &exam.external_id)?
                .is_some()
            {
                tracing::debug!(
                    student = %student.external_id,
                    exam = %exam.external_id,
                    "exam already recorded, skipping"
                );
                continue;
            }

            let scored: Vec<_> = exam.tasks.iter().map(|t| engine.score(t)).collect();
            store
                .insert_exam(student_row.id, &exam.external_id, Utc::now(), &scored)
                .with_context(|| {
                    format!(
                        "failed to insert exam {} for student {}",
                        exam.external_id, student.external_id
                    )
                })?;
            report.new_exams += 1;
            report.new_tasks += scored.len();
        }
    }

    Ok(())
}
