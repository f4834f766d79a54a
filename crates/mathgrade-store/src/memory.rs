//! In-memory store.
//!
//! Plain vectors behind a mutex with monotonically assigned ids. A test
//! double: the semantics (dedup keys, cascade clear, atomic exam insert)
//! match the SQLite backend exactly, so pipeline tests can run against
//! both through the same trait.

use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use mathgrade_core::model::ScoredTask;
use mathgrade_core::store::{
    ExamStore, ExamRow, ResultRow, StoreCounts, StudentRow, TeacherRow,
};

#[derive(Debug, Clone)]
struct TaskEntry {
    exam_id: i64,
    external_id: String,
    expression: String,
    student_answer: String,
    correct_answer: String,
    is_correct: bool,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    teachers: Vec<TeacherRow>,
    students: Vec<StudentRow>,
    exams: Vec<ExamRow>,
    tasks: Vec<TaskEntry>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn join_rows(&self, filter_student: Option<&str>) -> Vec<ResultRow> {
        let mut rows = Vec::new();
        for task in &self.tasks {
            let Some(exam) = self.exams.iter().find(|e| e.id == task.exam_id) else {
                continue;
            };
            let Some(student) = self.students.iter().find(|s| s.id == exam.student_id) else {
                continue;
            };
            if let Some(wanted) = filter_student {
                if student.external_id != wanted {
                    continue;
                }
            }
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
        rows
    }
}

/// An `ExamStore` kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| anyhow!("store mutex poisoned"))
    }
}

impl ExamStore for MemoryStore {
    fn find_teacher(&self, external_id: &str) -> Result<Option<TeacherRow>> {
        let inner = self.lock()?;
        Ok(inner
            .teachers
            .iter()
            .find(|t| t.external_id == external_id)
            .cloned())
    }

    fn insert_teacher(&self, external_id: &str) -> Result<TeacherRow> {
        let mut inner = self.lock()?;
        if inner.teachers.iter().any(|t| t.external_id == external_id) {
            return Err(anyhow!("teacher {external_id} already exists"));
        }
        let row = TeacherRow {
            id: inner.next_id(),
            external_id: external_id.to_string(),
        };
        inner.teachers.push(row.clone());
        Ok(row)
    }

    fn find_student(&self, teacher_id: i64, external_id: &str) -> Result<Option<StudentRow>> {
        let inner = self.lock()?;
        Ok(inner
            .students
            .iter()
            .find(|s| s.teacher_id == teacher_id && s.external_id == external_id)
            .cloned())
    }

    fn insert_student(&self, teacher_id: i64, external_id: &str) -> Result<StudentRow> {
        let mut inner = self.lock()?;
        if !inner.teachers.iter().any(|t| t.id == teacher_id) {
            return Err(anyhow!("no teacher with id {teacher_id}"));
        }
        if inner
            .students
            .iter()
            .any(|s| s.teacher_id == teacher_id && s.external_id == external_id)
        {
            return Err(anyhow!("student {external_id} already exists"));
        }
        let row = StudentRow {
            id: inner.next_id(),
            external_id: external_id.to_string(),
            teacher_id,
        };
        inner.students.push(row.clone());
        Ok(row)
    }

    fn find_exam(&self, student_id: i64, external_id: &str) -> Result<Option<ExamRow>> {
        let inner = self.lock()?;
        Ok(inner
            .exams
            .iter()
            .find(|e| e.student_id == student_id && e.external_id == external_id)
            .cloned())
    }

    fn insert_exam(
        &self,
        student_id: i64,
        external_id: &str,
        loaded_at: DateTime<Utc>,
        tasks: &[ScoredTask],
    ) -> Result<ExamRow> {
        let mut inner = self.lock()?;
        if !inner.students.iter().any(|s| s.id == student_id) {
            return Err(anyhow!("no student with id {student_id}"));
        }
        if inner
            .exams
            .iter()
            .any(|e| e.student_id == student_id && e.external_id == external_id)
        {
            return Err(anyhow!("exam {external_id} already exists"));
        }
        let row = ExamRow {
            id: inner.next_id(),
            external_id: external_id.to_string(),
            student_id,
            loaded_at,
        };
        // Single critical section: the exam and its tasks land together.
        inner.exams.push(row.clone());
        for task in tasks {
            inner.tasks.push(TaskEntry {
                exam_id: row.id,
                external_id: task.external_id.clone(),
                expression: task.expression.clone(),
                student_answer: task.student_answer.clone(),
                correct_answer: task.correct_answer.clone(),
                is_correct: task.is_correct,
            });
        }
        Ok(row)
    }

    fn result_rows(&self) -> Result<Vec<ResultRow>> {
        Ok(self.lock()?.join_rows(None))
    }

    fn result_rows_for_student(&self, student_external_id: &str) -> Result<Vec<ResultRow>> {
        Ok(self.lock()?.join_rows(Some(student_external_id)))
    }

    fn student_ids(&self) -> Result<Vec<String>> {
        let inner = self.lock()?;
        let mut ids: Vec<String> = inner
            .students
            .iter()
            .map(|s| s.external_id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn has_any_data(&self) -> Result<bool> {
        Ok(!self.lock()?.students.is_empty())
    }

    fn counts(&self) -> Result<StoreCounts> {
        let inner = self.lock()?;
        Ok(StoreCounts {
            teachers: inner.teachers.len(),
            students: inner.students.len(),
            exams: inner.exams.len(),
            tasks: inner.tasks.len(),
        })
    }

    fn clear(&self) -> Result<()> {
        let mut inner = self.lock()?;
        inner.teachers.clear();
        inner.students.clear();
        inner.exams.clear();
        inner.tasks.clear();
        Ok(())
    }
}
