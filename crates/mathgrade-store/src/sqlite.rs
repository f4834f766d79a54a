//! SQLite-backed store.
//!
//! Schema mirrors the entity model: integer primary keys, external ids from
//! the documents, foreign keys with `ON DELETE CASCADE` so removing a
//! teacher removes everything beneath it, and unique indexes on each dedup
//! key — teacher external id globally, `(teacher, student external id)`,
//! `(student, exam external id)`. Exam inserts run in a transaction so an
//! exam and its tasks are either all committed or all absent.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use mathgrade_core::model::ScoredTask;
use mathgrade_core::store::{
    ExamStore, ExamRow, ResultRow, StoreCounts, StudentRow, TeacherRow,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS teachers (
    teacher_id  INTEGER PRIMARY KEY,
    external_id TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS students (
    student_id  INTEGER PRIMARY KEY,
    external_id TEXT NOT NULL,
    teacher_id  INTEGER NOT NULL REFERENCES teachers(teacher_id) ON DELETE CASCADE,
    UNIQUE (teacher_id, external_id)
);

CREATE TABLE IF NOT EXISTS exams (
    exam_id     INTEGER PRIMARY KEY,
    external_id TEXT NOT NULL,
    student_id  INTEGER NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
    loaded_at   TEXT NOT NULL,
    UNIQUE (student_id, external_id)
);

CREATE TABLE IF NOT EXISTS tasks (
    task_id        INTEGER PRIMARY KEY,
    external_id    TEXT NOT NULL,
    exam_id        INTEGER NOT NULL REFERENCES exams(exam_id) ON DELETE CASCADE,
    expression     TEXT NOT NULL,
    student_answer TEXT NOT NULL,
    correct_answer TEXT NOT NULL,
    is_correct     INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_exam ON tasks(exam_id);
";

/// An `ExamStore` persisted in a SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) a store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open store at {}", path.display()))?;
        Self::init(conn)
    }

    /// Open a private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)
            .context("failed to initialize store schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("store mutex poisoned"))
    }
}

impl ExamStore for SqliteStore {
    fn find_teacher(&self, external_id: &str) -> Result<Option<TeacherRow>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT teacher_id, external_id FROM teachers WHERE external_id = ?1",
                params![external_id],
                |r| {
                    Ok(TeacherRow {
                        id: r.get(0)?,
                        external_id: r.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn insert_teacher(&self, external_id: &str) -> Result<TeacherRow> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO teachers (external_id) VALUES (?1)",
            params![external_id],
        )?;
        Ok(TeacherRow {
            id: conn.last_insert_rowid(),
            external_id: external_id.to_string(),
        })
    }

    fn find_student(&self, teacher_id: i64, external_id: &str) -> Result<Option<StudentRow>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT student_id, external_id, teacher_id FROM students
                 WHERE teacher_id = ?1 AND external_id = ?2",
                params![teacher_id, external_id],
                |r| {
                    Ok(StudentRow {
                        id: r.get(0)?,
                        external_id: r.get(1)?,
                        teacher_id: r.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn insert_student(&self, teacher_id: i64, external_id: &str) -> Result<StudentRow> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO students (teacher_id, external_id) VALUES (?1, ?2)",
            params![teacher_id, external_id],
        )?;
        Ok(StudentRow {
            id: conn.last_insert_rowid(),
            external_id: external_id.to_string(),
            teacher_id,
        })
    }

    fn find_exam(&self, student_id: i64, external_id: &str) -> Result<Option<ExamRow>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT exam_id, external_id, student_id, loaded_at FROM exams
                 WHERE student_id = ?1 AND external_id = ?2",
                params![student_id, external_id],
                |r| {
                    Ok(ExamRow {
                        id: r.get(0)?,
                        external_id: r.get(1)?,
                        student_id: r.get(2)?,
                        loaded_at: r.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn insert_exam(
        &self,
        student_id: i64,
        external_id: &str,
        loaded_at: DateTime<Utc>,
        tasks: &[ScoredTask],
    ) -> Result<ExamRow> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO exams (student_id, external_id, loaded_at) VALUES (?1, ?2, ?3)",
            params![student_id, external_id, loaded_at],
        )?;
        let exam_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO tasks
                   (exam_id, external_id, expression, student_answer, correct_answer, is_correct)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for task in tasks {
                stmt.execute(params![
                    exam_id,
                    task.external_id,
                    task.expression,
                    task.student_answer,
                    task.correct_answer,
                    task.is_correct,
                ])?;
            }
        }

        tx.commit()?;
        Ok(ExamRow {
            id: exam_id,
            external_id: external_id.to_string(),
            student_id,
            loaded_at,
        })
    }

    fn result_rows(&self) -> Result<Vec<ResultRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT s.external_id, e.external_id, t.external_id,
                    t.expression, t.student_answer, t.correct_answer, t.is_correct
             FROM tasks t
             JOIN exams e ON e.exam_id = t.exam_id
             JOIN students s ON s.student_id = e.student_id",
        )?;
        let rows = stmt
            .query_map([], result_row_from_sql)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn result_rows_for_student(&self, student_external_id: &str) -> Result<Vec<ResultRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT s.external_id, e.external_id, t.external_id,
                    t.expression, t.student_answer, t.correct_answer, t.is_correct
             FROM tasks t
             JOIN exams e ON e.exam_id = t.exam_id
             JOIN students s ON s.student_id = e.student_id
             WHERE s.external_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![student_external_id], result_row_from_sql)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn student_ids(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT external_id FROM students ORDER BY external_id")?;
        let ids = stmt
            .query_map([], |r| r.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    fn has_any_data(&self) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))?;
        Ok(count > 0)
    }

    fn counts(&self) -> Result<StoreCounts> {
        let conn = self.lock()?;
        let count = |table: &str| -> Result<usize> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
            Ok(n as usize)
        };
        Ok(StoreCounts {
            teachers: count("teachers")?,
            students: count("students")?,
            exams: count("exams")?,
            tasks: count("tasks")?,
        })
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        // Cascades through students, exams, and tasks.
        conn.execute("DELETE FROM teachers", [])?;
        Ok(())
    }
}

fn result_row_from_sql(r: &rusqlite::Row<'_>) -> rusqlite::Result<ResultRow> {
    Ok(ResultRow {
        student_external_id: r.get(0)?,
        exam_external_id: r.get(1)?,
        task_external_id: r.get(2)?,
        expression: r.get(3)?,
        student_answer: r.get(4)?,
        correct_answer: r.get(5)?,
        is_correct: r.get(6)?,
    })
}
