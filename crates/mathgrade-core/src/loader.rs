//! Hierarchical results-document loader.
//!
//! Walks the nested XML shape the exam software exports:
//!
//! ```xml
//! <Teacher ID="T1">
//!   <Students>
//!     <Student ID="S1">
//!       <Exam Id="E1">
//!         <Task id="1">2+2 = 4</Task>
//!       </Exam>
//!     </Student>
//!   </Students>
//! </Teacher>
//! ```
//!
//! Attribute casing (`ID`/`Id`/`id`) is what the exporter actually writes.
//!
//! Loading is best-effort below the teacher level: a student, exam, or task
//! node missing its identifier, or a task whose text does not split into
//! `expression = answer`, is skipped and reported in
//! [`LoadedDocument::skipped`] rather than aborting the document. Problems
//! at the document level (no teacher id, no student collection, XML syntax)
//! are fatal.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::model::{ExamRecord, StudentRecord, TeacherRecord};
use crate::task::parse_task;

/// Default cap on task nodes per document.
pub const MAX_TASKS: usize = 100_000;

/// Loads results documents into [`TeacherRecord`] trees.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    /// Defensive bound on the number of task nodes accepted per document.
    pub max_tasks: usize,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self {
            max_tasks: MAX_TASKS,
        }
    }
}

/// A successfully loaded document plus everything that was dropped on the
/// way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedDocument {
    pub teacher: TeacherRecord,
    /// Nodes that were skipped instead of aborting the load.
    pub skipped: Vec<SkippedNode>,
}

/// Which level of the hierarchy a skipped node sat at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkippedKind {
    Student,
    Exam,
    Task,
}

impl fmt::Display for SkippedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkippedKind::Student => write!(f, "student"),
            SkippedKind::Exam => write!(f, "exam"),
            SkippedKind::Task => write!(f, "task"),
        }
    }
}

/// A node dropped during best-effort loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedNode {
    pub kind: SkippedKind,
    /// Human-readable reason, including the offending identifier when known.
    pub detail: String,
}

impl DocumentLoader {
    pub fn new(max_tasks: usize) -> Self {
        Self { max_tasks }
    }

    /// Load a results document from a file.
    pub fn load_path(&self, path: &Path) -> anyhow::Result<LoadedDocument> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results file: {}", path.display()))?;
        self.load_str(&text)
            .with_context(|| format!("failed to load results file: {}", path.display()))
    }

    /// Load a results document from its text.
    pub fn load_str(&self, text: &str) -> Result<LoadedDocument, LoadError> {
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();

        if !root.has_tag_name("Teacher") {
            return Err(LoadError::MissingTeacherId);
        }
        let teacher_id = root
            .attribute("ID")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(LoadError::MissingTeacherId)?;

        let students_node = root
            .children()
            .find(|n| n.has_tag_name("Students"))
            .ok_or(LoadError::MissingStudents)?;

        let mut skipped = Vec::new();
        let mut students = Vec::new();
        let mut task_budget = self.max_tasks;

        for student_node in students_node
            .children()
            .filter(|n| n.has_tag_name("Student"))
        {
            let Some(student_id) = non_empty_attr(&student_node, "ID") else {
                skip(
                    &mut skipped,
                    SkippedKind::Student,
                    "student node without ID attribute".to_string(),
                );
                continue;
            };

            let mut exams = Vec::new();
            for exam_node in student_node.children().filter(|n| n.has_tag_name("Exam")) {
                let Some(exam_id) = non_empty_attr(&exam_node, "Id") else {
                    skip(
                        &mut skipped,
                        SkippedKind::Exam,
                        format!("exam node without Id attribute under student {student_id}"),
                    );
                    continue;
                };

                let mut tasks = Vec::new();
                for task_node in exam_node.children().filter(|n| n.has_tag_name("Task")) {
                    if task_budget == 0 {
                        return Err(LoadError::TooManyTasks {
                            max: self.max_tasks,
                        });
                    }
                    task_budget -= 1;

                    let Some(task_id) = non_empty_attr(&task_node, "id") else {
                        skip(
                            &mut skipped,
                            SkippedKind::Task,
                            format!("task node without id attribute in exam {exam_id}"),
                        );
                        continue;
                    };

                    let raw = task_node.text().unwrap_or("").trim();
                    match parse_task(raw, task_id) {
                        Ok(task) => tasks.push(task),
                        Err(err) => {
                            skip(&mut skipped, SkippedKind::Task, err.to_string());
                        }
                    }
                }

                exams.push(ExamRecord {
                    external_id: exam_id.to_string(),
                    tasks,
                });
            }

            students.push(StudentRecord {
                external_id: student_id.to_string(),
                exams,
            });
        }

        Ok(LoadedDocument {
            teacher: TeacherRecord {
                external_id: teacher_id.to_string(),
                students,
            },
            skipped,
        })
    }
}

fn non_empty_attr<'a>(node: &roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn skip(skipped: &mut Vec<SkippedNode>, kind: SkippedKind, detail: String) {
    tracing::warn!(%kind, %detail, "skipping node");
    skipped.push(SkippedNode { kind, detail });
}

/// Convenience wrapper using the default loader.
pub fn load_document(text: &str) -> Result<LoadedDocument, LoadError> {
    DocumentLoader::default().load_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
<Teacher ID="T1">
  <Students>
    <Student ID="S1">
      <Exam Id="E1">
        <Task id="1">2+2 = 4</Task>
        <Task id="2">3*3 = 8</Task>
      </Exam>
      <Exam Id="E2">
        <Task id="1">10/4 = 2.5</Task>
      </Exam>
    </Student>
    <Student ID="S2">
      <Exam Id="E1">
        <Task id="1">(2+3)*4 = 20</Task>
      </Exam>
    </Student>
  </Students>
</Teacher>
"#;

    #[test]
    fn loads_the_full_hierarchy() {
        let loaded = load_document(SAMPLE).unwrap();
        assert!(loaded.skipped.is_empty());

        let teacher = &loaded.teacher;
        assert_eq!(teacher.external_id, "T1");
        assert_eq!(teacher.students.len(), 2);

        let s1 = &teacher.students[0];
        assert_eq!(s1.external_id, "S1");
        assert_eq!(s1.exams.len(), 2);
        assert_eq!(s1.exams[0].tasks.len(), 2);
        assert_eq!(s1.exams[0].tasks[0].expression, "2+2");
        assert_eq!(s1.exams[0].tasks[0].student_answer, "4");

        assert_eq!(teacher.students[1].exams[0].tasks[0].expression, "(2+3)*4");
    }

    #[test]
    fn missing_teacher_id_is_fatal() {
        let doc = r#"<Teacher><Students><Student ID="S1"/></Students></Teacher>"#;
        assert!(matches!(
            load_document(doc),
            Err(LoadError::MissingTeacherId)
        ));

        let wrong_root = r#"<Results ID="T1"><Students/></Results>"#;
        assert!(matches!(
            load_document(wrong_root),
            Err(LoadError::MissingTeacherId)
        ));

        let blank = r#"<Teacher ID="  "><Students/></Teacher>"#;
        assert!(matches!(
            load_document(blank),
            Err(LoadError::MissingTeacherId)
        ));
    }

    #[test]
    fn missing_students_collection_is_fatal() {
        let doc = r#"<Teacher ID="T1"></Teacher>"#;
        assert!(matches!(
            load_document(doc),
            Err(LoadError::MissingStudents)
        ));
    }

    #[test]
    fn empty_students_collection_is_allowed() {
        let doc = r#"<Teacher ID="T1"><Students></Students></Teacher>"#;
        let loaded = load_document(doc).unwrap();
        assert!(loaded.teacher.students.is_empty());
        assert!(loaded.skipped.is_empty());
    }

    #[test]
    fn malformed_xml_is_fatal() {
        assert!(matches!(
            load_document("<Teacher ID='T1'><Students>"),
            Err(LoadError::Malformed(_))
        ));
        assert!(matches!(
            load_document("not xml at all"),
            Err(LoadError::Malformed(_))
        ));
    }

    #[test]
    fn nodes_without_ids_are_skipped_and_reported() {
        let doc = r#"
<Teacher ID="T1">
  <Students>
    <Student>
      <Exam Id="E1"><Task id="1">1+1 = 2</Task></Exam>
    </Student>
    <Student ID="S1">
      <Exam><Task id="1">1+1 = 2</Task></Exam>
      <Exam Id="E1">
        <Task>1+1 = 2</Task>
        <Task id="2">2+2 = 4</Task>
      </Exam>
    </Student>
  </Students>
</Teacher>
"#;
        let loaded = load_document(doc).unwrap();
        assert_eq!(loaded.teacher.students.len(), 1);
        assert_eq!(loaded.teacher.students[0].exams.len(), 1);
        assert_eq!(loaded.teacher.students[0].exams[0].tasks.len(), 1);

        let kinds: Vec<SkippedKind> = loaded.skipped.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SkippedKind::Student, SkippedKind::Exam, SkippedKind::Task]
        );
    }

    #[test]
    fn malformed_task_text_is_skipped_not_fatal() {
        let doc = r#"
<Teacher ID="T1">
  <Students>
    <Student ID="S1">
      <Exam Id="E1">
        <Task id="1">badtask</Task>
        <Task id="2">a=b=c</Task>
        <Task id="3">2+2 = 4</Task>
      </Exam>
    </Student>
  </Students>
</Teacher>
"#;
        let loaded = load_document(doc).unwrap();
        let exam = &loaded.teacher.students[0].exams[0];
        assert_eq!(exam.tasks.len(), 1);
        assert_eq!(exam.tasks[0].external_id, "3");

        assert_eq!(loaded.skipped.len(), 2);
        assert!(loaded.skipped[0].detail.contains("badtask"));
        assert!(loaded.skipped[1].detail.contains("a=b=c"));
    }

    #[test]
    fn task_bound_is_enforced() {
        let loader = DocumentLoader::new(2);
        let doc = r#"
<Teacher ID="T1">
  <Students>
    <Student ID="S1">
      <Exam Id="E1">
        <Task id="1">1+1 = 2</Task>
        <Task id="2">2+2 = 4</Task>
        <Task id="3">3+3 = 6</Task>
      </Exam>
    </Student>
  </Students>
</Teacher>
"#;
        assert!(matches!(
            loader.load_str(doc),
            Err(LoadError::TooManyTasks { max: 2 })
        ));
    }

    #[test]
    fn load_path_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.xml");
        std::fs::write(&path, SAMPLE).unwrap();

        let loaded = DocumentLoader::default().load_path(&path).unwrap();
        assert_eq!(loaded.teacher.external_id, "T1");

        let missing = DocumentLoader::default().load_path(&dir.path().join("nope.xml"));
        assert!(missing.is_err());
    }
}
