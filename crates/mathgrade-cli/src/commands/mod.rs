//! CLI subcommand implementations.

pub mod check;
pub mod clear;
pub mod load;
pub mod results;
pub mod students;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use mathgrade_core::query::StudentTaskResult;
use mathgrade_core::store::ResultRow;

pub fn mark(is_correct: bool) -> &'static str {
    if is_correct {
        "correct"
    } else {
        "wrong"
    }
}

/// Table of all results, teacher view.
pub fn render_all_results(rows: &[ResultRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Student",
            "Exam",
            "Task",
            "Expression",
            "Answer",
            "Correct answer",
            "Result",
        ]);
    for row in rows {
        table.add_row(vec![
            row.student_external_id.as_str(),
            row.exam_external_id.as_str(),
            row.task_external_id.as_str(),
            row.expression.as_str(),
            row.student_answer.as_str(),
            row.correct_answer.as_str(),
            mark(row.is_correct),
        ]);
    }
    table
}

/// Table of one student's results, with task numbers.
pub fn render_student_results(rows: &[StudentTaskResult]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "#",
            "Exam",
            "Expression",
            "Answer",
            "Correct answer",
            "Result",
        ]);
    for row in rows {
        table.add_row(vec![
            row.task_number.to_string(),
            row.exam_external_id.clone(),
            row.expression.clone(),
            row.student_answer.clone(),
            row.correct_answer.clone(),
            mark(row.is_correct).to_string(),
        ]);
    }
    table
}
