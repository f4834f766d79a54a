//! The `mathgrade results` command.

use std::path::Path;

use anyhow::Result;

use mathgrade_core::query::ResultQuery;
use mathgrade_store::SqliteStore;

use super::{render_all_results, render_student_results};

pub fn execute(student: Option<&str>, format: &str, store_path: &Path) -> Result<()> {
    anyhow::ensure!(
        matches!(format, "table" | "json"),
        "unknown format: {format} (expected table or json)"
    );

    let store = SqliteStore::open(store_path)?;
    let query = ResultQuery::new(&store);

    if !query.has_any_data()? {
        println!("No data in store.");
        return Ok(());
    }

    match student {
        Some(id) => {
            let rows = query.results_for_student(id)?;
            if rows.is_empty() {
                println!("No results for student {id}.");
                return Ok(());
            }
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            println!("{}", render_student_results(&rows));
            let summary = mathgrade_core::statistics::Summary::from_flags(
                rows.iter().map(|r| r.is_correct),
            );
            println!(
                "{}/{} correct ({}%)",
                summary.correct, summary.total, summary.percentage
            );
        }
        None => {
            let rows = query.all_results()?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            println!("{}", render_all_results(&rows));
            for summary in query.student_summaries()? {
                println!(
                    "{}: {}/{} correct ({}%)",
                    summary.student_id, summary.correct, summary.total, summary.percentage
                );
            }
        }
    }

    Ok(())
}
