//! The `mathgrade load` command.

use std::path::Path;

use anyhow::Result;

use mathgrade_core::loader::DocumentLoader;
use mathgrade_core::merge::merge;
use mathgrade_core::query::transient_results;
use mathgrade_core::scoring::ScoringEngine;
use mathgrade_core::statistics::Summary;
use mathgrade_store::SqliteStore;

use super::render_all_results;

pub fn execute(file: &Path, dry_run: bool, store_path: &Path) -> Result<()> {
    let loaded = DocumentLoader::default().load_path(file)?;

    if !loaded.skipped.is_empty() {
        println!("Skipped {} node(s):", loaded.skipped.len());
        for node in &loaded.skipped {
            println!("  - {}: {}", node.kind, node.detail);
        }
    }

    let engine = ScoringEngine::default();

    if dry_run {
        let rows = transient_results(&engine, &loaded.teacher);
        println!("{}", render_all_results(&rows));
        let summary = Summary::from_flags(rows.iter().map(|r| r.is_correct));
        println!(
            "{}/{} correct ({}%)",
            summary.correct, summary.total, summary.percentage
        );
        println!("Dry run: nothing was saved.");
        return Ok(());
    }

    tracing::debug!(store = %store_path.display(), "opening store");
    let store = SqliteStore::open(store_path)?;
    let report = merge(&store, &engine, &loaded.teacher)?;

    println!(
        "Teacher {}: added {} student(s), {} exam(s), {} task(s).",
        report.teacher_id, report.new_students, report.new_exams, report.new_tasks
    );
    if report.is_noop() {
        println!("Everything in this file was already imported.");
    }

    Ok(())
}
