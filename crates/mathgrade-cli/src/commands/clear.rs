//! The `mathgrade clear` command.

use std::path::Path;

use anyhow::Result;

use mathgrade_core::store::ExamStore;
use mathgrade_store::SqliteStore;

pub fn execute(yes: bool, store_path: &Path) -> Result<()> {
    anyhow::ensure!(
        yes,
        "this deletes every teacher, student, exam, and task; pass --yes to confirm"
    );

    let store = SqliteStore::open(store_path)?;
    let counts = store.counts()?;
    store.clear()?;

    println!(
        "Store cleared ({} teacher(s), {} student(s), {} exam(s), {} task(s) removed).",
        counts.teachers, counts.students, counts.exams, counts.tasks
    );
    Ok(())
}
