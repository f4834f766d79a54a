//! The `mathgrade students` command.

use std::path::Path;

use anyhow::Result;

use mathgrade_core::query::ResultQuery;
use mathgrade_store::SqliteStore;

pub fn execute(store_path: &Path) -> Result<()> {
    let store = SqliteStore::open(store_path)?;
    let query = ResultQuery::new(&store);

    let ids = query.student_ids()?;
    if ids.is_empty() {
        println!("No students in store.");
        return Ok(());
    }
    for id in ids {
        println!("{id}");
    }
    Ok(())
}
