//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mathgrade() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("mathgrade").unwrap()
}

const DOC: &str = r#"
<Teacher ID="T1">
  <Students>
    <Student ID="S1">
      <Exam Id="E1">
        <Task id="1">2+2 = 4</Task>
        <Task id="2">3*3 = 8</Task>
      </Exam>
    </Student>
  </Students>
</Teacher>
"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("results.xml"), DOC).unwrap();
        Self { dir }
    }

    fn store(&self) -> String {
        self.dir.path().join("grades.db").display().to_string()
    }

    fn doc(&self) -> String {
        self.dir.path().join("results.xml").display().to_string()
    }
}

#[test]
fn load_then_view_results() {
    let fx = Fixture::new();

    mathgrade()
        .args(["--store", &fx.store(), "load", &fx.doc()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "added 1 student(s), 1 exam(s), 2 task(s)",
        ));

    mathgrade()
        .args(["--store", &fx.store(), "results", "--student", "S1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3*3"))
        .stdout(predicate::str::contains("1/2 correct (50%)"));
}

#[test]
fn reload_is_a_noop() {
    let fx = Fixture::new();

    mathgrade()
        .args(["--store", &fx.store(), "load", &fx.doc()])
        .assert()
        .success();

    mathgrade()
        .args(["--store", &fx.store(), "load", &fx.doc()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "added 0 student(s), 0 exam(s), 0 task(s)",
        ))
        .stdout(predicate::str::contains("already imported"));
}

#[test]
fn students_lists_ids() {
    let fx = Fixture::new();

    mathgrade()
        .args(["--store", &fx.store(), "load", &fx.doc()])
        .assert()
        .success();

    mathgrade()
        .args(["--store", &fx.store(), "students"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S1"));
}

#[test]
fn dry_run_does_not_persist() {
    let fx = Fixture::new();

    mathgrade()
        .args(["--store", &fx.store(), "load", &fx.doc(), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("1/2 correct (50%)"));

    mathgrade()
        .args(["--store", &fx.store(), "results"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No data in store."));
}

#[test]
fn clear_requires_confirmation() {
    let fx = Fixture::new();

    mathgrade()
        .args(["--store", &fx.store(), "load", &fx.doc()])
        .assert()
        .success();

    mathgrade()
        .args(["--store", &fx.store(), "clear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    mathgrade()
        .args(["--store", &fx.store(), "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Store cleared"));

    mathgrade()
        .args(["--store", &fx.store(), "results"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No data in store."));
}

#[test]
fn results_as_json() {
    let fx = Fixture::new();

    mathgrade()
        .args(["--store", &fx.store(), "load", &fx.doc()])
        .assert()
        .success();

    mathgrade()
        .args(["--store", &fx.store(), "results", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"is_correct\""))
        .stdout(predicate::str::contains("\"expression\": \"2+2\""));
}

#[test]
fn check_evaluates_expressions() {
    mathgrade()
        .args(["check", "2+3*4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2+3*4 = 14"));

    mathgrade()
        .args(["check", "5/0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("division by zero"));
}

#[test]
fn load_rejects_documents_without_teacher_id() {
    let fx = Fixture::new();
    let bad = fx.dir.path().join("bad.xml");
    std::fs::write(&bad, "<Teacher><Students/></Teacher>").unwrap();

    mathgrade()
        .args(["--store", &fx.store(), "load", &bad.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("teacher ID not found"));
}

#[test]
fn load_reports_skipped_tasks() {
    let fx = Fixture::new();
    let partial = fx.dir.path().join("partial.xml");
    std::fs::write(
        &partial,
        r#"
<Teacher ID="T1">
  <Students>
    <Student ID="S1">
      <Exam Id="E1">
        <Task id="1">badtask</Task>
        <Task id="2">2+2 = 4</Task>
      </Exam>
    </Student>
  </Students>
</Teacher>
"#,
    )
    .unwrap();

    mathgrade()
        .args([
            "--store",
            &fx.store(),
            "load",
            &partial.display().to_string(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped 1 node(s)"))
        .stdout(predicate::str::contains("badtask"))
        .stdout(predicate::str::contains(
            "added 1 student(s), 1 exam(s), 1 task(s)",
        ));
}

#[test]
fn load_missing_file_fails() {
    let fx = Fixture::new();
    mathgrade()
        .args(["--store", &fx.store(), "load", "no-such-file.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
