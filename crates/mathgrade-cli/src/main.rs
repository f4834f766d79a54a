//! mathgrade CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "mathgrade", version, about = "Exam-result ingestion and grading")]
struct Cli {
    /// Path to the SQLite store (overrides mathgrade.toml)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest an XML results file into the store
    Load {
        /// Path to the results XML file
        file: PathBuf,

        /// Score and print results without saving anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show stored results — all students, or one
    Results {
        /// Show only this student's results
        #[arg(long)]
        student: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List all student ids in the store
    Students,

    /// Evaluate a single arithmetic expression
    Check {
        /// The expression, e.g. "(2+3)*4"
        expression: String,
    },

    /// Delete every teacher, student, exam, and task from the store
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mathgrade_cli=info".parse().unwrap())
                .add_directive("mathgrade_core=info".parse().unwrap())
                .add_directive("mathgrade_store=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let store_path = match config::resolve_store_path(cli.store, cli.config.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Load { file, dry_run } => commands::load::execute(&file, dry_run, &store_path),
        Commands::Results { student, format } => {
            commands::results::execute(student.as_deref(), &format, &store_path)
        }
        Commands::Students => commands::students::execute(&store_path),
        Commands::Check { expression } => commands::check::execute(&expression),
        Commands::Clear { yes } => commands::clear::execute(yes, &store_path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
