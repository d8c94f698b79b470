//! covmerge: merged coverage across every package
//!
//! ## Usage
//!
//! ```bash
//! covmerge -o coverage.out                        # Every package under the current root
//! covmerge -o coverage.out ./cmd/... ./internal/...
//! covmerge -o coverage.out --covermode atomic --race
//! ```

use clap::{CommandFactory, Parser};
use covmerge_cli::{init_logging, Cli, CliError, Outcome};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let color = covmerge_cli::ColorChoice::from(cli.color.clone()).should_color();
    init_logging(cli.quiet, color);

    let outcome = covmerge_cli::run(&cli);
    match outcome {
        Outcome::Success => {}
        Outcome::Failure { ref reason, .. } => eprintln!("FAIL: {reason}"),
        Outcome::Fatal(ref e @ CliError::Usage { .. }) => {
            eprintln!("error: {e}\n");
            eprintln!("{}", Cli::command().render_usage());
        }
        Outcome::Fatal(ref e) => eprintln!("Error: {e}"),
    }
    ExitCode::from(outcome.exit_code())
}
