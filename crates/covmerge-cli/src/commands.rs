//! CLI definition using clap

use clap::{Parser, ValueEnum};
use covmerge::Mode;
use std::path::PathBuf;

/// covmerge: run coverage tests package by package and merge the profiles
#[derive(Parser, Debug)]
#[command(name = "covmerge")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "covmerge [OPTIONS] --coverprofile <PATH> [PATTERN]...")]
pub struct Cli {
    /// Write the merged coverage profile to this file.
    /// An existing file is removed first, so a failed merge leaves none behind
    #[arg(short = 'o', long, value_name = "PATH")]
    pub coverprofile: Option<PathBuf>,

    /// Coverage accumulation mode forwarded to the test tool
    #[arg(long, value_name = "MODE")]
    pub covermode: Option<ModeArg>,

    /// GOMAXPROCS list forwarded to the test tool
    #[arg(long, value_name = "LIST")]
    pub cpu: Option<String>,

    /// Maximum parallel tests within one package, forwarded to the test tool
    #[arg(long, value_name = "N")]
    pub parallel: Option<usize>,

    /// Per-package timeout forwarded to the test tool (e.g. 10m)
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Ask the test tool to skip long-running tests
    #[arg(long)]
    pub short: bool,

    /// Verbose test output, streamed straight to the terminal
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the commands the test tool runs
    #[arg(short = 'x', long = "trace")]
    pub trace: bool,

    /// Enable data race detection (requires atomic mode)
    #[arg(long)]
    pub race: bool,

    /// Test tool executable
    #[arg(long = "go", value_name = "PATH", env = "COVMERGE_GO", default_value = "go")]
    pub go_binary: PathBuf,

    /// Quiet mode (suppress progress and summary output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorArg,

    /// Package patterns to measure (default: every package under the current root)
    #[arg(value_name = "PATTERN")]
    pub patterns: Vec<String>,
}

/// Coverage mode argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Was each block executed
    Set,
    /// How many times each block executed
    Count,
    /// Like count, safe under concurrent tests
    Atomic,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Set => Self::Set,
            ModeArg::Count => Self::Count,
            ModeArg::Atomic => Self::Atomic,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
