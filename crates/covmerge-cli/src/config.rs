//! Run configuration
//!
//! Built once from the command line and passed by reference to everything
//! that needs it.

use crate::commands::Cli;
use crate::error::{CliError, CliResult};
use covmerge::Mode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - no progress or summary
    Quiet,
    /// Normal - progress bar, captured test output
    #[default]
    Normal,
    /// Verbose - test output streamed to the terminal
    Verbose,
}

impl Verbosity {
    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose mode
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when stderr is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

/// Immutable options for one covmerge invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Destination of the merged profile
    pub coverprofile: PathBuf,
    /// Accumulation mode; `None` leaves the test tool's default
    pub covermode: Option<Mode>,
    /// `-cpu` list
    pub cpu: Option<String>,
    /// `-parallel` value
    pub parallel: Option<usize>,
    /// `-timeout` value
    pub timeout: Option<String>,
    /// `-short`
    pub short: bool,
    /// `-x`
    pub trace: bool,
    /// `-race`
    pub race: bool,
    /// Output verbosity; `Verbose` also forwards `-v`
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Test tool executable
    pub go_binary: PathBuf,
    /// Package patterns; empty means every package under the current root
    pub patterns: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            coverprofile: PathBuf::from("coverage.out"),
            covermode: None,
            cpu: None,
            parallel: None,
            timeout: None,
            short: false,
            trace: false,
            race: false,
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
            go_binary: PathBuf::from("go"),
            patterns: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Create a configuration writing to `coverprofile`
    #[must_use]
    pub fn new(coverprofile: impl Into<PathBuf>) -> Self {
        Self {
            coverprofile: coverprofile.into(),
            ..Self::default()
        }
    }

    /// Build and validate a configuration from parsed arguments
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let coverprofile = cli
            .coverprofile
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| CliError::usage("--coverprofile is required"))?;

        let verbosity = if cli.quiet {
            Verbosity::Quiet
        } else if cli.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        let config = Self {
            coverprofile,
            covermode: cli.covermode.map(Mode::from),
            cpu: cli.cpu.clone(),
            parallel: cli.parallel,
            timeout: cli.timeout.clone(),
            short: cli.short,
            trace: cli.trace,
            race: cli.race,
            verbosity,
            color: cli.color.clone().into(),
            go_binary: cli.go_binary.clone(),
            patterns: cli.patterns.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject option combinations the test tool cannot honor
    pub fn validate(&self) -> CliResult<()> {
        match self.covermode {
            Some(mode) if self.race && mode != Mode::Atomic => Err(CliError::config(format!(
                "cannot use --race with --covermode={mode}; race detection requires atomic"
            ))),
            _ => Ok(()),
        }
    }

    /// Set accumulation mode
    #[must_use]
    pub const fn with_covermode(mut self, mode: Mode) -> Self {
        self.covermode = Some(mode);
        self
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set race detection
    #[must_use]
    pub const fn with_race(mut self, race: bool) -> Self {
        self.race = race;
        self
    }

    /// Set the test tool executable
    #[must_use]
    pub fn with_go_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.go_binary = path.into();
        self
    }

    /// Set package patterns
    #[must_use]
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Whether child output goes straight to the terminal
    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbosity.is_verbose()
    }

    /// Patterns to resolve; no pattern means one empty pattern
    #[must_use]
    pub fn effective_patterns(&self) -> Vec<&str> {
        if self.patterns.is_empty() {
            vec![""]
        } else {
            self.patterns.iter().map(String::as_str).collect()
        }
    }

    /// Flags forwarded to every per-package test run, in a fixed order
    #[must_use]
    pub fn test_flags(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(mode) = self.covermode {
            args.extend(["-covermode".to_string(), mode.to_string()]);
        }
        if let Some(ref cpu) = self.cpu {
            args.extend(["-cpu".to_string(), cpu.clone()]);
        }
        if let Some(parallel) = self.parallel {
            args.extend(["-parallel".to_string(), parallel.to_string()]);
        }
        if let Some(ref timeout) = self.timeout {
            args.extend(["-timeout".to_string(), timeout.clone()]);
        }
        if self.short {
            args.push("-short".to_string());
        }
        if self.is_verbose() {
            args.push("-v".to_string());
        }
        if self.trace {
            args.push("-x".to_string());
        }
        if self.race {
            args.push("-race".to_string());
        }
        args
    }
}
