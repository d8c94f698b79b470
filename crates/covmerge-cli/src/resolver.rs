//! Package resolution

use crate::error::{CliError, CliResult};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Pattern used when none is given
pub const DEFAULT_PATTERN: &str = "./...";

/// Expands a target pattern into concrete package identifiers
pub trait PackageResolver {
    /// Resolve one pattern; vendored packages are excluded
    fn resolve(&self, pattern: &str) -> CliResult<Vec<String>>;
}

/// Resolver backed by `go list`
#[derive(Debug, Clone)]
pub struct GoListResolver {
    go_binary: PathBuf,
}

impl GoListResolver {
    /// Create a resolver invoking the given tool binary
    #[must_use]
    pub fn new(go_binary: impl Into<PathBuf>) -> Self {
        Self {
            go_binary: go_binary.into(),
        }
    }
}

impl PackageResolver for GoListResolver {
    fn resolve(&self, pattern: &str) -> CliResult<Vec<String>> {
        let pattern = if pattern.is_empty() {
            DEFAULT_PATTERN
        } else {
            pattern
        };
        debug!(tool = %self.go_binary.display(), pattern, "listing packages");

        let output = Command::new(&self.go_binary)
            .args(["list", pattern])
            .output()
            .map_err(|e| CliError::resolution(pattern, e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = format!("{stdout}{stderr}");
            let detail = detail.trim();
            let message = if detail.is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {detail}", output.status)
            };
            return Err(CliError::resolution(pattern, message));
        }

        Ok(filter_packages(&stdout))
    }
}

/// Split tool output into package identifiers, dropping blanks and vendored paths
#[must_use]
pub fn filter_packages(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|p| !p.is_empty() && !is_vendored(p))
        .map(String::from)
        .collect()
}

/// Whether a package identifier lives under a vendor directory
#[must_use]
pub fn is_vendored(package: &str) -> bool {
    package.contains("/vendor/") || package.starts_with("vendor/")
}

/// Resolve every pattern in order, keeping the first occurrence of each package
pub fn resolve_all<R>(resolver: &R, patterns: &[&str]) -> CliResult<Vec<String>>
where
    R: PackageResolver + ?Sized,
{
    let mut packages: Vec<String> = Vec::new();
    for pattern in patterns {
        for package in resolver.resolve(pattern)? {
            if !packages.contains(&package) {
                packages.push(package);
            }
        }
    }
    Ok(packages)
}
