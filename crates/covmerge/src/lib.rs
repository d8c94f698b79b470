//! covmerge: Coverage Profile Merging
//!
//! Data model, wire-format codec and merge engine for coverage profiles
//! produced by independent per-package test runs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  raw profile text ─► Profile::parse ─► MergeAccumulator::add    │
//! │                                              │                   │
//! │                                              ▼                   │
//! │                      MergedProfile::render ◄─ finish            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use covmerge::{merge_profiles, Profile};
//!
//! let a = Profile::parse("mode: count\npkg/a.go:1.1,2.2 1 3\n").unwrap();
//! let b = Profile::parse("mode: count\npkg/a.go:1.1,2.2 1 4\n").unwrap();
//!
//! let merged = merge_profiles([a, b]).unwrap();
//! assert_eq!(merged.render(), "mode: count\npkg/a.go:1.1,2.2 1 7\n");
//! ```

#![warn(missing_docs)]

pub mod merge;
pub mod profile;
mod result;

pub use merge::{merge_profiles, MergeAccumulator, MergedProfile};
pub use profile::{Block, Mode, Profile};
pub use result::{CovmergeError, CovmergeResult};
