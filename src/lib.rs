#![warn(missing_docs)]
//! Core library entry points for the vortcrawl headword harvester.
//!
//! The crawler walks the dictionary breadth-first from a seed word: every
//! fetched entry yields new candidate words, which join the frontier until
//! nothing new turns up. Progress lives in three word lists on disk so a
//! run can stop at any point and resume later. The root normalizer then
//! collapses the harvested headwords into their grammatical roots.

pub mod checkpoint;
pub mod collation;
pub mod controls;
pub mod fetch;
pub mod frontier;
pub mod html;
pub mod normalizer;
pub mod runtime;

pub use checkpoint::{Archive, CheckpointError, CheckpointStore};
pub use collation::esort;
pub use controls::{Cli, CrawlControls};
pub use fetch::{ArchiveFetcher, FetchError, FetchOutcome, Fetcher, HttpFetcher};
pub use frontier::{FrontierState, MergeStats, WordStatus};
pub use normalizer::{NormalizationRules, Normalizer, RulesError};
pub use runtime::run as run_crawler;
pub use runtime::{CrawlError, Crawler, Extract, Metrics, RunError, StopReason};
