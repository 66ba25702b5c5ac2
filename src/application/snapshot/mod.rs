//! Snapshot Module
//!
//! Standalone backup, restore and inspection of a deployed cluster,
//! outside of any deploy workflow.

mod options;
mod result;
mod use_case;

pub use options::{BackupOptions, RestoreOptions};
pub use result::{BackupOutcome, RestoreOutcome, StateReport};
pub use use_case::SnapshotUseCase;
