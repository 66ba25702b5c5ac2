//! Subcommand handlers
//!
//! Each handler builds a [`Runtime`](runtime::Runtime), runs one use case
//! and renders the outcome.

pub mod deploy;
pub mod redeploy;
pub mod runtime;
pub mod snapshot;
