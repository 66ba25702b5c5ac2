//! Common test utilities for kvdeploy workflow tests.
//!
//! This module provides:
//! - `FakeFleet`: remote hosts emulated as directories under a temp root
//! - `FakeNodes`: an in-memory cluster that answers the node control calls
//! - `RecordingSink`: captures deploy events
//! - `TestEnv`: all of the above wired into `Services`

#![allow(dead_code)]

pub mod env;
pub mod events;
pub mod fleet;
pub mod nodes;

pub use env::*;
pub use events::*;
pub use fleet::*;
pub use nodes::*;
