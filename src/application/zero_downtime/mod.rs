//! Zero-Downtime Redeploy Module
//!
//! Upgrades a deployed cluster without stopping service by upgrading the
//! replicas first, failing over to them, then upgrading the old masters.
//!
//! ## Structure
//!
//! - `options` - Inputs (`ZeroDowntimeOptions`)
//! - `result` - What the run did (`ZeroDowntimeOutcome`)
//! - `failover` - Timeout widening and the bounded failover rounds
//! - `use_case` - The numbered phase sequence (`ZeroDowntimeUseCase`)

mod failover;
mod options;
mod result;
mod use_case;

pub use failover::{FailoverLoop, TimeoutWindow};
pub use options::ZeroDowntimeOptions;
pub use result::ZeroDowntimeOutcome;
pub use use_case::ZeroDowntimeUseCase;
