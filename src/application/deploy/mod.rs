//! Deploy Module
//!
//! Standard deploy and full redeploy of one cluster.
//!
//! ## Structure
//!
//! - `options` - Inputs (`DeployOptions`, `PropertiesSource`)
//! - `result` - What the run did (`DeployOutcome`)
//! - `use_case` - The phase sequence (`DeployUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use kvdeploy::application::deploy::{DeployOptions, DeployUseCase, PropertiesSource};
//!
//! let use_case = DeployUseCase::new(&services, &resolver);
//! let outcome = use_case.execute(&DeployOptions::new(id, installer, PropertiesSource::Restore))?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::{DeployOptions, PropertiesSource};
pub use result::DeployOutcome;
pub use use_case::DeployUseCase;
