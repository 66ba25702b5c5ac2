//! Domain Layer
//!
//! The core of kvdeploy - cluster model and the interfaces the
//! workflows drive, without I/O.
//!
//! ## Structure
//!
//! - `entities/` - Properties document, port assignment, cluster context, backups
//! - `value_objects/` - Immutable value types (ClusterId, Host, PortSet, Phase)
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system or network directly
//! 2. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod value_objects;
