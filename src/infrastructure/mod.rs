//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `remote/` - SSH executor with rsync/scp transfers
//! - `node/` - Node control through the node CLI client
//! - `fs/` - Local file system
//! - `repositories/` - Advisory cluster lock
//! - `events/` - Console and NDJSON event sinks
//! - `host/` - Local host detection
//! - `conflict/` - Interactive port conflict resolution

pub mod conflict;
pub mod events;
pub mod fs;
pub mod host;
pub mod node;
pub mod remote;
pub mod repositories;

pub use conflict::InteractivePortResolver;
pub use events::{ConsoleEventSink, ConsoleStyle, JsonEventSink};
pub use fs::LocalFs;
pub use host::SystemHostResolver;
pub use node::{CliNodeControl, NodeCommands};
pub use remote::{SshExecutor, SshOptions};
pub use repositories::FsClusterLocker;
