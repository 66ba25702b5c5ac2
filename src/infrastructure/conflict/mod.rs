//! Infrastructure implementations for PortResolver

mod interactive;

pub use interactive::{confirm, InteractivePortResolver};
