//! Terminal presentation for the kvdeploy binary

pub mod context;
pub mod terminal;
pub mod views;
