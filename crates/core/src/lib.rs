//! githerd core - domain model and git pipelines for the repository herd
//!
//! This crate contains the status model, the git command sequences that
//! derive it, and the ports (interfaces) implemented by adapters in the app
//! crate. It never spawns a process itself - all subprocess execution goes
//! through the CommandRunner port, which keeps every pipeline testable with
//! scripted runners.

pub mod domain;
pub mod ports;
pub mod git;
pub mod error;

// Re-exports for ergonomics
pub use domain::*;
pub use error::*;
