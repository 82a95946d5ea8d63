//! githerd - batch status and sync for many local Git repositories
//!
//! The binary wires three layers together:
//! - `githerd-core` holds the domain model and the git pipelines
//! - [`adapters`] implement the core ports against the real system
//! - [`services`] own the tracked repository list and its orchestration

pub mod adapters;
pub mod cli;
pub mod services;
