//! Application services built on the core ports

pub mod store;

pub use store::{BatchAction, RepoStore, SortKey};
