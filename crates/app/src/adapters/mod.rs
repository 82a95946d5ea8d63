//! Port implementations backed by the host system

pub mod discovery;
pub mod persistence;
pub mod process;

pub use discovery::FsScanner;
pub use persistence::{JsonRepoStore, TomlConfigStore};
pub use process::SystemCommandRunner;
