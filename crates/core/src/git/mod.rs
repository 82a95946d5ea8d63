pub mod cli;
pub mod status;
pub mod actions;

// Re-exports
pub use cli::*;
pub use status::*;
pub use actions::*;
