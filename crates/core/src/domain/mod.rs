pub mod repo;
pub mod status;
pub mod version;

// Re-exports for convenience
pub use repo::*;
pub use status::*;
pub use version::*;
