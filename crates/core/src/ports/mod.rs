pub mod command;
pub mod scanner;
pub mod persistence;

// Re-exports
pub use command::*;
pub use scanner::*;
pub use persistence::*;
