use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Repository not found: {id}")]
    RepositoryNotFound { id: String },

    #[error("Not a git repository: {path}")]
    NotARepository { path: String },

    #[error("Persistence error: {source}")]
    Persistence { source: anyhow::Error },
}

pub type Result<T> = std::result::Result<T, CoreError>;
