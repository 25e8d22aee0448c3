use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error("Path cannot be empty.")]
    InvalidPath,

    #[error("{0}")]
    MalformedInput(String),

    #[error("Directory '{0}' not found.")]
    DirectoryNotFound(String),
}
