use std::path::PathBuf;

/// Errors raised by the project model, storage and the edit workflow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no ditz project found ({0}); use 'ditzui init' to initialize")]
    ProjectNotFound(PathBuf),
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("could not serialize yaml: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("invalid project: {0}")]
    InvalidProject(String),
    #[error("project already exists at {0}")]
    AlreadyInitialized(PathBuf),
    #[error("issue not found: {0}")]
    IssueNotFound(String),
    #[error("unknown component: {0}")]
    UnknownComponent(String),
    #[error("invalid disposition index: {0}")]
    InvalidDisposition(usize),
    #[error("issue {0} is already closed")]
    AlreadyClosed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
