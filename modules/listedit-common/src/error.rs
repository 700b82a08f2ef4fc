use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListEditError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures of the remote persist call. Cloneable so a single failure can be
/// broadcast to every outcome subscriber.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    #[error("Save task aborted before the remote store answered: {0}")]
    Aborted(String),
}
