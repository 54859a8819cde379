use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FacadeError {
    #[error("{0} already registered")]
    AlreadyRegistered(String),

    #[error("Invalid category name {0:?}: must be a non-empty file stem without path separators or '..'")]
    InvalidCategory(String),

    #[error("Failed to open log file {}: {source}", path.display())]
    OpenSink {
        path: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },
}
