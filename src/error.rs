use std::error::Error as StdError;

use thiserror::Error;

/// Failure to turn a URL into a [`crate::table::Table`].
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Parse(String),
}

/// Recoverable failure while loading one dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("invalid database configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Database(#[from] tokio_postgres::Error),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error("{0}")]
    Table(String),
}

/// Failure that ends the run before any dataset is attempted.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Error creating RAW schema: {0}")]
    Schema(#[source] LoadError),
}

/// The error message followed by the messages of all its causes, joined
/// with `": "`.  A cause already at the end of the text is not repeated.
pub fn error_chain(e: &(dyn StdError + 'static)) -> String {
    let mut text = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let msg = cause.to_string();
        if !msg.is_empty() && !text.ends_with(&msg) {
            text.push_str(": ");
            text.push_str(&msg);
        }
        source = cause.source();
    }
    text
}
