use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BindcovError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to write report to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BindcovError>;
