//! Error types for schema rendering

use thiserror::Error;

/// Result type for the xsd crate
pub type Result<T> = std::result::Result<T, XsdError>;

#[derive(Error, Debug)]
pub enum XsdError {
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("rendered schema is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("node {0} is not part of this tree")]
    DanglingNode(usize),
}
