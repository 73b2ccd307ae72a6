//! # shaclxsd xsd
//!
//! The output side of the converter: an arena-indexed XSD schema tree with a
//! closed set of node kinds, and a `quick-xml` based renderer.

pub mod builtin;
pub mod error;
pub mod render;
pub mod tree;

pub use builtin::{is_builtin, BUILTIN_TYPES};
pub use error::{Result, XsdError};
pub use render::{render, write_document, XSD_NAMESPACE};
pub use tree::*;
