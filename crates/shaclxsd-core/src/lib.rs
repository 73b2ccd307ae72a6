//! # shaclxsd core
//!
//! RDF term model, an indexed in-memory triple store and a Turtle loader.
//! The [`ShapeGraph`] trait is the read-only surface the lowering engine
//! queries.

pub mod access;
pub mod error;
pub mod model;
pub mod store;
pub mod turtle;
pub mod vocab;

pub use access::ShapeGraph;
pub use error::{CoreError, Result};
pub use model::*;
pub use store::GraphStore;
pub use turtle::{load_into, parse_turtle};
