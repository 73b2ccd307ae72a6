//! # shaclxsd - SHACL to XML Schema
//!
//! Converts a SHACL shapes graph, written in Turtle, into an XSD document.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shaclxsd::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let turtle = std::fs::read_to_string("shapes.ttl")?;
//!     let xsd = shaclxsd::convert_turtle(&turtle, &ConversionConfig::default())?;
//!     std::fs::write("shapes.ttl.xsd", xsd)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`shaclxsd-core`**: RDF terms, an indexed triple store and the Turtle loader
//! - **`shaclxsd-xsd`**: Arena-indexed XSD tree and its XML renderer
//! - **`shaclxsd-lower`**: Node/property shape lowering, the heart of the converter
//! - **`shaclxsd-cli`**: Command-line interface
//!
//! ## Feature Flags
//!
//! - `full` (default): All crates included
//! - `core`: Term model, store and Turtle loader
//! - `xsd`: Schema tree and renderer
//! - `lower`: Lowering engine (pulls in `core` and `xsd`)
//! - `cli`: Command-line tools

// Re-export all public APIs from sub-crates (feature-gated)

#[cfg(feature = "shaclxsd-core")]
pub use shaclxsd_core as core;

#[cfg(feature = "shaclxsd-xsd")]
pub use shaclxsd_xsd as xsd;

#[cfg(feature = "shaclxsd-lower")]
pub use shaclxsd_lower as lower;

#[cfg(feature = "shaclxsd-cli")]
pub use shaclxsd_cli as cli;

// Convenience re-exports for common types (feature-gated)
#[cfg(feature = "shaclxsd-core")]
pub use shaclxsd_core::{parse_turtle, CoreError, GraphStore, ShapeGraph, Term};

#[cfg(feature = "shaclxsd-xsd")]
pub use shaclxsd_xsd::{render, XsdDocument, XsdError};

#[cfg(feature = "shaclxsd-lower")]
pub use shaclxsd_lower::{convert, ConversionConfig, ConversionSummary};

// Commonly used external dependencies
pub use anyhow;
pub use serde;
pub use serde_json;

/// Prelude module for convenient imports
///
/// ```rust
/// use shaclxsd::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "shaclxsd-core")]
    pub use crate::core::{GraphStore, ShapeGraph, Term, Triple};

    #[cfg(feature = "shaclxsd-xsd")]
    pub use crate::xsd::{XsdDocument, XsdNode};

    #[cfg(feature = "shaclxsd-lower")]
    pub use crate::lower::{convert, ConversionConfig};

    // Common external types
    pub use anyhow::Result;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::Value;
}

/// Parse Turtle, lower its shapes and render the schema
#[cfg(all(feature = "shaclxsd-core", feature = "shaclxsd-xsd", feature = "shaclxsd-lower"))]
pub fn convert_turtle(turtle: &str, config: &ConversionConfig) -> anyhow::Result<String> {
    use anyhow::Context;

    let store = parse_turtle(turtle).context("failed to parse shapes graph")?;
    let document = convert(&store, config);
    let xml = render(&document).context("failed to render schema")?;
    tracing::debug!(triples = store.len(), bytes = xml.len(), "converted turtle shapes");
    Ok(xml)
}

// Version information
/// Current version of shaclxsd
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Basic system information, as reported by `shaclxsd info`
pub fn health_check() -> serde_json::Value {
    serde_json::json!({
        "status": "healthy",
        "version": VERSION,
        "modules": {
            "core": cfg!(feature = "shaclxsd-core"),
            "xsd": cfg!(feature = "shaclxsd-xsd"),
            "lower": cfg!(feature = "shaclxsd-lower"),
            "cli": cfg!(feature = "shaclxsd-cli"),
        }
    })
}
