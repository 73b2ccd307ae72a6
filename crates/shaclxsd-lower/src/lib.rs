//! # shaclxsd lower
//!
//! Lowers a SHACL shapes graph into an XSD schema tree.
//!
//! - Node shapes become complex types, extended from their `sh:node` base,
//!   grouped as `choice`, `union` or `all`
//! - Property shapes become elements or attributes with inline restrictions
//! - Target classes become top-level elements
//!
//! The engine never fails: unconvertible shapes are skipped, missing
//! datatypes fall back to defaults and unresolvable references are kept by
//! name. Everything a pass accumulates lives in one [`LoweringContext`].

pub mod classify;
pub mod config;
pub mod context;
pub mod emit;
pub mod list;
pub mod node;
pub mod property;
pub mod registry;
pub mod shapes;

pub use config::{ConfigError, ConversionConfig, DEFAULT_TARGET_NAMESPACE};
pub use context::LoweringContext;
pub use emit::{convert, convert_with_summary, ConversionSummary};
pub use node::lower_node_shape;
pub use property::lower_property_shape;
pub use registry::{Lowered, Registry, Slot};
pub use shapes::{shape_name, Enumeration, NodeShapeView, PropertyShapeView};
