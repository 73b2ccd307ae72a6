//! Conversion driver and schema assembly

use serde::Serialize;
use shaclxsd_core::vocab::sh;
use shaclxsd_core::ShapeGraph;
use shaclxsd_xsd::{XsdDocument, XsdNode};
use tracing::{debug, info};

use crate::config::ConversionConfig;
use crate::context::LoweringContext;
use crate::node::lower_node_shape;
use crate::property::lower_property_shape;

/// Counts reported for one conversion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub node_shapes: usize,
    pub property_shapes: usize,
    pub complex_types: usize,
    pub top_level_elements: usize,
}

/// Lower every shape in `graph` into one schema document.
///
/// Node shapes are lowered in the order the graph lists them, then property
/// shapes no node shape reached. Element-kind leftovers become top-level
/// elements; attribute-kind leftovers have no place in a schema root and are
/// dropped.
pub fn convert<G: ShapeGraph + ?Sized>(graph: &G, config: &ConversionConfig) -> XsdDocument {
    convert_with_summary(graph, config).0
}

/// Same as [`convert`], also returning pass counts
pub fn convert_with_summary<G: ShapeGraph + ?Sized>(
    graph: &G,
    config: &ConversionConfig,
) -> (XsdDocument, ConversionSummary) {
    let mut ctx = LoweringContext::new(graph, config);

    let node_shapes = graph.subjects_of_type(sh::NODE_SHAPE);
    for shape in &node_shapes {
        lower_node_shape(&mut ctx, shape);
    }

    let property_shapes = graph.subjects_of_type(sh::PROPERTY_SHAPE);
    for shape in &property_shapes {
        if ctx.registry.get(shape).is_some() {
            continue;
        }
        let node = match lower_property_shape(&mut ctx, shape) {
            Some(node) => node,
            None => continue,
        };
        if let Some(XsdNode::Element(_)) = ctx.tree.get(node) {
            debug!(shape = %shape, "unreached property shape emitted at top level");
            ctx.top_elements.push(node);
        }
    }

    let summary = ConversionSummary {
        node_shapes: node_shapes.len(),
        property_shapes: property_shapes.len(),
        complex_types: ctx.types.len(),
        top_level_elements: ctx.top_elements.len(),
    };
    info!(
        node_shapes = summary.node_shapes,
        property_shapes = summary.property_shapes,
        complex_types = summary.complex_types,
        top_level_elements = summary.top_level_elements,
        "conversion pass finished"
    );

    (ctx.finish(), summary)
}
