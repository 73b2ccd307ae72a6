//! State of one conversion pass

use shaclxsd_core::vocab::{sh, xsd};
use shaclxsd_core::ShapeGraph;
use shaclxsd_xsd::{NodeId, Schema, XsdDocument, XsdNode, XsdTree};

use crate::config::{ConversionConfig, DEFAULT_TARGET_NAMESPACE};
use crate::registry::Registry;

/// Everything a pass reads and accumulates.
///
/// Created per call to [`crate::convert`] and consumed by [`LoweringContext::finish`].
pub struct LoweringContext<'a, G: ShapeGraph + ?Sized> {
    pub graph: &'a G,
    pub config: &'a ConversionConfig,
    pub registry: Registry,
    pub tree: XsdTree,
    /// Top-level elements in first-encountered order
    pub top_elements: Vec<NodeId>,
    /// Complex types in completion order
    pub types: Vec<NodeId>,
}

impl<'a, G: ShapeGraph + ?Sized> LoweringContext<'a, G> {
    pub fn new(graph: &'a G, config: &'a ConversionConfig) -> Self {
        LoweringContext {
            graph,
            config,
            registry: Registry::new(),
            tree: XsdTree::new(),
            top_elements: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Assemble the schema root: top-level elements, then complex types
    pub fn finish(mut self) -> XsdDocument {
        let children = self
            .top_elements
            .iter()
            .chain(&self.types)
            .copied()
            .collect();
        let schema = Schema {
            target_namespace: self.target_namespace(),
            element_form_default: self.config.element_form_default.clone(),
            attribute_form_default: self.config.attribute_form_default.clone(),
            prefix: self.schema_prefix(),
            children,
        };
        let root = self.tree.add(XsdNode::Schema(schema));
        XsdDocument {
            tree: self.tree,
            root,
        }
    }

    /// Configured namespace, else the namespace of the first target class
    pub fn target_namespace(&self) -> String {
        if let Some(namespace) = &self.config.target_namespace {
            return namespace.clone();
        }
        self.graph
            .subjects_of_type(sh::NODE_SHAPE)
            .into_iter()
            .flat_map(|shape| self.graph.all_values_of(shape, sh::TARGET_CLASS))
            .find_map(|class| class.as_iri().map(namespace_of))
            .unwrap_or_else(|| DEFAULT_TARGET_NAMESPACE.to_string())
    }

    /// `xsd` when the input bound it to XML Schema, else `xs`
    pub fn schema_prefix(&self) -> String {
        if let Some(prefix) = &self.config.schema_prefix {
            return prefix.clone();
        }
        match self.graph.prefix_namespace("xsd") {
            Some(ns) if ns == xsd::NS || ns == xsd::SCHEMA_NS => "xsd".to_string(),
            _ => "xs".to_string(),
        }
    }
}

/// IRI up to and including its last `/`
fn namespace_of(iri: &str) -> String {
    match iri.rfind('/') {
        Some(pos) => iri[..=pos].to_string(),
        None => format!("{}/", iri),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaclxsd_core::vocab::rdf;
    use shaclxsd_core::{GraphStore, Term};

    #[test]
    fn test_namespace_of() {
        assert_eq!(namespace_of("http://example.org/model/Person"), "http://example.org/model/");
        assert_eq!(namespace_of("urn:thing"), "urn:thing/");
    }

    #[test]
    fn test_target_namespace_from_first_target_class() {
        let mut store = GraphStore::new();
        let shape = Term::iri("http://example.org/shapes/PersonShape");
        store.add(shape.clone(), rdf::TYPE, Term::iri(sh::NODE_SHAPE));
        store.add(shape, sh::TARGET_CLASS, Term::iri("http://example.org/model/Person"));

        let config = ConversionConfig::default();
        let ctx = LoweringContext::new(&store, &config);
        assert_eq!(ctx.target_namespace(), "http://example.org/model/");

        let config = ConversionConfig::default().with_target_namespace("urn:fixed/");
        let ctx = LoweringContext::new(&store, &config);
        assert_eq!(ctx.target_namespace(), "urn:fixed/");
    }

    #[test]
    fn test_schema_prefix_detection() {
        let mut store = GraphStore::new();
        let config = ConversionConfig::default();
        assert_eq!(LoweringContext::new(&store, &config).schema_prefix(), "xs");

        store.add_prefix("xsd", xsd::NS);
        assert_eq!(LoweringContext::new(&store, &config).schema_prefix(), "xsd");
    }
}
