//! Typed views over shapes in the graph

use serde::Serialize;
use shaclxsd_core::vocab::{rdf, sh};
use shaclxsd_core::{local_name, ShapeGraph, Term};

use crate::classify::is_attribute;
use crate::list::{is_list, walk};

/// Name of a shape: `sh:name` if present, else derived from its identity.
///
/// Identities of the form `.../NodeShape/<name>` and `.../PropertyShape/<name>`
/// yield the trailing part (without a leading `@` for property shapes);
/// anything else yields its last path segment or fragment.
pub fn shape_name<G: ShapeGraph + ?Sized>(graph: &G, shape: &Term) -> String {
    if let Some(name) = graph.value_of(shape, sh::NAME) {
        return name.lexical().to_string();
    }

    let identity = shape.lexical();
    if let Some(pos) = identity.rfind("NodeShape/") {
        return identity[pos + "NodeShape/".len()..].to_string();
    }
    if let Some(pos) = identity.rfind("PropertyShape/") {
        let tail = &identity[pos + "PropertyShape/".len()..];
        return tail.strip_prefix('@').unwrap_or(tail).to_string();
    }
    local_name(identity).to_string()
}

/// Node shape attributes relevant to lowering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeShapeView {
    pub id: Term,
    pub name: String,
    /// `sh:node`; only the first value counts
    pub base: Option<Term>,
    /// `sh:xone` branches
    pub exclusive_choice: Option<Vec<Term>>,
    /// `sh:or` branches
    pub disjunction: Option<Vec<Term>>,
    pub properties: Vec<Term>,
    pub target_classes: Vec<Term>,
}

impl NodeShapeView {
    pub fn read<G: ShapeGraph + ?Sized>(graph: &G, id: &Term) -> Self {
        NodeShapeView {
            id: id.clone(),
            name: shape_name(graph, id),
            base: graph.value_of(id, sh::NODE).cloned(),
            exclusive_choice: graph.value_of(id, sh::XONE).map(|head| walk(graph, head)),
            disjunction: graph.value_of(id, sh::OR).map(|head| walk(graph, head)),
            properties: graph.all_values_of(id, sh::PROPERTY).into_iter().cloned().collect(),
            target_classes: graph
                .all_values_of(id, sh::TARGET_CLASS)
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// Extends a base and adds nothing of its own
    pub fn only_extends_base(&self) -> bool {
        self.base.is_some()
            && self.properties.is_empty()
            && self.exclusive_choice.is_none()
            && self.disjunction.is_none()
    }
}

/// Shape of an `sh:in` value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Enumeration {
    /// `rdf:nil`: no constraint
    Empty,
    /// A list, possibly cut short by malformed cells
    Members(Vec<Term>),
    /// A value that is not a list
    Single(Term),
}

/// Property shape attributes relevant to lowering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyShapeView {
    pub id: Term,
    /// Display name with the attribute marker stripped
    pub name: String,
    pub is_attribute: bool,
    pub path: Option<Term>,
    pub datatype: Option<Term>,
    pub min_count: Option<u64>,
    pub max_count: Option<u64>,
    pub enumeration: Option<Enumeration>,
    pub pattern: Option<String>,
    pub min_exclusive: Option<String>,
    pub max_exclusive: Option<String>,
    pub min_inclusive: Option<String>,
    pub max_inclusive: Option<String>,
    pub min_length: Option<String>,
    pub max_length: Option<String>,
    pub length: Option<String>,
    /// Property-level `sh:or` branches
    pub disjunction: Option<Vec<Term>>,
}

impl PropertyShapeView {
    pub fn read<G: ShapeGraph + ?Sized>(graph: &G, id: &Term, attribute_marker: &str) -> Self {
        let lexical = |predicate: &str| graph.value_of(id, predicate).map(|v| v.lexical().to_string());
        let count = |predicate: &str| graph.value_of(id, predicate).and_then(Term::as_u64);

        let path = graph.value_of(id, sh::PATH).cloned();
        let mut name = shape_name(graph, id);
        let is_attribute = is_attribute(id, &name, path.as_ref(), attribute_marker);
        if is_attribute && !attribute_marker.is_empty() {
            if let Some(stripped) = name.strip_prefix(attribute_marker) {
                name = stripped.to_string();
            }
        }

        let enumeration = graph.value_of(id, sh::IN).map(|value| {
            if value.is_iri(rdf::NIL) {
                Enumeration::Empty
            } else if is_list(graph, value) {
                Enumeration::Members(walk(graph, value))
            } else {
                Enumeration::Single(value.clone())
            }
        });

        PropertyShapeView {
            id: id.clone(),
            name,
            is_attribute,
            path,
            datatype: graph.value_of(id, sh::DATATYPE).cloned(),
            min_count: count(sh::MIN_COUNT),
            max_count: count(sh::MAX_COUNT),
            enumeration,
            pattern: lexical(sh::PATTERN),
            min_exclusive: lexical(sh::MIN_EXCLUSIVE),
            max_exclusive: lexical(sh::MAX_EXCLUSIVE),
            min_inclusive: lexical(sh::MIN_INCLUSIVE),
            max_inclusive: lexical(sh::MAX_INCLUSIVE),
            min_length: lexical(sh::MIN_LENGTH),
            max_length: lexical(sh::MAX_LENGTH),
            length: lexical(sh::LENGTH),
            disjunction: graph.value_of(id, sh::OR).map(|head| walk(graph, head)),
        }
    }

    pub fn has_numeric_bounds(&self) -> bool {
        self.min_exclusive.is_some()
            || self.max_exclusive.is_some()
            || self.min_inclusive.is_some()
            || self.max_inclusive.is_some()
    }

    pub fn has_facets(&self) -> bool {
        self.pattern.is_some()
            || self.has_numeric_bounds()
            || self.min_length.is_some()
            || self.max_length.is_some()
            || self.length.is_some()
    }
}
