//! Arena-indexed XSD schema tree
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. A node may
//! be referenced from several parents (a property shared by two types), so
//! the arena is a DAG; the rendered document is the tree unfolding of it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable index of a node inside an [`XsdTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// `use` of an attribute declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Use {
    Required,
    Optional,
}

impl Use {
    pub fn as_str(&self) -> &'static str {
        match self {
            Use::Required => "required",
            Use::Optional => "optional",
        }
    }
}

/// What an element or attribute declaration is typed by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Content {
    /// Untyped, e.g. a fixed-value declaration
    None,
    /// Named type, builtin or user-defined
    Type(String),
    /// Anonymous `simpleType` child
    Inline(NodeId),
    /// `ref` to a top-level element (elements only)
    Ref(String),
}

impl Content {
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Content::Type(name) => Some(name),
            _ => None,
        }
    }

    pub fn inline(&self) -> Option<NodeId> {
        match self {
            Content::Inline(id) => Some(*id),
            _ => None,
        }
    }
}

/// Restriction facet kinds, declared in canonical output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FacetKind {
    Enumeration,
    Pattern,
    MinExclusive,
    MaxExclusive,
    MinInclusive,
    MaxInclusive,
    Length,
    MinLength,
    MaxLength,
}

impl FacetKind {
    /// XSD element name of the facet
    pub fn tag(&self) -> &'static str {
        match self {
            FacetKind::Enumeration => "enumeration",
            FacetKind::Pattern => "pattern",
            FacetKind::MinExclusive => "minExclusive",
            FacetKind::MaxExclusive => "maxExclusive",
            FacetKind::MinInclusive => "minInclusive",
            FacetKind::MaxInclusive => "maxInclusive",
            FacetKind::Length => "length",
            FacetKind::MinLength => "minLength",
            FacetKind::MaxLength => "maxLength",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub kind: FacetKind,
    pub value: String,
}

impl Facet {
    pub fn new(kind: FacetKind, value: impl Into<String>) -> Self {
        Facet {
            kind,
            value: value.into(),
        }
    }
}

/// Root `schema` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub target_namespace: String,
    pub element_form_default: String,
    pub attribute_form_default: String,
    /// Prefix bound to the XML Schema namespace (`xs` or `xsd`)
    pub prefix: String,
    /// Top-level elements followed by complex types
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexType {
    pub name: String,
    /// Extension base; the body is wrapped in `complexContent/extension`
    pub base: Option<String>,
    /// Groups, unions and loose elements in document order
    pub body: Vec<NodeId>,
    pub attributes: Vec<NodeId>,
}

impl ComplexType {
    pub fn new(name: impl Into<String>) -> Self {
        ComplexType {
            name: name.into(),
            base: None,
            body: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// `None` for `ref` elements
    pub name: Option<String>,
    pub content: Content,
    pub fixed: Option<String>,
    pub min_occurs: Option<u64>,
    pub max_occurs: Option<u64>,
}

impl Element {
    pub fn named(name: impl Into<String>, content: Content) -> Self {
        Element {
            name: Some(name.into()),
            content,
            fixed: None,
            min_occurs: None,
            max_occurs: None,
        }
    }

    /// `<element ref="..."/>`
    pub fn reference(target: impl Into<String>) -> Self {
        Element {
            name: None,
            content: Content::Ref(target.into()),
            fixed: None,
            min_occurs: None,
            max_occurs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub usage: Use,
    pub content: Content,
    pub fixed: Option<String>,
}

/// Anonymous simple type wrapping a restriction or a union
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleType {
    pub content: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    pub base: String,
    pub facets: Vec<Facet>,
}

impl Restriction {
    pub fn new(base: impl Into<String>) -> Self {
        Restriction {
            base: base.into(),
            facets: Vec::new(),
        }
    }

    /// Whether facets follow the canonical kind order
    pub fn is_canonical(&self) -> bool {
        self.facets.windows(2).all(|w| w[0].kind <= w[1].kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Union {
    pub member_types: Vec<String>,
}

/// Ordered element group (`choice` or `all`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub children: Vec<NodeId>,
}

/// Output node variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node")]
pub enum XsdNode {
    Schema(Schema),
    ComplexType(ComplexType),
    Element(Element),
    Attribute(Attribute),
    SimpleType(SimpleType),
    Restriction(Restriction),
    Union(Union),
    Choice(Group),
    All(Group),
}

impl XsdNode {
    /// XSD element name this node renders as
    pub fn tag(&self) -> &'static str {
        match self {
            XsdNode::Schema(_) => "schema",
            XsdNode::ComplexType(_) => "complexType",
            XsdNode::Element(_) => "element",
            XsdNode::Attribute(_) => "attribute",
            XsdNode::SimpleType(_) => "simpleType",
            XsdNode::Restriction(_) => "restriction",
            XsdNode::Union(_) => "union",
            XsdNode::Choice(_) => "choice",
            XsdNode::All(_) => "all",
        }
    }

    /// Children owned by this node, in document order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            XsdNode::Schema(schema) => schema.children.clone(),
            XsdNode::ComplexType(ct) => ct.body.iter().chain(&ct.attributes).copied().collect(),
            XsdNode::Element(Element { content, .. }) | XsdNode::Attribute(Attribute { content, .. }) => {
                content.inline().into_iter().collect()
            }
            XsdNode::SimpleType(st) => vec![st.content],
            XsdNode::Choice(group) | XsdNode::All(group) => group.children.clone(),
            XsdNode::Restriction(_) | XsdNode::Union(_) => Vec::new(),
        }
    }
}

/// Node arena
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XsdTree {
    nodes: Vec<XsdNode>,
}

impl XsdTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: XsdNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&XsdNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut XsdNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &XsdNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    pub fn complex_type(&self, id: NodeId) -> Option<&ComplexType> {
        match self.get(id) {
            Some(XsdNode::ComplexType(ct)) => Some(ct),
            _ => None,
        }
    }

    pub fn complex_type_mut(&mut self, id: NodeId) -> Option<&mut ComplexType> {
        match self.get_mut(id) {
            Some(XsdNode::ComplexType(ct)) => Some(ct),
            _ => None,
        }
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.get(id) {
            Some(XsdNode::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId) -> Option<&Attribute> {
        match self.get(id) {
            Some(XsdNode::Attribute(attribute)) => Some(attribute),
            _ => None,
        }
    }

    pub fn restriction(&self, id: NodeId) -> Option<&Restriction> {
        match self.get(id) {
            Some(XsdNode::Restriction(restriction)) => Some(restriction),
            _ => None,
        }
    }

    pub fn restriction_mut(&mut self, id: NodeId) -> Option<&mut Restriction> {
        match self.get_mut(id) {
            Some(XsdNode::Restriction(restriction)) => Some(restriction),
            _ => None,
        }
    }

    pub fn union(&self, id: NodeId) -> Option<&Union> {
        match self.get(id) {
            Some(XsdNode::Union(union)) => Some(union),
            _ => None,
        }
    }

    /// Node wrapped by a `simpleType`
    pub fn simple_type_content(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id) {
            Some(XsdNode::SimpleType(st)) => Some(st.content),
            _ => None,
        }
    }

    /// Group children for `choice` and `all` nodes
    pub fn group_children(&self, id: NodeId) -> Option<&[NodeId]> {
        match self.get(id) {
            Some(XsdNode::Choice(group)) | Some(XsdNode::All(group)) => Some(&group.children),
            _ => None,
        }
    }

    pub fn group_mut(&mut self, id: NodeId) -> Option<&mut Group> {
        match self.get_mut(id) {
            Some(XsdNode::Choice(group)) | Some(XsdNode::All(group)) => Some(group),
            _ => None,
        }
    }
}

/// Finished schema: the arena plus the id of its `Schema` root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XsdDocument {
    pub tree: XsdTree,
    pub root: NodeId,
}

impl XsdDocument {
    pub fn schema(&self) -> Option<&Schema> {
        match self.tree.get(self.root) {
            Some(XsdNode::Schema(schema)) => Some(schema),
            _ => None,
        }
    }

    pub fn top_level(&self) -> Vec<NodeId> {
        self.schema().map(|s| s.children.clone()).unwrap_or_default()
    }

    /// Top-level element declarations in document order
    pub fn top_elements(&self) -> Vec<&Element> {
        self.top_level()
            .into_iter()
            .filter_map(|id| self.tree.element(id))
            .collect()
    }

    /// Complex type definitions in document order
    pub fn complex_types(&self) -> Vec<&ComplexType> {
        self.top_level()
            .into_iter()
            .filter_map(|id| self.tree.complex_type(id))
            .collect()
    }

    pub fn complex_type_named(&self, name: &str) -> Option<&ComplexType> {
        self.complex_types().into_iter().find(|ct| ct.name == name)
    }
}
