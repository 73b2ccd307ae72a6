//! XML rendering of an [`XsdDocument`]

use std::io::Write;

use itertools::Itertools;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::builtin::is_builtin;
use crate::error::{Result, XsdError};
use crate::tree::{Content, NodeId, XsdDocument, XsdNode, XsdTree};

/// Namespace of XML Schema documents
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Prefix under which the target namespace is declared
pub const TARGET_PREFIX: &str = "tns";

/// Render the document as indented XML with an XML declaration
pub fn render(doc: &XsdDocument) -> Result<String> {
    let mut buf = Vec::new();
    write_document(doc, &mut buf)?;
    let xml = String::from_utf8(buf)?;
    debug!(bytes = xml.len(), nodes = doc.tree.len(), "rendered schema");
    Ok(xml)
}

/// Stream the document to any writer
pub fn write_document<W: Write>(doc: &XsdDocument, out: W) -> Result<()> {
    let prefix = doc
        .schema()
        .map(|s| s.prefix.clone())
        .ok_or(XsdError::DanglingNode(doc.root.0))?;

    let mut renderer = Renderer {
        tree: &doc.tree,
        prefix,
        writer: Writer::new_with_indent(out, b' ', 2),
    };
    renderer
        .writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    renderer.write_node(doc.root)?;
    renderer.writer.get_mut().write_all(b"\n")?;
    Ok(())
}

struct Renderer<'a, W: Write> {
    tree: &'a XsdTree,
    prefix: String,
    writer: Writer<W>,
}

impl<'a, W: Write> Renderer<'a, W> {
    fn qname(&self, local: &str) -> String {
        format!("{}:{}", self.prefix, local)
    }

    /// Builtin types are qualified with the schema prefix, user types stay bare
    fn type_ref(&self, name: &str) -> String {
        if is_builtin(name) {
            self.qname(name)
        } else {
            name.to_string()
        }
    }

    fn open(&self, local: &str, attrs: &[(&str, String)]) -> BytesStart<'static> {
        let mut start = BytesStart::new(self.qname(local));
        for (key, value) in attrs {
            start.push_attribute((*key, value.as_str()));
        }
        start
    }

    fn write_start(&mut self, local: &str, attrs: &[(&str, String)]) -> Result<()> {
        let start = self.open(local, attrs);
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    fn write_end(&mut self, local: &str) -> Result<()> {
        let end = BytesEnd::new(self.qname(local));
        self.writer.write_event(Event::End(end))?;
        Ok(())
    }

    fn write_empty(&mut self, local: &str, attrs: &[(&str, String)]) -> Result<()> {
        let start = self.open(local, attrs);
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    fn write_container(
        &mut self,
        local: &str,
        attrs: &[(&str, String)],
        children: &[NodeId],
    ) -> Result<()> {
        if children.is_empty() {
            return self.write_empty(local, attrs);
        }
        self.write_start(local, attrs)?;
        for &child in children {
            self.write_node(child)?;
        }
        self.write_end(local)
    }

    fn write_node(&mut self, id: NodeId) -> Result<()> {
        let tree = self.tree;
        let node = tree.get(id).ok_or(XsdError::DanglingNode(id.0))?;

        match node {
            XsdNode::Schema(schema) => {
                let xmlns_schema = format!("xmlns:{}", self.prefix);
                let xmlns_target = format!("xmlns:{}", TARGET_PREFIX);
                let attrs = [
                    (xmlns_schema.as_str(), XSD_NAMESPACE.to_string()),
                    (xmlns_target.as_str(), schema.target_namespace.clone()),
                    ("targetNamespace", schema.target_namespace.clone()),
                    ("elementFormDefault", schema.element_form_default.clone()),
                    ("attributeFormDefault", schema.attribute_form_default.clone()),
                ];
                self.write_container("schema", &attrs, &schema.children)
            }
            XsdNode::ComplexType(ct) => {
                let attrs = [("name", ct.name.clone())];
                let inner: Vec<NodeId> = ct.body.iter().chain(&ct.attributes).copied().collect();
                match &ct.base {
                    Some(base) => {
                        let base = [("base", self.type_ref(base))];
                        self.write_start("complexType", &attrs)?;
                        self.write_start("complexContent", &[])?;
                        self.write_container("extension", &base, &inner)?;
                        self.write_end("complexContent")?;
                        self.write_end("complexType")
                    }
                    None => self.write_container("complexType", &attrs, &inner),
                }
            }
            XsdNode::Element(element) => {
                let mut attrs = Vec::new();
                if let Some(name) = &element.name {
                    attrs.push(("name", name.clone()));
                }
                match &element.content {
                    Content::Ref(target) => attrs.push(("ref", target.clone())),
                    Content::Type(name) => attrs.push(("type", self.type_ref(name))),
                    Content::Inline(_) | Content::None => {}
                }
                if let Some(fixed) = &element.fixed {
                    attrs.push(("fixed", fixed.clone()));
                }
                if let Some(min) = element.min_occurs {
                    attrs.push(("minOccurs", min.to_string()));
                }
                if let Some(max) = element.max_occurs {
                    attrs.push(("maxOccurs", max.to_string()));
                }
                let inline: Vec<NodeId> = element.content.inline().into_iter().collect();
                self.write_container("element", &attrs, &inline)
            }
            XsdNode::Attribute(attribute) => {
                let mut attrs = vec![("name", attribute.name.clone())];
                if let Some(name) = attribute.content.type_name() {
                    attrs.push(("type", self.type_ref(name)));
                }
                attrs.push(("use", attribute.usage.as_str().to_string()));
                if let Some(fixed) = &attribute.fixed {
                    attrs.push(("fixed", fixed.clone()));
                }
                let inline: Vec<NodeId> = attribute.content.inline().into_iter().collect();
                self.write_container("attribute", &attrs, &inline)
            }
            XsdNode::SimpleType(st) => self.write_container("simpleType", &[], &[st.content]),
            XsdNode::Restriction(restriction) => {
                let attrs = [("base", self.type_ref(&restriction.base))];
                if restriction.facets.is_empty() {
                    return self.write_empty("restriction", &attrs);
                }
                self.write_start("restriction", &attrs)?;
                for facet in &restriction.facets {
                    self.write_empty(facet.kind.tag(), &[("value", facet.value.clone())])?;
                }
                self.write_end("restriction")
            }
            XsdNode::Union(union) => {
                let members = union.member_types.iter().map(|m| self.type_ref(m)).join(" ");
                self.write_empty("union", &[("memberTypes", members)])
            }
            XsdNode::Choice(group) => self.write_container("choice", &[], &group.children),
            XsdNode::All(group) => self.write_container("all", &[], &group.children),
        }
    }
}
