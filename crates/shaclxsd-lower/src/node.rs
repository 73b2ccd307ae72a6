//! Node shape lowering
//!
//! Descent runs on an explicit stack of `Visit`/`Build` frames. `Visit`
//! reserves the shape's complex type and schedules its base and branch shapes
//! ahead of its own `Build`, so dependencies are finished (and appended to the
//! output) first. A dependency that is still reserved when its dependent is
//! built lies on a cycle and is referenced by name.

use shaclxsd_core::{ShapeGraph, Term};
use shaclxsd_xsd::{ComplexType, Content, Element, Group, NodeId, SimpleType, Union, XsdNode};
use tracing::{debug, warn};

use crate::classify::{is_property_branch, is_scalar_uniform};
use crate::context::LoweringContext;
use crate::property::{lower_property_shape, member_types};
use crate::registry::Lowered;
use crate::shapes::{shape_name, NodeShapeView};

enum Frame {
    Visit(Term),
    Build(NodeShapeView),
}

/// Where element properties of a type go
#[derive(Clone, Copy)]
enum Placement {
    /// No group yet; an `all` group is created on first use
    Unset,
    Group(NodeId),
    /// Only group is a union; elements sit directly in the body
    Body,
}

/// Lower a node shape into a complex type.
///
/// Returns the cached node for shapes already lowered or in progress, and
/// `None` for identities the graph says nothing about.
pub fn lower_node_shape<G: ShapeGraph + ?Sized>(
    ctx: &mut LoweringContext<'_, G>,
    shape: &Term,
) -> Option<NodeId> {
    if ctx.registry.get(shape).is_some() {
        return ctx.registry.type_node(shape);
    }

    let mut stack = vec![Frame::Visit(shape.clone())];
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Visit(id) => visit(ctx, id, &mut stack),
            Frame::Build(view) => build(ctx, view),
        }
    }

    ctx.registry.type_node(shape)
}

fn visit<G: ShapeGraph + ?Sized>(
    ctx: &mut LoweringContext<'_, G>,
    id: Term,
    stack: &mut Vec<Frame>,
) {
    if ctx.registry.get(&id).is_some() || !ctx.graph.describes(&id) {
        return;
    }

    let view = NodeShapeView::read(ctx.graph, &id);
    let node = ctx
        .tree
        .add(XsdNode::ComplexType(ComplexType::new(view.name.clone())));
    ctx.registry.reserve(id, node);

    let dependencies = dependencies(ctx.graph, &view);
    stack.push(Frame::Build(view));
    for dependency in dependencies.into_iter().rev() {
        stack.push(Frame::Visit(dependency));
    }
}

/// Node shapes that must be lowered before `view`, in declaration order
fn dependencies<G: ShapeGraph + ?Sized>(graph: &G, view: &NodeShapeView) -> Vec<Term> {
    let mut dependencies: Vec<Term> = view.base.iter().cloned().collect();

    let branches = match (&view.exclusive_choice, &view.disjunction) {
        (Some(branches), _) => Some(branches),
        (None, Some(branches)) if !is_scalar_uniform(graph, branches) => Some(branches),
        _ => None,
    };
    if let Some(branches) = branches {
        dependencies.extend(
            branches
                .iter()
                .filter(|branch| !is_property_branch(graph, branch))
                .cloned(),
        );
    }
    dependencies
}

fn build<G: ShapeGraph + ?Sized>(ctx: &mut LoweringContext<'_, G>, view: NodeShapeView) {
    let node = match ctx.registry.type_node(&view.id) {
        Some(node) => node,
        None => return,
    };

    let base = view.base.as_ref().map(|base| reference_name(ctx, &view, base));
    let mut body = Vec::new();
    let mut attributes = Vec::new();
    let mut placement = Placement::Unset;

    if let Some(branches) = &view.exclusive_choice {
        let choice = lower_choice(ctx, branches);
        body.push(choice);
        placement = Placement::Group(choice);
    } else if let Some(branches) = &view.disjunction {
        if is_scalar_uniform(ctx.graph, branches) {
            let member_types = member_types(ctx.graph, branches);
            let union = ctx.tree.add(XsdNode::Union(Union { member_types }));
            body.push(ctx.tree.add(XsdNode::SimpleType(SimpleType { content: union })));
            placement = Placement::Body;
        } else {
            let choice = lower_choice(ctx, branches);
            body.push(choice);
            placement = Placement::Group(choice);
        }
    }

    for property in &view.properties {
        let lowered = match lower_property_shape(ctx, property) {
            Some(lowered) => lowered,
            None => continue,
        };
        match ctx.tree.get(lowered) {
            Some(XsdNode::Attribute(_)) => attributes.push(lowered),
            Some(XsdNode::Element(_)) => {
                let group = match placement {
                    Placement::Group(group) => group,
                    Placement::Body => {
                        body.push(lowered);
                        continue;
                    }
                    Placement::Unset => {
                        let all = ctx.tree.add(XsdNode::All(Group::default()));
                        body.push(all);
                        placement = Placement::Group(all);
                        all
                    }
                };
                if let Some(group) = ctx.tree.group_mut(group) {
                    group.children.push(lowered);
                }
            }
            _ => {}
        }
    }

    let element_type = match &base {
        Some(base) if view.only_extends_base() => base.clone(),
        _ => view.name.clone(),
    };
    for class in &view.target_classes {
        let element = ctx.tree.add(XsdNode::Element(Element::named(
            view.name.clone(),
            Content::Type(element_type.clone()),
        )));
        debug!(shape = %view.id, class = %class, "top-level element {}", view.name);
        ctx.top_elements.push(element);
    }

    if let Some(ct) = ctx.tree.complex_type_mut(node) {
        ct.base = base;
        ct.body = body;
        ct.attributes = attributes;
    }
    ctx.types.push(node);
    ctx.registry.store(view.id.clone(), Lowered::Type(node));
    debug!(shape = %view.id, name = %view.name, "lowered node shape");
}

/// `choice` over branches: property branches inline, node branches by `ref`
fn lower_choice<G: ShapeGraph + ?Sized>(
    ctx: &mut LoweringContext<'_, G>,
    branches: &[Term],
) -> NodeId {
    let mut children = Vec::new();
    for branch in branches {
        if is_property_branch(ctx.graph, branch) {
            if let Some(node) = lower_property_shape(ctx, branch) {
                children.push(node);
            }
        } else {
            if !ctx.graph.describes(branch) {
                warn!(branch = %branch, "choice branch is not defined, referencing it by name");
            }
            let name = shape_name(ctx.graph, branch);
            children.push(ctx.tree.add(XsdNode::Element(Element::reference(name))));
        }
    }
    ctx.tree.add(XsdNode::Choice(Group { children }))
}

/// Name of a base type, whatever state its shape is in
fn reference_name<G: ShapeGraph + ?Sized>(
    ctx: &LoweringContext<'_, G>,
    view: &NodeShapeView,
    base: &Term,
) -> String {
    let name = shape_name(ctx.graph, base);
    if ctx.registry.is_in_progress(base) {
        warn!(
            shape = %view.id,
            base = %base,
            "cyclic sh:node inheritance, extending {} by forward reference",
            name
        );
    } else if ctx.registry.type_node(base).is_none() {
        warn!(
            shape = %view.id,
            base = %base,
            "base shape is not defined, extending {} by name only",
            name
        );
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Slot;
    use crate::ConversionConfig;
    use shaclxsd_core::vocab::{rdf, sh, xsd};
    use shaclxsd_core::GraphStore;

    const EX: &str = "http://example.org/";

    fn node_shape(store: &mut GraphStore, name: &str) -> Term {
        let shape = Term::iri(format!("{}NodeShape/{}", EX, name));
        store.add(shape.clone(), rdf::TYPE, Term::iri(sh::NODE_SHAPE));
        shape
    }

    fn property_shape(store: &mut GraphStore, name: &str, datatype: &str) -> Term {
        let shape = Term::iri(format!("{}PropertyShape/{}", EX, name));
        store.add(shape.clone(), rdf::TYPE, Term::iri(sh::PROPERTY_SHAPE));
        store.add(
            shape.clone(),
            sh::PATH,
            Term::iri(format!("{}{}", EX, name.trim_start_matches('@'))),
        );
        store.add(shape.clone(), sh::DATATYPE, Term::iri(datatype));
        shape
    }

    fn add_list(store: &mut GraphStore, subject: &Term, predicate: &str, items: &[Term]) {
        let cells: Vec<Term> = (0..items.len())
            .map(|i| Term::blank(format!("{}-{}-{}", subject.local_name(), predicate.len(), i)))
            .collect();
        store.add(
            subject.clone(),
            predicate,
            cells.first().cloned().unwrap_or_else(|| Term::iri(rdf::NIL)),
        );
        for (i, item) in items.iter().enumerate() {
            let rest = cells.get(i + 1).cloned().unwrap_or_else(|| Term::iri(rdf::NIL));
            store.add(cells[i].clone(), rdf::FIRST, item.clone());
            store.add(cells[i].clone(), rdf::REST, rest);
        }
    }

    #[test]
    fn test_lowering_twice_returns_same_node() {
        let mut store = GraphStore::new();
        let person = node_shape(&mut store, "Person");

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        let first = lower_node_shape(&mut ctx, &person);
        let second = lower_node_shape(&mut ctx, &person);

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(ctx.types, vec![first.unwrap()]);
    }

    #[test]
    fn test_properties_go_into_all_group() {
        let mut store = GraphStore::new();
        let person = node_shape(&mut store, "Person");
        let name = property_shape(&mut store, "name", xsd::STRING);
        let id = property_shape(&mut store, "@id", xsd::STRING);
        store.add(person.clone(), sh::PROPERTY, name);
        store.add(person.clone(), sh::PROPERTY, id);

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        let node = lower_node_shape(&mut ctx, &person).unwrap();

        let ct = ctx.tree.complex_type(node).unwrap();
        assert_eq!(ct.name, "Person");
        assert_eq!(ct.base, None);
        assert_eq!(ct.body.len(), 1);
        assert!(matches!(ctx.tree.get(ct.body[0]), Some(XsdNode::All(_))));
        let children = ctx.tree.group_children(ct.body[0]).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(ctx.tree.element(children[0]).unwrap().name.as_deref(), Some("name"));
        assert_eq!(ct.attributes.len(), 1);
        assert_eq!(ctx.tree.attribute(ct.attributes[0]).unwrap().name, "id");
    }

    #[test]
    fn test_base_is_lowered_first() {
        let mut store = GraphStore::new();
        let person = node_shape(&mut store, "Person");
        let employee = node_shape(&mut store, "Employee");
        store.add(employee.clone(), sh::NODE, person.clone());

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        let node = lower_node_shape(&mut ctx, &employee).unwrap();
        let base = ctx.registry.type_node(&person).unwrap();

        assert_eq!(ctx.types, vec![base, node]);
        assert_eq!(
            ctx.tree.complex_type(node).unwrap().base.as_deref(),
            Some("Person")
        );
    }

    #[test]
    fn test_cyclic_base_terminates_with_forward_reference() {
        let mut store = GraphStore::new();
        let a = node_shape(&mut store, "A");
        let b = node_shape(&mut store, "B");
        store.add(a.clone(), sh::NODE, b.clone());
        store.add(b.clone(), sh::NODE, a.clone());

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        let node_a = lower_node_shape(&mut ctx, &a).unwrap();
        let node_b = ctx.registry.type_node(&b).unwrap();

        assert_eq!(ctx.types, vec![node_b, node_a]);
        assert_eq!(ctx.tree.complex_type(node_b).unwrap().base.as_deref(), Some("A"));
        assert_eq!(ctx.tree.complex_type(node_a).unwrap().base.as_deref(), Some("B"));
        assert_eq!(ctx.registry.get(&a), Some(Slot::Done(Lowered::Type(node_a))));
    }

    #[test]
    fn test_self_reference_terminates() {
        let mut store = GraphStore::new();
        let a = node_shape(&mut store, "Loop");
        store.add(a.clone(), sh::NODE, a.clone());

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        let node = lower_node_shape(&mut ctx, &a).unwrap();
        assert_eq!(ctx.tree.complex_type(node).unwrap().base.as_deref(), Some("Loop"));
        assert_eq!(ctx.types.len(), 1);
    }

    #[test]
    fn test_undefined_base_is_referenced_not_fabricated() {
        let mut store = GraphStore::new();
        let child = node_shape(&mut store, "Child");
        store.add(child.clone(), sh::NODE, Term::iri(format!("{}NodeShape/Missing", EX)));

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        let node = lower_node_shape(&mut ctx, &child).unwrap();

        assert_eq!(ctx.types, vec![node]);
        assert_eq!(ctx.tree.complex_type(node).unwrap().base.as_deref(), Some("Missing"));
        assert_eq!(
            lower_node_shape(&mut ctx, &Term::iri(format!("{}NodeShape/Missing", EX))),
            None
        );
    }

    #[test]
    fn test_target_class_shortcut() {
        let mut store = GraphStore::new();
        let person = node_shape(&mut store, "Person");
        let employee = node_shape(&mut store, "Employee");
        store.add(employee.clone(), sh::NODE, person.clone());
        store.add(employee.clone(), sh::TARGET_CLASS, Term::iri(format!("{}Employee", EX)));

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        lower_node_shape(&mut ctx, &employee);

        assert_eq!(ctx.top_elements.len(), 1);
        let element = ctx.tree.element(ctx.top_elements[0]).unwrap();
        assert_eq!(element.name.as_deref(), Some("Employee"));
        assert_eq!(element.content, Content::Type("Person".to_string()));
    }

    #[test]
    fn test_target_class_with_own_properties_uses_own_type() {
        let mut store = GraphStore::new();
        let person = node_shape(&mut store, "Person");
        let employee = node_shape(&mut store, "Employee");
        let salary = property_shape(&mut store, "salary", xsd::DECIMAL);
        store.add(employee.clone(), sh::NODE, person);
        store.add(employee.clone(), sh::PROPERTY, salary);
        store.add(employee.clone(), sh::TARGET_CLASS, Term::iri(format!("{}Employee", EX)));

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        lower_node_shape(&mut ctx, &employee);

        let element = ctx.tree.element(ctx.top_elements[0]).unwrap();
        assert_eq!(element.content, Content::Type("Employee".to_string()));
    }

    #[test]
    fn test_xone_builds_choice_with_inline_properties_and_refs() {
        let mut store = GraphStore::new();
        let party = node_shape(&mut store, "Party");
        let person = node_shape(&mut store, "Person");
        let org_name = property_shape(&mut store, "orgName", xsd::STRING);
        let note = property_shape(&mut store, "note", xsd::STRING);
        add_list(&mut store, &party, sh::XONE, &[person.clone(), org_name]);
        store.add(party.clone(), sh::PROPERTY, note);

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        let node = lower_node_shape(&mut ctx, &party).unwrap();

        let ct = ctx.tree.complex_type(node).unwrap();
        assert_eq!(ct.body.len(), 1);
        assert!(matches!(ctx.tree.get(ct.body[0]), Some(XsdNode::Choice(_))));
        let children = ctx.tree.group_children(ct.body[0]).unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(
            ctx.tree.element(children[0]).unwrap().content,
            Content::Ref("Person".to_string())
        );
        assert_eq!(ctx.tree.element(children[1]).unwrap().name.as_deref(), Some("orgName"));
        assert_eq!(ctx.tree.element(children[2]).unwrap().name.as_deref(), Some("note"));

        let person_node = ctx.registry.type_node(&person).unwrap();
        assert_eq!(ctx.types, vec![person_node, node]);
    }

    #[test]
    fn test_scalar_or_becomes_union_and_elements_join_body() {
        let mut store = GraphStore::new();
        let value = node_shape(&mut store, "Value");
        store.add(Term::blank("i"), sh::DATATYPE, Term::iri(xsd::INTEGER));
        store.add(Term::blank("s"), sh::DATATYPE, Term::iri(xsd::STRING));
        add_list(&mut store, &value, sh::OR, &[Term::blank("i"), Term::blank("s")]);
        let unit = property_shape(&mut store, "unit", xsd::STRING);
        store.add(value.clone(), sh::PROPERTY, unit);

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        let node = lower_node_shape(&mut ctx, &value).unwrap();

        let ct = ctx.tree.complex_type(node).unwrap();
        assert_eq!(ct.body.len(), 2);
        let union = ctx
            .tree
            .union(ctx.tree.simple_type_content(ct.body[0]).unwrap())
            .unwrap();
        assert_eq!(union.member_types, vec!["integer", "string"]);
        assert_eq!(ctx.tree.element(ct.body[1]).unwrap().name.as_deref(), Some("unit"));
    }

    #[test]
    fn test_structural_or_becomes_choice() {
        let mut store = GraphStore::new();
        let contact = node_shape(&mut store, "Contact");
        let email = node_shape(&mut store, "Email");
        let phone = property_shape(&mut store, "phone", xsd::STRING);
        add_list(&mut store, &contact, sh::OR, &[email.clone(), phone]);

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        let node = lower_node_shape(&mut ctx, &contact).unwrap();

        let ct = ctx.tree.complex_type(node).unwrap();
        let children = ctx.tree.group_children(ct.body[0]).unwrap();
        assert!(matches!(ctx.tree.get(ct.body[0]), Some(XsdNode::Choice(_))));
        assert_eq!(
            ctx.tree.element(children[0]).unwrap().content,
            Content::Ref("Email".to_string())
        );
        assert!(ctx.registry.type_node(&email).is_some());
    }

    #[test]
    fn test_shared_property_is_one_node() {
        let mut store = GraphStore::new();
        let a = node_shape(&mut store, "A");
        let b = node_shape(&mut store, "B");
        let name = property_shape(&mut store, "name", xsd::STRING);
        store.add(a.clone(), sh::PROPERTY, name.clone());
        store.add(b.clone(), sh::PROPERTY, name);

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        let node_a = lower_node_shape(&mut ctx, &a).unwrap();
        let node_b = lower_node_shape(&mut ctx, &b).unwrap();

        let element_of = |node: NodeId| {
            let ct = ctx.tree.complex_type(node).unwrap();
            ctx.tree.group_children(ct.body[0]).unwrap()[0]
        };
        assert_eq!(element_of(node_a), element_of(node_b));
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut store = GraphStore::new();
        let shapes: Vec<Term> = (0..20_000)
            .map(|i| node_shape(&mut store, &format!("S{}", i)))
            .collect();
        for pair in shapes.windows(2) {
            store.add(pair[0].clone(), sh::NODE, pair[1].clone());
        }

        let config = ConversionConfig::default();
        let mut ctx = LoweringContext::new(&store, &config);
        let top = lower_node_shape(&mut ctx, &shapes[0]).unwrap();

        assert_eq!(ctx.types.len(), shapes.len());
        assert_eq!(ctx.types.last(), Some(&top));
    }
}
