//! Property shape lowering

use shaclxsd_core::vocab::sh;
use shaclxsd_core::{ShapeGraph, Term};
use shaclxsd_xsd::{
    Attribute, Content, Element, Facet, FacetKind, NodeId, Restriction, SimpleType, Union, Use,
    XsdNode,
};
use tracing::{debug, warn};

use crate::classify::is_scalar_uniform;
use crate::config::ConversionConfig;
use crate::context::LoweringContext;
use crate::registry::{Lowered, Slot};
use crate::shapes::{Enumeration, PropertyShapeView};

/// Lower one property shape into an element or attribute node.
///
/// Returns `None` for shapes without `sh:path`, and for identities already
/// claimed by a node shape.
pub fn lower_property_shape<G: ShapeGraph + ?Sized>(
    ctx: &mut LoweringContext<'_, G>,
    shape: &Term,
) -> Option<NodeId> {
    match ctx.registry.get(shape) {
        Some(Slot::Done(Lowered::Element(node))) | Some(Slot::Done(Lowered::Attribute(node))) => {
            return Some(node)
        }
        Some(_) => return None,
        None => {}
    }

    let view = PropertyShapeView::read(ctx.graph, shape, &ctx.config.attribute_marker);
    if view.path.is_none() {
        debug!(shape = %shape, "property shape without sh:path skipped");
        ctx.registry.store(shape.clone(), Lowered::Skipped);
        return None;
    }

    if let (Some(branches), false) = (&view.disjunction, view.is_attribute) {
        let node = lower_disjunction(ctx, &view, branches);
        ctx.registry.store(shape.clone(), Lowered::Element(node));
        return Some(node);
    }

    let scalar = scalar_type(ctx.config, &view);
    let mut content = Content::Type(scalar.clone());
    let mut fixed = None;
    let mut restriction: Option<Restriction> = None;

    match &view.enumeration {
        None | Some(Enumeration::Empty) => {}
        Some(Enumeration::Members(members)) => match members.as_slice() {
            [] => {}
            [only] => {
                fixed = Some(only.lexical().to_string());
                content = Content::None;
            }
            members => {
                let mut enumeration = Restriction::new(scalar.clone());
                enumeration.facets.extend(
                    members
                        .iter()
                        .map(|m| Facet::new(FacetKind::Enumeration, m.lexical())),
                );
                restriction = Some(enumeration);
            }
        },
        Some(Enumeration::Single(value)) => fixed = Some(value.lexical().to_string()),
    }

    if view.has_facets() {
        let facets = &mut restriction
            .get_or_insert_with(|| Restriction::new(scalar.clone()))
            .facets;
        append_facets(facets, &view);
    }

    if let Some(restriction) = restriction {
        let restriction = ctx.tree.add(XsdNode::Restriction(restriction));
        let simple = ctx.tree.add(XsdNode::SimpleType(SimpleType {
            content: restriction,
        }));
        content = Content::Inline(simple);
    }

    let (node, lowered) = if view.is_attribute {
        let usage = match view.min_count {
            Some(min) if min > 0 => Use::Required,
            _ => Use::Optional,
        };
        let node = ctx.tree.add(XsdNode::Attribute(Attribute {
            name: view.name.clone(),
            usage,
            content,
            fixed,
        }));
        (node, Lowered::Attribute(node))
    } else {
        let mut element = Element::named(view.name.clone(), content);
        element.fixed = fixed;
        element.min_occurs = view.min_count.filter(|&n| n != 1);
        element.max_occurs = view.max_count.filter(|&n| n != 1);
        let node = ctx.tree.add(XsdNode::Element(element));
        (node, Lowered::Element(node))
    };

    debug!(
        shape = %shape,
        name = %view.name,
        attribute = view.is_attribute,
        "lowered property shape"
    );
    ctx.registry.store(shape.clone(), lowered);
    Some(node)
}

/// Element typed by an inline union, or by a plain text restriction when a
/// branch is structural
fn lower_disjunction<G: ShapeGraph + ?Sized>(
    ctx: &mut LoweringContext<'_, G>,
    view: &PropertyShapeView,
    branches: &[Term],
) -> NodeId {
    let content = if is_scalar_uniform(ctx.graph, branches) {
        let member_types = member_types(ctx.graph, branches);
        ctx.tree.add(XsdNode::Union(Union { member_types }))
    } else {
        warn!(
            shape = %view.id,
            name = %view.name,
            "structural sh:or on a property shape is narrowed to an unconstrained {} restriction",
            ctx.config.default_text_type
        );
        ctx.tree.add(XsdNode::Restriction(Restriction::new(
            ctx.config.default_text_type.clone(),
        )))
    };
    let simple = ctx.tree.add(XsdNode::SimpleType(SimpleType { content }));
    ctx.tree.add(XsdNode::Element(Element::named(
        view.name.clone(),
        Content::Inline(simple),
    )))
}

/// Datatype local names of scalar branches, in branch order
pub(crate) fn member_types<G: ShapeGraph + ?Sized>(graph: &G, branches: &[Term]) -> Vec<String> {
    branches
        .iter()
        .filter_map(|branch| graph.value_of(branch, sh::DATATYPE))
        .map(|datatype| datatype.local_name().to_string())
        .collect()
}

fn scalar_type(config: &ConversionConfig, view: &PropertyShapeView) -> String {
    match &view.datatype {
        Some(datatype) => datatype.local_name().to_string(),
        None if view.has_numeric_bounds() => config.default_numeric_type.clone(),
        None => config.default_text_type.clone(),
    }
}

/// Append value facets after any enumerations, in canonical order
fn append_facets(facets: &mut Vec<Facet>, view: &PropertyShapeView) {
    let bounds = [
        (FacetKind::Pattern, &view.pattern),
        (FacetKind::MinExclusive, &view.min_exclusive),
        (FacetKind::MaxExclusive, &view.max_exclusive),
        (FacetKind::MinInclusive, &view.min_inclusive),
        (FacetKind::MaxInclusive, &view.max_inclusive),
    ];
    for (kind, value) in bounds {
        if let Some(value) = value {
            facets.push(Facet::new(kind, value.clone()));
        }
    }

    let exact = match (&view.length, &view.min_length, &view.max_length) {
        (Some(length), _, _) => Some(length),
        (None, Some(min), Some(max)) if same_length(min, max) => Some(min),
        _ => None,
    };
    match exact {
        Some(length) => facets.push(Facet::new(FacetKind::Length, length.clone())),
        None => {
            if let Some(min) = &view.min_length {
                facets.push(Facet::new(FacetKind::MinLength, min.clone()));
            }
            if let Some(max) = &view.max_length {
                facets.push(Facet::new(FacetKind::MaxLength, max.clone()));
            }
        }
    }
}

fn same_length(a: &str, b: &str) -> bool {
    match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
