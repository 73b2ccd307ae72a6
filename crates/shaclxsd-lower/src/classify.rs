//! Structural policy predicates

use shaclxsd_core::vocab::{rdf, sh};
use shaclxsd_core::{ShapeGraph, Term};

/// True iff every branch declares `sh:datatype`.
///
/// Such a disjunction is a choice between value types and lowers to a
/// `union`; anything else needs a structural `choice`.
pub fn is_scalar_uniform<G: ShapeGraph + ?Sized>(graph: &G, branches: &[Term]) -> bool {
    branches
        .iter()
        .all(|branch| graph.value_of(branch, sh::DATATYPE).is_some())
}

/// True iff the identity, the derived name or the path's local name carries `marker`
pub fn is_attribute(identity: &Term, name: &str, path: Option<&Term>, marker: &str) -> bool {
    if marker.is_empty() {
        return false;
    }
    let identity_marked = match identity {
        Term::Iri(iri) => iri.contains(marker),
        _ => false,
    };
    identity_marked
        || name.starts_with(marker)
        || path.map_or(false, |p| p.local_name().starts_with(marker))
}

/// Whether a branch of `sh:xone`/`sh:or` is a property shape rather than a node shape
pub fn is_property_branch<G: ShapeGraph + ?Sized>(graph: &G, branch: &Term) -> bool {
    graph.has_triple(branch, rdf::TYPE, &Term::iri(sh::PROPERTY_SHAPE))
        || graph.value_of(branch, sh::PATH).is_some()
}
