//! RDF collection traversal

use std::collections::HashSet;

use shaclxsd_core::vocab::rdf;
use shaclxsd_core::{ShapeGraph, Term};
use tracing::warn;

/// Payloads of the list starting at `head`, in order.
///
/// Stops at `rdf:nil`, at a cell without `rdf:rest`, or at a cell seen
/// before. Cells without `rdf:first` contribute nothing.
pub fn walk<G: ShapeGraph + ?Sized>(graph: &G, head: &Term) -> Vec<Term> {
    let mut items = Vec::new();
    let mut seen = HashSet::new();
    let mut cell = head.clone();

    while !cell.is_iri(rdf::NIL) {
        if !seen.insert(cell.clone()) {
            warn!(cell = %cell, "cyclic list, stopping walk");
            break;
        }
        if let Some(first) = graph.value_of(&cell, rdf::FIRST) {
            items.push(first.clone());
        }
        match graph.value_of(&cell, rdf::REST) {
            Some(next) => cell = next.clone(),
            None => break,
        }
    }

    items
}

/// Whether `term` is the head of a list (a cell with `rdf:first`)
pub fn is_list<G: ShapeGraph + ?Sized>(graph: &G, term: &Term) -> bool {
    graph.value_of(term, rdf::FIRST).is_some()
}
