//! Read-only lookup interface over a shapes graph

use crate::model::Term;
use crate::store::GraphStore;
use crate::vocab::rdf;

/// Query surface the lowering engine consumes.
///
/// Implementations must return matches in a stable order; output document
/// order is derived from it.
pub trait ShapeGraph {
    /// First object of `(subject, predicate, ?)`
    fn value_of(&self, subject: &Term, predicate: &str) -> Option<&Term>;

    /// Every object of `(subject, predicate, ?)`
    fn all_values_of(&self, subject: &Term, predicate: &str) -> Vec<&Term>;

    fn has_triple(&self, subject: &Term, predicate: &str, object: &Term) -> bool;

    /// Distinct subjects of `(?, rdf:type, class)` in first-seen order
    fn subjects_of_type(&self, class: &str) -> Vec<&Term>;

    /// Whether the graph says anything at all about `subject`
    fn describes(&self, subject: &Term) -> bool;

    /// Namespace the source document bound to `prefix`, if it kept prefixes
    fn prefix_namespace(&self, _prefix: &str) -> Option<&str> {
        None
    }
}

impl ShapeGraph for GraphStore {
    fn value_of(&self, subject: &Term, predicate: &str) -> Option<&Term> {
        self.find_triples(Some(subject), Some(predicate), None)
            .into_iter()
            .next()
            .map(|t| &t.object)
    }

    fn all_values_of(&self, subject: &Term, predicate: &str) -> Vec<&Term> {
        self.find_triples(Some(subject), Some(predicate), None)
            .into_iter()
            .map(|t| &t.object)
            .collect()
    }

    fn has_triple(&self, subject: &Term, predicate: &str, object: &Term) -> bool {
        !self
            .find_triples(Some(subject), Some(predicate), Some(object))
            .is_empty()
    }

    fn subjects_of_type(&self, class: &str) -> Vec<&Term> {
        let class = Term::iri(class);
        let mut subjects: Vec<&Term> = Vec::new();
        for triple in self.find_triples(None, Some(rdf::TYPE), Some(&class)) {
            if !subjects.contains(&&triple.subject) {
                subjects.push(&triple.subject);
            }
        }
        subjects
    }

    fn describes(&self, subject: &Term) -> bool {
        self.has_subject(subject)
    }

    fn prefix_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes()
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }
}
