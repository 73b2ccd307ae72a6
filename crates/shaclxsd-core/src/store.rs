//! Graph storage with indexing for fast lookups

use crate::model::{Term, Triple};
use smallvec::SmallVec;
use std::collections::HashMap;

/// In-memory triple store with subject/predicate/object indices.
///
/// Triples keep their insertion order, and every lookup returns matches in
/// that order so that consumers see a deterministic graph.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    triples: Vec<Triple>,
    /// Subject index: subject -> list of triple indices
    subject_index: HashMap<Term, SmallVec<[usize; 8]>>,
    /// Predicate index: predicate -> list of triple indices
    predicate_index: HashMap<String, SmallVec<[usize; 8]>>,
    /// Object index: object -> list of triple indices
    object_index: HashMap<Term, SmallVec<[usize; 8]>>,
    /// Namespace prefixes declared by the source document, in declaration order
    prefixes: Vec<(String, String)>,
    /// Next candidate label for [`GraphStore::fresh_blank`]
    blank_seq: usize,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple, ignoring exact duplicates. Returns whether it was new.
    pub fn add_triple(&mut self, triple: Triple) -> bool {
        if !self
            .find_exact_triple_indices(&triple.subject, &triple.predicate, &triple.object)
            .is_empty()
        {
            return false;
        }

        let index = self.triples.len();
        self.subject_index
            .entry(triple.subject.clone())
            .or_insert_with(SmallVec::new)
            .push(index);
        self.predicate_index
            .entry(triple.predicate.clone())
            .or_insert_with(SmallVec::new)
            .push(index);
        self.object_index
            .entry(triple.object.clone())
            .or_insert_with(SmallVec::new)
            .push(index);
        self.triples.push(triple);
        true
    }

    /// Convenience wrapper around [`GraphStore::add_triple`]
    pub fn add(&mut self, subject: Term, predicate: &str, object: Term) -> bool {
        self.add_triple(Triple::new(subject, predicate, object))
    }

    /// Record a namespace prefix. A later declaration of the same prefix wins.
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        match self.prefixes.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = namespace,
            None => self.prefixes.push((prefix, namespace)),
        }
    }

    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    /// Look up the prefix bound to a namespace IRI
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, ns)| ns == namespace)
            .map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// All triples in insertion order
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Whether the term occurs as the subject of any triple
    pub fn has_subject(&self, subject: &Term) -> bool {
        self.subject_index.contains_key(subject)
    }

    /// Find triples matching a pattern, using the most selective index
    pub fn find_triples(
        &self,
        subject: Option<&Term>,
        predicate: Option<&str>,
        object: Option<&Term>,
    ) -> Vec<&Triple> {
        let candidate_indices: SmallVec<[usize; 8]> = match (subject, predicate, object) {
            (Some(s), Some(p), Some(o)) => self.find_exact_triple_indices(s, p, o),
            (Some(s), None, None) => self.subject_index.get(s).cloned().unwrap_or_default(),
            (None, Some(p), None) => self.predicate_index.get(p).cloned().unwrap_or_default(),
            (None, None, Some(o)) => self.object_index.get(o).cloned().unwrap_or_default(),
            (Some(s), Some(p), None) => intersect_indices(
                self.subject_slice(s),
                self.predicate_slice(p),
            ),
            (Some(s), None, Some(o)) => intersect_indices(
                self.subject_slice(s),
                self.object_slice(o),
            ),
            (None, Some(p), Some(o)) => intersect_indices(
                self.predicate_slice(p),
                self.object_slice(o),
            ),
            (None, None, None) => (0..self.triples.len()).collect(),
        };

        candidate_indices
            .iter()
            .filter_map(|&index| self.triples.get(index))
            .collect()
    }

    /// A blank node no triple in the store mentions yet.
    ///
    /// Labels are never handed out twice by the same store, so loaders can
    /// map each document's blank nodes onto fresh ones.
    pub fn fresh_blank(&mut self) -> Term {
        loop {
            let term = Term::blank(format!("b{}", self.blank_seq));
            self.blank_seq += 1;
            if !self.subject_index.contains_key(&term) && !self.object_index.contains_key(&term) {
                return term;
            }
        }
    }

    fn subject_slice(&self, subject: &Term) -> &[usize] {
        self.subject_index.get(subject).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn predicate_slice(&self, predicate: &str) -> &[usize] {
        self.predicate_index.get(predicate).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn object_slice(&self, object: &Term) -> &[usize] {
        self.object_index.get(object).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn find_exact_triple_indices(&self, subject: &Term, predicate: &str, object: &Term) -> SmallVec<[usize; 8]> {
        let sp = intersect_indices(self.subject_slice(subject), self.predicate_slice(predicate));
        intersect_indices(&sp, self.object_slice(object))
    }
}

/// Intersect two sorted index vectors
fn intersect_indices(a: &[usize], b: &[usize]) -> SmallVec<[usize; 8]> {
    let mut result = SmallVec::new();
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }

    result
}

impl FromIterator<Triple> for GraphStore {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut store = GraphStore::new();
        for triple in iter {
            store.add_triple(triple);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://example.org/{}", local))
    }

    #[test]
    fn test_duplicate_triples_are_ignored() {
        let mut store = GraphStore::new();
        assert!(store.add(ex("a"), "http://example.org/p", ex("b")));
        assert!(!store.add(ex("a"), "http://example.org/p", ex("b")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_find_preserves_insertion_order() {
        let mut store = GraphStore::new();
        for local in ["z", "a", "m"] {
            store.add(ex("s"), "http://example.org/p", ex(local));
        }
        let objects: Vec<&str> = store
            .find_triples(Some(&ex("s")), Some("http://example.org/p"), None)
            .iter()
            .map(|t| t.object.local_name())
            .collect();
        assert_eq!(objects, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_intersect_indices() {
        let result = intersect_indices(&[1, 3, 5, 7], &[2, 3, 7, 9]);
        assert_eq!(result.as_slice(), &[3, 7]);
    }

    #[test]
    fn test_fresh_blank_skips_labels_in_use() {
        let mut store = GraphStore::new();
        store.add(Term::blank("b0"), "http://example.org/p", Term::blank("b1"));

        let first = store.fresh_blank();
        let second = store.fresh_blank();
        assert_eq!(first, Term::blank("b2"));
        assert_eq!(second, Term::blank("b3"));
    }

    #[test]
    fn test_prefix_redeclaration_replaces_namespace() {
        let mut store = GraphStore::new();
        store.add_prefix("ex", "http://example.org/");
        store.add_prefix("ex", "http://example.com/");
        assert_eq!(store.prefixes().len(), 1);
        assert_eq!(store.prefix_for("http://example.com/"), Some("ex"));
        assert_eq!(store.prefix_for("http://example.org/"), None);
    }
}
