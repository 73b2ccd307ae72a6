//! Per-pass memo of lowered shapes

use std::collections::HashMap;

use shaclxsd_core::Term;
use shaclxsd_xsd::NodeId;

/// Outcome of lowering one shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lowered {
    Type(NodeId),
    Element(NodeId),
    Attribute(NodeId),
    /// Unconvertible property shape
    Skipped,
}

impl Lowered {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Lowered::Type(id) | Lowered::Element(id) | Lowered::Attribute(id) => Some(*id),
            Lowered::Skipped => None,
        }
    }
}

/// Slot state; absence from the registry means unvisited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Descent has started; the node is allocated but not filled in
    InProgress(NodeId),
    Done(Lowered),
}

/// Shape identity to lowered node, scoped to one conversion pass
#[derive(Debug, Default)]
pub struct Registry {
    slots: HashMap<Term, Slot>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, shape: &Term) -> Option<Slot> {
        self.slots.get(shape).copied()
    }

    pub fn reserve(&mut self, shape: Term, node: NodeId) {
        self.slots.insert(shape, Slot::InProgress(node));
    }

    pub fn store(&mut self, shape: Term, lowered: Lowered) {
        self.slots.insert(shape, Slot::Done(lowered));
    }

    pub fn is_in_progress(&self, shape: &Term) -> bool {
        matches!(self.get(shape), Some(Slot::InProgress(_)))
    }

    /// Complex type node of a node shape, reserved or finished
    pub fn type_node(&self, shape: &Term) -> Option<NodeId> {
        match self.get(shape)? {
            Slot::InProgress(node) | Slot::Done(Lowered::Type(node)) => Some(node),
            Slot::Done(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
