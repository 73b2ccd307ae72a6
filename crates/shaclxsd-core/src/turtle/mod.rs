//! Turtle loading for shapes graphs
//!
//! Covers the subset of Turtle that shapes files use in practice: prefix and
//! base directives, prefixed names, blank node property lists, collections
//! and the usual literal forms. A `.` inside a prefixed local name is part of
//! the name unless it is the last character.
//!
//! Blank node labels are scoped to one document and are mapped onto fresh
//! store nodes, so [`load_into`] never merges blank nodes across documents.

pub mod lexer;
pub mod parser;

use crate::error::Result;
use crate::store::GraphStore;
use parser::Parser;
use tracing::debug;

/// Parse a Turtle document into a fresh store
pub fn parse_turtle(input: &str) -> Result<GraphStore> {
    let mut store = GraphStore::new();
    load_into(&mut store, input)?;
    Ok(store)
}

/// Parse a Turtle document and add its triples and prefixes to `store`
pub fn load_into(store: &mut GraphStore, input: &str) -> Result<()> {
    let before = store.len();
    Parser::new(input, store)?.parse()?;
    debug!(
        added = store.len() - before,
        prefixes = store.prefixes().len(),
        "loaded turtle document"
    );
    Ok(())
}
