//! Recursive-descent Turtle parser feeding a [`GraphStore`]

use std::collections::HashMap;
use std::ops::Range;

use logos::Logos;

use super::lexer::Token;
use crate::error::{CoreError, Result};
use crate::model::{Term, Triple};
use crate::store::GraphStore;
use crate::vocab::{rdf, xsd};

/// Turtle parser state.
pub struct Parser<'a, 'g> {
    input: &'a str,
    tokens: Vec<(Token<'a>, Range<usize>)>,
    pos: usize,
    store: &'g mut GraphStore,
    prefixes: HashMap<String, String>,
    base: Option<String>,
    /// Document blank node labels mapped onto store-unique nodes
    blank_labels: HashMap<String, Term>,
}

impl<'a, 'g> Parser<'a, 'g> {
    /// Tokenize `input`; fails on the first unrecognized character run.
    pub fn new(input: &'a str, store: &'g mut GraphStore) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut lexer = Token::lexer(input);
        while let Some(token) = lexer.next() {
            match token {
                Ok(token) => tokens.push((token, lexer.span())),
                Err(()) => {
                    return Err(CoreError::Lex {
                        line: line_of(input, lexer.span().start),
                        text: lexer.slice().to_string(),
                    })
                }
            }
        }

        Ok(Self {
            input,
            tokens,
            pos: 0,
            store,
            prefixes: HashMap::new(),
            base: None,
            blank_labels: HashMap::new(),
        })
    }

    /// Parse the entire document.
    pub fn parse(mut self) -> Result<()> {
        while !self.is_at_end() {
            self.parse_statement()?;
        }
        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn line(&self) -> usize {
        let offset = self
            .tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, span)| span.start)
            .unwrap_or(0);
        line_of(self.input, offset)
    }

    fn check(&self, expected: &Token<'a>) -> bool {
        self.current() == Some(expected)
    }

    fn expect(&mut self, expected: Token<'a>, what: &str) -> Result<()> {
        if self.check(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> CoreError {
        let found = match self.current() {
            Some(token) => format!("{:?}", token),
            None => "end of input".to_string(),
        };
        CoreError::syntax(self.line(), format!("expected {}, found {}", what, found))
    }

    fn parse_statement(&mut self) -> Result<()> {
        match self.current() {
            Some(Token::PrefixDirective) => self.parse_prefix_directive(true),
            Some(Token::SparqlPrefix) => self.parse_prefix_directive(false),
            Some(Token::BaseDirective) => self.parse_base_directive(true),
            Some(Token::SparqlBase) => self.parse_base_directive(false),
            _ => self.parse_triples(),
        }
    }

    fn parse_prefix_directive(&mut self, needs_dot: bool) -> Result<()> {
        self.advance();

        let prefix = match self.advance() {
            Some(Token::PrefixedName(name)) if name.ends_with(':') => {
                name[..name.len() - 1].to_string()
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                return Err(self.unexpected("prefix name"));
            }
        };

        let namespace = match self.advance() {
            Some(Token::Iri(iri)) => self.resolve_iri(iri)?,
            _ => {
                self.pos = self.pos.saturating_sub(1);
                return Err(self.unexpected("namespace IRI"));
            }
        };

        self.store.add_prefix(prefix.clone(), namespace.clone());
        self.prefixes.insert(prefix, namespace);

        if needs_dot {
            self.expect(Token::Dot, "'.'")?;
        }
        Ok(())
    }

    fn parse_base_directive(&mut self, needs_dot: bool) -> Result<()> {
        self.advance();

        match self.advance() {
            Some(Token::Iri(iri)) => {
                let resolved = self.resolve_iri(iri)?;
                self.base = Some(resolved);
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                return Err(self.unexpected("base IRI"));
            }
        }

        if needs_dot {
            self.expect(Token::Dot, "'.'")?;
        }
        Ok(())
    }

    fn parse_triples(&mut self) -> Result<()> {
        let subject_is_property_list = self.check(&Token::LBracket);
        let subject = self.parse_subject()?;

        // `[ ... ] .` is a complete statement on its own
        if !(subject_is_property_list && self.check(&Token::Dot)) {
            self.parse_predicate_object_list(&subject)?;
        }

        self.expect(Token::Dot, "'.'")
    }

    fn parse_subject(&mut self) -> Result<Term> {
        match self.current() {
            Some(Token::Iri(_)) | Some(Token::PrefixedName(_)) => Ok(Term::Iri(self.parse_iri()?)),
            Some(Token::BlankNodeLabel(label)) => {
                let label: &'a str = *label;
                let term = self.labelled_blank(label);
                self.advance();
                Ok(term)
            }
            Some(Token::LBracket) => self.parse_blank_node_property_list(),
            Some(Token::LParen) => self.parse_collection(),
            _ => Err(self.unexpected("subject")),
        }
    }

    fn parse_predicate_object_list(&mut self, subject: &Term) -> Result<()> {
        loop {
            let predicate = self.parse_predicate()?;
            self.parse_object_list(subject, &predicate)?;

            if !self.check(&Token::Semicolon) {
                break;
            }
            // Repeated and trailing semicolons are allowed
            while self.check(&Token::Semicolon) {
                self.advance();
            }
            if matches!(self.current(), Some(Token::Dot) | Some(Token::RBracket) | None) {
                break;
            }
        }
        Ok(())
    }

    fn parse_predicate(&mut self) -> Result<String> {
        match self.current() {
            Some(Token::A) => {
                self.advance();
                Ok(rdf::TYPE.to_string())
            }
            Some(Token::Iri(_)) | Some(Token::PrefixedName(_)) => self.parse_iri(),
            _ => Err(self.unexpected("predicate")),
        }
    }

    fn parse_object_list(&mut self, subject: &Term, predicate: &str) -> Result<()> {
        loop {
            let object = self.parse_object()?;
            self.store
                .add_triple(Triple::new(subject.clone(), predicate, object));

            if self.check(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(())
    }

    fn parse_object(&mut self) -> Result<Term> {
        match self.current() {
            Some(Token::Iri(_)) | Some(Token::PrefixedName(_)) => Ok(Term::Iri(self.parse_iri()?)),
            Some(Token::BlankNodeLabel(label)) => {
                let label: &'a str = *label;
                let term = self.labelled_blank(label);
                self.advance();
                Ok(term)
            }
            Some(Token::LBracket) => self.parse_blank_node_property_list(),
            Some(Token::LParen) => self.parse_collection(),
            Some(Token::String(_)) | Some(Token::Number(_)) | Some(Token::True) | Some(Token::False) => {
                self.parse_literal()
            }
            _ => Err(self.unexpected("object")),
        }
    }

    fn parse_literal(&mut self) -> Result<Term> {
        let line = self.line();
        match self.advance() {
            Some(Token::String(raw)) => {
                let value = unescape(raw, line)?;
                match self.current() {
                    Some(Token::LangTag(lang)) => {
                        let lang = lang.to_string();
                        self.advance();
                        Ok(Term::lang_literal(value, lang))
                    }
                    Some(Token::DoubleCaret) => {
                        self.advance();
                        let datatype = self.parse_iri()?;
                        Ok(Term::typed_literal(value, datatype))
                    }
                    _ => Ok(Term::literal(value)),
                }
            }
            Some(Token::Number(lexical)) => {
                let datatype = if lexical.contains(|c| c == 'e' || c == 'E') {
                    xsd::DOUBLE
                } else if lexical.contains('.') {
                    xsd::DECIMAL
                } else {
                    xsd::INTEGER
                };
                Ok(Term::typed_literal(lexical, datatype))
            }
            Some(Token::True) => Ok(Term::typed_literal("true", xsd::BOOLEAN)),
            Some(Token::False) => Ok(Term::typed_literal("false", xsd::BOOLEAN)),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.unexpected("literal"))
            }
        }
    }

    /// IRI reference or prefixed name, expanded to a full IRI
    fn parse_iri(&mut self) -> Result<String> {
        let line = self.line();
        match self.advance() {
            Some(Token::Iri(iri)) => self.resolve_iri(iri),
            Some(Token::PrefixedName(name)) => {
                // The lexer guarantees a ':' in every prefixed name
                let (prefix, local) = name.split_once(':').unwrap_or(("", name));
                match self.prefixes.get(prefix) {
                    Some(namespace) => Ok(format!("{}{}", namespace, local)),
                    None => Err(CoreError::UndefinedPrefix {
                        line,
                        prefix: prefix.to_string(),
                    }),
                }
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.unexpected("IRI"))
            }
        }
    }

    /// `[ predicate object ; ... ]`
    fn parse_blank_node_property_list(&mut self) -> Result<Term> {
        self.expect(Token::LBracket, "'['")?;
        let node = self.fresh_blank();

        if !self.check(&Token::RBracket) {
            self.parse_predicate_object_list(&node)?;
        }

        self.expect(Token::RBracket, "']'")?;
        Ok(node)
    }

    /// `( item ... )` expanded into `rdf:first`/`rdf:rest` cells
    fn parse_collection(&mut self) -> Result<Term> {
        self.expect(Token::LParen, "'('")?;

        let mut items = Vec::new();
        while !self.check(&Token::RParen) {
            if self.is_at_end() {
                return Err(self.unexpected("')'"));
            }
            items.push(self.parse_object()?);
        }
        self.advance();

        let cells: Vec<Term> = items.iter().map(|_| self.fresh_blank()).collect();
        for (i, item) in items.into_iter().enumerate() {
            let rest = cells.get(i + 1).cloned().unwrap_or_else(|| Term::iri(rdf::NIL));
            self.store.add_triple(Triple::new(cells[i].clone(), rdf::FIRST, item));
            self.store.add_triple(Triple::new(cells[i].clone(), rdf::REST, rest));
        }
        Ok(cells.into_iter().next().unwrap_or_else(|| Term::iri(rdf::NIL)))
    }

    fn fresh_blank(&mut self) -> Term {
        self.store.fresh_blank()
    }

    /// `_:label`, scoped to this document
    fn labelled_blank(&mut self, label: &str) -> Term {
        if let Some(term) = self.blank_labels.get(label) {
            return term.clone();
        }
        let term = self.store.fresh_blank();
        self.blank_labels.insert(label.to_string(), term.clone());
        term
    }

    /// Resolve a possibly relative IRI against the base.
    ///
    /// Only plain concatenation is performed; dot segments are kept.
    fn resolve_iri(&self, reference: &str) -> Result<String> {
        if has_scheme(reference) {
            return Ok(reference.to_string());
        }
        match &self.base {
            Some(base) if reference.is_empty() => Ok(base.clone()),
            Some(base) if reference.starts_with('#') => {
                let stem = base.split('#').next().unwrap_or(base);
                Ok(format!("{}{}", stem, reference))
            }
            Some(base) => {
                let stem = match base.rfind('/') {
                    Some(pos) => &base[..=pos],
                    None => base.as_str(),
                };
                Ok(format!("{}{}", stem, reference.trim_start_matches('/')))
            }
            None => Err(CoreError::RelativeIri(reference.to_string())),
        }
    }
}

fn has_scheme(reference: &str) -> bool {
    match reference.find(':') {
        Some(colon) => {
            let scheme = &reference[..colon];
            let mut chars = scheme.chars();
            chars.next().map_or(false, |c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn line_of(input: &str, offset: usize) -> usize {
    input[..offset.min(input.len())].matches('\n').count() + 1
}

/// Resolve string escapes (`\t`, `\n`, `\uXXXX`, ...)
fn unescape(raw: &str, line: usize) -> Result<String> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars.next().ok_or_else(|| CoreError::InvalidEscape {
            line,
            sequence: String::new(),
        })?;
        match escaped {
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            '"' | '\'' | '\\' => out.push(escaped),
            'u' | 'U' => {
                let width = if escaped == 'u' { 4 } else { 8 };
                let hex: String = chars.by_ref().take(width).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == width)
                    .and_then(char::from_u32)
                    .ok_or_else(|| CoreError::InvalidEscape {
                        line,
                        sequence: format!("{}{}", escaped, hex),
                    })?;
                out.push(decoded);
            }
            other => {
                return Err(CoreError::InvalidEscape {
                    line,
                    sequence: other.to_string(),
                })
            }
        }
    }
    Ok(out)
}
