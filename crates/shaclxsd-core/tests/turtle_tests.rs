//! Tests for the Turtle loader

use shaclxsd_core::vocab::{rdf, sh, xsd};
use shaclxsd_core::{parse_turtle, CoreError, GraphStore, ShapeGraph, Term};

const EX: &str = "http://example.org/";

fn ex(local: &str) -> Term {
    Term::iri(format!("{}{}", EX, local))
}

#[test]
fn test_parse_node_shape_with_nested_property() {
    let ttl = r#"
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        @prefix ex: <http://example.org/> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

        ex:PersonShape a sh:NodeShape ;
            sh:targetClass ex:Person ;
            sh:property [
                sh:path ex:name ;
                sh:datatype xsd:string ;
                sh:minCount 1 ;
            ] .
    "#;

    let store = parse_turtle(ttl).unwrap();
    assert_eq!(store.len(), 6);

    let shape = ex("PersonShape");
    assert!(store.has_triple(&shape, rdf::TYPE, &Term::iri(sh::NODE_SHAPE)));
    assert_eq!(store.value_of(&shape, sh::TARGET_CLASS), Some(&ex("Person")));

    let property = store.value_of(&shape, sh::PROPERTY).cloned().unwrap();
    assert!(property.is_blank());
    assert_eq!(store.value_of(&property, sh::PATH), Some(&ex("name")));
    assert_eq!(
        store.value_of(&property, sh::DATATYPE),
        Some(&Term::iri(xsd::STRING))
    );
    assert_eq!(
        store.value_of(&property, sh::MIN_COUNT).and_then(Term::as_u64),
        Some(1)
    );
}

#[test]
fn test_prefixes_are_kept_in_declaration_order() {
    let ttl = "@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .\nPREFIX ex: <http://example.org/>\n";
    let store = parse_turtle(ttl).unwrap();

    assert!(store.is_empty());
    assert_eq!(
        store.prefixes(),
        &[
            ("xsd".to_string(), xsd::NS.to_string()),
            ("ex".to_string(), EX.to_string()),
        ]
    );
    assert_eq!(store.prefix_for(xsd::NS), Some("xsd"));
}

#[test]
fn test_collection_expands_to_list_cells() {
    let ttl = r#"
        @prefix ex: <http://example.org/> .
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        ex:s sh:in ( "a" "b" "c" ) .
        ex:t sh:in () .
    "#;
    let store = parse_turtle(ttl).unwrap();

    let mut cell = store.value_of(&ex("s"), sh::IN).cloned().unwrap();
    let mut items = Vec::new();
    while !cell.is_iri(rdf::NIL) {
        items.push(store.value_of(&cell, rdf::FIRST).unwrap().lexical().to_string());
        cell = store.value_of(&cell, rdf::REST).cloned().unwrap();
    }
    assert_eq!(items, vec!["a", "b", "c"]);

    assert_eq!(store.value_of(&ex("t"), sh::IN), Some(&Term::iri(rdf::NIL)));
}

#[test]
fn test_literal_forms() {
    let ttl = r#"
        @prefix ex: <http://example.org/> .
        ex:s ex:p "chat"@fr , true , 2.5 , 1e3 , -7 , "x"^^ex:Custom , "a\"bA" .
    "#;
    let store = parse_turtle(ttl).unwrap();
    let objects = store.all_values_of(&ex("s"), &format!("{}p", EX));

    assert_eq!(
        objects,
        vec![
            &Term::lang_literal("chat", "fr"),
            &Term::typed_literal("true", xsd::BOOLEAN),
            &Term::typed_literal("2.5", xsd::DECIMAL),
            &Term::typed_literal("1e3", xsd::DOUBLE),
            &Term::typed_literal("-7", xsd::INTEGER),
            &Term::typed_literal("x", format!("{}Custom", EX)),
            &Term::literal("a\"bA"),
        ]
    );
}

#[test]
fn test_base_resolution() {
    let ttl = r#"
        @base <http://example.org/shapes/> .
        <Person> a <#Marker> .
    "#;
    let store = parse_turtle(ttl).unwrap();
    let triple = &store.triples()[0];

    assert_eq!(triple.subject, Term::iri("http://example.org/shapes/Person"));
    assert_eq!(triple.object, Term::iri("http://example.org/shapes/#Marker"));
}

#[test]
fn test_relative_iri_without_base_fails() {
    let err = parse_turtle("<Person> a <Thing> .").unwrap_err();
    assert_eq!(err, CoreError::RelativeIri("Person".to_string()));
}

#[test]
fn test_undefined_prefix_reports_line() {
    let ttl = "@prefix ex: <http://example.org/> .\n\nfoo:bar a ex:C .\n";
    let err = parse_turtle(ttl).unwrap_err();

    assert_eq!(
        err,
        CoreError::UndefinedPrefix {
            line: 3,
            prefix: "foo".to_string()
        }
    );
}

#[test]
fn test_missing_dot_is_a_syntax_error() {
    let ttl = "@prefix ex: <http://example.org/> .\nex:a ex:b ex:c\nex:d ex:e ex:f .";
    let err = parse_turtle(ttl).unwrap_err();

    assert!(matches!(err, CoreError::Syntax { line: 3, .. }), "{:?}", err);
}

#[test]
fn test_unrecognized_input_is_a_lex_error() {
    let err = parse_turtle("@prefix ex: <http://example.org/> .\nex:a ex:b ` .").unwrap_err();
    assert!(matches!(err, CoreError::Lex { line: 2, .. }), "{:?}", err);
}

#[test]
fn test_anonymous_subject_statement() {
    let ttl = r#"
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        [ a sh:PropertyShape ; sh:path sh:name ] .
    "#;
    let store = parse_turtle(ttl).unwrap();

    let shapes = store.subjects_of_type(sh::PROPERTY_SHAPE);
    assert_eq!(shapes.len(), 1);
    assert!(shapes[0].is_blank());
}

#[test]
fn test_load_into_merges_documents() {
    let mut store = GraphStore::new();
    shaclxsd_core::load_into(&mut store, "<http://example.org/a> <http://example.org/p> 1 .").unwrap();
    shaclxsd_core::load_into(&mut store, "<http://example.org/a> <http://example.org/p> 2 .").unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn test_labelled_and_anonymous_blank_nodes_stay_distinct() {
    let ttl = r#"
        @prefix ex: <http://example.org/> .
        ex:S ex:p [ ex:v "anon" ] .
        ex:S ex:q _:genid0 .
        _:genid0 ex:v "labelled" .
        ex:S ex:r _:b0 .
        _:b0 ex:v "b0" .
    "#;
    let store = parse_turtle(ttl).unwrap();
    let value = format!("{}v", EX);

    let p = store.value_of(&ex("S"), &format!("{}p", EX)).cloned().unwrap();
    let q = store.value_of(&ex("S"), &format!("{}q", EX)).cloned().unwrap();
    let r = store.value_of(&ex("S"), &format!("{}r", EX)).cloned().unwrap();
    assert_ne!(p, q);
    assert_ne!(p, r);
    assert_ne!(q, r);
    assert_eq!(store.all_values_of(&p, &value), vec![&Term::literal("anon")]);
    assert_eq!(store.all_values_of(&q, &value), vec![&Term::literal("labelled")]);
    assert_eq!(store.all_values_of(&r, &value), vec![&Term::literal("b0")]);
}

#[test]
fn test_load_into_keeps_blank_nodes_per_document() {
    let doc = |n: u32| {
        format!(
            r#"
            @prefix ex: <http://example.org/> .
            ex:S{n} ex:p [ ex:v {n} ] ; ex:q _:b0 ; ex:in ( {n} ) .
            _:b0 ex:v {n} .
        "#
        )
    };
    let mut store = GraphStore::new();
    shaclxsd_core::load_into(&mut store, &doc(1)).unwrap();
    shaclxsd_core::load_into(&mut store, &doc(2)).unwrap();

    let value = format!("{}v", EX);
    for predicate in ["p", "q"] {
        let predicate = format!("{}{}", EX, predicate);
        let first = store.value_of(&ex("S1"), &predicate).cloned().unwrap();
        let second = store.value_of(&ex("S2"), &predicate).cloned().unwrap();
        assert_ne!(first, second);
        assert_eq!(store.all_values_of(&first, &value).len(), 1);
        assert_eq!(store.all_values_of(&second, &value).len(), 1);
    }

    let first = store.value_of(&ex("S1"), &format!("{}in", EX)).cloned().unwrap();
    let second = store.value_of(&ex("S2"), &format!("{}in", EX)).cloned().unwrap();
    assert_ne!(first, second);
    assert_eq!(store.all_values_of(&first, rdf::REST), vec![&Term::iri(rdf::NIL)]);
    assert_eq!(store.all_values_of(&second, rdf::REST), vec![&Term::iri(rdf::NIL)]);
}

#[test]
fn test_repeated_label_is_one_node_within_a_document() {
    let ttl = r#"
        @prefix ex: <http://example.org/> .
        ex:a ex:p _:x .
        ex:b ex:p _:x .
    "#;
    let store = parse_turtle(ttl).unwrap();
    let p = format!("{}p", EX);
    assert_eq!(store.value_of(&ex("a"), &p), store.value_of(&ex("b"), &p));
}

#[test]
fn test_dotted_local_names() {
    let ttl = r#"
        @prefix ex: <http://example.org/> .
        ex:s ex:version ex:v1.0 .
        ex:a ex:b ex:c.
    "#;
    let store = parse_turtle(ttl).unwrap();

    assert_eq!(store.value_of(&ex("s"), &format!("{}version", EX)), Some(&ex("v1.0")));
    assert_eq!(store.value_of(&ex("a"), &format!("{}b", EX)), Some(&ex("c")));
}
