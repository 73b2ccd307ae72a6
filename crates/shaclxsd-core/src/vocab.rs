//! Well-known vocabulary IRIs

/// RDF vocabulary
pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// XML Schema datatypes
pub mod xsd {
    /// Namespace used for datatype IRIs in RDF
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    /// Namespace of the schema document itself (no trailing `#`)
    pub const SCHEMA_NS: &str = "http://www.w3.org/2001/XMLSchema";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
}

/// SHACL core vocabulary
pub mod sh {
    pub const NS: &str = "http://www.w3.org/ns/shacl#";
    pub const NODE_SHAPE: &str = "http://www.w3.org/ns/shacl#NodeShape";
    pub const PROPERTY_SHAPE: &str = "http://www.w3.org/ns/shacl#PropertyShape";
    pub const NAME: &str = "http://www.w3.org/ns/shacl#name";
    pub const NODE: &str = "http://www.w3.org/ns/shacl#node";
    pub const XONE: &str = "http://www.w3.org/ns/shacl#xone";
    pub const OR: &str = "http://www.w3.org/ns/shacl#or";
    pub const PROPERTY: &str = "http://www.w3.org/ns/shacl#property";
    pub const TARGET_CLASS: &str = "http://www.w3.org/ns/shacl#targetClass";
    pub const PATH: &str = "http://www.w3.org/ns/shacl#path";
    pub const DATATYPE: &str = "http://www.w3.org/ns/shacl#datatype";
    pub const MIN_COUNT: &str = "http://www.w3.org/ns/shacl#minCount";
    pub const MAX_COUNT: &str = "http://www.w3.org/ns/shacl#maxCount";
    pub const IN: &str = "http://www.w3.org/ns/shacl#in";
    pub const PATTERN: &str = "http://www.w3.org/ns/shacl#pattern";
    pub const MIN_EXCLUSIVE: &str = "http://www.w3.org/ns/shacl#minExclusive";
    pub const MAX_EXCLUSIVE: &str = "http://www.w3.org/ns/shacl#maxExclusive";
    pub const MIN_INCLUSIVE: &str = "http://www.w3.org/ns/shacl#minInclusive";
    pub const MAX_INCLUSIVE: &str = "http://www.w3.org/ns/shacl#maxInclusive";
    pub const MIN_LENGTH: &str = "http://www.w3.org/ns/shacl#minLength";
    pub const MAX_LENGTH: &str = "http://www.w3.org/ns/shacl#maxLength";
    pub const LENGTH: &str = "http://www.w3.org/ns/shacl#length";
}
