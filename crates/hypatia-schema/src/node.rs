//! Canonical schema nodes.
//!
//! A [`SchemaNode`] is the introspected representation of a type's shape,
//! shared by the runtime binder (coercion) and the documentation assembler.
//! Nodes are built once at route-registration time and never mutated.

use serde_json::{Map, Value};

use crate::Constraints;

/// The kind of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// `true` / `false`.
    Boolean,
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Number,
    /// UTF-8 text.
    String,
    /// A closed set of literal values.
    Enum {
        /// The allowed values in declaration order.
        values: Vec<EnumValue>,
    },
    /// An ordered sequence of one element schema.
    Array {
        /// Schema of every element.
        items: Box<SchemaNode>,
    },
    /// A string-keyed map of one value schema.
    Map {
        /// Schema of every value.
        values: Box<SchemaNode>,
    },
    /// A named object with fields in declaration order.
    Object {
        /// The declared fields.
        fields: Vec<ObjectField>,
    },
    /// Exactly one of several alternative schemas.
    OneOf {
        /// The alternatives.
        variants: Vec<SchemaNode>,
    },
    /// A reference to a named node already being expanded: the cycle
    /// cut-off emitted by the introspector instead of re-expanding.
    Reference {
        /// Name of the referenced node.
        name: String,
    },
}

/// One allowed value of an enum schema, with its optional descriptive label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// The literal wire value.
    pub value: String,
    /// Human-readable label (the Described capability), if the type
    /// supplies one.
    pub label: Option<String>,
}

/// A field of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    /// Field name as declared.
    pub name: String,
    /// The field's schema.
    pub schema: SchemaNode,
    /// Whether the field must be present (it is not a nullable wrapper).
    pub required: bool,
}

/// Canonical, introspected representation of a type's shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Declared type name, when the type has one (objects, enums).
    pub name: Option<String>,
    /// The node kind.
    pub kind: SchemaKind,
    /// Whether the value may be null (set by unwrapping `Option<T>`).
    pub nullable: bool,
    /// Constraint metadata sourced from annotations.
    pub constraints: Constraints,
    /// Example value for documentation.
    pub example: Option<Value>,
}

impl SchemaNode {
    /// Creates a node of the given kind with no name, constraints or example.
    #[must_use]
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            name: None,
            kind,
            nullable: false,
            constraints: Constraints::default(),
            example: None,
        }
    }

    /// Attaches an example value for documentation.
    #[must_use]
    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    /// Looks up a declared field by exact name on an object node.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ObjectField> {
        match &self.kind {
            SchemaKind::Object { fields } => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    /// Renders this node as a generic schema document for the documentation
    /// tree: `{"type": ..., "properties": ..., "required": [...]}` with
    /// constraint metadata inlined.
    #[must_use]
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();

        match &self.kind {
            SchemaKind::Boolean => {
                doc.insert("type".into(), Value::from("boolean"));
            }
            SchemaKind::Integer => {
                doc.insert("type".into(), Value::from("integer"));
            }
            SchemaKind::Number => {
                doc.insert("type".into(), Value::from("number"));
            }
            SchemaKind::String => {
                doc.insert("type".into(), Value::from("string"));
            }
            SchemaKind::Enum { values } => {
                doc.insert("type".into(), Value::from("string"));
                doc.insert(
                    "enum".into(),
                    Value::Array(values.iter().map(|v| Value::from(v.value.clone())).collect()),
                );
                let labels: Map<String, Value> = values
                    .iter()
                    .filter_map(|v| {
                        v.label
                            .as_ref()
                            .map(|l| (v.value.clone(), Value::from(l.clone())))
                    })
                    .collect();
                if !labels.is_empty() {
                    doc.insert("x-enum-descriptions".into(), Value::Object(labels));
                }
            }
            SchemaKind::Array { items } => {
                doc.insert("type".into(), Value::from("array"));
                doc.insert("items".into(), items.to_document());
            }
            SchemaKind::Map { values } => {
                doc.insert("type".into(), Value::from("object"));
                doc.insert("additionalProperties".into(), values.to_document());
            }
            SchemaKind::Object { fields } => {
                doc.insert("type".into(), Value::from("object"));
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in fields {
                    properties.insert(field.name.clone(), field.schema.to_document());
                    if field.required {
                        required.push(Value::from(field.name.clone()));
                    }
                }
                doc.insert("properties".into(), Value::Object(properties));
                if !required.is_empty() {
                    doc.insert("required".into(), Value::Array(required));
                }
            }
            SchemaKind::OneOf { variants } => {
                doc.insert(
                    "oneOf".into(),
                    Value::Array(variants.iter().map(Self::to_document).collect()),
                );
            }
            SchemaKind::Reference { name } => {
                doc.insert("$ref".into(), Value::from(format!("#/components/schemas/{name}")));
                return Value::Object(doc);
            }
        }

        if let Some(name) = &self.name {
            doc.insert("title".into(), Value::from(name.clone()));
        }
        if self.nullable {
            doc.insert("nullable".into(), Value::Bool(true));
        }
        if let Some(min) = self.constraints.minimum {
            doc.insert("minimum".into(), Value::from(min));
        }
        if let Some(max) = self.constraints.maximum {
            doc.insert("maximum".into(), Value::from(max));
        }
        if let Some(min) = self.constraints.min_length {
            doc.insert("minLength".into(), Value::from(min));
        }
        if let Some(max) = self.constraints.max_length {
            doc.insert("maxLength".into(), Value::from(max));
        }
        if let Some(pattern) = self.constraints.pattern {
            doc.insert("pattern".into(), Value::from(pattern));
        }
        if let Some(format) = self.constraints.format {
            doc.insert("format".into(), Value::from(format));
        }
        if let Some(example) = &self.example {
            doc.insert("example".into(), example.clone());
        }

        Value::Object(doc)
    }
}
