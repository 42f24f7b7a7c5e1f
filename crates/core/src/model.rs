//! Closed schema model.
//!
//! The raw document structs from [`crate::spec`] are lowered into
//! [`SchemaNode`] exactly once. Everything downstream matches on
//! [`SchemaKind`] exhaustively and never sees an unexpected shape.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use tracing::debug;

use crate::error::ConvertError;
use crate::spec::{
    AdditionalProperties, HTTP_METHODS, RawDocument, RawItems, RawOperation, RawParameter,
    RawPathItem, RawSchema, SchemaType, decode,
};

/// Primitive JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
}

/// Schema composition keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    /// Intersection.
    AllOf,
    /// Exclusive union.
    OneOf,
    /// Inclusive union.
    AnyOf,
}

impl CompositeKind {
    /// The keyword as written in a document.
    pub fn keyword(self) -> &'static str {
        match self {
            CompositeKind::AllOf => "allOf",
            CompositeKind::OneOf => "oneOf",
            CompositeKind::AnyOf => "anyOf",
        }
    }

    /// Whether the composition renders as a union.
    pub fn is_union(self) -> bool {
        matches!(self, CompositeKind::OneOf | CompositeKind::AnyOf)
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "allOf" => Some(CompositeKind::AllOf),
            "oneOf" => Some(CompositeKind::OneOf),
            "anyOf" => Some(CompositeKind::AnyOf),
            _ => None,
        }
    }
}

/// A scalar value allowed by `enum` or `const`.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// String value.
    String(String),
    /// Integral number.
    Integer(i64),
    /// Non-integral (or out of `i64` range) number.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// `null`
    Null,
}

/// What an object allows besides its declared properties.
#[derive(Debug, Clone)]
pub enum Additional {
    /// `additionalProperties` absent or `false`.
    Closed,
    /// `additionalProperties: true`.
    Open,
    /// `additionalProperties: { ... }`.
    Typed(Box<SchemaNode>),
}

/// The shape of a schema node.
#[derive(Debug, Clone)]
pub enum SchemaKind {
    /// No constraints at all (`{}`).
    Any,
    /// A primitive value.
    Primitive {
        /// Which primitive.
        kind: PrimitiveKind,
        /// Format hint, kept for documentation.
        format: Option<String>,
    },
    /// A homogeneous list.
    Array {
        /// Item schema.
        items: Box<SchemaNode>,
    },
    /// A structured object.
    Object {
        /// Declared properties in document order.
        properties: IndexMap<String, SchemaNode>,
        /// Names of required properties.
        required: IndexSet<String>,
        /// Undeclared property policy.
        additional: Additional,
    },
    /// A fixed set of literal values.
    Enum {
        /// Values in document order.
        values: Vec<Literal>,
    },
    /// A pointer to another node of the document.
    Reference {
        /// The pointer as written.
        pointer: String,
    },
    /// A combination of schemas.
    Composite {
        /// Composition keyword.
        kind: CompositeKind,
        /// Member schemas in document order.
        members: Vec<SchemaNode>,
    },
    /// A construct that cannot be represented.
    Unsupported {
        /// Short description of the construct.
        construct: String,
    },
}

/// One node of the schema graph.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Shape of the node.
    pub kind: SchemaKind,
    /// Documentation text (description, or title).
    pub description: Option<String>,
    /// Whether `null` is allowed in addition to the shape.
    pub nullable: bool,
}

impl SchemaNode {
    /// A node with no documentation that is not nullable.
    pub fn bare(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
            nullable: false,
        }
    }

    /// Step into a child node addressed by pointer segments.
    ///
    /// Returns the child and how many segments were consumed, or `None` when
    /// the segments do not address a child of this node.
    pub fn child(&self, segment: &str, next: Option<&str>) -> Option<(&SchemaNode, usize)> {
        match (&self.kind, segment) {
            (SchemaKind::Object { properties, .. }, "properties") => {
                properties.get(next?).map(|node| (node, 2))
            }
            (
                SchemaKind::Object {
                    additional: Additional::Typed(node),
                    ..
                },
                "additionalProperties",
            ) => Some((node.as_ref(), 1)),
            (SchemaKind::Array { items }, "items") => Some((items.as_ref(), 1)),
            (SchemaKind::Composite { kind, members }, keyword) => {
                let wanted = CompositeKind::from_keyword(keyword)?;
                let index: usize = next?.parse().ok()?;
                if *kind == wanted {
                    return members.get(index).map(|node| (node, 2));
                }
                // `oneOf`/`anyOf` written next to other keywords live as a
                // trailing member of the enclosing `allOf`.
                members.iter().rev().find_map(|member| match &member.kind {
                    SchemaKind::Composite { kind, members } if *kind == wanted => {
                        members.get(index).map(|node| (node, 2))
                    }
                    _ => None,
                })
            }
            _ => None,
        }
    }
}

/// Lower a raw schema into the closed model.
pub fn lower(raw: &RawSchema) -> SchemaNode {
    if let Some(reason) = &raw.invalid {
        return SchemaNode::bare(SchemaKind::Unsupported {
            construct: format!("malformed schema ({reason})"),
        });
    }

    let description = raw.doc();
    let mut nullable = raw.is_nullable();

    if let Some(pointer) = &raw.ref_path {
        return SchemaNode {
            kind: SchemaKind::Reference {
                pointer: pointer.clone(),
            },
            description,
            nullable,
        };
    }

    let mut base = lower_base(raw, &mut nullable).map(SchemaNode::bare);
    let mut pieces = Vec::new();

    if let Some(all_of) = &raw.all_of {
        let mut members: Vec<_> = all_of.iter().map(lower).collect();
        members.extend(base.take());
        members.extend(lower_union(CompositeKind::OneOf, raw.one_of.as_deref()));
        members.extend(lower_union(CompositeKind::AnyOf, raw.any_of.as_deref()));
        pieces.push(SchemaNode::bare(SchemaKind::Composite {
            kind: CompositeKind::AllOf,
            members,
        }));
    } else {
        pieces.extend(base);
        pieces.extend(lower_union(CompositeKind::OneOf, raw.one_of.as_deref()));
        pieces.extend(lower_union(CompositeKind::AnyOf, raw.any_of.as_deref()));
    }

    let kind = match pieces.len() {
        0 => SchemaKind::Any,
        1 => pieces.remove(0).kind,
        _ => SchemaKind::Composite {
            kind: CompositeKind::AllOf,
            members: pieces,
        },
    };

    SchemaNode {
        kind,
        description,
        nullable,
    }
}

fn lower_union(kind: CompositeKind, members: Option<&[RawSchema]>) -> Option<SchemaNode> {
    members.map(|members| {
        SchemaNode::bare(SchemaKind::Composite {
            kind,
            members: members.iter().map(lower).collect(),
        })
    })
}

/// The structural part of a schema: enum/const, type, or implied object/array.
fn lower_base(raw: &RawSchema, nullable: &mut bool) -> Option<SchemaKind> {
    if let Some(value) = &raw.const_value {
        return Some(lower_enum(std::slice::from_ref(value)));
    }
    if let Some(values) = &raw.enum_values {
        return Some(lower_enum(values));
    }

    match &raw.schema_type {
        Some(SchemaType::Single(name)) => Some(lower_type(name, raw)),
        Some(SchemaType::Multiple(names)) => {
            let non_null: Vec<_> = names.iter().filter(|name| *name != "null").collect();
            if non_null.len() < names.len() {
                *nullable = true;
            }
            match non_null.as_slice() {
                [] => Some(SchemaKind::Primitive {
                    kind: PrimitiveKind::Null,
                    format: None,
                }),
                [single] => Some(lower_type(single, raw)),
                many => Some(SchemaKind::Composite {
                    kind: CompositeKind::AnyOf,
                    members: many
                        .iter()
                        .map(|name| SchemaNode::bare(lower_type(name, raw)))
                        .collect(),
                }),
            }
        }
        None => {
            // A bare `required` list still constrains an object; inside an
            // `allOf` it adds names to the merged object.
            if raw.properties.is_some()
                || raw.additional_properties.is_some()
                || !raw.required_names().is_empty()
            {
                Some(lower_object(raw))
            } else if raw.items.is_some() {
                Some(lower_array(raw))
            } else {
                None
            }
        }
    }
}

fn lower_type(name: &str, raw: &RawSchema) -> SchemaKind {
    let primitive = |kind| SchemaKind::Primitive {
        kind,
        format: raw.format.clone(),
    };
    match name {
        "string" => primitive(PrimitiveKind::String),
        "number" => primitive(PrimitiveKind::Number),
        "integer" => primitive(PrimitiveKind::Integer),
        "boolean" => primitive(PrimitiveKind::Boolean),
        "null" => primitive(PrimitiveKind::Null),
        "array" => lower_array(raw),
        "object" => lower_object(raw),
        other => SchemaKind::Unsupported {
            construct: format!("type `{other}`"),
        },
    }
}

fn lower_array(raw: &RawSchema) -> SchemaKind {
    match &raw.items {
        None => SchemaKind::Array {
            items: Box::new(SchemaNode::bare(SchemaKind::Any)),
        },
        Some(RawItems::Single(items)) => SchemaKind::Array {
            items: Box::new(lower(items)),
        },
        Some(RawItems::Tuple(_)) => SchemaKind::Unsupported {
            construct: "tuple `items`".to_string(),
        },
    }
}

fn lower_object(raw: &RawSchema) -> SchemaKind {
    let properties = raw
        .properties
        .iter()
        .flatten()
        .map(|(name, schema)| (name.clone(), lower(schema)))
        .collect();
    let flagged = raw
        .properties
        .iter()
        .flatten()
        .filter(|(_, schema)| schema.required_flag())
        .map(|(name, _)| name.clone());
    let required = raw
        .required_names()
        .iter()
        .cloned()
        .chain(flagged)
        .collect();
    let additional = match &raw.additional_properties {
        None | Some(AdditionalProperties::Bool(false)) => Additional::Closed,
        Some(AdditionalProperties::Bool(true)) => Additional::Open,
        Some(AdditionalProperties::Schema(schema)) => Additional::Typed(Box::new(lower(schema))),
    };
    SchemaKind::Object {
        properties,
        required,
        additional,
    }
}

fn lower_enum(values: &[Value]) -> SchemaKind {
    if values.is_empty() {
        return SchemaKind::Unsupported {
            construct: "empty `enum`".to_string(),
        };
    }
    let mut literals = Vec::with_capacity(values.len());
    for value in values {
        let literal = match value {
            Value::Null => Literal::Null,
            Value::Bool(b) => Literal::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Literal::Integer(i),
                None => Literal::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Literal::String(s.clone()),
            Value::Array(_) | Value::Object(_) => {
                return SchemaKind::Unsupported {
                    construct: "non-scalar `enum` value".to_string(),
                };
            }
        };
        literals.push(literal);
    }
    SchemaKind::Enum { values: literals }
}

/// Escape one JSON pointer segment (`~` → `~0`, `/` → `~1`).
pub fn escape_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// One named top-level schema.
#[derive(Debug, Clone)]
pub struct Definition {
    /// Key as written in the document.
    pub name: String,
    /// Canonical pointer (`#/definitions/<name>` or `#/components/schemas/<name>`).
    pub pointer: String,
    /// Root node.
    pub root: SchemaNode,
}

/// Named top-level schemas in document order.
#[derive(Debug, Clone, Default)]
pub struct DefinitionTable {
    entries: Vec<Definition>,
    by_pointer: HashMap<String, usize>,
}

impl DefinitionTable {
    fn insert(&mut self, prefix: &str, name: &str, raw: &RawSchema) {
        let pointer = format!("{prefix}/{}", escape_pointer_segment(name));
        self.by_pointer.insert(pointer.clone(), self.entries.len());
        self.entries.push(Definition {
            name: name.to_string(),
            pointer,
            root: lower(raw),
        });
    }

    /// Position of the definition with this canonical pointer.
    pub fn index_of(&self, pointer: &str) -> Option<usize> {
        self.by_pointer.get(pointer).copied()
    }

    /// Definition at a position.
    pub fn get(&self, index: usize) -> Option<&Definition> {
        self.entries.get(index)
    }

    /// All definitions in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Definition> {
        self.entries.iter()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no definitions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where a parameter is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterLocation {
    /// Query string.
    Query,
    /// URL path template.
    Path,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
    /// Swagger 2.0 form field.
    FormData,
    /// Swagger 2.0 request body.
    Body,
    /// Anything else.
    Other(String),
}

impl ParameterLocation {
    fn parse(location: &str) -> Self {
        match location {
            "query" => ParameterLocation::Query,
            "path" => ParameterLocation::Path,
            "header" => ParameterLocation::Header,
            "cookie" => ParameterLocation::Cookie,
            "formData" => ParameterLocation::FormData,
            "body" => ParameterLocation::Body,
            other => ParameterLocation::Other(other.to_string()),
        }
    }
}

/// A resolved parameter.
#[derive(Debug, Clone)]
pub struct ParameterEntry {
    /// Parameter name.
    pub name: String,
    /// Where it is sent.
    pub location: ParameterLocation,
    /// Whether it must be sent.
    pub required: bool,
    /// Documentation text.
    pub description: Option<String>,
    /// Value type.
    pub schema: SchemaNode,
    /// Whether the value type sits under the parameter's `schema` key rather
    /// than inline on the parameter.
    pub nested_schema: bool,
}

/// A parameter as listed on a path item or operation.
#[derive(Debug, Clone)]
pub enum ParameterSlot {
    /// Declared in place.
    Inline(ParameterEntry),
    /// Points at a reusable parameter.
    Reference(String),
}

impl ParameterSlot {
    fn lower(raw: &RawParameter, location: &str) -> Result<Self, ConvertError> {
        if let Some(pointer) = &raw.ref_path {
            return Ok(ParameterSlot::Reference(pointer.clone()));
        }
        let name = raw.name.clone().ok_or_else(|| {
            ConvertError::MalformedDocument(format!("parameter without `name` at {location}"))
        })?;
        let place = raw.location.as_deref().ok_or_else(|| {
            ConvertError::MalformedDocument(format!("parameter `{name}` without `in` at {location}"))
        })?;
        Ok(ParameterSlot::Inline(ParameterEntry {
            name,
            location: ParameterLocation::parse(place),
            required: raw.required,
            description: raw.description.clone().filter(|d| !d.trim().is_empty()),
            schema: lower(&raw.value_schema()),
            nested_schema: raw.schema.is_some(),
        }))
    }
}

/// One API operation.
#[derive(Debug, Clone)]
pub struct Operation {
    /// URL template.
    pub path: String,
    /// Lower-case HTTP method.
    pub method: String,
    /// `operationId`, when present.
    pub operation_id: Option<String>,
    /// Pointer to the operation object.
    pub pointer: String,
    /// Parameters declared on the path item.
    pub path_parameters: Vec<ParameterSlot>,
    /// Parameters declared on the operation.
    pub parameters: Vec<ParameterSlot>,
}

/// The whole document, lowered.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    /// Named schemas.
    pub definitions: DefinitionTable,
    /// Reusable parameters keyed by canonical pointer.
    pub parameters: IndexMap<String, ParameterSlot>,
    /// Operations in document order; `None` when they were not requested or
    /// the document has no `paths`.
    pub operations: Option<Vec<Operation>>,
}

impl SchemaModel {
    /// Build the model from a parsed document.
    ///
    /// Reusable parameters and `paths` are only read with `with_operations`;
    /// otherwise their content is never validated.
    pub fn from_document(document: &Value, with_operations: bool) -> Result<Self, ConvertError> {
        let raw = RawDocument::from_value(document)?;

        let mut definitions = DefinitionTable::default();
        for (name, schema) in raw.definitions.iter().flatten() {
            definitions.insert("#/definitions", name, schema);
        }
        let component_schemas = raw.components.as_ref().and_then(|c| c.schemas.as_ref());
        for (name, schema) in component_schemas.into_iter().flatten() {
            definitions.insert("#/components/schemas", name, schema);
        }

        let mut parameters = IndexMap::new();
        let mut operations = None;
        if with_operations {
            let component_parameters =
                raw.components.as_ref().and_then(|c| c.parameters.as_ref());
            for (prefix, location, table) in [
                ("#/parameters", "parameters", raw.parameters.as_ref()),
                (
                    "#/components/parameters",
                    "components.parameters",
                    component_parameters,
                ),
            ] {
                let Some(table) = table else { continue };
                let table: IndexMap<String, RawParameter> = decode(table, location)?;
                for (name, param) in &table {
                    let pointer = format!("{prefix}/{}", escape_pointer_segment(name));
                    let slot = ParameterSlot::lower(param, &pointer)?;
                    parameters.insert(pointer, slot);
                }
            }

            if let Some(paths) = &raw.paths {
                let paths: IndexMap<String, RawPathItem> = decode(paths, "paths")?;
                operations = Some(lower_operations(&paths)?);
            }
        }

        debug!(
            definitions = definitions.len(),
            parameters = parameters.len(),
            operations = operations.as_ref().map_or(0, Vec::len),
            "Lowered schema model."
        );

        Ok(Self {
            definitions,
            parameters,
            operations,
        })
    }
}

fn lower_operations(paths: &IndexMap<String, RawPathItem>) -> Result<Vec<Operation>, ConvertError> {
    let mut operations = Vec::new();
    for (path, item) in paths {
        let item_pointer = format!("#/paths/{}", escape_pointer_segment(path));
        let path_parameters = item
            .parameters
            .iter()
            .map(|p| ParameterSlot::lower(p, &item_pointer))
            .collect::<Result<Vec<_>, _>>()?;

        for (method, value) in &item.rest {
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            let pointer = format!("{item_pointer}/{method}");
            let op: RawOperation = decode(value, &format!("paths.{path}.{method}"))?;
            let parameters = op
                .parameters
                .iter()
                .map(|p| ParameterSlot::lower(p, &pointer))
                .collect::<Result<Vec<_>, _>>()?;
            operations.push(Operation {
                path: path.clone(),
                method: method.clone(),
                operation_id: op.operation_id,
                pointer,
                path_parameters: path_parameters.clone(),
                parameters,
            });
        }
    }
    Ok(operations)
}
