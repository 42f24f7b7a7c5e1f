//! Raw Swagger/OpenAPI document structs for serde deserialization.
//!
//! This module mirrors the subset of Swagger 2.0 and OpenAPI 3.x that the
//! generator reads. Nothing here is interpreted; [`crate::model`] lowers these
//! structs into the closed schema model once, at the boundary.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ConvertError;

/// HTTP methods that can appear as operations under a path item.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Root document.
///
/// Parameter tables and `paths` stay undecoded until query interfaces are
/// requested; see [`decode`].
#[derive(Debug, Deserialize)]
pub struct RawDocument {
    /// Swagger 2.0 schema definitions.
    pub definitions: Option<IndexMap<String, RawSchema>>,
    /// Swagger 2.0 reusable parameters.
    pub parameters: Option<Value>,
    /// OpenAPI 3.x components.
    pub components: Option<RawComponents>,
    /// Path items keyed by URL template.
    pub paths: Option<Value>,
}

/// OpenAPI 3.x `components` section.
#[derive(Debug, Deserialize)]
pub struct RawComponents {
    /// Reusable schemas.
    pub schemas: Option<IndexMap<String, RawSchema>>,
    /// Reusable parameters.
    pub parameters: Option<Value>,
}

/// A path item: shared parameters plus one entry per HTTP method.
#[derive(Debug, Deserialize)]
pub struct RawPathItem {
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    /// Operations and extension keys, in document order.
    #[serde(flatten)]
    pub rest: IndexMap<String, Value>,
}

/// An API operation (endpoint).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    /// Operation identifier used to name derived declarations.
    pub operation_id: Option<String>,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
}

/// A parameter, inline or by reference.
///
/// Swagger 2.0 describes the value type inline (`type`, `format`, `items`,
/// `enum`); OpenAPI 3.x nests it under `schema`.
#[derive(Debug, Deserialize)]
pub struct RawParameter {
    /// Reference to a reusable parameter.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// Parameter name.
    pub name: Option<String>,
    /// Location: query, path, header, cookie, formData or body.
    #[serde(rename = "in")]
    pub location: Option<String>,
    /// Whether the parameter must be sent.
    #[serde(default)]
    pub required: bool,
    /// Free-form description.
    pub description: Option<String>,
    /// OpenAPI 3.x value schema (also Swagger 2.0 body parameters).
    pub schema: Option<RawSchema>,
    /// Swagger 2.0 inline type.
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    /// Swagger 2.0 inline format.
    pub format: Option<String>,
    /// Swagger 2.0 inline item schema.
    pub items: Option<Box<RawSchema>>,
    /// Swagger 2.0 inline enum.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    /// Swagger 2.0 nullable extension.
    #[serde(rename = "x-nullable")]
    pub x_nullable: Option<bool>,
}

impl RawParameter {
    /// The schema describing the parameter value.
    ///
    /// Prefers `schema`; otherwise rebuilds a schema from the inline
    /// Swagger 2.0 keywords.
    pub fn value_schema(&self) -> RawSchema {
        if let Some(schema) = &self.schema {
            return schema.clone();
        }
        RawSchema {
            schema_type: self.schema_type.clone(),
            format: self.format.clone(),
            items: self.items.clone().map(RawItems::Single),
            enum_values: self.enum_values.clone(),
            x_nullable: self.x_nullable,
            ..RawSchema::default()
        }
    }
}

/// JSON Schema object as used by Swagger/OpenAPI.
///
/// A schema whose keywords have unexpected shapes still deserializes: the
/// error lands in `invalid` and the keywords stay empty, so one odd
/// sub-schema never rejects the whole document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct RawSchema {
    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// The type (string, number, integer, boolean, object, array, null).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Format hint (e.g. int64, date-time, uuid).
    pub format: Option<String>,

    /// Short title, used as documentation when there is no description.
    pub title: Option<String>,

    /// Free-form description.
    pub description: Option<String>,

    /// Properties for object types, in document order.
    pub properties: Option<IndexMap<String, RawSchema>>,

    /// Required property names, or the draft-3 per-property flag.
    pub required: Option<Required>,

    /// Item schema for array types.
    pub items: Option<RawItems>,

    /// Enum values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,

    /// Constant value.
    #[serde(rename = "const")]
    pub const_value: Option<Value>,

    /// Intersection (all of these schemas combined).
    pub all_of: Option<Vec<RawSchema>>,

    /// Union (exactly one of these schemas).
    pub one_of: Option<Vec<RawSchema>>,

    /// Union (any of these schemas).
    pub any_of: Option<Vec<RawSchema>>,

    /// Additional properties for object types.
    pub additional_properties: Option<AdditionalProperties>,

    /// OpenAPI 3.0 nullable flag.
    pub nullable: Option<bool>,

    /// Swagger 2.0 nullable extension.
    #[serde(rename = "x-nullable")]
    pub x_nullable: Option<bool>,

    /// Why the keywords could not be read, for a malformed schema.
    #[serde(skip)]
    pub invalid: Option<String>,
}

impl<'de> Deserialize<'de> for RawSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(RawSchema::deserialize(&value).unwrap_or_else(|err| RawSchema {
            invalid: Some(err.to_string()),
            ..RawSchema::default()
        }))
    }
}

/// `required` is a list of names on the object, or (draft 3) a flag on the
/// property itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Required {
    /// `required: [a, b]`
    Names(Vec<String>),
    /// `required: true`
    Flag(bool),
}

/// Schema type can be a single type or an array of types.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

/// `items` is a schema, or a list of schemas for tuple validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawItems {
    /// Positional schemas (not expressible by the generator).
    Tuple(Vec<RawSchema>),
    /// One schema for every item.
    Single(Box<RawSchema>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `additionalProperties: true | false`
    Bool(bool),
    /// `additionalProperties: { ... }`
    Schema(Box<RawSchema>),
}

impl RawSchema {
    /// Documentation text: the description, or the title when there is none.
    pub fn doc(&self) -> Option<String> {
        self.description
            .as_ref()
            .or(self.title.as_ref())
            .filter(|text| !text.trim().is_empty())
            .cloned()
    }

    /// Whether the schema is marked nullable by `nullable` or `x-nullable`.
    pub fn is_nullable(&self) -> bool {
        self.nullable == Some(true) || self.x_nullable == Some(true)
    }

    /// Names listed by an object-level `required`.
    pub fn required_names(&self) -> &[String] {
        match &self.required {
            Some(Required::Names(names)) => names,
            Some(Required::Flag(_)) | None => &[],
        }
    }

    /// Whether a draft-3 `required: true` marks this property as required.
    pub fn required_flag(&self) -> bool {
        matches!(self.required, Some(Required::Flag(true)))
    }
}

impl RawDocument {
    /// Deserialize a parsed document, reporting the JSON path of any value
    /// with an unexpected shape.
    pub fn from_value(document: &Value) -> Result<Self, ConvertError> {
        if !document.is_object() {
            return Err(ConvertError::MalformedDocument(
                "the document root must be a mapping".to_string(),
            ));
        }
        decode(document, "")
    }
}

/// Deserialize one section of the document. `location` is the dotted path of
/// `value` and prefixes the path of any error.
pub fn decode<T: DeserializeOwned>(value: &Value, location: &str) -> Result<T, ConvertError> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let at = match (location.is_empty(), path.as_str()) {
            (true, _) => path,
            (false, ".") => location.to_string(),
            (false, _) => format!("{location}.{path}"),
        };
        ConvertError::MalformedDocument(format!("at {at}: {}", err.into_inner()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_definitions_keep_document_order() {
        let doc = json!({
            "definitions": {
                "Zebra": { "type": "string" },
                "Apple": { "type": "string" },
                "Mango": { "type": "string" }
            }
        });
        let raw = RawDocument::from_value(&doc).unwrap();
        let names: Vec<_> = raw.definitions.unwrap().into_keys().collect();
        assert_eq!(names, vec!["Zebra", "Apple", "Mango"]);
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = RawDocument::from_value(&json!(["not", "a", "mapping"])).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedDocument(_)));
    }

    #[test]
    fn test_malformed_section_reports_path() {
        let doc = json!({ "components": { "schemas": ["Pet"] } });
        let err = RawDocument::from_value(&doc).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("components.schemas"), "{message}");
    }

    #[test]
    fn test_odd_schema_is_kept_as_invalid() {
        let doc = json!({
            "definitions": {
                "Pet": {
                    "properties": {
                        "kind": { "enum": "cat" },
                        "name": { "type": "string" }
                    }
                }
            }
        });
        let raw = RawDocument::from_value(&doc).unwrap();
        let pet = &raw.definitions.unwrap()["Pet"];
        let properties = pet.properties.as_ref().unwrap();
        assert!(properties["kind"].invalid.is_some());
        assert!(properties["name"].invalid.is_none());
        assert!(pet.invalid.is_none());
    }

    #[test]
    fn test_required_list_or_flag() {
        let object: RawSchema = serde_json::from_value(json!({ "required": ["a", "b"] })).unwrap();
        assert_eq!(object.required_names(), ["a", "b"]);
        assert!(!object.required_flag());
        let property: RawSchema =
            serde_json::from_value(json!({ "type": "string", "required": true })).unwrap();
        assert!(property.required_flag());
        assert!(property.required_names().is_empty());
        assert!(property.invalid.is_none());
    }

    #[test]
    fn test_decode_prefixes_location() {
        let err = decode::<IndexMap<String, RawPathItem>>(&json!({ "/pets": 5 }), "paths")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("at paths./pets"), "{message}");
    }

    #[test]
    fn test_swagger2_inline_parameter_schema() {
        let param: RawParameter = serde_json::from_value(json!({
            "name": "limit",
            "in": "query",
            "type": "integer",
            "format": "int32"
        }))
        .unwrap();
        let schema = param.value_schema();
        assert!(matches!(schema.schema_type, Some(SchemaType::Single(ref t)) if t == "integer"));
        assert_eq!(schema.format.as_deref(), Some("int32"));
    }

    #[test]
    fn test_doc_falls_back_to_title() {
        let schema: RawSchema = serde_json::from_value(json!({ "title": "A pet" })).unwrap();
        assert_eq!(schema.doc().as_deref(), Some("A pet"));
        let schema: RawSchema =
            serde_json::from_value(json!({ "title": "A pet", "description": "Pet record" }))
                .unwrap();
        assert_eq!(schema.doc().as_deref(), Some("Pet record"));
    }
}
