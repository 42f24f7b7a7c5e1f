//! Conversion pipeline.
//!
//! 1. Model: parsed document -> SchemaModel (raw structs lowered once)
//! 2. Build: SchemaModel -> declarations (references resolved, cycles cut)
//! 3. Organize: declarations -> TsModule (optional namespace)
//! 4. Emit: TsModule -> String (via Emit trait)

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ConvertError, Warning};
use crate::ir::{Emit, build_declarations, organize};
use crate::model::SchemaModel;
use crate::options::ConvertOptions;

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Declaration text.
    pub output: String,
    /// Non-fatal issues, in the order they were found.
    pub warnings: Vec<Warning>,
}

/// Convert a parsed Swagger/OpenAPI document into TypeScript declarations.
pub fn convert(document: &Value, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let model = SchemaModel::from_document(document, options.with_query)?;
    let (declarations, warnings) = build_declarations(&model, options)?;
    let module = organize(declarations, options.namespace.as_deref())?;
    let output = module.emit();

    for warning in &warnings {
        warn!(kind = %warning.kind, pointer = %warning.pointer, "{}", warning.message);
    }
    debug!(bytes = output.len(), warnings = warnings.len(), "Conversion finished.");

    Ok(Conversion { output, warnings })
}

/// Parse JSON or YAML text and convert it.
///
/// YAML merge keys (`<<: *anchor`) are expanded before conversion.
pub fn convert_str(input: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    convert(&parse_document(input)?, options)
}

fn parse_document(input: &str) -> Result<Value, ConvertError> {
    // YAML is a superset of JSON, so one parser covers both.
    let mut yaml: serde_yaml::Value =
        serde_yaml::from_str(input).map_err(|e| ConvertError::Parse(e.to_string()))?;
    yaml.apply_merge().map_err(|e| ConvertError::Parse(e.to_string()))?;
    serde_json::to_value(yaml).map_err(|e| ConvertError::Parse(e.to_string()))
}
