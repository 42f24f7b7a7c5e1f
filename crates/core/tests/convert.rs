//! End-to-end conversions of whole documents.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::{Value, json};
use sw2dts_core::{ConvertError, ConvertOptions, WarningKind, convert, convert_str};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const SHAPES: &str = include_str!("fixtures/openapi3.yaml");
const MERGED: &str = include_str!("fixtures/merge_keys.yaml");

fn pet_document() -> Value {
    json!({
        "definitions": {
            "Pet": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "age": { "type": "integer" }
                }
            }
        }
    })
}

fn options() -> ConvertOptions {
    ConvertOptions::default()
}

#[test]
fn test_pet_keeps_document_order() {
    let conversion = convert(&pet_document(), &options()).unwrap();
    assert_eq!(
        conversion.output,
        "export interface Pet {\n  name: string;\n  age?: number;\n}\n"
    );
    assert!(conversion.warnings.is_empty());
}

#[test]
fn test_pet_sorted_props() {
    let options = ConvertOptions {
        sort_props: true,
        ..options()
    };
    let conversion = convert(&pet_document(), &options).unwrap();
    assert_eq!(
        conversion.output,
        "export interface Pet {\n  age?: number;\n  name: string;\n}\n"
    );
}

#[test]
fn test_pet_in_namespace() {
    let options = ConvertOptions {
        namespace: Some("Api".to_string()),
        ..options()
    };
    let conversion = convert(&pet_document(), &options).unwrap();
    assert_eq!(
        conversion.output,
        "declare namespace Api {\n  export interface Pet {\n    name: string;\n    age?: number;\n  }\n}\n"
    );
}

#[test]
fn test_self_referencing_node() {
    let document = json!({
        "definitions": {
            "Node": { "properties": { "next": { "$ref": "#/definitions/Node" } } }
        }
    });
    let conversion = convert(&document, &options()).unwrap();
    assert_eq!(
        conversion.output,
        "export interface Node {\n  next?: Node;\n}\n"
    );
}

#[test]
fn test_chained_cycle_terminates() {
    let document = json!({
        "definitions": {
            "Person": { "properties": { "employer": { "$ref": "#/definitions/Company" } } },
            "Company": {
                "properties": {
                    "staff": { "type": "array", "items": { "$ref": "#/definitions/Person" } }
                }
            }
        }
    });
    let conversion = convert(&document, &options()).unwrap();
    assert_eq!(
        conversion.output,
        "export interface Person {\n  employer?: Company;\n}\n\nexport interface Company {\n  staff?: Person[];\n}\n"
    );
}

#[test]
fn test_petstore() {
    let conversion = convert_str(PETSTORE, &options()).unwrap();
    assert_eq!(
        conversion.output,
        r#"/** A pet in the store. */
export type Pet = NewPet & { id: number };

export interface NewPet {
  name: string;
  tag?: string | null;
  status?: "available" | "pending" | "sold";
}

export type Pets = Pet[];

export interface Error {
  code: number; // int32
  message: string;
  details?: { [key: string]: string };
}
"#
    );
    assert!(conversion.warnings.is_empty());
}

#[test]
fn test_petstore_with_query() {
    let options = ConvertOptions {
        with_query: true,
        ..options()
    };
    let conversion = convert_str(PETSTORE, &options).unwrap();
    assert!(
        conversion.output.ends_with(
            r#"export interface ListPetsQuery {
  /** How many items to return */
  limit?: number; // int32
  tags?: string[];
}

export interface GetPetsPetIdQuery {
  fields: string;
}
"#
        ),
        "{}",
        conversion.output
    );
    assert!(!conversion.output.contains("CreatePetQuery"));
}

#[test]
fn test_petstore_namespace_wraps_queries() {
    let options = ConvertOptions {
        namespace: Some("Petstore.V1".to_string()),
        with_query: true,
        sort_props: true,
    };
    let output = convert_str(PETSTORE, &options).unwrap().output;
    assert!(output.starts_with("declare namespace Petstore.V1 {\n  /** A pet in the store. */\n"));
    assert!(output.contains("\n  export interface ListPetsQuery {\n    /** How many items to return */\n    limit?: number; // int32\n"));
    assert!(output.contains("  export interface NewPet {\n    name: string;\n    status?: "));
    assert!(output.ends_with("  }\n}\n"));
}

#[test]
fn test_openapi3_components() {
    let conversion = convert_str(SHAPES, &options()).unwrap();
    assert_eq!(
        conversion.output,
        r#"/** A drawable shape */
export type Shape = Circle | Square | null;

export interface Circle {
  kind: "circle";
  radius: number; // double
}

export interface Square {
  kind: "square";
  side?: number;
  origin?: number;
}

export interface Tree {
  children?: Tree[];
  meta?: { [key: string]: any };
}
"#
    );
}

#[test]
fn test_conversion_is_deterministic() {
    let options = ConvertOptions {
        with_query: true,
        ..options()
    };
    let first = convert_str(PETSTORE, &options).unwrap();
    let second = convert_str(PETSTORE, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_sorting_sorted_document_changes_nothing() {
    let document = json!({
        "definitions": {
            "Sorted": {
                "properties": {
                    "a": { "type": "string" },
                    "b": { "properties": { "x": {}, "y": {} } },
                    "c": { "type": "boolean" }
                }
            }
        }
    });
    let plain = convert(&document, &options()).unwrap();
    let sorted = convert(
        &document,
        &ConvertOptions {
            sort_props: true,
            ..options()
        },
    )
    .unwrap();
    assert_eq!(plain.output, sorted.output);
}

#[test]
fn test_shared_reference_declared_once() {
    let document = json!({
        "definitions": {
            "Transfer": {
                "properties": {
                    "from": { "$ref": "#/definitions/Account" },
                    "to": { "$ref": "#/definitions/Account" }
                }
            },
            "Account": { "properties": { "iban": { "type": "string" } } }
        }
    });
    let output = convert(&document, &options()).unwrap().output;
    assert_eq!(output.matches("interface Account").count(), 1);
    assert!(output.contains("  from?: Account;\n  to?: Account;\n"));
}

#[test]
fn test_required_from_every_all_of_member() {
    let document = json!({
        "definitions": {
            "Merged": {
                "allOf": [
                    { "properties": { "a": { "type": "string" }, "b": { "type": "string" } } },
                    { "required": ["b"] }
                ]
            }
        }
    });
    let output = convert(&document, &options()).unwrap().output;
    assert_eq!(output, "export type Merged = { a?: string; b: string };\n");
}

#[test]
fn test_required_only_member_keeps_reference() {
    let document = json!({
        "definitions": {
            "Base": { "properties": { "name": { "type": "string" } } },
            "Named": {
                "allOf": [{ "$ref": "#/definitions/Base" }, { "required": ["name"] }]
            }
        }
    });
    let conversion = convert(&document, &options()).unwrap();
    assert_eq!(
        conversion.output,
        "export interface Base {\n  name?: string;\n}\n\nexport type Named = Base;\n"
    );
    assert!(conversion.warnings.is_empty());
}

#[test]
fn test_paths_unread_without_with_query() {
    let document = json!({
        "definitions": { "Pet": { "type": "string" } },
        "paths": { "/pets": { "get": { "parameters": [{ "name": "x" }] } } }
    });
    let conversion = convert(&document, &options()).unwrap();
    assert_eq!(conversion.output, "export type Pet = string;\n");
    let err = convert(
        &document,
        &ConvertOptions {
            with_query: true,
            ..options()
        },
    )
    .unwrap_err();
    assert!(matches!(err, ConvertError::MalformedDocument(_)));
}

#[test]
fn test_odd_sub_schemas_degrade() {
    let document = json!({
        "definitions": {
            "Pet": {
                "properties": {
                    "name": { "type": "string", "required": true },
                    "kind": { "enum": "cat" }
                }
            }
        }
    });
    let conversion = convert(&document, &options()).unwrap();
    assert_eq!(
        conversion.output,
        "export interface Pet {\n  name: string;\n  kind?: any;\n}\n"
    );
    assert_eq!(conversion.warnings.len(), 1);
    assert_eq!(conversion.warnings[0].kind, WarningKind::UnsupportedConstruct);
    assert_eq!(conversion.warnings[0].pointer, "#/definitions/Pet/properties/kind");
}

#[test]
fn test_yaml_merge_keys() {
    let conversion = convert_str(MERGED, &options()).unwrap();
    assert_eq!(
        conversion.output,
        r#"export interface Audited {
  createdAt?: string; // date-time
  updatedAt?: string; // date-time
}

export interface Invoice {
  total?: number;
  createdAt: string; // date-time
  updatedAt?: string; // date-time
}
"#
    );
    assert!(conversion.warnings.is_empty());
}

#[test]
fn test_alias_cycle_warns() {
    let document = json!({
        "definitions": {
            "A": { "$ref": "#/definitions/B" },
            "B": { "$ref": "#/definitions/A" }
        }
    });
    let conversion = convert(&document, &options()).unwrap();
    assert_eq!(
        conversion.output,
        "export type A = B;\n\nexport type B = any;\n"
    );
    assert_eq!(conversion.warnings.len(), 1);
    assert_eq!(conversion.warnings[0].kind, WarningKind::CircularAlias);
}

#[test]
fn test_unsupported_constructs_degrade() {
    let document = json!({
        "definitions": {
            "Upload": {
                "required": ["file"],
                "properties": {
                    "file": { "type": "file" },
                    "pair": { "type": "array", "items": [{ "type": "string" }, { "type": "integer" }] }
                }
            }
        }
    });
    let conversion = convert(&document, &options()).unwrap();
    assert_eq!(
        conversion.output,
        "export interface Upload {\n  file: any;\n  pair?: any;\n}\n"
    );
    let pointers: Vec<_> = conversion
        .warnings
        .iter()
        .map(|w| w.pointer.as_str())
        .collect();
    assert_eq!(
        pointers,
        vec![
            "#/definitions/Upload/properties/file",
            "#/definitions/Upload/properties/pair"
        ]
    );
}

#[test]
fn test_names_are_sanitized() {
    let document = json!({
        "definitions": {
            "Page«Pet»": { "type": "string" },
            "default": { "type": "string" },
            "List": { "items": { "$ref": "#/definitions/Page«Pet»" } }
        }
    });
    let output = convert(&document, &options()).unwrap().output;
    assert_eq!(
        output,
        "export type PagePet = string;\n\nexport type _default = string;\n\nexport type List = PagePet[];\n"
    );
}

#[test]
fn test_property_names_are_quoted() {
    let document = json!({
        "definitions": {
            "Headers": {
                "properties": { "x-rate-limit": { "type": "integer" }, "2fa": { "type": "boolean" } }
            }
        }
    });
    let output = convert(&document, &options()).unwrap().output;
    assert_eq!(
        output,
        "export interface Headers {\n  \"x-rate-limit\"?: number;\n  \"2fa\"?: boolean;\n}\n"
    );
}

#[test]
fn test_dangling_reference_fails() {
    let document = json!({
        "definitions": { "Pet": { "$ref": "#/definitions/Missing" } }
    });
    let err = convert(&document, &options()).unwrap_err();
    assert!(matches!(err, ConvertError::Resolution { .. }), "{err}");
}

#[test]
fn test_external_reference_fails() {
    let document = json!({
        "definitions": { "Pet": { "$ref": "common.yaml#/definitions/Pet" } }
    });
    let err = convert(&document, &options()).unwrap_err();
    assert!(err.to_string().contains("external"), "{err}");
}

#[test]
fn test_invalid_namespace_fails() {
    let options = ConvertOptions {
        namespace: Some("my-api".to_string()),
        ..options()
    };
    let err = convert(&pet_document(), &options).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidNamespace(_)));
}

#[test]
fn test_with_query_without_paths_fails() {
    let options = ConvertOptions {
        with_query: true,
        ..options()
    };
    let err = convert(&pet_document(), &options).unwrap_err();
    assert!(matches!(err, ConvertError::MalformedDocument(_)));
}
