//! Swagger/OpenAPI schema to TypeScript declaration generator.
//!
//! This crate turns the schema part of a Swagger 2.0 or OpenAPI 3.x document
//! into `.d.ts` text:
//! - One `interface` or `type` alias per definition, in document order
//! - References rendered by name, self-references included
//! - Optional query-parameter interfaces per operation
//! - Optional `declare namespace` wrapper
//!
//! ```
//! use sw2dts_core::{ConvertOptions, convert_str};
//!
//! let doc = "definitions:\n  Pet:\n    type: object\n    required: [name]\n    properties:\n      name: { type: string }\n";
//! let conversion = convert_str(doc, &ConvertOptions::default()).unwrap();
//! assert_eq!(conversion.output, "export interface Pet {\n  name: string;\n}\n");
//! ```

pub mod emitter;
pub mod error;
pub mod ir;
pub mod model;
pub mod options;
pub mod resolver;
pub mod spec;

pub use emitter::{Conversion, convert, convert_str};
pub use error::{ConvertError, Warning, WarningKind};
pub use options::ConvertOptions;
