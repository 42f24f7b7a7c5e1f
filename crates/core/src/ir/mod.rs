//! Declaration synthesis.
//!
//! - `types`: TypeScript declaration IR (TsType, TsObject, TsTypeDef, TsModule)
//! - `mapper`: schema node -> type expression
//! - `builder`: definitions and operations -> named declarations
//! - `namespace`: optional enclosing `declare namespace`
//! - `emit`: IR -> text (via the `Emit` trait)
//! - `utils`: identifier and literal helpers shared by the above

mod builder;
mod emit;
mod mapper;
mod namespace;
mod types;
pub mod utils;

pub use builder::build_declarations;
pub use emit::Emit;
pub use namespace::organize;
pub use types::{TsLiteral, TsModule, TsObject, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind};
