//! Conversion options.

use serde::Deserialize;

/// Options consumed by [`convert`](crate::convert).
///
/// Deserializes from the camelCase keys used by config files
/// (`namespace`, `withQuery`, `sortProps`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Wrap every declaration in `declare namespace <name> { ... }`.
    pub namespace: Option<String>,
    /// Also emit one interface per operation's query parameters.
    pub with_query: bool,
    /// Order object properties lexicographically.
    pub sort_props: bool,
}
