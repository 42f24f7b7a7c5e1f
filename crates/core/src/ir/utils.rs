//! Identifier and literal helpers shared by the builder and the emitter.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::LazyLock;

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Predefined type names a declaration cannot take.
pub static TS_BUILTIN_TYPES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "any",
        "bigint",
        "boolean",
        "never",
        "number",
        "object",
        "string",
        "symbol",
        "type",
        "undefined",
        "unknown",
    ]
    .into_iter()
    .collect()
});

/// Check if a property name must be quoted.
///
/// Returns true if the name:
/// - Is empty
/// - Doesn't start with a letter, underscore, or dollar sign
/// - Contains characters other than alphanumeric, underscore, or dollar sign
pub fn needs_bracket_notation(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Whether `name` can be declared as-is: a plain identifier that is neither
/// reserved nor a predefined type.
pub fn is_declarable(name: &str) -> bool {
    !needs_bracket_notation(name)
        && !TS_RESERVED_WORDS.contains(name)
        && !TS_BUILTIN_TYPES.contains(name)
}

/// Escape a string for use in a double-quoted TypeScript string literal.
/// Escapes backslashes, double quotes and control characters.
pub fn escape_js_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(escaped, "\\u{:04x}", u32::from(c));
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Quote a string if needed for use as a property key.
pub fn quote_if_needed(name: &str) -> String {
    if needs_bracket_notation(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Drop runs of characters that cannot appear in an identifier, upper-casing
/// the letter that follows each dropped run.
fn strip_invalid(name: &str, capitalize_first_letter: bool) -> String {
    let mut result = String::with_capacity(name.len());
    let mut upper_next = capitalize_first_letter;
    for c in name.chars() {
        if is_identifier_char(c) {
            if upper_next {
                result.extend(c.to_uppercase());
                upper_next = false;
            } else {
                result.push(c);
            }
        } else {
            upper_next = upper_next || !result.is_empty();
        }
    }
    result
}

/// Turn a definition key into a declarable type name.
///
/// - `Page«Pet»` becomes `PagePet`, `pet-info` becomes `petInfo`
/// - Prepends `_` if it starts with a digit
/// - Prepends `_` to reserved words and predefined type names
pub fn sanitize_type_name(name: &str) -> String {
    let result = strip_invalid(name, false);
    if result.is_empty() {
        return "_empty".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit())
        || TS_RESERVED_WORDS.contains(result.as_str())
        || TS_BUILTIN_TYPES.contains(result.as_str())
    {
        return format!("_{result}");
    }
    result
}

/// PascalCase an arbitrary string (`listPets` → `ListPets`, `pets/{petId}` → `PetsPetId`).
pub fn pascal_case(s: &str) -> String {
    strip_invalid(s, true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_bracket_notation() {
        assert!(!needs_bracket_notation("foo"));
        assert!(!needs_bracket_notation("_foo"));
        assert!(!needs_bracket_notation("$foo"));
        assert!(!needs_bracket_notation("foo123"));

        assert!(needs_bracket_notation(""));
        assert!(needs_bracket_notation("123foo"));
        assert!(needs_bracket_notation("foo-bar"));
        assert!(needs_bracket_notation("foo bar"));
        assert!(needs_bracket_notation("x-rate-limit"));
    }

    #[test]
    fn test_escape_js_string() {
        assert_eq!(escape_js_string("hello"), "hello");
        assert_eq!(escape_js_string("hel\"lo"), "hel\\\"lo");
        assert_eq!(escape_js_string("hel\\lo"), "hel\\\\lo");
        assert_eq!(escape_js_string("a\nb\tc"), "a\\nb\\tc");
        assert_eq!(escape_js_string("\u{1}"), "\\u0001");
    }

    #[test]
    fn test_quote_if_needed() {
        assert_eq!(quote_if_needed("foo"), "foo");
        assert_eq!(quote_if_needed("foo-bar"), "\"foo-bar\"");
        assert_eq!(quote_if_needed("123"), "\"123\"");
    }

    #[test]
    fn test_sanitize_type_name() {
        assert_eq!(sanitize_type_name("Pet"), "Pet");
        assert_eq!(sanitize_type_name("Page«Pet»"), "PagePet");
        assert_eq!(sanitize_type_name("pet-info"), "petInfo");
        assert_eq!(sanitize_type_name("com.example.Pet"), "comExamplePet");
        assert_eq!(sanitize_type_name("1Pet"), "_1Pet");
        assert_eq!(sanitize_type_name("delete"), "_delete");
        assert_eq!(sanitize_type_name("string"), "_string");
        assert_eq!(sanitize_type_name("«»"), "_empty");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("listPets"), "ListPets");
        assert_eq!(pascal_case("get"), "Get");
        assert_eq!(pascal_case("/pets/{petId}"), "PetsPetId");
        assert_eq!(pascal_case("list_pets"), "List_pets");
    }

    #[test]
    fn test_is_declarable() {
        assert!(is_declarable("Api"));
        assert!(!is_declarable("class"));
        assert!(!is_declarable("any"));
        assert!(!is_declarable("1Api"));
        assert!(!is_declarable(""));
    }
}
