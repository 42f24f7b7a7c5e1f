//! TypeScript declaration emission via the Emit trait.
//!
//! Every IR node renders itself; the emitter never inspects the schema model.

use super::types::{TsLiteral, TsModule, TsObject, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind};
use super::utils::{escape_js_string, quote_if_needed};

const INDENT: &str = "  ";

/// Trait for emitting TypeScript code from IR nodes.
pub trait Emit {
    /// Convert the IR node to its TypeScript string representation.
    fn emit(&self) -> String;
}

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Any => "any",
        }
        .to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

fn is_negative_literal(ty: &TsType) -> bool {
    match ty {
        TsType::Literal(TsLiteral::Int(i)) => *i < 0,
        TsType::Literal(TsLiteral::Number(n)) => n.is_sign_negative(),
        _ => false,
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                if matches!(**inner, TsType::Union(_) | TsType::Intersection(_))
                    || is_negative_literal(inner)
                {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(types) => types.iter().map(Emit::emit).collect::<Vec<_>>().join(" | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    let s = t.emit();
                    if matches!(t, TsType::Union(_)) {
                        format!("({s})")
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(object) => object.emit(),
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
        }
    }
}

fn index_signature(value: &TsType) -> String {
    format!("[key: string]: {}", value.emit())
}

impl Emit for TsObject {
    fn emit(&self) -> String {
        let mut parts: Vec<_> = self.props.iter().map(Emit::emit).collect();
        parts.extend(self.index.as_deref().map(index_signature));
        if parts.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", parts.join("; "))
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{key}{opt}: {}", self.ty.emit())
    }
}

/// Render a `/** ... */` block. `*/` inside the text is broken up.
fn doc_comment(text: &str, indent: &str) -> String {
    let text = text.trim().replace("*/", "*\\/");
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    if let [line] = lines.as_slice() {
        return format!("{indent}/** {line} */\n");
    }
    let mut output = format!("{indent}/**\n");
    for line in lines {
        if line.is_empty() {
            output.push_str(&format!("{indent} *\n"));
        } else {
            output.push_str(&format!("{indent} * {line}\n"));
        }
    }
    output.push_str(&format!("{indent} */\n"));
    output
}

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let mut output = self
            .doc
            .as_deref()
            .map(|doc| doc_comment(doc, ""))
            .unwrap_or_default();
        let export = if self.exported { "export " } else { "" };
        match &self.kind {
            TypeDefKind::Interface(object) => {
                output.push_str(&format!("{export}interface {} {{\n", self.name));
                for prop in &object.props {
                    if let Some(doc) = &prop.doc {
                        output.push_str(&doc_comment(doc, INDENT));
                    }
                    output.push_str(&format!("{INDENT}{};", prop.emit()));
                    if let Some(format) = &prop.format {
                        output.push_str(&format!(" // {}", format.replace(['\n', '\r'], " ")));
                    }
                    output.push('\n');
                }
                if let Some(index) = &object.index {
                    output.push_str(&format!("{INDENT}{};\n", index_signature(index)));
                }
                output.push_str("}\n");
            }
            TypeDefKind::TypeAlias { ty } => {
                output.push_str(&format!("{export}type {} = {};\n", self.name, ty.emit()));
            }
        }
        output
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let body = self.types.iter().map(Emit::emit).collect::<Vec<_>>().join("\n");
        let Some(namespace) = &self.namespace else {
            return body;
        };
        let mut output = format!("declare namespace {namespace} {{\n");
        for line in body.lines() {
            if !line.is_empty() {
                output.push_str(INDENT);
                output.push_str(line);
            }
            output.push('\n');
        }
        output.push_str("}\n");
        output
    }
}
