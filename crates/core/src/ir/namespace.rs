//! Optional enclosing `declare namespace`.

use super::types::{TsModule, TsTypeDef};
use super::utils::is_declarable;
use crate::error::ConvertError;

/// Wrap declarations in a module, validating the namespace name.
///
/// Dotted names (`Foo.Bar`) are accepted; every segment must be a plain,
/// non-reserved identifier. Declarations are never renamed.
pub fn organize(types: Vec<TsTypeDef>, namespace: Option<&str>) -> Result<TsModule, ConvertError> {
    if let Some(name) = namespace
        && !name.split('.').all(is_declarable)
    {
        return Err(ConvertError::InvalidNamespace(name.to_string()));
    }
    Ok(TsModule {
        namespace: namespace.map(str::to_string),
        types,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::emit::Emit;
    use crate::ir::types::{TsPrimitive, TsType, TypeDefKind};

    fn alias(name: &str) -> TsTypeDef {
        TsTypeDef {
            name: name.to_string(),
            exported: true,
            doc: None,
            kind: TypeDefKind::TypeAlias {
                ty: TsType::Primitive(TsPrimitive::Boolean),
            },
        }
    }

    #[test]
    fn test_dotted_namespace() {
        let module = organize(vec![alias("Flag")], Some("Acme.Api")).unwrap();
        assert_eq!(
            module.emit(),
            "declare namespace Acme.Api {\n  export type Flag = boolean;\n}\n"
        );
    }

    #[test]
    fn test_invalid_namespaces() {
        for name in ["", "1Api", "Api-v2", "Api..V2", "class", "Api.default"] {
            let err = organize(Vec::new(), Some(name)).unwrap_err();
            assert!(
                matches!(err, ConvertError::InvalidNamespace(ref n) if n == name),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_no_namespace_keeps_declarations() {
        let module = organize(vec![alias("A"), alias("B")], None).unwrap();
        assert!(module.namespace.is_none());
        assert_eq!(module.types.len(), 2);
    }
}
