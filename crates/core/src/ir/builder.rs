//! Named declarations: one per definition, plus optional query interfaces.

use std::collections::HashSet;

use tracing::debug;

use super::mapper::primitive_format;
use super::types::{TsObject, TsProp, TsTypeDef, TypeDefKind};
use super::utils::{pascal_case, sanitize_type_name};
use crate::error::{ConvertError, Warning, WarningKind};
use crate::model::{
    Definition, Operation, ParameterEntry, ParameterLocation, ParameterSlot, SchemaKind,
    SchemaModel,
};
use crate::options::ConvertOptions;
use crate::resolver::Resolver;

/// Synthesis state of one definition.
#[derive(Debug)]
pub(super) enum Slot {
    Pending,
    InProgress,
    Done(TsTypeDef),
}

/// Hands out unique declaration names in claim order.
#[derive(Debug, Default)]
struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    fn claim(&mut self, base: String, pointer: &str, warnings: &mut Vec<Warning>) -> String {
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        let unique = loop {
            let candidate = format!("{base}{n}");
            if !self.taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        warnings.push(Warning {
            kind: WarningKind::DuplicateName,
            pointer: pointer.to_string(),
            message: format!("`{base}` is already declared; using `{unique}`"),
        });
        self.taken.insert(unique.clone());
        unique
    }
}

/// Depth-first declaration synthesis over one model.
#[derive(Debug)]
pub(super) struct Synthesizer<'m> {
    pub(super) model: &'m SchemaModel,
    pub(super) resolver: Resolver<'m>,
    /// Declaration name per definition.
    pub(super) names: Vec<String>,
    pub(super) slots: Vec<Slot>,
    pub(super) warnings: Vec<Warning>,
    /// Pointer of the node being mapped, for warnings.
    pub(super) location: String,
    /// Object-property and array-item boundaries on the current path.
    pub(super) guard_depth: usize,
    pub(super) sort_props: bool,
    registry: NameRegistry,
}

impl<'m> Synthesizer<'m> {
    pub(super) fn new(model: &'m SchemaModel, sort_props: bool) -> Self {
        let mut registry = NameRegistry::default();
        let mut warnings = Vec::new();
        let names = model
            .definitions
            .iter()
            .map(|def| registry.claim(sanitize_type_name(&def.name), &def.pointer, &mut warnings))
            .collect();
        Self {
            model,
            resolver: Resolver::new(model),
            names,
            slots: model.definitions.iter().map(|_| Slot::Pending).collect(),
            warnings,
            location: String::from("#"),
            guard_depth: 0,
            sort_props,
            registry,
        }
    }

    pub(super) fn warn(&mut self, kind: WarningKind, message: String) {
        self.warnings.push(Warning {
            kind,
            pointer: self.location.clone(),
            message,
        });
    }

    /// Produce the declaration of a definition whose pointer was just entered.
    pub(super) fn synthesize(
        &mut self,
        index: usize,
        definition: &'m Definition,
    ) -> Result<(), ConvertError> {
        self.slots[index] = Slot::InProgress;
        let saved = std::mem::replace(&mut self.location, definition.pointer.clone());
        let result = self.build_declaration(index, definition);
        self.location = saved;
        self.slots[index] = Slot::Done(result?);
        Ok(())
    }

    fn build_declaration(
        &mut self,
        index: usize,
        definition: &'m Definition,
    ) -> Result<TsTypeDef, ConvertError> {
        let root = &definition.root;
        let kind = match &root.kind {
            SchemaKind::Object {
                properties,
                required,
                additional,
            } if !root.nullable => {
                TypeDefKind::Interface(self.map_object(properties, required, additional)?)
            }
            _ => TypeDefKind::TypeAlias {
                ty: self.map_type(root)?,
            },
        };
        Ok(TsTypeDef {
            name: self.names[index].clone(),
            exported: true,
            doc: root.description.clone(),
            kind,
        })
    }

    /// Resolve one parameter list, rejecting duplicates. Each entry comes
    /// with the pointer of the parameter object it was read from.
    fn parameter_list(
        &self,
        slots: &'m [ParameterSlot],
        pointer: &str,
    ) -> Result<Vec<(String, &'m ParameterEntry)>, ConvertError> {
        let mut entries: Vec<(String, &'m ParameterEntry)> = Vec::with_capacity(slots.len());
        for (index, slot) in slots.iter().enumerate() {
            let entry = self.resolver.resolve_parameter(slot)?;
            if entries.iter().any(|(_, e)| same_parameter(e, entry)) {
                return Err(ConvertError::MalformedDocument(format!(
                    "duplicate parameter `{}` at {pointer}",
                    entry.name
                )));
            }
            let source = match slot {
                ParameterSlot::Inline(_) => format!("{pointer}/parameters/{index}"),
                ParameterSlot::Reference(target) => target.clone(),
            };
            entries.push((source, entry));
        }
        Ok(entries)
    }

    /// Interface of an operation's query parameters, if it has any.
    fn query_declaration(&mut self, op: &'m Operation) -> Result<Option<TsTypeDef>, ConvertError> {
        let item_pointer = op
            .pointer
            .rsplit_once('/')
            .map_or(op.pointer.as_str(), |(item, _)| item);
        let mut merged = self.parameter_list(&op.path_parameters, item_pointer)?;
        for (source, entry) in self.parameter_list(&op.parameters, &op.pointer)? {
            match merged.iter().position(|(_, e)| same_parameter(e, entry)) {
                Some(pos) => merged[pos] = (source, entry),
                None => merged.push((source, entry)),
            }
        }

        let query: Vec<_> = merged
            .into_iter()
            .filter(|(_, entry)| entry.location == ParameterLocation::Query)
            .collect();
        if query.is_empty() {
            return Ok(None);
        }

        let mut props = Vec::with_capacity(query.len());
        for (source, entry) in query {
            let segments: &[&str] = if entry.nested_schema { &["schema"] } else { &[] };
            let saved = std::mem::replace(&mut self.location, source);
            let ty = self.descend(segments, true, |s| s.map_type(&entry.schema));
            self.location = saved;
            let ty = ty?;
            props.push(TsProp {
                name: entry.name.clone(),
                ty,
                optional: !entry.required,
                doc: entry.description.clone(),
                format: primitive_format(&entry.schema),
            });
        }
        let mut object = TsObject { props, index: None };
        if self.sort_props {
            object.sort_props();
        }

        let base = match &op.operation_id {
            Some(id) => format!("{}Query", pascal_case(id)),
            None => format!("{}{}Query", pascal_case(&op.method), pascal_case(&op.path)),
        };
        let name = self
            .registry
            .claim(sanitize_type_name(&base), &op.pointer, &mut self.warnings);

        Ok(Some(TsTypeDef {
            name,
            exported: true,
            doc: None,
            kind: TypeDefKind::Interface(object),
        }))
    }
}

fn same_parameter(a: &ParameterEntry, b: &ParameterEntry) -> bool {
    a.name == b.name && a.location == b.location
}

/// Build every declaration of the document, in production order.
///
/// Definitions come first, in document order; query interfaces follow in
/// operation order when `with_query` is set.
pub fn build_declarations(
    model: &SchemaModel,
    options: &ConvertOptions,
) -> Result<(Vec<TsTypeDef>, Vec<Warning>), ConvertError> {
    let mut synth = Synthesizer::new(model, options.sort_props);

    for index in 0..model.definitions.len() {
        synth.reference_definition(index)?;
    }

    let mut queries = Vec::new();
    if options.with_query {
        let operations = model.operations.as_ref().ok_or_else(|| {
            ConvertError::MalformedDocument(
                "`withQuery` requires a document with `paths`".to_string(),
            )
        })?;
        for op in operations {
            queries.extend(synth.query_declaration(op)?);
        }
    }

    let mut declarations: Vec<TsTypeDef> = std::mem::take(&mut synth.slots)
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Done(def) => Some(def),
            Slot::Pending | Slot::InProgress => None,
        })
        .collect();
    declarations.extend(queries);

    debug!(
        declarations = declarations.len(),
        warnings = synth.warnings.len(),
        "Built declarations."
    );
    Ok((declarations, synth.warnings))
}
