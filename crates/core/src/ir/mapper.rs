//! Schema node -> type expression.

use indexmap::{IndexMap, IndexSet};

use super::builder::{Slot, Synthesizer};
use super::types::{TsLiteral, TsObject, TsPrimitive, TsProp, TsType};
use crate::error::{ConvertError, WarningKind};
use crate::model::{
    Additional, CompositeKind, Literal, PrimitiveKind, SchemaKind, SchemaNode,
    escape_pointer_segment,
};
use crate::resolver::Visit;

impl<'m> Synthesizer<'m> {
    /// Map one node, appending `| null` when it is nullable.
    pub(super) fn map_type(&mut self, node: &'m SchemaNode) -> Result<TsType, ConvertError> {
        let ty = self.map_kind(node)?;
        Ok(if node.nullable { ty.nullable() } else { ty })
    }

    fn map_kind(&mut self, node: &'m SchemaNode) -> Result<TsType, ConvertError> {
        match &node.kind {
            SchemaKind::Any => Ok(TsType::ANY),
            SchemaKind::Primitive { kind, .. } => Ok(TsType::Primitive(primitive(*kind))),
            SchemaKind::Enum { values } => Ok(enum_type(values)),
            SchemaKind::Array { items } => {
                let items = self.descend(&["items"], true, |s| s.map_type(items))?;
                Ok(TsType::Array(Box::new(items)))
            }
            SchemaKind::Object {
                properties,
                required,
                additional,
            } => Ok(TsType::Object(self.map_object(properties, required, additional)?)),
            SchemaKind::Reference { pointer } => self.map_reference(pointer),
            SchemaKind::Composite { kind, members } => self.map_composite(*kind, members),
            SchemaKind::Unsupported { construct } => {
                self.warn(
                    WarningKind::UnsupportedConstruct,
                    format!("{construct} cannot be expressed; using `any`"),
                );
                Ok(TsType::ANY)
            }
        }
    }

    /// Structural object type, also used for interface bodies.
    pub(super) fn map_object(
        &mut self,
        properties: &'m IndexMap<String, SchemaNode>,
        required: &IndexSet<String>,
        additional: &'m Additional,
    ) -> Result<TsObject, ConvertError> {
        let mut props = Vec::with_capacity(properties.len());
        for (name, node) in properties {
            let ty = self.descend(&["properties", name.as_str()], true, |s| s.map_type(node))?;
            props.push(TsProp {
                name: name.clone(),
                ty,
                optional: !required.contains(name),
                doc: node.description.clone(),
                format: primitive_format(node),
            });
        }

        let index = match additional {
            Additional::Closed => None,
            Additional::Open => Some(Box::new(TsType::ANY)),
            Additional::Typed(node) => Some(Box::new(self.descend(
                &["additionalProperties"],
                true,
                |s| s.map_type(node),
            )?)),
        };

        let mut object = TsObject { props, index };
        if self.sort_props {
            object.sort_props();
        }
        Ok(object)
    }

    /// Reference to a named definition: triggers its synthesis and renders
    /// its name, or `any` when it closes a cycle of aliases.
    pub(super) fn reference_definition(&mut self, index: usize) -> Result<TsType, ConvertError> {
        let name = self.names[index].clone();
        if matches!(self.slots[index], Slot::Done(_)) {
            return Ok(TsType::Ref(name));
        }

        let model = self.model;
        let Some(definition) = model.definitions.get(index) else {
            return Ok(TsType::Ref(name));
        };
        match self.resolver.enter(&definition.pointer, self.guard_depth) {
            Visit::Entered => {
                let result = self.synthesize(index, definition);
                self.resolver.leave();
                result?;
                Ok(TsType::Ref(name))
            }
            Visit::Cycle { guarded: true } => Ok(TsType::Ref(name)),
            Visit::Cycle { guarded: false } => {
                self.warn(
                    WarningKind::CircularAlias,
                    format!("reference to `{name}` closes a cycle of type aliases; using `any`"),
                );
                Ok(TsType::ANY)
            }
        }
    }

    fn map_reference(&mut self, pointer: &str) -> Result<TsType, ConvertError> {
        let target = self.resolver.resolve(pointer)?;
        if target.is_root {
            return self.reference_definition(target.definition);
        }

        // A pointer into the middle of a definition has no name of its own.
        match self.resolver.enter(&target.pointer, self.guard_depth) {
            Visit::Entered => {
                let saved = std::mem::replace(&mut self.location, target.pointer.clone());
                let result = self.map_type(target.node);
                self.location = saved;
                self.resolver.leave();
                result
            }
            Visit::Cycle { .. } => {
                self.warn(
                    WarningKind::UnsupportedConstruct,
                    format!("recursive reference `{pointer}` into an unnamed schema; using `any`"),
                );
                Ok(TsType::ANY)
            }
        }
    }

    fn map_composite(
        &mut self,
        kind: CompositeKind,
        members: &'m [SchemaNode],
    ) -> Result<TsType, ConvertError> {
        let flat = flatten(kind, members);
        if kind.is_union() {
            let mut types = Vec::with_capacity(flat.len());
            for (segments, member) in flat {
                let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
                types.push(self.descend(&segments, false, |s| s.map_type(member))?);
            }
            return Ok(match types.len() {
                0 => TsType::ANY,
                1 => types.remove(0),
                _ => TsType::Union(types),
            });
        }
        self.map_all_of(flat)
    }

    /// Intersection. Inline object members merge into one object placed at
    /// the first such member; `required` is the union over all members.
    /// Members without any keyword add nothing and are skipped.
    fn map_all_of(&mut self, flat: Vec<(Vec<String>, &'m SchemaNode)>) -> Result<TsType, ConvertError> {
        let required: IndexSet<String> = flat
            .iter()
            .filter_map(|(_, member)| match &member.kind {
                SchemaKind::Object { required, .. } => Some(required.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect();

        let has_others = flat.len() > 1;
        let mut operands: Vec<Option<TsType>> = Vec::with_capacity(flat.len());
        let mut merged: Option<TsObject> = None;
        for (segments, member) in flat {
            let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
            match &member.kind {
                SchemaKind::Any if has_others && !member.nullable => {}
                SchemaKind::Object {
                    properties,
                    additional,
                    ..
                } if !member.nullable => {
                    let object = self.descend(&segments, false, |s| {
                        s.map_object(properties, &required, additional)
                    })?;
                    match merged.as_mut() {
                        Some(target) => merge_object(target, object),
                        None => {
                            merged = Some(object);
                            operands.push(None);
                        }
                    }
                }
                _ => operands.push(Some(self.descend(&segments, false, |s| s.map_type(member))?)),
            }
        }

        if let Some(object) = merged.as_mut()
            && self.sort_props
        {
            object.sort_props();
        }
        let keep_merged = merged
            .as_ref()
            .is_some_and(|o| !o.props.is_empty() || o.index.is_some())
            || operands.len() == 1;

        let mut types: Vec<TsType> = Vec::with_capacity(operands.len());
        for operand in operands {
            match operand {
                Some(ty) => types.push(ty),
                None => {
                    if keep_merged && let Some(object) = merged.take() {
                        types.push(TsType::Object(object));
                    }
                }
            }
        }

        Ok(match types.len() {
            0 => TsType::ANY,
            1 => types.remove(0),
            _ => TsType::Intersection(types),
        })
    }

    /// Run `f` one or more pointer segments deeper. `guard` marks an object
    /// property, array item or additionalProperties boundary.
    pub(super) fn descend<T>(
        &mut self,
        segments: &[&str],
        guard: bool,
        f: impl FnOnce(&mut Self) -> Result<T, ConvertError>,
    ) -> Result<T, ConvertError> {
        let len = self.location.len();
        for segment in segments {
            self.location.push('/');
            self.location.push_str(&escape_pointer_segment(segment));
        }
        if guard {
            self.guard_depth += 1;
        }
        let result = f(self);
        if guard {
            self.guard_depth -= 1;
        }
        self.location.truncate(len);
        result
    }
}

/// Members of a composite with same-family composites lifted one level.
fn flatten(kind: CompositeKind, members: &[SchemaNode]) -> Vec<(Vec<String>, &SchemaNode)> {
    let keyword = kind.keyword();
    let mut flat = Vec::with_capacity(members.len());
    for (i, member) in members.iter().enumerate() {
        match &member.kind {
            SchemaKind::Composite {
                kind: inner,
                members: inner_members,
            } if inner.is_union() == kind.is_union() && !member.nullable => {
                for (j, inner_member) in inner_members.iter().enumerate() {
                    let segments = vec![
                        keyword.to_string(),
                        i.to_string(),
                        inner.keyword().to_string(),
                        j.to_string(),
                    ];
                    flat.push((segments, inner_member));
                }
            }
            _ => flat.push((vec![keyword.to_string(), i.to_string()], member)),
        }
    }
    flat
}

fn merge_object(target: &mut TsObject, object: TsObject) {
    for prop in object.props {
        match target.props.iter_mut().find(|p| p.name == prop.name) {
            Some(existing) => {
                if existing.ty != prop.ty {
                    existing.ty = intersect(existing.ty.clone(), prop.ty);
                }
                existing.optional = existing.optional && prop.optional;
                if existing.doc.is_none() {
                    existing.doc = prop.doc;
                }
            }
            None => target.props.push(prop),
        }
    }
    target.index = match (target.index.take(), object.index) {
        (Some(a), Some(b)) if a != b => Some(Box::new(intersect(*a, *b))),
        (a, b) => a.or(b),
    };
}

fn intersect(left: TsType, right: TsType) -> TsType {
    match left {
        TsType::Intersection(mut types) => {
            if !types.contains(&right) {
                types.push(right);
            }
            TsType::Intersection(types)
        }
        left => TsType::Intersection(vec![left, right]),
    }
}

fn primitive(kind: PrimitiveKind) -> TsPrimitive {
    match kind {
        PrimitiveKind::String => TsPrimitive::String,
        PrimitiveKind::Number | PrimitiveKind::Integer => TsPrimitive::Number,
        PrimitiveKind::Boolean => TsPrimitive::Boolean,
        PrimitiveKind::Null => TsPrimitive::Null,
    }
}

pub(super) fn primitive_format(node: &SchemaNode) -> Option<String> {
    match &node.kind {
        SchemaKind::Primitive { format, .. } => format.clone(),
        _ => None,
    }
}

fn enum_type(values: &[Literal]) -> TsType {
    let mut unique: Vec<&Literal> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    let mut literals: Vec<TsType> = unique
        .into_iter()
        .map(|value| {
            TsType::Literal(match value {
                Literal::String(s) => TsLiteral::String(s.clone()),
                Literal::Integer(i) => TsLiteral::Int(*i),
                Literal::Float(f) => TsLiteral::Number(*f),
                Literal::Bool(b) => TsLiteral::Bool(*b),
                Literal::Null => TsLiteral::Null,
            })
        })
        .collect();
    if literals.len() == 1 {
        literals.remove(0)
    } else {
        TsType::Union(literals)
    }
}
