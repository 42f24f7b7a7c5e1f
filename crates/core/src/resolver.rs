//! Reference resolution and cycle detection.

use indexmap::IndexMap;

use crate::error::ConvertError;
use crate::model::{
    DefinitionTable, ParameterEntry, ParameterSlot, SchemaKind, SchemaModel, SchemaNode,
    escape_pointer_segment,
};

/// A resolved schema pointer.
#[derive(Debug, Clone)]
pub struct Target<'m> {
    /// Position of the enclosing definition in the definition table.
    pub definition: usize,
    /// Canonical pointer of the target node.
    pub pointer: String,
    /// The target node.
    pub node: &'m SchemaNode,
    /// Whether the target is the definition root itself.
    pub is_root: bool,
}

/// Outcome of [`Resolver::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// The pointer was pushed on the stack; call [`Resolver::leave`] when done.
    Entered,
    /// The pointer is already on the stack.
    Cycle {
        /// An object property or array item lies between the two visits.
        guarded: bool,
    },
}

/// Upper bound on references followed while resolving one pointer.
const MAX_HOPS: usize = 256;

#[derive(Debug)]
struct Frame {
    pointer: String,
    guard_depth: usize,
}

/// Resolves local JSON pointers and tracks the active resolution chain.
#[derive(Debug)]
pub struct Resolver<'m> {
    definitions: &'m DefinitionTable,
    parameters: &'m IndexMap<String, ParameterSlot>,
    stack: Vec<Frame>,
}

impl<'m> Resolver<'m> {
    /// Resolver over one model.
    pub fn new(model: &'m SchemaModel) -> Self {
        Self {
            definitions: &model.definitions,
            parameters: &model.parameters,
            stack: Vec::new(),
        }
    }

    /// Resolve a schema pointer.
    ///
    /// References crossed while walking into a definition are followed.
    /// A chain of pointers that comes back to itself is an error.
    pub fn resolve(&self, pointer: &str) -> Result<Target<'m>, ConvertError> {
        let mut visited: Vec<String> = Vec::new();
        let mut segments = parse_pointer(pointer)?;

        loop {
            let canonical = canonical_pointer(&segments);
            if visited.contains(&canonical) || visited.len() > MAX_HOPS {
                return Err(ConvertError::resolution(
                    pointer,
                    format!("reference loop through `{canonical}`"),
                ));
            }
            visited.push(canonical);

            let (definition, rest) = self.definition_root(pointer, &segments)?;
            let root = &self
                .definitions
                .get(definition)
                .ok_or_else(|| ConvertError::resolution(pointer, "definition table is inconsistent"))?
                .root;

            match walk(root, rest) {
                Walk::Done(node) => {
                    return Ok(Target {
                        definition,
                        pointer: canonical_pointer(&segments),
                        node,
                        is_root: rest.is_empty(),
                    });
                }
                Walk::Follow(next, remaining) => {
                    let mut followed = parse_pointer(next)?;
                    followed.extend_from_slice(remaining);
                    segments = followed;
                }
                Walk::Missing(at) => {
                    return Err(ConvertError::resolution(
                        pointer,
                        format!("no schema node at `{at}`"),
                    ));
                }
            }
        }
    }

    /// Resolve a parameter slot to its entry, following parameter references.
    pub fn resolve_parameter(
        &self,
        slot: &'m ParameterSlot,
    ) -> Result<&'m ParameterEntry, ConvertError> {
        let mut current = slot;
        let mut visited: Vec<String> = Vec::new();
        loop {
            match current {
                ParameterSlot::Inline(entry) => return Ok(entry),
                ParameterSlot::Reference(pointer) => {
                    let canonical = canonical_pointer(&parse_pointer(pointer)?);
                    if visited.contains(&canonical) {
                        return Err(ConvertError::resolution(pointer, "parameter reference loop"));
                    }
                    current = self.parameters.get(&canonical).ok_or_else(|| {
                        ConvertError::resolution(pointer, "no reusable parameter with this name")
                    })?;
                    visited.push(canonical);
                }
            }
        }
    }

    /// Push a pointer on the resolution chain.
    ///
    /// `guard_depth` is the number of object-property and array-item
    /// boundaries on the current traversal path.
    pub fn enter(&mut self, pointer: &str, guard_depth: usize) -> Visit {
        if let Some(frame) = self.stack.iter().rev().find(|f| f.pointer == pointer) {
            return Visit::Cycle {
                guarded: guard_depth > frame.guard_depth,
            };
        }
        self.stack.push(Frame {
            pointer: pointer.to_string(),
            guard_depth,
        });
        Visit::Entered
    }

    /// Pop the innermost pointer pushed by [`Resolver::enter`].
    pub fn leave(&mut self) {
        self.stack.pop();
    }

    fn definition_root<'s>(
        &self,
        pointer: &str,
        segments: &'s [String],
    ) -> Result<(usize, &'s [String]), ConvertError> {
        let (prefix, name, rest) = match segments {
            [section, name, rest @ ..] if section == "definitions" => ("#/definitions", name, rest),
            [section, sub, name, rest @ ..] if section == "components" && sub == "schemas" => {
                ("#/components/schemas", name, rest)
            }
            _ => {
                return Err(ConvertError::resolution(
                    pointer,
                    "pointer does not start at a schema definition",
                ));
            }
        };
        let root = format!("{prefix}/{}", escape_pointer_segment(name));
        let index = self.definitions.index_of(&root).ok_or_else(|| {
            ConvertError::resolution(pointer, format!("no definition named `{name}`"))
        })?;
        Ok((index, rest))
    }
}

enum Walk<'m, 's> {
    Done(&'m SchemaNode),
    Follow(&'m str, &'s [String]),
    Missing(String),
}

fn walk<'m, 's>(root: &'m SchemaNode, segments: &'s [String]) -> Walk<'m, 's> {
    let mut node = root;
    let mut index = 0;
    while index < segments.len() {
        if let SchemaKind::Reference { pointer } = &node.kind {
            return Walk::Follow(pointer, &segments[index..]);
        }
        let next = segments.get(index + 1).map(String::as_str);
        match node.child(&segments[index], next) {
            Some((child, used)) => {
                node = child;
                index += used;
            }
            None => return Walk::Missing(segments[..=index].join("/")),
        }
    }
    Walk::Done(node)
}

/// Split a local JSON pointer into unescaped segments.
fn parse_pointer(pointer: &str) -> Result<Vec<String>, ConvertError> {
    let Some(fragment) = pointer.strip_prefix('#') else {
        let reason = if pointer.contains('#') {
            "external document references are not supported"
        } else {
            "only local `#/...` pointers are supported"
        };
        return Err(ConvertError::resolution(pointer, reason));
    };
    let Some(path) = fragment.strip_prefix('/') else {
        return Err(ConvertError::resolution(pointer, "not a JSON pointer"));
    };
    Ok(path
        .split('/')
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect())
}

fn canonical_pointer(segments: &[String]) -> String {
    let mut pointer = String::from("#");
    for segment in segments {
        pointer.push('/');
        pointer.push_str(&escape_pointer_segment(segment));
    }
    pointer
}
