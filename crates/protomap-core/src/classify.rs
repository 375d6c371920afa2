//! Classification of record types into field categories
//!
//! The [`Classifier`] turns a [`TypeDescriptor`] into a [`ClassificationNode`]:
//! the per-type plan the encode and decode traversals follow. Building is a
//! pure function of the type, so nodes can be cached and shared.

use crate::error::{MapperError, MapperResult};
use crate::schema::{FieldDecl, FieldShape, Schema, TypeDescriptor, TypeKind};
use std::any::TypeId;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// How a field is encoded and decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    /// Plain serde data
    Regular,
    /// Delegated to the message codec
    Opaque,
    /// A record traversed recursively
    Nested,
}

/// Classification of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    internal_name: &'static str,
    external_name: String,
    category: FieldCategory,
    optional: bool,
}

impl FieldSpec {
    /// Rust identifier of the field
    pub fn internal_name(&self) -> &'static str {
        self.internal_name
    }

    /// Key used on the wire
    pub fn external_name(&self) -> &str {
        &self.external_name
    }

    pub fn category(&self) -> FieldCategory {
        self.category
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Immutable encode/decode plan for one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationNode {
    type_id: TypeId,
    type_name: &'static str,
    opaque: bool,
    fields: Vec<FieldSpec>,
    children: BTreeMap<&'static str, ClassificationNode>,
}

impl ClassificationNode {
    /// Classify `T` without consulting any cache
    pub fn of<T: Schema>() -> MapperResult<Self> {
        Classifier::new().build(&T::descriptor())
    }

    fn opaque(descriptor: &TypeDescriptor) -> Self {
        Self {
            type_id: descriptor.type_id,
            type_name: descriptor.type_name,
            opaque: true,
            fields: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the whole type is handled by the message codec
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Field classifications in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Classification of a field by internal name
    pub fn field(&self, internal_name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.internal_name == internal_name)
    }

    /// Child node of a `Nested` field, by internal name
    pub fn child(&self, internal_name: &str) -> Option<&ClassificationNode> {
        self.children.get(internal_name)
    }

    pub fn children(&self) -> impl Iterator<Item = (&'static str, &ClassificationNode)> {
        self.children.iter().map(|(name, node)| (*name, node))
    }
}

/// Builds classification nodes, tracking the types currently being
/// classified so self-referencing records fail instead of recursing forever.
#[derive(Debug, Default)]
pub struct Classifier {
    stack: Vec<(TypeId, &'static str)>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the type of a representative instance
    pub fn build_from_instance<T: Schema>(
        &mut self,
        instance: Option<&T>,
    ) -> MapperResult<ClassificationNode> {
        if instance.is_none() {
            return Err(MapperError::NilInput("instance"));
        }
        self.build(&T::descriptor())
    }

    /// Classify a described type
    pub fn build(&mut self, descriptor: &TypeDescriptor) -> MapperResult<ClassificationNode> {
        let decl = match &descriptor.kind {
            TypeKind::Message => return Ok(ClassificationNode::opaque(descriptor)),
            TypeKind::Record(decl) => decl,
        };

        if self.stack.iter().any(|(id, _)| *id == descriptor.type_id) {
            let mut path: Vec<_> = self.stack.iter().map(|(_, name)| *name).collect();
            path.push(descriptor.type_name);
            return Err(MapperError::CycleDetected { path });
        }

        self.stack.push((descriptor.type_id, descriptor.type_name));
        let result = self.build_record(descriptor, &decl.fields, decl.rename_all);
        self.stack.pop();
        result
    }

    fn build_record(
        &mut self,
        descriptor: &TypeDescriptor,
        decls: &[FieldDecl],
        rename_all: Option<&'static str>,
    ) -> MapperResult<ClassificationNode> {
        let rule = rename_all
            .map(|raw| {
                RenameRule::parse(raw).ok_or_else(|| MapperError::TagParse {
                    target: descriptor.type_name.to_string(),
                    tag: raw.to_string(),
                    reason: "unknown rename_all rule".to_string(),
                })
            })
            .transpose()?;

        let mut fields = Vec::with_capacity(decls.len());
        let mut children = BTreeMap::new();
        let mut seen = HashSet::new();

        for decl in decls {
            let Some(naming) = resolve_naming(decl, rule)? else {
                continue;
            };

            if !seen.insert(naming.external_name.clone()) {
                return Err(MapperError::DuplicateName {
                    record: descriptor.type_name,
                    name: naming.external_name,
                });
            }

            let category = match decl.shape {
                FieldShape::Value => FieldCategory::Regular,
                FieldShape::Message => FieldCategory::Opaque,
                FieldShape::Record(describe) => {
                    let child = describe();
                    if child.is_message() {
                        FieldCategory::Opaque
                    } else {
                        let node = self
                            .build(&child)
                            .map_err(|e| e.at_field(&naming.external_name))?;
                        children.insert(decl.ident, node);
                        FieldCategory::Nested
                    }
                }
            };

            fields.push(FieldSpec {
                internal_name: decl.ident,
                external_name: naming.external_name,
                category,
                optional: decl.optional || naming.optional,
            });
        }

        debug!(
            record = descriptor.type_name,
            fields = fields.len(),
            nested = children.len(),
            "classified record"
        );

        Ok(ClassificationNode {
            type_id: descriptor.type_id,
            type_name: descriptor.type_name,
            opaque: false,
            fields,
            children,
        })
    }
}

// ============================================================================
// Naming
// ============================================================================

struct Naming {
    external_name: String,
    optional: bool,
}

/// Resolve a field's external name and tag options; `None` skips the field
fn resolve_naming(decl: &FieldDecl, rule: Option<RenameRule>) -> MapperResult<Option<Naming>> {
    let tag = decl.tag.map(|raw| parse_tag(decl.ident, raw)).transpose()?;

    let (tag_name, optional) = match tag {
        Some(Tag::Skip) => return Ok(None),
        Some(Tag::Named { name, optional }) => (name, optional),
        None => (None, false),
    };

    let external_name = match (tag_name, decl.rename) {
        (Some(name), _) => name.to_string(),
        (None, Some(rename)) => {
            if !is_valid_name(rename) {
                return Err(MapperError::TagParse {
                    target: decl.ident.to_string(),
                    tag: rename.to_string(),
                    reason: "invalid characters in name".to_string(),
                });
            }
            rename.to_string()
        }
        (None, None) => match rule {
            Some(rule) => rule.apply(decl.ident),
            None => decl.ident.to_string(),
        },
    };

    Ok(Some(Naming {
        external_name,
        optional,
    }))
}

#[derive(Debug, PartialEq, Eq)]
enum Tag<'a> {
    Skip,
    Named { name: Option<&'a str>, optional: bool },
}

/// Parse a `name[,option]*` annotation
fn parse_tag<'a>(ident: &str, raw: &'a str) -> MapperResult<Tag<'a>> {
    if raw == "-" {
        return Ok(Tag::Skip);
    }

    let invalid = |reason: String| MapperError::TagParse {
        target: ident.to_string(),
        tag: raw.to_string(),
        reason,
    };

    let (name, options) = match raw.split_once(',') {
        Some((name, options)) => (name, Some(options)),
        None => (raw, None),
    };

    if !name.is_empty() && !is_valid_name(name) {
        return Err(invalid("invalid characters in name".to_string()));
    }

    let mut optional = false;
    for option in options.into_iter().flat_map(|o| o.split(',')) {
        match option {
            "omitempty" | "omitzero" => optional = true,
            "" => return Err(invalid("empty option".to_string())),
            other => return Err(invalid(format!("unsupported option {other:?}"))),
        }
    }

    Ok(Tag::Named {
        name: (!name.is_empty()).then_some(name),
        optional,
    })
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || "!#$%&()*+-./:;<=>?@[]^_{|}~ ".contains(c))
}

/// Container-level renaming rule applied to snake_case identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameRule {
    Lower,
    Camel,
    Pascal,
    Snake,
    ScreamingSnake,
    Kebab,
}

impl RenameRule {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "lowercase" => Some(Self::Lower),
            "camelCase" => Some(Self::Camel),
            "PascalCase" => Some(Self::Pascal),
            "snake_case" => Some(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Some(Self::ScreamingSnake),
            "kebab-case" => Some(Self::Kebab),
            _ => None,
        }
    }

    fn apply(self, ident: &str) -> String {
        match self {
            Self::Lower => ident.to_ascii_lowercase(),
            Self::Snake => ident.to_string(),
            Self::ScreamingSnake => ident.to_ascii_uppercase(),
            Self::Kebab => ident.replace('_', "-"),
            Self::Pascal => to_pascal(ident),
            Self::Camel => {
                let pascal = to_pascal(ident);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

fn to_pascal(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let mut capitalize = true;
    for ch in ident.chars() {
        if ch == '_' {
            capitalize = true;
        } else if capitalize {
            out.extend(ch.to_uppercase());
            capitalize = false;
        } else {
            out.push(ch);
        }
    }
    out
}
