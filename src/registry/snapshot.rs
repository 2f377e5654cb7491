//! Offline registry: a JSON dump of the libvips type table.
//!
//! Parent links are resolved after every type is declared, so documents may
//! list types in any order. Fundamental kinds come from the nearest built-in
//! root on the parent chain.
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use serde::Deserialize;

use super::{
    Argument, ArgumentFlags, Fundamental, OperationDescriptor, PropertyDescriptor, Registry,
    RegistryError, TypeDescriptor, TypeId,
};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// One snapshot document, as found on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub types: Vec<TypeRecord>,
    pub operations: IndexMap<String, OperationRecord>,
    pub enums: IndexMap<String, Vec<String>>,
    pub image_properties: Vec<PropertyRecord>,
    /// Declared, but invisible until forced.
    pub lazy_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeRecord {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// The registry cannot name this type.
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OperationRecord {
    pub description: String,
    pub deprecated: bool,
    pub arguments: Vec<ArgumentRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArgumentRecord {
    pub name: String,
    /// Raw `VipsArgumentFlags`.
    pub flags: u32,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub blurb: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub blurb: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("type `{0}` is declared twice")]
    DuplicateType(String),
    #[error("type `{name}` has undeclared parent `{parent}`")]
    UnknownParent { name: String, parent: String },
    #[error("type `{0}` is its own ancestor")]
    Cycle(String),
    #[error("`{owner}`: `{field}` has undeclared type `{ty}`")]
    UnknownFieldType { owner: String, field: String, ty: String },
    #[error("enum values given for undeclared type `{0}`")]
    UnknownEnum(String),
    #[error("lazy type `{0}` is not declared")]
    UnknownLazyType(String),
}

#[derive(Debug)]
struct TypeNode {
    name: String,
    parent: Option<TypeId>,
    nickname: Option<String>,
    is_abstract: bool,
    anonymous: bool,
    fundamental: Fundamental,
    children: Vec<TypeId>,
}

#[derive(Debug)]
pub struct SnapshotRegistry {
    nodes: Vec<TypeNode>,
    by_name: HashMap<String, TypeId>,
    /// First declaration wins.
    by_nickname: HashMap<String, TypeId>,
    operations: IndexMap<String, OperationRecord>,
    enums: IndexMap<String, Vec<String>>,
    properties: Vec<PropertyRecord>,
    hidden: RefCell<BTreeSet<TypeId>>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Snapshot {
    /// Lists append, maps overwrite per key.
    pub fn merge(&mut self, other: Snapshot) {
        self.types.extend(other.types);
        self.operations.extend(other.operations);
        self.enums.extend(other.enums);
        self.image_properties.extend(other.image_properties);
        self.lazy_types.extend(other.lazy_types);
    }
}

impl SnapshotRegistry {
    pub fn from_documents<I>(documents: I) -> Result<Self, SnapshotError>
    where
        I: IntoIterator<Item = Snapshot>,
    {
        let mut merged = Snapshot::default();
        for document in documents {
            merged.merge(document);
        }
        Self::from_snapshot(merged)
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        let mut nodes = Vec::<TypeNode>::new();
        let mut by_name = HashMap::<String, TypeId>::new();

        for (name, kind) in Fundamental::ROOTS {
            by_name.insert(name.to_string(), TypeId(nodes.len()));
            nodes.push(TypeNode::new(name.to_string(), kind));
        }
        let builtin_count = nodes.len();

        // 1) declare; a built-in may be declared once, to give it a parent
        let mut links = Vec::<(TypeId, String)>::new();
        let mut redeclared = BTreeSet::<TypeId>::new();
        for record in snapshot.types {
            let id = match by_name.get(&record.name) {
                Some(&id) if id.0 < builtin_count && redeclared.insert(id) => id,
                Some(_) => return Err(SnapshotError::DuplicateType(record.name)),
                None => {
                    let id = TypeId(nodes.len());
                    by_name.insert(record.name.clone(), id);
                    nodes.push(TypeNode::new(record.name.clone(), Fundamental::Unknown));
                    id
                }
            };
            let node = &mut nodes[id.0];
            node.nickname = record.nickname;
            node.is_abstract = record.is_abstract;
            node.anonymous = record.anonymous;
            if let Some(parent) = record.parent {
                links.push((id, parent));
            }
        }

        // 2) link
        for (id, parent) in links {
            let parent_id = *by_name.get(&parent).ok_or_else(|| SnapshotError::UnknownParent {
                name: nodes[id.0].name.clone(),
                parent: parent.clone(),
            })?;
            nodes[id.0].parent = Some(parent_id);
            nodes[parent_id.0].children.push(id);
        }

        // 3) fundamentals, built-ins keep their own kind
        for index in builtin_count..nodes.len() {
            nodes[index].fundamental = resolve_fundamental(&nodes, builtin_count, TypeId(index))?;
        }

        let mut by_nickname = HashMap::<String, TypeId>::new();
        for (index, node) in nodes.iter().enumerate() {
            if let Some(nickname) = &node.nickname {
                by_nickname.entry(nickname.clone()).or_insert(TypeId(index));
            }
        }

        for (nickname, op) in &snapshot.operations {
            for arg in &op.arguments {
                if !by_name.contains_key(&arg.ty) {
                    return Err(SnapshotError::UnknownFieldType {
                        owner: nickname.clone(),
                        field: arg.name.clone(),
                        ty: arg.ty.clone(),
                    });
                }
            }
        }
        for prop in &snapshot.image_properties {
            if !by_name.contains_key(&prop.ty) {
                return Err(SnapshotError::UnknownFieldType {
                    owner: "VipsImage".to_string(),
                    field: prop.name.clone(),
                    ty: prop.ty.clone(),
                });
            }
        }
        if let Some(name) = snapshot.enums.keys().find(|name| !by_name.contains_key(*name)) {
            return Err(SnapshotError::UnknownEnum(name.clone()));
        }

        let mut hidden = BTreeSet::new();
        for name in &snapshot.lazy_types {
            let id = by_name
                .get(name)
                .ok_or_else(|| SnapshotError::UnknownLazyType(name.clone()))?;
            hidden.insert(*id);
        }

        Ok(Self {
            nodes,
            by_name,
            by_nickname,
            operations: snapshot.operations,
            enums: snapshot.enums,
            properties: snapshot.image_properties,
            hidden: RefCell::new(hidden),
        })
    }

    fn is_hidden(&self, ty: TypeId) -> bool {
        self.hidden.borrow().contains(&ty)
    }

    fn descriptor_for(&self, type_name: &str) -> Result<TypeDescriptor, RegistryError> {
        let id = self
            .by_name
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))?;
        Ok(self.describe(*id))
    }
}

impl TypeNode {
    fn new(name: String, fundamental: Fundamental) -> Self {
        Self {
            name,
            parent: None,
            nickname: None,
            is_abstract: false,
            anonymous: false,
            fundamental,
            children: Vec::new(),
        }
    }
}

impl Registry for SnapshotRegistry {
    fn type_from_name(&self, name: &str) -> Option<TypeId> {
        self.by_name
            .get(name)
            .copied()
            .filter(|id| !self.is_hidden(*id))
    }

    fn describe(&self, ty: TypeId) -> TypeDescriptor {
        let node = &self.nodes[ty.0];
        TypeDescriptor {
            fundamental: node.fundamental,
            name: if node.anonymous { None } else { Some(node.name.clone()) },
        }
    }

    fn is_abstract(&self, ty: TypeId) -> bool {
        self.nodes[ty.0].is_abstract
    }

    fn children(&self, ty: TypeId) -> Vec<TypeId> {
        self.nodes[ty.0]
            .children
            .iter()
            .copied()
            .filter(|id| !self.is_hidden(*id))
            .collect()
    }

    fn nickname(&self, ty: TypeId) -> Option<String> {
        self.nodes[ty.0].nickname.clone()
    }

    fn operation(&self, nickname: &str) -> Result<OperationDescriptor, RegistryError> {
        if let Some(id) = self.by_nickname.get(nickname) {
            if self.nodes[id.0].is_abstract {
                return Err(RegistryError::Abstract(nickname.to_string()));
            }
        }
        let record = self
            .operations
            .get(nickname)
            .ok_or_else(|| RegistryError::UnknownOperation(nickname.to_string()))?;
        let arguments = record
            .arguments
            .iter()
            .map(|arg| {
                Ok(Argument {
                    name: arg.name.clone(),
                    flags: ArgumentFlags::from_bits_truncate(arg.flags),
                    ty: self.descriptor_for(&arg.ty)?,
                    blurb: arg.blurb.clone(),
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Ok(OperationDescriptor {
            nickname: nickname.to_string(),
            description: record.description.clone(),
            deprecated: record.deprecated,
            arguments,
        })
    }

    fn enum_values(&self, ty: TypeId) -> Result<Vec<String>, RegistryError> {
        let node = &self.nodes[ty.0];
        if node.fundamental != Fundamental::Enum {
            return Err(RegistryError::NotAnEnum(node.name.clone()));
        }
        Ok(self.enums.get(&node.name).cloned().unwrap_or_default())
    }

    fn image_properties(&self) -> Result<Vec<PropertyDescriptor>, RegistryError> {
        self.properties
            .iter()
            .map(|prop| {
                Ok(PropertyDescriptor {
                    name: prop.name.clone(),
                    ty: self.descriptor_for(&prop.ty)?,
                    blurb: prop.blurb.clone(),
                })
            })
            .collect()
    }

    fn force_registration(&self, type_name: &str) -> Result<(), RegistryError> {
        let id = self
            .by_name
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))?;
        self.hidden.borrow_mut().remove(id);
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_fundamental(
    nodes: &[TypeNode],
    builtin_count: usize,
    start: TypeId,
) -> Result<Fundamental, SnapshotError> {
    let mut cursor = nodes[start.0].parent;
    let mut steps = 0usize;
    while let Some(id) = cursor {
        if id.0 < builtin_count {
            return Ok(nodes[id.0].fundamental);
        }
        steps += 1;
        if steps > nodes.len() {
            return Err(SnapshotError::Cycle(nodes[start.0].name.clone()));
        }
        cursor = nodes[id.0].parent;
    }
    Ok(Fundamental::Unknown)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
