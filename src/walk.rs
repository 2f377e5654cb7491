//! Registry traversal.
//!
//! An explicit stack replaces the registry's recursive visitor; accepted
//! names are gathered into a sorted set so output order never depends on
//! registration order.
use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::registry::{Registry, TypeId};

/// Operation nicknames to document: sorted, unique, synonyms in,
/// hand-written operations out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NicknameSet(Vec<String>);

impl NicknameSet {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn contains(&self, nickname: &str) -> bool {
        self.0.binary_search_by(|n| n.as_str().cmp(nickname)).is_ok()
    }
}

/// Every descendant of `root` (not `root` itself) that `accept` names.
pub fn collect<R, F>(registry: &R, root: TypeId, mut accept: F) -> Vec<String>
where
    R: Registry + ?Sized,
    F: FnMut(TypeId) -> Option<String>,
{
    let mut found = BTreeSet::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<TypeId> = registry.children(root).into_iter().rev().collect();
    while let Some(ty) = stack.pop() {
        if !visited.insert(ty) {
            continue;
        }
        if let Some(name) = accept(ty) {
            found.insert(name);
        }
        stack.extend(registry.children(ty).into_iter().rev());
    }
    found.into_iter().collect()
}

pub fn operation_nicknames<R>(registry: &R, config: &GeneratorConfig) -> Result<NicknameSet, GenerateError>
where
    R: Registry + ?Sized,
{
    let root = registry
        .type_from_name(&config.operation_root)
        .ok_or_else(|| GenerateError::MissingRoot(config.operation_root.clone()))?;

    let collected = collect(registry, root, |ty| {
        let nickname = registry.nickname(ty)?;
        // abstract types only show up as a failed instantiation
        match registry.operation(&nickname) {
            Ok(op) if !op.deprecated => Some(nickname),
            Ok(_) => {
                debug!(%nickname, "skipping deprecated operation");
                None
            }
            Err(error) => {
                debug!(%nickname, %error, "skipping");
                None
            }
        }
    });

    let mut names: BTreeSet<String> = collected.into_iter().collect();
    names.extend(config.synonyms.iter().cloned());
    names.retain(|name| !config.deny_list.contains(name));
    Ok(NicknameSet(names.into_iter().collect()))
}

/// Type names of every concrete enum under the configured root.
pub fn enum_type_names<R>(registry: &R, config: &GeneratorConfig) -> Result<Vec<String>, GenerateError>
where
    R: Registry + ?Sized,
{
    let root = registry
        .type_from_name(&config.enum_root)
        .ok_or_else(|| GenerateError::MissingRoot(config.enum_root.clone()))?;

    Ok(collect(registry, root, |ty| {
        let descriptor = registry.describe(ty);
        if registry.is_abstract(ty) || !descriptor.is_enum() {
            return None;
        }
        if descriptor.name.is_none() {
            tracing::warn!(?ty, "skipping enum the registry cannot name");
        }
        descriptor.name
    }))
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
