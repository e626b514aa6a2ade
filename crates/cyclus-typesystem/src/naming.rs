// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name derivation for normalized types.
//!
//! Leaves come from the base tables; templates join the names of their head
//! and arguments. A leaf that is a declared type name (`VECTOR_INT`) is first
//! resolved to its normal form. Results are memoized on the registry.

use crate::base::{Direction, FamilySpec, LeafSpec, StorageKind};
use crate::error::{Result, TypeSystemError};
use crate::normalize::NormalizedType;
use crate::registry::TypeRegistry;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
enum NameKind {
    Runtime,
    Function,
    Class,
}

impl NameKind {
    fn of_leaf(self, leaf: &LeafSpec) -> &'static str {
        match self {
            NameKind::Runtime => leaf.runtime,
            NameKind::Function => leaf.function,
            NameKind::Class => leaf.class,
        }
    }

    fn of_family(self, family: &FamilySpec) -> &'static str {
        match self {
            NameKind::Runtime => family.runtime,
            NameKind::Function => family.function,
            NameKind::Class => family.class,
        }
    }

    fn join(self, head: &str, args: &[String]) -> String {
        match self {
            NameKind::Runtime => format!("{head}[{}]", args.join(", ")),
            NameKind::Function => format!("{head}_{}", args.join("_")),
            NameKind::Class => format!("{head}{}", args.concat()),
        }
    }
}

impl TypeRegistry {
    /// Cython spelling, e.g. `std_map[int, std_vector[double]]`.
    pub fn runtime_type_name(&self, ty: &NormalizedType) -> Result<String> {
        self.derive_name(ty, NameKind::Runtime)
    }

    /// Symbol-safe fragment, e.g. `std_map_int_std_vector_double`.
    pub fn function_name_fragment(&self, ty: &NormalizedType) -> Result<String> {
        self.derive_name(ty, NameKind::Function)
    }

    /// Compact class fragment, e.g. `MapIntVectorDouble`.
    pub fn class_name_fragment(&self, ty: &NormalizedType) -> Result<String> {
        self.derive_name(ty, NameKind::Class)
    }

    /// Name of the generated routine converting `ty` in `direction`.
    pub fn routine_name(&self, direction: Direction, ty: &NormalizedType) -> Result<String> {
        Ok(format!(
            "{}{}",
            self.function_name_fragment(ty)?,
            direction.routine_suffix()
        ))
    }

    /// Dynamic-side storage of values of `ty`.
    pub fn storage_kind(&self, ty: &NormalizedType) -> Result<StorageKind> {
        match self.resolve(ty) {
            NormalizedType::Leaf(s) => self
                .base
                .leaf(s)
                .map(|l| l.storage)
                .ok_or_else(|| TypeSystemError::UnknownType(s.clone())),
            NormalizedType::Template { head, .. } => self
                .base
                .family(head)
                .map(|_| StorageKind::Object)
                .ok_or_else(|| TypeSystemError::UnknownType(head.clone())),
        }
    }

    /// One-line expression converting native `var` to a dynamic object.
    ///
    /// Leaves convert inline; everything else calls its generated routine.
    pub fn to_dynamic_expr(&self, var: &str, ty: &NormalizedType) -> Result<String> {
        self.inline_expr(Direction::ToDynamic, var, ty)
    }

    /// One-line expression converting dynamic `var` to a native value.
    pub fn to_native_expr(&self, var: &str, ty: &NormalizedType) -> Result<String> {
        self.inline_expr(Direction::ToNative, var, ty)
    }

    /// Convert the payload of a type-erased native holder.
    pub fn any_to_dynamic_expr(&self, var: &str, ty: &NormalizedType) -> Result<String> {
        let cast = format!("{var}.cast[{}]()", self.runtime_type_name(ty)?);
        self.to_dynamic_expr(&cast, ty)
    }

    /// Assign dynamic `value` into the type-erased native holder `target`.
    pub fn dynamic_to_any_expr(
        &self,
        target: &str,
        value: &str,
        ty: &NormalizedType,
    ) -> Result<String> {
        Ok(format!(
            "{target}.assign[{}]({})",
            self.runtime_type_name(ty)?,
            self.to_native_expr(value, ty)?
        ))
    }

    fn inline_expr(&self, direction: Direction, var: &str, ty: &NormalizedType) -> Result<String> {
        match self.resolve(ty) {
            NormalizedType::Leaf(s) => {
                if self.base.leaf(s).is_none() {
                    return Err(TypeSystemError::UnknownType(s.clone()));
                }
                self.templates.render_leaf_expr(direction, s, var)
            }
            norm @ NormalizedType::Template { .. } => {
                Ok(format!("{}({var})", self.routine_name(direction, norm)?))
            }
        }
    }

    fn derive_name(&self, ty: &NormalizedType, kind: NameKind) -> Result<String> {
        if let Some(hit) = self.name_cache(kind).borrow().get(ty) {
            return Ok(hit.clone());
        }

        let name = match ty {
            NormalizedType::Leaf(s) => match self.base.leaf(s) {
                Some(leaf) => kind.of_leaf(leaf).to_string(),
                None => {
                    let norm = self.resolve(ty);
                    if norm == ty {
                        return Err(TypeSystemError::UnknownType(s.clone()));
                    }
                    self.derive_name(norm, kind)?
                }
            },
            NormalizedType::Template { head, args } => {
                let family = self
                    .base
                    .family(head)
                    .ok_or_else(|| TypeSystemError::UnknownType(head.clone()))?;
                let args = args
                    .iter()
                    .map(|a| self.derive_name(a, kind))
                    .collect::<Result<Vec<_>>>()?;
                kind.join(kind.of_family(family), &args)
            }
        };

        self.name_cache(kind)
            .borrow_mut()
            .insert(ty.clone(), name.clone());
        Ok(name)
    }

    fn name_cache(&self, kind: NameKind) -> &RefCell<HashMap<NormalizedType, String>> {
        match kind {
            NameKind::Runtime => &self.caches.runtime,
            NameKind::Function => &self.caches.function,
            NameKind::Class => &self.caches.class,
        }
    }
}
