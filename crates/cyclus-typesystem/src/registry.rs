// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry built from a version-filtered type table.
//!
//! The registry is read-only once built. Its only mutable state is the
//! per-instance name memoization, which lives behind `RefCell`, so a
//! registry is `Send` but not `Sync`; share one across threads behind a
//! lock.

use crate::base::BaseTables;
use crate::converter::ConverterTemplates;
use crate::error::{Result, TypeSystemError};
use crate::normalize::{parse_template, NormalizedType};
use crate::table::{TypeTable, VersionSelector};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Namespace of the generated native enum header unless configured.
pub const DEFAULT_NAMESPACE: &str = "cpp_typesystem";

/// Memoized names, keyed by exact normalized type.
#[derive(Debug, Default)]
pub(crate) struct NameCaches {
    pub runtime: RefCell<HashMap<NormalizedType, String>>,
    pub function: RefCell<HashMap<NormalizedType, String>>,
    pub class: RefCell<HashMap<NormalizedType, String>>,
}

/// Declared types of one version with their normal forms, canonical
/// representatives and inventory containers.
#[derive(Debug)]
pub struct TypeRegistry {
    selector: VersionSelector,
    namespace: String,
    pub(crate) base: BaseTables,
    pub(crate) templates: ConverterTemplates,
    declared: HashSet<String>,
    ids: HashMap<String, i64>,
    native: HashMap<String, String>,
    ranks: HashMap<String, i64>,
    norms: HashMap<String, NormalizedType>,
    ordered: Vec<String>,
    canonical: Vec<String>,
    containers: Vec<String>,
    pub(crate) caches: NameCaches,
}

impl TypeRegistry {
    /// Build a registry with the Cyclus base tables.
    pub fn new(table: &TypeTable, selector: &VersionSelector) -> Result<Self> {
        Self::with_tables(table, selector, BaseTables::cyclus())
    }

    /// Build a registry over caller-supplied base tables.
    pub fn with_tables(
        table: &TypeTable,
        selector: &VersionSelector,
        base: BaseTables,
    ) -> Result<Self> {
        let rows = table.select(selector)?;

        let mut declared = HashSet::new();
        let mut ids = HashMap::new();
        let mut native = HashMap::new();
        let mut ranks = HashMap::new();
        for row in rows {
            declared.insert(row.name.clone());
            ids.insert(row.name.clone(), row.id);
            native.insert(row.name.clone(), row.native_type.clone());
            ranks.insert(row.name.clone(), row.shape_rank);
        }

        let norms = native
            .iter()
            .map(|(name, spelling)| Ok((name.clone(), parse_template(spelling)?)))
            .collect::<Result<HashMap<_, _>>>()?;

        let mut ordered: Vec<String> = declared.iter().cloned().collect();
        ordered.sort_by(|a, b| (ids[a], a).cmp(&(ids[b], b)));

        // First declared name (by id) owns each distinct normal form.
        let mut seen = HashSet::new();
        let canonical: Vec<String> = ordered
            .iter()
            .filter(|name| seen.insert(&norms[*name]))
            .cloned()
            .collect();

        let containers = canonical
            .iter()
            .filter(|name| base.is_inventory(norms[*name].head()))
            .cloned()
            .collect();

        let templates = ConverterTemplates::new(&base)?;

        let registry = Self {
            selector: selector.clone(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            base,
            templates,
            declared,
            ids,
            native,
            ranks,
            norms,
            ordered,
            canonical,
            containers,
            caches: NameCaches::default(),
        };

        tracing::info!(
            "Type registry for {}: {} declared, {} canonical, {} containers",
            registry.selector,
            registry.ordered.len(),
            registry.canonical.len(),
            registry.containers.len()
        );
        Ok(registry)
    }

    /// Set the namespace used by [`TypeRegistry::enum_symbol`].
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn selector(&self) -> &VersionSelector {
        &self.selector
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn base(&self) -> &BaseTables {
        &self.base
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    pub fn declared_types(&self) -> &HashSet<String> {
        &self.declared
    }

    pub fn id_of(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied()
    }

    pub fn native_type_of(&self, name: &str) -> Option<&str> {
        self.native.get(name).map(String::as_str)
    }

    pub fn rank_of(&self, name: &str) -> Option<i64> {
        self.ranks.get(name).copied()
    }

    pub fn normal_form_of(&self, name: &str) -> Option<&NormalizedType> {
        self.norms.get(name)
    }

    /// Declared names in ascending id order.
    pub fn ordered_by_id(&self) -> &[String] {
        &self.ordered
    }

    /// One declared name per distinct normal form, in id order.
    pub fn canonical_types(&self) -> &[String] {
        &self.canonical
    }

    /// Canonical types whose head is an inventory family.
    pub fn container_types(&self) -> &[String] {
        &self.containers
    }

    /// Concrete resource types declared in this version.
    pub fn resources(&self) -> Vec<&str> {
        self.base
            .resources()
            .iter()
            .copied()
            .filter(|r| self.declared.contains(*r))
            .collect()
    }

    /// Canonical types whose normal form is a leaf, in id order.
    pub fn canonical_leaf_types(&self) -> Vec<&str> {
        self.canonical
            .iter()
            .filter(|name| self.norms[*name].is_leaf())
            .map(String::as_str)
            .collect()
    }

    /// Canonical template types grouped by head; names stay in id order.
    pub fn canonical_templates_by_head(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for name in &self.canonical {
            let norm = &self.norms[name];
            if !norm.is_leaf() {
                groups.entry(norm.head()).or_default().push(name);
            }
        }
        groups
    }

    /// Distinct normal forms sorted by function-name fragment: one
    /// conversion routine per entry and direction.
    ///
    /// The set is closed: element types that generated code converts by
    /// calling their routine are included even when no declared type has
    /// that normal form.
    pub fn converter_targets(&self) -> Result<Vec<&NormalizedType>> {
        let mut unique: HashSet<&NormalizedType> = HashSet::new();
        for norm in self.norms.values() {
            unique.insert(norm);
            self.collect_routine_calls(norm, &mut unique);
        }
        let mut keyed = unique
            .into_iter()
            .map(|n| Ok((self.function_name_fragment(n)?, n)))
            .collect::<Result<Vec<_>>>()?;
        keyed.sort();
        Ok(keyed.into_iter().map(|(_, n)| n).collect())
    }

    // Buffer-backed families convert template elements through the element
    // routine; other families inline the element conversion.
    fn collect_routine_calls<'a>(
        &self,
        ty: &'a NormalizedType,
        out: &mut HashSet<&'a NormalizedType>,
    ) {
        let NormalizedType::Template { head, args } = ty else {
            return;
        };
        let calls = self.base.family(head).is_some_and(|f| f.buffer_backed);
        for arg in args {
            if calls && !arg.is_leaf() {
                out.insert(arg);
            }
            self.collect_routine_calls(arg, out);
        }
    }

    /// Symbol of a declared type in the native enum header, e.g.
    /// `cpp_typesystem.INT`.
    pub fn enum_symbol(&self, name: &str) -> Result<String> {
        if !self.declared.contains(name) {
            return Err(TypeSystemError::UnknownType(name.to_string()));
        }
        Ok(format!("{}.{}", self.namespace, name))
    }

    /// Normal form of a declared name, or the type itself.
    pub fn resolve<'a>(&'a self, ty: &'a NormalizedType) -> &'a NormalizedType {
        match ty {
            NormalizedType::Leaf(name) => self.norms.get(name).unwrap_or(ty),
            NormalizedType::Template { .. } => ty,
        }
    }
}
