// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed leaf and template-family tables.
//!
//! A registry owns one [`BaseTables`] for its whole lifetime. Leaves carry
//! every per-type fact in a single [`LeafSpec`] record, so a leaf is either
//! fully described (naming, storage, conversion) or unknown.

use std::collections::HashMap;
use std::fmt;

/// How values of a type are stored on the dynamic side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Bool,
    Int32,
    Float32,
    Float64,
    /// Boxed object, one reference per element.
    Object,
    /// No dynamic-side representation.
    Unsupported,
}

impl StorageKind {
    /// Numeric type code used in generated array code.
    pub fn type_code(self) -> &'static str {
        match self {
            StorageKind::Bool => "np.NPY_BOOL",
            StorageKind::Int32 => "np.NPY_INT32",
            StorageKind::Float32 => "np.NPY_FLOAT32",
            StorageKind::Float64 => "np.NPY_FLOAT64",
            StorageKind::Object => "np.NPY_OBJECT",
            StorageKind::Unsupported => "None",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_code())
    }
}

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Native value to dynamic object.
    ToDynamic,
    /// Dynamic object to native value.
    ToNative,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::ToDynamic => "to_dynamic",
            Direction::ToNative => "to_native",
        }
    }

    /// Suffix of generated conversion routines, e.g. `std_map_int_double_to_py`.
    pub fn routine_suffix(self) -> &'static str {
        match self {
            Direction::ToDynamic => "_to_py",
            Direction::ToNative => "_to_cpp",
        }
    }

    /// Whether a buffer-backed sequence with elements of `kind` must use
    /// the per-element object loop instead of a bulk buffer copy.
    ///
    /// Packed native booleans cannot be filled from a boolean buffer, so
    /// `Bool` only takes the fast path towards the dynamic side.
    pub fn needs_object_array(self, kind: StorageKind) -> bool {
        match (self, kind) {
            (_, StorageKind::Object | StorageKind::Unsupported) => true,
            (Direction::ToNative, StorageKind::Bool) => true,
            (Direction::ToDynamic, StorageKind::Bool) => false,
            (_, StorageKind::Int32 | StorageKind::Float32 | StorageKind::Float64) => false,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything known about one leaf spelling.
#[derive(Debug, Clone)]
pub struct LeafSpec {
    pub spelling: &'static str,
    pub runtime: &'static str,
    pub function: &'static str,
    pub class: &'static str,
    pub storage: StorageKind,
    /// One-line native to dynamic expression, Tera syntax over `var`.
    pub to_dynamic_expr: &'static str,
    /// One-line dynamic to native expression, Tera syntax over `var`.
    pub to_native_expr: &'static str,
}

/// A template family and its argument roles.
#[derive(Debug, Clone)]
pub struct FamilySpec {
    pub head: &'static str,
    pub runtime: &'static str,
    pub function: &'static str,
    pub class: &'static str,
    pub roles: &'static [&'static str],
    /// Contiguous sequence eligible for bulk buffer copies.
    pub buffer_backed: bool,
}

/// Immutable lookup tables handed to a registry at construction.
#[derive(Debug, Clone)]
pub struct BaseTables {
    leaves: HashMap<&'static str, LeafSpec>,
    families: HashMap<&'static str, FamilySpec>,
    inventories: Vec<&'static str>,
    resources: Vec<&'static str>,
}

impl BaseTables {
    pub fn new(
        leaves: Vec<LeafSpec>,
        families: Vec<FamilySpec>,
        inventories: Vec<&'static str>,
        resources: Vec<&'static str>,
    ) -> Self {
        Self {
            leaves: leaves.into_iter().map(|l| (l.spelling, l)).collect(),
            families: families.into_iter().map(|f| (f.head, f)).collect(),
            inventories,
            resources,
        }
    }

    /// Tables for the Cyclus type system.
    pub fn cyclus() -> Self {
        Self::new(
            CYCLUS_LEAVES.to_vec(),
            CYCLUS_FAMILIES.to_vec(),
            vec![
                "cyclus::toolkit::ResourceBuff",
                "cyclus::toolkit::ResBuf",
                "cyclus::toolkit::ResMap",
            ],
            // The abstract resource base class is left out on purpose.
            vec!["MATERIAL", "PRODUCT"],
        )
    }

    pub fn leaf(&self, spelling: &str) -> Option<&LeafSpec> {
        self.leaves.get(spelling)
    }

    pub fn family(&self, head: &str) -> Option<&FamilySpec> {
        self.families.get(head)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &LeafSpec> {
        self.leaves.values()
    }

    pub fn families(&self) -> impl Iterator<Item = &FamilySpec> {
        self.families.values()
    }

    pub fn is_inventory(&self, head: &str) -> bool {
        self.inventories.iter().any(|i| *i == head)
    }

    pub fn resources(&self) -> &[&'static str] {
        &self.resources
    }
}

const fn leaf(
    spelling: &'static str,
    runtime: &'static str,
    function: &'static str,
    class: &'static str,
    storage: StorageKind,
    to_dynamic_expr: &'static str,
    to_native_expr: &'static str,
) -> LeafSpec {
    LeafSpec {
        spelling,
        runtime,
        function,
        class,
        storage,
        to_dynamic_expr,
        to_native_expr,
    }
}

const fn family(
    head: &'static str,
    runtime: &'static str,
    function: &'static str,
    class: &'static str,
    roles: &'static [&'static str],
    buffer_backed: bool,
) -> FamilySpec {
    FamilySpec {
        head,
        runtime,
        function,
        class,
        roles,
        buffer_backed,
    }
}

#[rustfmt::skip]
const CYCLUS_LEAVES: &[LeafSpec] = &[
    leaf("bool", "cpp_bool", "bool", "Bool", StorageKind::Bool,
         "{{ var }}", "<bint> {{ var }}"),
    leaf("int", "int", "int", "Int", StorageKind::Int32,
         "{{ var }}", "<int> {{ var }}"),
    leaf("float", "float", "float", "Float", StorageKind::Float32,
         "{{ var }}", "<float> {{ var }}"),
    leaf("double", "double", "double", "Double", StorageKind::Float64,
         "{{ var }}", "<double> {{ var }}"),
    leaf("std::string", "std_string", "std_string", "String", StorageKind::Object,
         "bytes({{ var }}).decode()", "str_py_to_cpp({{ var }})"),
    leaf("cyclus::Blob", "cpp_cyclus.Blob", "blob", "Blob", StorageKind::Object,
         "blob_to_bytes({{ var }})", "cpp_cyclus.Blob(std_string(<const char*> {{ var }}))"),
    leaf("boost::uuids::uuid", "cpp_cyclus.uuid", "uuid", "Uuid", StorageKind::Object,
         "uuid_cpp_to_py({{ var }})", "uuid_py_to_cpp({{ var }})"),
    leaf("cyclus::Material", "cpp_cyclus.Material", "material", "Material",
         StorageKind::Unsupported, "None", "None"),
    leaf("cyclus::Product", "cpp_cyclus.Product", "product", "Product",
         StorageKind::Unsupported, "None", "None"),
    leaf("cyclus::toolkit::ResourceBuff", "cpp_cyclus.ResourceBuff", "resource_buff",
         "ResourceBuff", StorageKind::Unsupported, "None", "None"),
];

#[rustfmt::skip]
const CYCLUS_FAMILIES: &[FamilySpec] = &[
    family("std::set", "std_set", "std_set", "Set", &["val"], false),
    family("std::map", "std_map", "std_map", "Map", &["key", "val"], false),
    family("std::pair", "std_pair", "std_pair", "Pair", &["first", "second"], false),
    family("std::list", "std_list", "std_list", "List", &["val"], false),
    family("std::vector", "std_vector", "std_vector", "Vector", &["val"], true),
    family("cyclus::toolkit::ResBuf", "cpp_cyclus.ResBuf", "res_buf", "ResBuf", &["val"], false),
    family("cyclus::toolkit::ResMap", "cpp_cyclus.ResMap", "res_map", "ResMap",
           &["key", "val"], false),
];
