// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cyclus Type System
//!
//! Models the family of value types a Cyclus simulation can persist and
//! generates the Cython snippets that convert each of them between its
//! native (C++) form and its dynamic (Python) form.
//!
//! # Features
//!
//! - **Type table loading**: JSON `dbtypes` table filtered by version
//! - **Normalization**: template spellings parsed into nested structures
//! - **Naming**: runtime, function and class name fragments per type
//! - **Converters**: recursive declarations/body/result fragments
//!
//! # Quick Start
//!
//! ```no_run
//! use cyclus_typesystem::{parse_template, TypeRegistry, TypeTable, VersionSelector};
//!
//! # fn main() -> cyclus_typesystem::Result<()> {
//! let table = TypeTable::from_file("dbtypes.json")?;
//! let registry = TypeRegistry::new(&table, &VersionSelector::parse("1.5.0")?)?;
//!
//! let ty = parse_template("std::map<std::string, std::vector<double>>")?;
//! let fragments = registry.convert_to_dynamic("x", &ty)?;
//! println!("{}\n{}\nreturn {}", fragments.declarations, fragments.body, fragments.result);
//! # Ok(())
//! # }
//! ```

pub mod base;
pub mod composition;
pub mod converter;
pub mod error;
mod naming;
pub mod normalize;
pub mod registry;
pub mod table;

pub use base::{BaseTables, Direction, FamilySpec, LeafSpec, StorageKind};
pub use composition::Basis;
pub use converter::{reindent, Fragments};
pub use error::{Result, TypeSystemError};
pub use normalize::{
    parse_template, parse_template_with, split_template_args, NormalizedType, TemplateSyntax,
};
pub use registry::{TypeRegistry, DEFAULT_NAMESPACE};
pub use table::{TypeTable, TypeTableRow, VersionSelector};
