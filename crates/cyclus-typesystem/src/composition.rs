// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Material composition helpers.

use crate::base::Direction;
use crate::converter::templates::{SourceKind, SINGLETON_KEY};
use crate::converter::Fragments;
use crate::error::{Result, TypeSystemError};
use crate::normalize::NormalizedType;
use crate::registry::TypeRegistry;
use std::fmt;
use std::str::FromStr;
use tera::Context;

/// Unit basis of a nuclide quantity map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Basis {
    #[default]
    Mass,
    Atom,
}

impl Basis {
    pub fn as_str(self) -> &'static str {
        match self {
            Basis::Mass => "mass",
            Basis::Atom => "atom",
        }
    }

    /// Native factory building a composition from a quantity map.
    pub fn factory(self) -> &'static str {
        match self {
            Basis::Mass => "CreateFromMass",
            Basis::Atom => "CreateFromAtom",
        }
    }

    /// Native accessor returning the quantity map.
    pub fn accessor(self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for Basis {
    type Err = TypeSystemError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mass" => Ok(Basis::Mass),
            "atom" => Ok(Basis::Atom),
            other => Err(TypeSystemError::UnsupportedBasis(other.to_string())),
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn quantity_map() -> NormalizedType {
    NormalizedType::template("std::map", vec!["int".into(), "double".into()])
}

impl TypeRegistry {
    /// Build a native composition handle from the dynamic mapping `var`
    /// (nuclide name to quantity).
    pub fn composition_to_native(&self, var: &str, basis: Basis) -> Result<Fragments> {
        let mut ctx = Context::new();
        ctx.insert("var", var);
        ctx.insert("factory", basis.factory());
        self.templates
            .render(Direction::ToNative, SourceKind::Composition, SINGLETON_KEY, &ctx)
    }

    /// Read the quantity map of the native composition handle `var` and
    /// convert it with the generated `std::map<int, double>` routine.
    pub fn composition_to_dynamic(&self, var: &str, basis: Basis) -> Result<Fragments> {
        let map = quantity_map();
        let mut ctx = Context::new();
        ctx.insert("var", var);
        ctx.insert("accessor", basis.accessor());
        ctx.insert("map_routine", &self.routine_name(Direction::ToDynamic, &map)?);
        ctx.insert("map_type", &self.runtime_type_name(&map)?);
        self.templates
            .render(Direction::ToDynamic, SourceKind::Composition, SINGLETON_KEY, &ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{TypeTable, TypeTableRow, VersionSelector};

    fn registry() -> TypeRegistry {
        let rows = vec![TypeTableRow::new(0, "INT", "v1.5", "int", 1)];
        TypeRegistry::new(&TypeTable::new(rows), &VersionSelector::new(1, 5)).unwrap()
    }

    #[test]
    fn test_basis_parse() {
        assert_eq!("mass".parse::<Basis>().unwrap(), Basis::Mass);
        assert_eq!("atom".parse::<Basis>().unwrap(), Basis::Atom);
        assert!(matches!(
            "volume".parse::<Basis>(),
            Err(TypeSystemError::UnsupportedBasis(s)) if s == "volume"
        ));
    }

    #[test]
    fn test_to_native_uses_factory() {
        let reg = registry();
        let f = reg.composition_to_native("comp", Basis::Atom).unwrap();
        assert!(f.body.contains("cpp_cyclus.Composition.CreateFromAtom(ccomp)"));
        assert!(f.declarations.contains("cdef cpp_cyclus.CompMap ccomp"));
        assert_eq!(f.result, "pcomp");
    }

    #[test]
    fn test_to_dynamic_uses_map_routine() {
        let reg = registry();
        let f = reg.composition_to_dynamic("comp", Basis::Mass).unwrap();
        assert_eq!(f.body, "ccomp = deref(comp).mass()\n");
        assert_eq!(
            f.result,
            "std_map_int_double_to_py(<std_map[int, double]> ccomp)"
        );
    }
}
