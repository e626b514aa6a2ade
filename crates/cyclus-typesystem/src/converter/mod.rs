// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive converter generation.
//!
//! A conversion of a nested type is assembled bottom-up: every template
//! role is converted on its own (into `{var}_{role}`), and the role's three
//! fragments are substituted into the family template of the enclosing
//! level.

pub mod fragment;
pub(crate) mod templates;

pub use fragment::{reindent, Fragments};

use self::templates::{SourceKind, SINGLETON_KEY, SOURCES};
use crate::base::{BaseTables, Direction, FamilySpec};
use crate::error::{Result, TypeSystemError};
use crate::normalize::{parse_template, NormalizedType};
use crate::registry::TypeRegistry;
use serde::Serialize;
use std::collections::HashSet;
use tera::{Context, Tera};

fn template_name(direction: Direction, kind: SourceKind, key: &str, part: &str) -> String {
    format!("{direction}/{}/{key}/{part}", kind.as_str())
}

fn leaf_expr_name(direction: Direction, spelling: &str) -> String {
    format!("{direction}/leaf_expr/{spelling}")
}

/// Compiled conversion templates, one Tera engine per registry.
#[derive(Debug)]
pub struct ConverterTemplates {
    tera: Tera,
    bases: HashSet<(Direction, NormalizedType)>,
    families: HashSet<(Direction, String)>,
}

impl ConverterTemplates {
    pub(crate) fn new(base: &BaseTables) -> Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("reindent", fragment::reindent_filter);

        let mut raw: Vec<(String, &str)> = Vec::new();
        let mut bases = HashSet::new();
        let mut families = HashSet::new();
        for source in SOURCES {
            for (part, text) in [
                ("decl", source.decl),
                ("body", source.body),
                ("expr", source.expr),
            ] {
                raw.push((
                    template_name(source.direction, source.kind, source.key, part),
                    text,
                ));
            }
            match source.kind {
                SourceKind::Base => {
                    bases.insert((source.direction, parse_template(source.key)?));
                }
                SourceKind::Family => {
                    families.insert((source.direction, source.key.to_string()));
                }
                SourceKind::ObjectArray | SourceKind::Composition => {}
            }
        }
        for leaf in base.leaves() {
            raw.push((
                leaf_expr_name(Direction::ToDynamic, leaf.spelling),
                leaf.to_dynamic_expr,
            ));
            raw.push((
                leaf_expr_name(Direction::ToNative, leaf.spelling),
                leaf.to_native_expr,
            ));
        }
        tera.add_raw_templates(raw)?;

        Ok(Self {
            tera,
            bases,
            families,
        })
    }

    fn has_base(&self, direction: Direction, ty: &NormalizedType) -> bool {
        self.bases.contains(&(direction, ty.clone()))
    }

    fn has_family(&self, direction: Direction, head: &str) -> bool {
        self.families.contains(&(direction, head.to_string()))
    }

    pub(crate) fn render(
        &self,
        direction: Direction,
        kind: SourceKind,
        key: &str,
        ctx: &Context,
    ) -> Result<Fragments> {
        let part = |p: &str| self.tera.render(&template_name(direction, kind, key, p), ctx);
        Ok(Fragments::new(part("decl")?, part("body")?, part("expr")?))
    }

    pub(crate) fn render_leaf_expr(
        &self,
        direction: Direction,
        spelling: &str,
        var: &str,
    ) -> Result<String> {
        let mut ctx = Context::new();
        ctx.insert("var", var);
        Ok(self
            .tera
            .render(&leaf_expr_name(direction, spelling), &ctx)?)
    }
}

/// How one level of a type is converted.
#[derive(Debug, Clone, Copy)]
enum Strategy<'r> {
    /// Fixed template for the exact normalized type.
    Base,
    /// Family template filled from its roles.
    Family(&'r FamilySpec),
    /// Boxed per-element loop for a buffer-backed family.
    ObjectArray(&'r FamilySpec),
}

/// Per-role substitution context.
#[derive(Debug, Serialize)]
struct RoleContext {
    name: String,
    type_name: String,
    func: String,
    storage: &'static str,
    decl: String,
    body: String,
    expr: String,
    to_native: String,
    to_dynamic: String,
}

impl TypeRegistry {
    /// Fragments converting native `var` of type `ty` to a dynamic object.
    pub fn convert_to_dynamic(&self, var: &str, ty: &NormalizedType) -> Result<Fragments> {
        self.convert(Direction::ToDynamic, var, ty)
    }

    /// Fragments converting dynamic `var` to a native value of type `ty`.
    pub fn convert_to_native(&self, var: &str, ty: &NormalizedType) -> Result<Fragments> {
        self.convert(Direction::ToNative, var, ty)
    }

    /// Fragments for one direction; declared names are resolved first.
    pub fn convert(
        &self,
        direction: Direction,
        var: &str,
        ty: &NormalizedType,
    ) -> Result<Fragments> {
        let norm = self.resolve(ty);
        let strategy = self.strategy(direction, norm)?;
        tracing::trace!("{} {} as {} via {:?}", direction, var, norm, strategy);

        let mut ctx = Context::new();
        ctx.insert("var", var);
        ctx.insert("type_name", &self.runtime_type_name(norm)?);

        let (kind, key) = match strategy {
            Strategy::Base => (SourceKind::Base, norm.to_string()),
            Strategy::Family(family) => (SourceKind::Family, family.head.to_string()),
            Strategy::ObjectArray(_) => (SourceKind::ObjectArray, SINGLETON_KEY.to_string()),
        };

        if let Strategy::Family(family) | Strategy::ObjectArray(family) = strategy {
            for (role, arg) in family.roles.iter().zip(norm.args()) {
                let role_var = format!("{var}_{role}");
                let inner = self.convert(direction, &role_var, arg)?;
                let role_ctx = RoleContext {
                    type_name: self.runtime_type_name(arg)?,
                    func: self.function_name_fragment(arg)?,
                    storage: self.storage_kind(arg)?.type_code(),
                    decl: inner.declarations,
                    body: inner.body,
                    expr: inner.result,
                    to_native: self.to_native_expr(&role_var, arg)?,
                    to_dynamic: self.to_dynamic_expr(&role_var, arg)?,
                    name: role_var,
                };
                ctx.insert(*role, &role_ctx);
            }
        }

        if let (Strategy::ObjectArray(_), Some(elem)) = (strategy, norm.args().first()) {
            ctx.insert(
                "elem_to_dynamic",
                &self.to_dynamic_expr(&format!("{var}[i{var}]"), elem)?,
            );
        }

        self.templates.render(direction, kind, &key, &ctx)
    }

    fn strategy<'r>(&'r self, direction: Direction, norm: &NormalizedType) -> Result<Strategy<'r>> {
        if self.templates.has_base(direction, norm) {
            return Ok(Strategy::Base);
        }
        let NormalizedType::Template { head, args } = norm else {
            return Err(TypeSystemError::UnknownConversionStrategy(norm.to_string()));
        };
        let family = self
            .base
            .family(head)
            .filter(|_| self.templates.has_family(direction, head))
            .ok_or_else(|| TypeSystemError::UnknownConversionStrategy(norm.to_string()))?;
        if family.roles.len() != args.len() {
            return Err(TypeSystemError::TemplateArity {
                head: head.clone(),
                expected: family.roles.len(),
                found: args.len(),
            });
        }

        if family.buffer_backed {
            if let Some(elem) = args.first() {
                if direction.needs_object_array(self.storage_kind(elem)?) {
                    return Ok(Strategy::ObjectArray(family));
                }
            }
        }
        Ok(Strategy::Family(family))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{TypeTable, TypeTableRow, VersionSelector};

    fn registry() -> TypeRegistry {
        let rows = vec![
            TypeTableRow::new(0, "BOOL", "v1.5", "bool", 1),
            TypeTableRow::new(1, "STRING", "v1.5", "std::string", 1),
            TypeTableRow::new(2, "VECTOR_DOUBLE", "v1.5", "std::vector<double>", 2),
        ];
        TypeRegistry::new(&TypeTable::new(rows), &VersionSelector::new(1, 5)).unwrap()
    }

    fn ty(s: &str) -> NormalizedType {
        parse_template(s).unwrap()
    }

    #[test]
    fn test_base_case_has_no_recursion() {
        let reg = registry();
        let f = reg.convert_to_dynamic("x", &"BOOL".into()).unwrap();
        assert_eq!(f, Fragments::new("", "", "x"));
        let f = reg.convert_to_native("x", &ty("double")).unwrap();
        assert_eq!(f.result, "<double> x");
    }

    #[test]
    fn test_vector_of_primitives_uses_buffer() {
        let reg = registry();
        let f = reg.convert_to_dynamic("x", &"VECTOR_DOUBLE".into()).unwrap();
        assert!(f.body.contains("PyArray_SimpleNewFromData(1, x_shape, np.NPY_FLOAT64, &x[0])"));
        let f = reg.convert_to_native("x", &"VECTOR_DOUBLE".into()).unwrap();
        assert!(f.body.contains("memcpy"));
        assert!(f.declarations.contains("cdef double * x_data"));
    }

    #[test]
    fn test_vector_of_objects_uses_object_array() {
        let reg = registry();
        let f = reg.convert_to_dynamic("x", &ty("std::vector<std::string>")).unwrap();
        assert!(f.body.contains("np.NPY_OBJECT"));
        assert!(f.body.contains("x_i = bytes(x[ix]).decode()"));
        let f = reg.convert_to_native("x", &ty("std::vector<std::string>")).unwrap();
        assert!(f.body.contains("cppx[ix] = str_py_to_cpp(x_val)"));
        assert!(!f.body.contains("memcpy"));
    }

    #[test]
    fn test_bool_vector_direction_split() {
        let reg = registry();
        let to_dyn = reg.convert_to_dynamic("x", &ty("std::vector<bool>")).unwrap();
        assert!(to_dyn.body.contains("np.NPY_BOOL"));
        let to_native = reg.convert_to_native("x", &ty("std::vector<bool>")).unwrap();
        assert!(to_native.body.contains("cppx[ix] = <bint> x_val"));
        assert!(!to_native.body.contains("memcpy"));
    }

    #[test]
    fn test_unsupported_element_still_converted() {
        let reg = registry();
        let f = reg
            .convert_to_dynamic("x", &ty("std::vector<cyclus::Material>"))
            .unwrap();
        assert!(f.body.contains("x_i = None"));
    }

    #[test]
    fn test_inventory_families_unavailable() {
        let reg = registry();
        let f = reg
            .convert_to_dynamic("x", &ty("cyclus::toolkit::ResBuf<cyclus::Material>"))
            .unwrap();
        assert_eq!(f.result, "None");
    }

    #[test]
    fn test_set_body_reindented() {
        let reg = registry();
        let f = reg.convert_to_dynamic("x", &ty("std::set<std::string>")).unwrap();
        assert!(f.body.contains("    pyx_val = x_val\n    pyx_val = pyx_val.decode()"));
    }

    #[test]
    fn test_nested_roles_keep_own_temporaries() {
        let reg = registry();
        let f = reg
            .convert_to_dynamic("x", &ty("std::map<int, std::map<int, double>>"))
            .unwrap();
        assert!(f.body.contains("pykeyx = x_key"));
        assert!(f.body.contains("pykeyx_val = x_val_key"));
        assert!(f.body.contains("pyx[pykeyx] = pyvalx"));
        assert!(f.body.contains("pyx_val[pykeyx_val] = pyvalx_val"));

        let f = reg
            .convert_to_dynamic("x", &ty("std::pair<int, std::pair<int, double>>"))
            .unwrap();
        assert!(f.body.contains("pyfirstx = x_first"));
        assert!(f.body.contains("pyfirstx_second = x_second_first"));
        assert!(f.body.contains("pyx = (pyfirstx, pysecondx)"));
    }

    #[test]
    fn test_sibling_vectors_declare_distinct_indices() {
        let reg = registry();
        let f = reg
            .convert_to_native("x", &ty("std::pair<std::vector<int>, std::vector<double>>"))
            .unwrap();
        assert!(f.declarations.contains("cdef int ix_first\n"));
        assert!(f.declarations.contains("cdef int ix_second\n"));
        assert!(!f.declarations.contains("cdef int i\n"));

        let f = reg
            .convert_to_dynamic(
                "x",
                &ty("std::pair<std::vector<std::string>, std::vector<std::string>>"),
            )
            .unwrap();
        assert!(f.declarations.contains("cdef int ix_first\n"));
        assert!(f.declarations.contains("cdef int ix_second\n"));
        assert!(f.body.contains("x_first_i = bytes(x_first[ix_first]).decode()"));
    }

    #[test]
    fn test_unknown_strategy() {
        let reg = registry();
        assert!(matches!(
            reg.convert_to_dynamic("x", &ty("std::deque<int>")),
            Err(TypeSystemError::UnknownConversionStrategy(_))
        ));
        assert!(matches!(
            reg.convert_to_native("x", &"unsigned char".into()),
            Err(TypeSystemError::UnknownConversionStrategy(_))
        ));
    }

    #[test]
    fn test_arity_mismatch() {
        let reg = registry();
        assert!(matches!(
            reg.convert_to_dynamic("x", &ty("std::pair<int>")),
            Err(TypeSystemError::TemplateArity {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }
}
