// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use cyclus_typesystem::{
    parse_template, Direction, NormalizedType, TypeRegistry, TypeSystemError, TypeTable,
    VersionSelector,
};
use std::collections::HashSet;
use std::io::Write;

const DBTYPES: &str = r#"[
    ["id", "name", "C++ type", "shape rank", "backend", "version", "supported"],
    [0, "BOOL", "bool", 1, "HDF5", "v1.0", 1],
    [1, "INT", "int", 1, "HDF5", "v1.0", 1],
    [0, "BOOL", "bool", 1, "HDF5", "2.1.0", 1],
    [1, "INT", "int", 1, "HDF5", "2.1.0", 1],
    [2, "DOUBLE", "double", 1, "HDF5", "2.1.0", 1],
    [3, "STRING", "std::string", 1, "HDF5", "2.1.0", 1],
    [4, "VL_STRING", "std::string", 1, "HDF5", "2.1.0", 1],
    [5, "VECTOR_DOUBLE", "std::vector<double>", 2, "HDF5", "2.1.0", 1],
    [6, "VECTOR_STRING", "std::vector<std::string>", 2, "HDF5", "2.1.0", 1],
    [7, "MAP_INT_DOUBLE", "std::map<int, double>", 2, "HDF5", "2.1.0", 1],
    [8, "MAP_STRING_VECTOR_DOUBLE", "std::map<std::string, std::vector<double> >", 3, "HDF5", "2.1.0", 1],
    [9, "VL_MAP_INT_DOUBLE", "std::map<int,double>", 2, "HDF5", "2.1.0", 1],
    [10, "PAIR_INT_STRING", "std::pair<int, std::string>", 2, "HDF5", "2.1.0", 1],
    [11, "MATERIAL", "cyclus::Material", 1, "HDF5", "2.1.0", 1]
]"#;

fn table() -> TypeTable {
    TypeTable::from_json_str(DBTYPES).unwrap()
}

fn registry() -> TypeRegistry {
    TypeRegistry::new(&table(), &VersionSelector::new(2, 1)).unwrap()
}

#[test]
fn test_end_to_end_small_table() {
    let rows = TypeTable::from_json_str(
        r#"[
        ["id", "name", "version", "C++ type", "shape rank"],
        [0, "BOOL", "2.1.0", "bool", 1],
        [1, "INT", "2.1.0", "int", 1],
        [2, "DOUBLE", "2.1.0", "double", 1],
        [3, "VECTOR_DOUBLE", "2.1.0", "std::vector<double>", 2]
    ]"#,
    )
    .unwrap();
    let reg = TypeRegistry::new(&rows, &VersionSelector::new(2, 1)).unwrap();
    assert_eq!(reg.ordered_by_id(), ["BOOL", "INT", "DOUBLE", "VECTOR_DOUBLE"]);

    let norm = reg.normal_form_of("VECTOR_DOUBLE").unwrap();
    assert_eq!(norm.tuple_repr(), "('std::vector', 'double')");
    assert_eq!(
        reg.function_name_fragment(&"VECTOR_DOUBLE".into()).unwrap(),
        "std_vector_double"
    );
    assert_eq!(reg.canonical_types().len(), 4);
}

#[test]
fn test_unknown_version() {
    let err = TypeRegistry::new(&table(), &VersionSelector::new(9, 9)).unwrap_err();
    assert!(matches!(err, TypeSystemError::VersionNotFound { .. }));
}

#[test]
fn test_exact_version_preferred() {
    let reg = TypeRegistry::new(&table(), &VersionSelector::parse("v1.0").unwrap()).unwrap();
    assert_eq!(reg.ordered_by_id(), ["BOOL", "INT"]);
    assert_eq!(table().latest_version(), Some(VersionSelector::new(2, 1)));
}

#[test]
fn test_canonical_uniqueness() {
    let reg = registry();
    let canonical = reg.canonical_types();

    let forms: HashSet<_> = canonical
        .iter()
        .map(|n| reg.normal_form_of(n).unwrap())
        .collect();
    assert_eq!(forms.len(), canonical.len());

    for declared in reg.ordered_by_id() {
        let nf = reg.normal_form_of(declared).unwrap();
        let owners = canonical
            .iter()
            .filter(|c| reg.normal_form_of(c).unwrap() == nf)
            .count();
        assert_eq!(owners, 1, "{declared} has {owners} canonical owners");
    }
    assert!(canonical.contains(&"STRING".to_string()));
    assert!(!canonical.contains(&"VL_STRING".to_string()));
    assert!(!canonical.contains(&"VL_MAP_INT_DOUBLE".to_string()));
}

#[test]
fn test_id_ordering_preserved() {
    let reg = registry();
    let ids: Vec<_> = reg
        .ordered_by_id()
        .iter()
        .map(|n| reg.id_of(n).unwrap())
        .collect();
    assert!(ids.windows(2).all(|w| w[0] <= w[1]));

    // canonical types are a subsequence of the id order
    let mut ordered = reg.ordered_by_id().iter();
    for c in reg.canonical_types() {
        assert!(ordered.any(|o| o == c));
    }
}

#[test]
fn test_function_fragment_injective_to_depth_three() {
    let reg = registry();
    let leaves: Vec<NormalizedType> = ["bool", "int", "double", "std::string"]
        .iter()
        .map(|s| NormalizedType::leaf(*s))
        .collect();
    let heads_one = ["std::vector", "std::set", "std::list"];
    let heads_two = ["std::map", "std::pair"];

    let grow = |level: &[NormalizedType]| -> Vec<NormalizedType> {
        let mut out = Vec::new();
        for a in level {
            for h in heads_one {
                out.push(NormalizedType::template(h, vec![a.clone()]));
            }
            for b in leaves.iter().chain(level.iter().take(3)) {
                for h in heads_two {
                    out.push(NormalizedType::template(h, vec![a.clone(), b.clone()]));
                    out.push(NormalizedType::template(h, vec![b.clone(), a.clone()]));
                }
            }
        }
        out
    };
    let depth_two = grow(leaves.as_slice());
    let depth_three = grow(depth_two.as_slice());

    let mut all: HashSet<NormalizedType> = HashSet::new();
    all.extend(leaves.iter().cloned());
    all.extend(depth_two);
    all.extend(depth_three);

    let mut names = HashSet::new();
    for ty in &all {
        let name = reg.function_name_fragment(ty).unwrap();
        assert!(names.insert(name.clone()), "collision on {name} for {ty}");
    }
}

#[test]
fn test_naming_stable_across_calls() {
    let reg = registry();
    let ty = parse_template("std::map<std::string, std::vector<double>>").unwrap();
    for _ in 0..3 {
        assert_eq!(
            reg.runtime_type_name(&ty).unwrap(),
            "std_map[std_string, std_vector[double]]"
        );
        assert_eq!(reg.class_name_fragment(&ty).unwrap(), "MapStringVectorDouble");
    }
}

#[test]
fn test_nested_conversion_well_formed() {
    let reg = registry();
    let ty = parse_template("std::vector<std::map<std::string, std::vector<double>>>").unwrap();

    let f = reg.convert_to_dynamic("x", &ty).unwrap();
    // outer vector of maps is boxed per element
    assert!(f.body.contains("np.NPY_OBJECT"));
    assert!(f.body.contains("std_map_std_string_std_vector_double_to_py(x[ix])"));
    assert!(f.result.contains('x'));

    let f = reg.convert_to_native("x", &ty).unwrap();
    assert!(f.body.contains("std_map_std_string_std_vector_double_to_cpp(x_val)"));
    assert!(f.result.contains('x'));

    // the inner map resolves every role of every nested head
    let map = parse_template("std::map<std::string, std::vector<double>>").unwrap();
    let f = reg.convert_to_dynamic("x_val", &map).unwrap();
    assert!(f.declarations.contains("cdef std_string x_val_key"));
    assert!(f.declarations.contains("cdef std_vector[double] x_val_val"));
    assert!(f.declarations.contains("cdef np.npy_intp x_val_val_shape[1]"));
    assert!(f.body.contains("pykeyx_val = pyx_val_key"));
    assert!(f.body.contains("pyvalx_val = pyx_val_val"));
    assert!(f.body.contains("x_val_val_shape[0] = <np.npy_intp> x_val_val.size()"));
    assert_eq!(f.result, "pyx_val");
}

#[test]
fn test_pair_to_native_roles() {
    let reg = registry();
    let f = reg
        .convert(Direction::ToNative, "p", &"PAIR_INT_STRING".into())
        .unwrap();
    assert!(f.declarations.contains("cdef bytes b_p_second"));
    assert!(f.declarations.contains("cdef std_pair[int, std_string] cppp"));
    assert!(f.body.contains("cppp.first = <int> p_first"));
    assert!(f.body.contains("cppp.second = std_string(<const char*> b_p_second)"));
    assert_eq!(f.result, "cppp");
}

#[test]
fn test_grouping_accessors() {
    let reg = registry();
    assert_eq!(reg.canonical_leaf_types(), ["BOOL", "INT", "DOUBLE", "STRING", "MATERIAL"]);
    let groups = reg.canonical_templates_by_head();
    assert_eq!(groups["std::vector"], ["VECTOR_DOUBLE", "VECTOR_STRING"]);
    assert_eq!(groups["std::map"], ["MAP_INT_DOUBLE", "MAP_STRING_VECTOR_DOUBLE"]);
    assert_eq!(reg.resources(), ["MATERIAL"]);
    assert!(reg.container_types().is_empty());
    assert_eq!(reg.enum_symbol("VL_STRING").unwrap(), "cpp_typesystem.VL_STRING");
}

#[test]
fn test_converter_targets_deduplicated() {
    let reg = registry();
    let targets = reg.converter_targets().unwrap();
    let names: Vec<_> = targets
        .iter()
        .map(|t| reg.function_name_fragment(t).unwrap())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(names, sorted);
    assert_eq!(
        targets.len(),
        reg.canonical_types().len(),
        "one target per canonical type"
    );
}

#[test]
fn test_table_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DBTYPES.as_bytes()).unwrap();

    let table = TypeTable::from_file(file.path()).unwrap();
    assert_eq!(table.len(), 14);
    assert_eq!(table.rows()[7].native_type, "std::vector<double>");
}

#[test]
fn test_table_missing_column() {
    let err = TypeTable::from_json_str(r#"[["id", "name"], [0, "INT"]]"#).unwrap_err();
    assert!(matches!(err, TypeSystemError::Table(_)));
}
