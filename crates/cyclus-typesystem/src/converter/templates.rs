// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion template sources.
//!
//! Every entry is a (declarations, body, result) triple in Tera syntax. The
//! generated code is Cython: `to_dynamic` templates read a native value named
//! `var` and build a Python object, `to_native` templates do the reverse.
//!
//! Family templates see one object per role (`val`, `key`, `first`, ...)
//! with the fields `name`, `type_name`, `func`, `storage`, `decl`, `body`,
//! `expr`, `to_native` and `to_dynamic`.

use self::SourceKind::{Base, Composition, Family, ObjectArray};
use crate::base::Direction;
use crate::base::Direction::{ToDynamic, ToNative};

/// What a template source is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourceKind {
    /// Normalized type spelling with a fixed conversion.
    Base,
    /// Template family head.
    Family,
    /// Per-element boxed loop for buffer-backed sequences.
    ObjectArray,
    /// Composition helpers.
    Composition,
}

impl SourceKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SourceKind::Base => "base",
            SourceKind::Family => "family",
            SourceKind::ObjectArray => "object_array",
            SourceKind::Composition => "composition",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TemplateSource {
    pub direction: Direction,
    pub kind: SourceKind,
    pub key: &'static str,
    pub decl: &'static str,
    pub body: &'static str,
    pub expr: &'static str,
}

const fn src(
    direction: Direction,
    kind: SourceKind,
    key: &'static str,
    decl: &'static str,
    body: &'static str,
    expr: &'static str,
) -> TemplateSource {
    TemplateSource {
        direction,
        kind,
        key,
        decl,
        body,
        expr,
    }
}

/// Key used for the single object-array and composition entries.
pub(crate) const SINGLETON_KEY: &str = "default";

pub(crate) const SOURCES: &[TemplateSource] = &[
    // native -> dynamic, fixed conversions
    src(ToDynamic, Base, "bool", "", "", "{{ var }}"),
    src(ToDynamic, Base, "int", "", "", "{{ var }}"),
    src(ToDynamic, Base, "float", "", "", "{{ var }}"),
    src(ToDynamic, Base, "double", "", "", "{{ var }}"),
    src(
        ToDynamic,
        Base,
        "std::string",
        "\n",
        "
py{{ var }} = {{ var }}
py{{ var }} = py{{ var }}.decode()
",
        "py{{ var }}",
    ),
    src(ToDynamic, Base, "cyclus::Blob", "", "", "blob_to_bytes({{ var }})"),
    src(ToDynamic, Base, "boost::uuids::uuid", "", "", "uuid_cpp_to_py({{ var }})"),
    src(ToDynamic, Base, "cyclus::Material", "", "", "None"),
    src(ToDynamic, Base, "cyclus::Product", "", "", "None"),
    src(ToDynamic, Base, "cyclus::toolkit::ResourceBuff", "", "", "None"),
    src(
        ToDynamic,
        Base,
        "std::vector<bool>",
        "cdef int i{{ var }}
cdef np.npy_intp {{ var }}_shape[1]
",
        "{{ var }}_shape[0] = <np.npy_intp> {{ var }}.size()
py{{ var }} = np.PyArray_SimpleNew(1, {{ var }}_shape, np.NPY_BOOL)
for i{{ var }} in range({{ var }}_shape[0]):
    py{{ var }}[i{{ var }}] = {{ var }}[i{{ var }}]
",
        "py{{ var }}",
    ),
    // native -> dynamic, families
    src(
        ToDynamic,
        Family,
        "std::set",
        "{{ val.decl }}
cdef {{ val.type_name }} {{ val.name }}
cdef std_set[{{ val.type_name }}].iterator it{{ var }}
cdef set py{{ var }}
",
        "py{{ var }} = set()
it{{ var }} = {{ var }}.begin()
while it{{ var }} != {{ var }}.end():
    {{ val.name }} = deref(it{{ var }})
    {{ val.body | reindent(width=4) }}
    pyval{{ var }} = {{ val.expr }}
    py{{ var }}.add(pyval{{ var }})
    inc(it{{ var }})
",
        "py{{ var }}",
    ),
    src(
        ToDynamic,
        Family,
        "std::map",
        "{{ key.decl }}
{{ val.decl }}
cdef {{ key.type_name }} {{ key.name }}
cdef {{ val.type_name }} {{ val.name }}
cdef {{ type_name }}.iterator it{{ var }}
cdef dict py{{ var }}
",
        "py{{ var }} = {}
it{{ var }} = {{ var }}.begin()
while it{{ var }} != {{ var }}.end():
    {{ key.name }} = deref(it{{ var }}).first
    {{ key.body | reindent(width=4) }}
    pykey{{ var }} = {{ key.expr }}
    {{ val.name }} = deref(it{{ var }}).second
    {{ val.body | reindent(width=4) }}
    pyval{{ var }} = {{ val.expr }}
    py{{ var }}[pykey{{ var }}] = pyval{{ var }}
    inc(it{{ var }})
",
        "py{{ var }}",
    ),
    src(
        ToDynamic,
        Family,
        "std::pair",
        "{{ first.decl }}
{{ second.decl }}
cdef {{ first.type_name }} {{ first.name }}
cdef {{ second.type_name }} {{ second.name }}
",
        "{{ first.name }} = {{ var }}.first
{{ first.body }}
pyfirst{{ var }} = {{ first.expr }}
{{ second.name }} = {{ var }}.second
{{ second.body }}
pysecond{{ var }} = {{ second.expr }}
py{{ var }} = (pyfirst{{ var }}, pysecond{{ var }})
",
        "py{{ var }}",
    ),
    src(
        ToDynamic,
        Family,
        "std::list",
        "{{ val.decl }}
cdef {{ val.type_name }} {{ val.name }}
cdef std_list[{{ val.type_name }}].iterator it{{ var }}
cdef list py{{ var }}
",
        "py{{ var }} = []
it{{ var }} = {{ var }}.begin()
while it{{ var }} != {{ var }}.end():
    {{ val.name }} = deref(it{{ var }})
    {{ val.body | reindent(width=4) }}
    pyval{{ var }} = {{ val.expr }}
    py{{ var }}.append(pyval{{ var }})
    inc(it{{ var }})
",
        "py{{ var }}",
    ),
    src(
        ToDynamic,
        Family,
        "std::vector",
        "cdef np.npy_intp {{ var }}_shape[1]
",
        "{{ var }}_shape[0] = <np.npy_intp> {{ var }}.size()
py{{ var }} = np.PyArray_SimpleNewFromData(1, {{ var }}_shape, {{ val.storage }}, &{{ var }}[0])
py{{ var }} = np.PyArray_Copy(py{{ var }})
",
        "py{{ var }}",
    ),
    // Inventories delegate to the resource subsystem and have no value form.
    src(ToDynamic, Family, "cyclus::toolkit::ResBuf", "", "", "None"),
    src(ToDynamic, Family, "cyclus::toolkit::ResMap", "", "", "None"),
    src(
        ToDynamic,
        ObjectArray,
        SINGLETON_KEY,
        "cdef int i{{ var }}
cdef np.npy_intp {{ var }}_shape[1]
",
        "{{ var }}_shape[0] = <np.npy_intp> {{ var }}.size()
py{{ var }} = np.PyArray_SimpleNew(1, {{ var }}_shape, np.NPY_OBJECT)
for i{{ var }} in range({{ var }}_shape[0]):
    {{ var }}_i = {{ elem_to_dynamic }}
    py{{ var }}[i{{ var }}] = {{ var }}_i
",
        "py{{ var }}",
    ),
    // dynamic -> native, fixed conversions
    src(ToNative, Base, "bool", "", "", "<bint> {{ var }}"),
    src(ToNative, Base, "int", "", "", "<int> {{ var }}"),
    src(ToNative, Base, "float", "", "", "<float> {{ var }}"),
    src(ToNative, Base, "double", "", "", "<double> {{ var }}"),
    src(
        ToNative,
        Base,
        "std::string",
        "cdef bytes b_{{ var }}
",
        "if isinstance({{ var }}, str):
    b_{{ var }} = {{ var }}.encode()
elif isinstance({{ var }}, bytes):
    b_{{ var }} = {{ var }}
else:
    b_{{ var }} = bytes({{ var }})
",
        "std_string(<const char*> b_{{ var }})",
    ),
    src(
        ToNative,
        Base,
        "cyclus::Blob",
        "",
        "",
        "cpp_cyclus.Blob(std_string(<const char*> {{ var }}))",
    ),
    src(ToNative, Base, "boost::uuids::uuid", "", "", "uuid_py_to_cpp({{ var }})"),
    src(ToNative, Base, "cyclus::Material", "", "", "None"),
    src(ToNative, Base, "cyclus::Product", "", "", "None"),
    src(ToNative, Base, "cyclus::toolkit::ResourceBuff", "", "", "None"),
    // dynamic -> native, families
    src(
        ToNative,
        Family,
        "std::set",
        "{{ val.decl }}
cdef std_set[{{ val.type_name }}] cpp{{ var }}
",
        "for {{ val.name }} in {{ var }}:
    {{ val.body | reindent(width=4) }}
    cpp{{ var }}.insert({{ val.expr }})
",
        "cpp{{ var }}",
    ),
    src(
        ToNative,
        Family,
        "std::map",
        "{{ key.decl }}
{{ val.decl }}
cdef {{ type_name }} cpp{{ var }}
",
        "if not isinstance({{ var }}, collections.abc.Mapping):
    {{ var }} = dict({{ var }})
for {{ key.name }}, {{ val.name }} in {{ var }}.items():
    {{ key.body | reindent(width=4) }}
    {{ val.body | reindent(width=4) }}
    cpp{{ var }}[{{ key.expr }}] = {{ val.expr }}
",
        "cpp{{ var }}",
    ),
    src(
        ToNative,
        Family,
        "std::pair",
        "{{ first.decl }}
{{ second.decl }}
cdef {{ type_name }} cpp{{ var }}
",
        "{{ first.name }} = {{ var }}[0]
{{ first.body }}
cpp{{ var }}.first = {{ first.expr }}
{{ second.name }} = {{ var }}[1]
{{ second.body }}
cpp{{ var }}.second = {{ second.expr }}
",
        "cpp{{ var }}",
    ),
    src(
        ToNative,
        Family,
        "std::list",
        "{{ val.decl }}
cdef std_list[{{ val.type_name }}] cpp{{ var }}
",
        "for {{ val.name }} in {{ var }}:
    {{ val.body | reindent(width=4) }}
    cpp{{ var }}.push_back({{ val.expr }})
",
        "cpp{{ var }}",
    ),
    src(
        ToNative,
        Family,
        "std::vector",
        "cdef int i{{ var }}
cdef int {{ var }}_size
cdef {{ type_name }} cpp{{ var }}
cdef {{ val.type_name }} * {{ var }}_data
",
        "{{ var }}_size = len({{ var }})
cpp{{ var }}.resize(<size_t> {{ var }}_size)
if isinstance({{ var }}, np.ndarray) and (<np.ndarray> {{ var }}).descr.type_num == {{ val.storage }}:
    {{ var }}_data = <{{ val.type_name }} *> np.PyArray_DATA(<np.ndarray> {{ var }})
    memcpy(<void*> &cpp{{ var }}[0], {{ var }}_data, sizeof({{ val.type_name }}) * {{ var }}_size)
else:
    for i{{ var }}, {{ val.name }} in enumerate({{ var }}):
        cpp{{ var }}[i{{ var }}] = {{ val.to_native }}
",
        "cpp{{ var }}",
    ),
    src(ToNative, Family, "cyclus::toolkit::ResBuf", "", "", "None"),
    src(ToNative, Family, "cyclus::toolkit::ResMap", "", "", "None"),
    src(
        ToNative,
        ObjectArray,
        SINGLETON_KEY,
        "cdef int i{{ var }}
cdef int {{ var }}_size
cdef {{ type_name }} cpp{{ var }}
",
        "{{ var }}_size = len({{ var }})
cpp{{ var }}.resize(<size_t> {{ var }}_size)
for i{{ var }}, {{ val.name }} in enumerate({{ var }}):
    cpp{{ var }}[i{{ var }}] = {{ val.to_native }}
",
        "cpp{{ var }}",
    ),
    // compositions
    src(
        ToNative,
        Composition,
        SINGLETON_KEY,
        "cdef int k{{ var }}
cdef double v{{ var }}
cdef cpp_cyclus.CompMap c{{ var }}
cdef shared_ptr[cpp_cyclus.Composition] p{{ var }}
",
        "if not isinstance({{ var }}, dict):
    {{ var }} = dict({{ var }})
for key{{ var }}, val{{ var }} in {{ var }}.items():
    k{{ var }} = nucname.id(key{{ var }})
    v{{ var }} = val{{ var }}
    c{{ var }}[k{{ var }}] = v{{ var }}
p{{ var }} = cpp_cyclus.Composition.{{ factory }}(c{{ var }})
",
        "p{{ var }}",
    ),
    src(
        ToDynamic,
        Composition,
        SINGLETON_KEY,
        "cdef cpp_cyclus.CompMap c{{ var }}
",
        "c{{ var }} = deref({{ var }}).{{ accessor }}()
",
        "{{ map_routine }}(<{{ map_type }}> c{{ var }})",
    ),
];
