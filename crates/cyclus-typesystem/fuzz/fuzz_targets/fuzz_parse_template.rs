// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for the template spelling parser
//!
//! Exercises with arbitrary inputs:
//! - `parse_template`: must return a tree or an error, never panic
//! - `split_template_args` with a byte-selected syntax
//! - `TypeTable::from_json_str`: malformed tables are errors
//! - a parsed tree must render and re-parse to itself

#![no_main]

use cyclus_typesystem::{parse_template, split_template_args, TemplateSyntax, TypeTable};
use libfuzzer_sys::fuzz_target;

/// Map a byte to one of a few bracket styles
fn byte_to_syntax(b: u8) -> TemplateSyntax {
    match b % 3 {
        0 => TemplateSyntax::default(),
        1 => TemplateSyntax {
            open: '[',
            close: ']',
            separator: ';',
        },
        _ => TemplateSyntax {
            open: '(',
            close: ')',
            separator: ',',
        },
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Phase 1: default syntax
    if let Ok(parsed) = parse_template(input) {
        // Rendering is canonical, so it must parse back to the same tree
        let rendered = parsed.to_string();
        if let Ok(again) = parse_template(&rendered) {
            assert_eq!(again, parsed);
        }
        let _ = parsed.tuple_repr();
    }

    // Phase 2: alternate syntax picked from the first byte
    if let Some(&first) = data.first() {
        let _ = split_template_args(input, byte_to_syntax(first));
    }

    // Phase 3: table loader
    let _ = TypeTable::from_json_str(input);
});
