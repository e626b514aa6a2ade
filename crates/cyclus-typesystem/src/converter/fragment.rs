// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion fragments and their re-indentation.

use serde::Serialize;
use std::collections::HashMap;
use tera::Value;

/// The three pieces of one conversion.
///
/// `declarations` and `body` may span several lines; `result` is a single
/// expression referencing the converted value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fragments {
    pub declarations: String,
    pub body: String,
    pub result: String,
}

impl Fragments {
    pub fn new(
        declarations: impl Into<String>,
        body: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            declarations: declarations.into(),
            body: body.into(),
            result: result.into(),
        }
    }

    /// True when the conversion is a bare expression.
    pub fn is_inline(&self) -> bool {
        self.declarations.trim().is_empty() && self.body.trim().is_empty()
    }
}

/// Shift every line after the first by `width` spaces.
///
/// The first line is left alone because it lands at the insertion point,
/// which already carries the enclosing indentation.
pub fn reindent(text: &str, width: usize) -> String {
    let pad = format!("\n{}", " ".repeat(width));
    text.replace('\n', &pad)
}

/// Tera filter form of [`reindent`]: `{{ val.body | reindent(width=4) }}`.
pub(crate) fn reindent_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("reindent: value must be a string"))?;
    let width = match args.get("width") {
        Some(w) => w
            .as_u64()
            .ok_or_else(|| tera::Error::msg("reindent: width must be a positive integer"))?,
        None => 4,
    };
    Ok(Value::String(reindent(text, width as usize)))
}
