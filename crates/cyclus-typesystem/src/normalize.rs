// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Template spelling parser and the normalized type tree.
//!
//! Native type spellings such as `std::map<int, std::vector<double> >` are
//! parsed into a [`NormalizedType`] so that two spellings of the same
//! instantiation compare equal regardless of whitespace.

use crate::error::{Result, TypeSystemError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Brace and separator characters used when splitting template arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSyntax {
    pub open: char,
    pub close: char,
    pub separator: char,
}

impl Default for TemplateSyntax {
    fn default() -> Self {
        Self {
            open: '<',
            close: '>',
            separator: ',',
        }
    }
}

/// Structural form of a type: a leaf spelling or a template family applied
/// to normalized arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NormalizedType {
    Leaf(String),
    Template {
        head: String,
        args: Vec<NormalizedType>,
    },
}

impl NormalizedType {
    pub fn leaf(spelling: impl Into<String>) -> Self {
        NormalizedType::Leaf(spelling.into())
    }

    pub fn template(head: impl Into<String>, args: Vec<NormalizedType>) -> Self {
        NormalizedType::Template {
            head: head.into(),
            args,
        }
    }

    /// Family name of a template, or the spelling of a leaf.
    pub fn head(&self) -> &str {
        match self {
            NormalizedType::Leaf(s) => s,
            NormalizedType::Template { head, .. } => head,
        }
    }

    /// Template arguments; empty for leaves.
    pub fn args(&self) -> &[NormalizedType] {
        match self {
            NormalizedType::Leaf(_) => &[],
            NormalizedType::Template { args, .. } => args,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NormalizedType::Leaf(_))
    }

    /// Nesting depth: 0 for leaves.
    pub fn depth(&self) -> usize {
        self.args().iter().map(|a| a.depth() + 1).max().unwrap_or(0)
    }

    /// Tuple literal of this form on the dynamic side, e.g.
    /// `('std::vector', 'double')`.
    pub fn tuple_repr(&self) -> String {
        match self {
            NormalizedType::Leaf(s) => format!("'{s}'"),
            NormalizedType::Template { head, args } => {
                let mut parts = vec![format!("'{head}'")];
                parts.extend(args.iter().map(NormalizedType::tuple_repr));
                format!("({})", parts.join(", "))
            }
        }
    }
}

impl fmt::Display for NormalizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedType::Leaf(s) => f.write_str(s),
            NormalizedType::Template { head, args } => {
                write!(f, "{head}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
        }
    }
}

impl From<&str> for NormalizedType {
    fn from(spelling: &str) -> Self {
        NormalizedType::leaf(spelling)
    }
}

fn unbalanced(spelling: &str, reason: &'static str) -> TypeSystemError {
    TypeSystemError::UnbalancedTemplateSpelling {
        spelling: spelling.to_string(),
        reason,
    }
}

/// Split the arguments between the first open brace and the last close
/// brace on top-level separators only.
pub fn split_template_args(spelling: &str, syntax: TemplateSyntax) -> Result<Vec<String>> {
    let open_at = spelling
        .find(syntax.open)
        .ok_or_else(|| unbalanced(spelling, "missing opening brace"))?;
    let close_at = spelling
        .rfind(syntax.close)
        .ok_or_else(|| unbalanced(spelling, "missing closing brace"))?;
    if close_at < open_at {
        return Err(unbalanced(spelling, "closing brace before opening brace"));
    }
    if !spelling[close_at + syntax.close.len_utf8()..].trim().is_empty() {
        return Err(unbalanced(spelling, "text after closing brace"));
    }

    let inner = &spelling[open_at + syntax.open.len_utf8()..close_at];
    let mut pieces = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        if c == syntax.open {
            depth += 1;
        } else if c == syntax.close {
            depth = depth
                .checked_sub(1)
                .ok_or_else(|| unbalanced(spelling, "closing brace without opening brace"))?;
        } else if c == syntax.separator && depth == 0 {
            pieces.push(&inner[start..i]);
            start = i + c.len_utf8();
        }
    }
    if depth != 0 {
        return Err(unbalanced(spelling, "opening brace never closed"));
    }
    pieces.push(&inner[start..]);

    pieces
        .into_iter()
        .map(|p| {
            let arg = p.trim();
            if arg.is_empty() {
                Err(TypeSystemError::EmptyTemplateArgument {
                    spelling: spelling.to_string(),
                })
            } else {
                Ok(arg.to_string())
            }
        })
        .collect()
}

/// Parse a native spelling with the default `<`, `>`, `,` syntax.
pub fn parse_template(spelling: &str) -> Result<NormalizedType> {
    parse_template_with(spelling, TemplateSyntax::default())
}

/// Parse a native spelling into its normalized form.
///
/// A spelling without template braces is returned unchanged as a leaf.
pub fn parse_template_with(spelling: &str, syntax: TemplateSyntax) -> Result<NormalizedType> {
    let Some(open_at) = spelling.find(syntax.open) else {
        if spelling.contains(syntax.close) {
            return Err(unbalanced(spelling, "closing brace without opening brace"));
        }
        return Ok(NormalizedType::leaf(spelling));
    };

    let head = spelling[..open_at].trim();
    if head.is_empty() {
        return Err(unbalanced(spelling, "missing template head"));
    }
    if head.contains(syntax.close) {
        return Err(unbalanced(spelling, "closing brace before opening brace"));
    }
    let args = split_template_args(spelling, syntax)?
        .iter()
        .map(|arg| parse_template_with(arg, syntax))
        .collect::<Result<Vec<_>>>()?;

    Ok(NormalizedType::template(head, args))
}
