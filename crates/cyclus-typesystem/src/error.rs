// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by every stage of the type system.

use thiserror::Error;

/// Type system errors.
///
/// None of these are transient: each one means the run is misconfigured or
/// the type table declares something the generator cannot handle.
#[derive(Debug, Error)]
pub enum TypeSystemError {
    #[error("Cyclus version {selector} could not be found in type table")]
    VersionNotFound { selector: String },

    #[error("Invalid version string {0:?}: must not be empty")]
    InvalidVersion(String),

    #[error("Unbalanced template spelling {spelling:?}: {reason}")]
    UnbalancedTemplateSpelling {
        spelling: String,
        reason: &'static str,
    },

    #[error("Empty template argument in {spelling:?}")]
    EmptyTemplateArgument { spelling: String },

    #[error("Unknown type {0:?}: not a base leaf and not a declared type name")]
    UnknownType(String),

    #[error("No conversion strategy for {0:?}")]
    UnknownConversionStrategy(String),

    #[error("Template {head} takes {expected} argument(s), got {found}")]
    TemplateArity {
        head: String,
        expected: usize,
        found: usize,
    },

    #[error("Composition basis must be either mass or atom, not {0:?}")]
    UnsupportedBasis(String),

    #[error("Invalid type table: {0}")]
    Table(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TypeSystemError>;
