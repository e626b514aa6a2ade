// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type table rows and version selection.
//!
//! The table is the `dbtypes.json` layout: a JSON array of rows whose first
//! row names the columns. Columns are located by name, so their order may
//! change between releases.

use crate::error::{Result, TypeSystemError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

pub const COL_ID: &str = "id";
pub const COL_NAME: &str = "name";
pub const COL_VERSION: &str = "version";
pub const COL_NATIVE_TYPE: &str = "C++ type";
pub const COL_SHAPE_RANK: &str = "shape rank";

/// One declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTableRow {
    pub id: i64,
    pub name: String,
    pub version: String,
    pub native_type: String,
    pub shape_rank: i64,
}

impl TypeTableRow {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        version: impl Into<String>,
        native_type: impl Into<String>,
        shape_rank: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            version: version.into(),
            native_type: native_type.into(),
            shape_rank,
        }
    }
}

/// Target version: an optional exact version string and an optional
/// `major.minor` pair used as a prefix filter. At least one is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSelector {
    raw: Option<String>,
    major_minor: Option<(u32, u32)>,
}

impl VersionSelector {
    /// Prefix-only selector.
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            raw: None,
            major_minor: Some((major, minor)),
        }
    }

    /// Selector from a raw version string such as `1.5.3` or `v1.5.3-rc1`.
    ///
    /// A string without a leading `major.minor` (e.g. `dev`) only matches
    /// rows tagged with exactly that string.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TypeSystemError::InvalidVersion(raw.into()));
        }
        Ok(Self {
            raw: Some(raw.to_string()),
            major_minor: parse_major_minor(raw),
        })
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn major_minor(&self) -> Option<(u32, u32)> {
        self.major_minor
    }

    /// `major.minor` prefix checked against row versions.
    pub fn prefix(&self) -> Option<String> {
        self.major_minor
            .map(|(major, minor)| format!("{major}.{minor}"))
    }

    /// Whether `version` (leading `v` ignored) belongs to this `major.minor`.
    ///
    /// `1.1` does not match `1.10.0`. Raw-only selectors match nothing here.
    pub fn matches_prefix(&self, version: &str) -> bool {
        let Some(prefix) = self.prefix() else {
            return false;
        };
        let version = version.trim();
        let version = version.strip_prefix('v').unwrap_or(version);
        match version.strip_prefix(prefix.as_str()) {
            Some(rest) => !rest.starts_with(|c: char| c.is_ascii_digit()),
            None => false,
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.raw, self.major_minor) {
            (Some(raw), Some((major, minor))) => write!(f, "{raw} (v{major}.{minor})"),
            (Some(raw), None) => f.write_str(raw),
            (None, Some((major, minor))) => write!(f, "v{major}.{minor}"),
            (None, None) => f.write_str("<none>"),
        }
    }
}

fn parse_major_minor(version: &str) -> Option<(u32, u32)> {
    let re = Regex::new(r"^v?(\d+)\.(\d+)").ok()?;
    let caps = re.captures(version.trim())?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some((major, minor))
}

/// All rows of a type table, every version included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeTable {
    rows: Vec<TypeTableRow>,
}

impl TypeTable {
    pub fn new(rows: Vec<TypeTableRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TypeTableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Load a `dbtypes.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse a header-first JSON table.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: Vec<Vec<Value>> = serde_json::from_str(content)?;
        let (header, body) = raw
            .split_first()
            .ok_or_else(|| TypeSystemError::Table("missing header row".into()))?;

        let column = |name: &str| -> Result<usize> {
            header
                .iter()
                .position(|cell| cell.as_str() == Some(name))
                .ok_or_else(|| TypeSystemError::Table(format!("missing column {name:?}")))
        };
        let id = column(COL_ID)?;
        let name = column(COL_NAME)?;
        let version = column(COL_VERSION)?;
        let native_type = column(COL_NATIVE_TYPE)?;
        let shape_rank = column(COL_SHAPE_RANK)?;

        let rows = body
            .iter()
            .enumerate()
            .map(|(i, row)| {
                // Row numbers in messages count the header as row 0.
                let cells = RowCells { row, index: i + 1 };
                Ok(TypeTableRow {
                    id: cells.int(id, COL_ID)?,
                    name: cells.string(name, COL_NAME)?,
                    version: cells.string(version, COL_VERSION)?,
                    native_type: cells.string(native_type, COL_NATIVE_TYPE)?,
                    shape_rank: cells.int(shape_rank, COL_SHAPE_RANK)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rows })
    }

    /// Rows for the selected version.
    ///
    /// An exact match on the raw version string wins; otherwise rows are
    /// matched on the `major.minor` prefix.
    pub fn select(&self, selector: &VersionSelector) -> Result<Vec<&TypeTableRow>> {
        if let Some(raw) = selector.raw() {
            let exact: Vec<_> = self.rows.iter().filter(|r| r.version == raw).collect();
            if !exact.is_empty() {
                return Ok(exact);
            }
            if let Some(prefix) = selector.prefix() {
                tracing::debug!(
                    "No rows with exact version {}, falling back to prefix {}",
                    raw,
                    prefix
                );
            }
        }

        let selected: Vec<_> = self
            .rows
            .iter()
            .filter(|r| selector.matches_prefix(&r.version))
            .collect();
        if selected.is_empty() {
            return Err(TypeSystemError::VersionNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(selected)
    }

    /// Highest `major.minor` any row is tagged with.
    pub fn latest_version(&self) -> Option<VersionSelector> {
        self.rows
            .iter()
            .filter_map(|r| parse_major_minor(&r.version))
            .max()
            .map(|(major, minor)| VersionSelector::new(major, minor))
    }
}

struct RowCells<'a> {
    row: &'a [Value],
    index: usize,
}

impl RowCells<'_> {
    fn cell(&self, col: usize, name: &str) -> Result<&Value> {
        self.row.get(col).ok_or_else(|| {
            TypeSystemError::Table(format!("row {} has no {name:?} cell", self.index))
        })
    }

    fn string(&self, col: usize, name: &str) -> Result<String> {
        self.cell(col, name)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                TypeSystemError::Table(format!("row {}: {name:?} is not a string", self.index))
            })
    }

    fn int(&self, col: usize, name: &str) -> Result<i64> {
        self.cell(col, name)?.as_i64().ok_or_else(|| {
            TypeSystemError::Table(format!("row {}: {name:?} is not an integer", self.index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"[
        ["id", "name", "C++ type", "shape rank", "backend", "version", "supported"],
        [0, "BOOL", "bool", 1, "SQLite", "v1.5", 1],
        [1, "INT", "int", 1, "SQLite", "v1.5", 1],
        [0, "BOOL", "bool", 1, "HDF5", "v1.10.2", 1]
    ]"#;

    #[test]
    fn test_columns_by_name() {
        let table = TypeTable::from_json_str(TABLE).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[1], TypeTableRow::new(1, "INT", "v1.5", "int", 1));
    }

    #[test]
    fn test_missing_column() {
        let err = TypeTable::from_json_str(r#"[["id", "name"], [0, "BOOL"]]"#).unwrap_err();
        assert!(matches!(err, TypeSystemError::Table(m) if m.contains("version")));
    }

    #[test]
    fn test_bad_cell() {
        let json = r#"[["id", "name", "version", "C++ type", "shape rank"],
                       ["zero", "BOOL", "1.0", "bool", 1]]"#;
        let err = TypeTable::from_json_str(json).unwrap_err();
        assert!(matches!(err, TypeSystemError::Table(m) if m.contains("row 1")));
    }

    #[test]
    fn test_selector_parse() {
        let sel = VersionSelector::parse("v1.5.3-rc1").unwrap();
        assert_eq!(sel.major_minor(), Some((1, 5)));
        assert_eq!(sel.raw(), Some("v1.5.3-rc1"));
        let dev = VersionSelector::parse("dev").unwrap();
        assert_eq!(dev.major_minor(), None);
        assert_eq!(dev.to_string(), "dev");
        assert!(matches!(
            VersionSelector::parse("  "),
            Err(TypeSystemError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_prefix_respects_component_boundary() {
        let sel = VersionSelector::new(1, 1);
        assert!(sel.matches_prefix("1.1"));
        assert!(sel.matches_prefix("v1.1.4"));
        assert!(!sel.matches_prefix("1.10.0"));
    }

    #[test]
    fn test_exact_then_prefix() {
        let table = TypeTable::from_json_str(TABLE).unwrap();
        let exact = table.select(&VersionSelector::parse("v1.10.2").unwrap()).unwrap();
        assert_eq!(exact.len(), 1);
        let prefix = table.select(&VersionSelector::parse("1.5.1").unwrap()).unwrap();
        assert_eq!(prefix.len(), 2);
        assert!(matches!(
            table.select(&VersionSelector::new(2, 0)),
            Err(TypeSystemError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn test_raw_only_selector_matches_exactly() {
        let json = r#"[["id", "name", "version", "C++ type", "shape rank"],
                       [0, "BOOL", "dev", "bool", 1],
                       [1, "INT", "v1.5", "int", 1]]"#;
        let table = TypeTable::from_json_str(json).unwrap();
        let rows = table.select(&VersionSelector::parse("dev").unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "BOOL");
        assert!(matches!(
            table.select(&VersionSelector::parse("nightly").unwrap()),
            Err(TypeSystemError::VersionNotFound { selector }) if selector == "nightly"
        ));
    }

    #[test]
    fn test_latest_version() {
        let table = TypeTable::from_json_str(TABLE).unwrap();
        assert_eq!(table.latest_version(), Some(VersionSelector::new(1, 10)));
    }
}
