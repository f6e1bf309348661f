//! Grid addressing for spreadsheet templates.
//!
//! Cells are addressed in A1 notation (`"C8"`, `"G102"`). Templates frequently
//! merge cells into one visual block; writes must land on the block's
//! top-left anchor, which [`resolve_write_target`] finds.

use crate::error::{DocumentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single cell coordinate. Both `column` and `row` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellRef {
    pub column: u32,
    pub row: u32,
}

impl CellRef {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Parses an A1-style reference such as `"B12"` or `"aa3"`.
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let split = reference
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| DocumentError::InvalidCellReference(reference.to_string()))?;
        let (letters, digits) = reference.split_at(split);

        if letters.is_empty() || letters.len() > 3 || !letters.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(DocumentError::InvalidCellReference(reference.to_string()));
        }

        let column = letters
            .chars()
            .fold(0u32, |acc, c| acc * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1));

        let row: u32 = digits
            .parse()
            .map_err(|_| DocumentError::InvalidCellReference(reference.to_string()))?;
        if row == 0 {
            return Err(DocumentError::InvalidCellReference(reference.to_string()));
        }

        Ok(Self { column, row })
    }

    pub fn column_letters(&self) -> String {
        let mut n = self.column;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letters(), self.row)
    }
}

impl FromStr for CellRef {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CellRef {
    type Error = DocumentError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CellRef> for String {
    fn from(cell: CellRef) -> Self {
        cell.to_string()
    }
}

/// A rectangular span of cells, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellRange {
    pub top_left: CellRef,
    pub bottom_right: CellRef,
}

impl CellRange {
    /// Builds a range from any two opposite corners.
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            top_left: CellRef::new(a.column.min(b.column), a.row.min(b.row)),
            bottom_right: CellRef::new(a.column.max(b.column), a.row.max(b.row)),
        }
    }

    /// Parses `"B2:D2"`. A bare `"B2"` is a one-cell range.
    pub fn parse(range: &str) -> Result<Self> {
        match range.split_once(':') {
            Some((start, end)) => Ok(Self::new(CellRef::parse(start)?, CellRef::parse(end)?)),
            None => {
                let cell = CellRef::parse(range)?;
                Ok(Self::new(cell, cell))
            }
        }
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        (self.top_left.column..=self.bottom_right.column).contains(&cell.column)
            && (self.top_left.row..=self.bottom_right.row).contains(&cell.row)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.top_left, self.bottom_right)
    }
}

impl FromStr for CellRange {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CellRange {
    type Error = DocumentError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CellRange> for String {
    fn from(range: CellRange) -> Self {
        range.to_string()
    }
}

/// Returns the cell a write aimed at `cell` must actually land on.
///
/// Regions are scanned in order and the first one containing `cell` wins, so
/// overlapping regions (which well-formed templates never have) resolve to
/// whichever was declared first. Cells outside every region are returned
/// unchanged; range checking is left to the document.
pub fn resolve_write_target(regions: &[CellRange], cell: CellRef) -> CellRef {
    regions
        .iter()
        .find(|region| region.contains(cell))
        .map(|region| region.top_left)
        .unwrap_or(cell)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Font {
    pub name: String,
    pub size: u32,
    #[serde(default)]
    pub underline: bool,
}

impl Font {
    pub fn arial(size: u32) -> Self {
        Self {
            name: "Arial".to_string(),
            size,
            underline: false,
        }
    }

    pub fn underlined(mut self) -> Self {
        self.underline = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlignment {
    Left,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: Option<VerticalAlignment>,
    #[serde(default)]
    pub wrap_text: bool,
}

/// Font plus alignment applied to every written cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStyle {
    pub font: Font,
    pub alignment: Alignment,
}

impl CellStyle {
    /// Arial 11, left aligned. Used for plain field values.
    pub fn plain() -> Self {
        Self {
            font: Font::arial(11),
            alignment: Alignment {
                horizontal: HorizontalAlignment::Left,
                vertical: None,
                wrap_text: false,
            },
        }
    }

    /// Arial 11, justified, top aligned and wrapped. Used for paragraphs and clauses.
    pub fn justified() -> Self {
        Self {
            font: Font::arial(11),
            alignment: Alignment {
                horizontal: HorizontalAlignment::Justify,
                vertical: Some(VerticalAlignment::Top),
                wrap_text: true,
            },
        }
    }

    /// Arial 11, right and top aligned. Used for the dated signature line.
    pub fn right_top() -> Self {
        Self {
            font: Font::arial(11),
            alignment: Alignment {
                horizontal: HorizontalAlignment::Right,
                vertical: Some(VerticalAlignment::Top),
                wrap_text: false,
            },
        }
    }

    pub fn with_underline(mut self) -> Self {
        self.font = self.font.underlined();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> CellRef {
        CellRef::parse(s).unwrap()
    }

    #[test]
    fn test_parse_a1_references() {
        assert_eq!(cell("A1"), CellRef::new(1, 1));
        assert_eq!(cell("C8"), CellRef::new(3, 8));
        assert_eq!(cell("g102"), CellRef::new(7, 102));
        assert_eq!(cell("AA3"), CellRef::new(27, 3));
        assert_eq!(cell("AA3").to_string(), "AA3");
        assert_eq!(cell("Z9").to_string(), "Z9");
    }

    #[test]
    fn test_reject_malformed_references() {
        assert!(CellRef::parse("").is_err());
        assert!(CellRef::parse("12").is_err());
        assert!(CellRef::parse("A0").is_err());
        assert!(CellRef::parse("A1B").is_err());
        assert!(CellRef::parse("ABCD1").is_err());
        assert!(CellRange::parse("A1:").is_err());
    }

    #[test]
    fn test_range_normalizes_corners() {
        let range = CellRange::parse("D4:B2").unwrap();
        assert_eq!(range.to_string(), "B2:D4");
        assert!(range.contains(cell("C3")));
        assert!(!range.contains(cell("E3")));
    }

    #[test]
    fn test_resolve_inside_merged_region() {
        let regions = vec![CellRange::parse("B2:D2").unwrap()];
        assert_eq!(resolve_write_target(&regions, cell("C2")), cell("B2"));
        assert_eq!(resolve_write_target(&regions, cell("D2")), cell("B2"));
        assert_eq!(resolve_write_target(&regions, cell("B2")), cell("B2"));
    }

    #[test]
    fn test_resolve_outside_merged_region_is_identity() {
        let regions = vec![CellRange::parse("B2:D2").unwrap()];
        assert_eq!(resolve_write_target(&regions, cell("A1")), cell("A1"));
        assert_eq!(resolve_write_target(&regions, cell("C3")), cell("C3"));
        assert_eq!(resolve_write_target(&[], cell("C2")), cell("C2"));
    }

    #[test]
    fn test_resolve_overlap_takes_first_region() {
        let regions = vec![
            CellRange::parse("A1:C3").unwrap(),
            CellRange::parse("B2:D4").unwrap(),
        ];
        assert_eq!(resolve_write_target(&regions, cell("C3")), cell("A1"));
        assert_eq!(resolve_write_target(&regions, cell("D4")), cell("B2"));
    }

    #[test]
    fn test_cell_serde_uses_a1_text() {
        let json = serde_json::to_string(&cell("H12")).unwrap();
        assert_eq!(json, "\"H12\"");
        let back: CellRange = serde_json::from_str("\"B2:D2\"").unwrap();
        assert_eq!(back, CellRange::parse("B2:D2").unwrap());
    }
}
