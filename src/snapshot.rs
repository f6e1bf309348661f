//! In-memory documents with a JSON snapshot format.
//!
//! [`MemorySheet`] and [`MemoryDocument`] implement the template traits
//! over ordered maps, so serializing the same content always yields the
//! same bytes. [`SnapshotCodec`] reads them back from template files.

use crate::catalog::{DocumentVariant, TemplateFormat};
use crate::error::{DocumentError, Result};
use crate::grid::{CellRange, CellRef, CellStyle, HorizontalAlignment};
use crate::template::{GridDocument, ParagraphDocument, TemplateAsset, TemplateCodec, TemplateStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spreadsheet format limits.
pub const MAX_ROW: u32 = 1_048_576;
pub const MAX_COLUMN: u32 = 16_384;

fn default_max_row() -> u32 {
    MAX_ROW
}

fn default_max_column() -> u32 {
    MAX_COLUMN
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySheet {
    #[serde(default)]
    merged: Vec<CellRange>,
    #[serde(default)]
    cells: BTreeMap<CellRef, SheetCell>,
    #[serde(default)]
    row_heights: BTreeMap<u32, f64>,
    #[serde(default = "default_max_row")]
    max_row: u32,
    #[serde(default = "default_max_column")]
    max_column: u32,
}

impl Default for MemorySheet {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::with_bounds(MAX_COLUMN, MAX_ROW)
    }

    /// A sheet that rejects cells beyond `max_column` x `max_row`.
    pub fn with_bounds(max_column: u32, max_row: u32) -> Self {
        Self {
            merged: Vec::new(),
            cells: BTreeMap::new(),
            row_heights: BTreeMap::new(),
            max_row,
            max_column,
        }
    }

    pub fn merge(&mut self, range: CellRange) -> Result<()> {
        self.check_bounds(range.top_left)?;
        self.check_bounds(range.bottom_right)?;
        self.merged.push(range);
        Ok(())
    }

    pub fn merge_range(mut self, range: &str) -> Result<Self> {
        self.merge(CellRange::parse(range)?)?;
        Ok(self)
    }

    pub fn cell(&self, cell: CellRef) -> Option<&SheetCell> {
        self.cells.get(&cell)
    }

    pub fn text_at(&self, reference: &str) -> Option<&str> {
        let cell = CellRef::parse(reference).ok()?;
        self.cells.get(&cell)?.text.as_deref()
    }

    pub fn style_at(&self, reference: &str) -> Option<&CellStyle> {
        let cell = CellRef::parse(reference).ok()?;
        self.cells.get(&cell)?.style.as_ref()
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    /// Cells that hold text, in row-major order.
    pub fn written_cells(&self) -> Vec<CellRef> {
        let mut cells: Vec<CellRef> = self
            .cells
            .iter()
            .filter(|(_, cell)| cell.text.is_some())
            .map(|(cell, _)| *cell)
            .collect();
        cells.sort_by_key(|cell| (cell.row, cell.column));
        cells
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| DocumentError::TemplateFormat(format!("invalid sheet snapshot: {}", e)))
    }

    fn check_bounds(&self, cell: CellRef) -> Result<()> {
        if cell.column == 0 || cell.row == 0 || cell.column > self.max_column || cell.row > self.max_row
        {
            return Err(DocumentError::CellOutOfRange(format!(
                "{} (sheet is {} columns x {} rows)",
                cell, self.max_column, self.max_row
            )));
        }
        Ok(())
    }

    fn check_writable(&self, cell: CellRef) -> Result<()> {
        self.check_bounds(cell)?;
        if let Some(region) = self
            .merged
            .iter()
            .find(|region| region.contains(cell) && region.top_left != cell)
        {
            return Err(DocumentError::MergedCellWrite(format!("{} in {}", cell, region)));
        }
        Ok(())
    }
}

impl GridDocument for MemorySheet {
    fn merged_regions(&self) -> &[CellRange] {
        &self.merged
    }

    fn cell_text(&self, cell: CellRef) -> Result<Option<String>> {
        self.check_bounds(cell)?;
        Ok(self.cells.get(&cell).and_then(|c| c.text.clone()))
    }

    fn set_cell(&mut self, cell: CellRef, text: &str, style: &CellStyle) -> Result<()> {
        self.check_writable(cell)?;
        let entry = self.cells.entry(cell).or_default();
        entry.text = Some(text.to_string());
        entry.style = Some(style.clone());
        Ok(())
    }

    fn set_cell_style(&mut self, cell: CellRef, style: &CellStyle) -> Result<()> {
        self.check_writable(cell)?;
        self.cells.entry(cell).or_default().style = Some(style.clone());
        Ok(())
    }

    fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
        if row == 0 || row > self.max_row {
            return Err(DocumentError::CellOutOfRange(format!("row {}", row)));
        }
        self.row_heights.insert(row, height);
        Ok(())
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<HorizontalAlignment>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alignment: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<TableCell>>,
}

/// A word-processor document: body paragraphs and tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paragraphs: lines.into_iter().map(Paragraph::new).collect(),
            tables: Vec::new(),
        }
    }

    /// Adds a one-row table whose cells each hold a single paragraph.
    #[must_use]
    pub fn with_table_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row = cells
            .into_iter()
            .map(|text| TableCell {
                paragraphs: vec![Paragraph::new(text)],
            })
            .collect();
        self.tables.push(Table { rows: vec![row] });
        self
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| DocumentError::TemplateFormat(format!("invalid document snapshot: {}", e)))
    }

    fn table_paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.tables
            .iter()
            .flat_map(|table| table.rows.iter())
            .flat_map(|row| row.iter())
            .flat_map(|cell| cell.paragraphs.iter())
    }

    fn table_paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.tables
            .iter_mut()
            .flat_map(|table| table.rows.iter_mut())
            .flat_map(|row| row.iter_mut())
            .flat_map(|cell| cell.paragraphs.iter_mut())
    }
}

fn paragraph_out_of_range(index: usize, len: usize) -> DocumentError {
    DocumentError::CellOutOfRange(format!("paragraph {} of {}", index, len))
}

impl ParagraphDocument for MemoryDocument {
    fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    fn paragraph_text(&self, index: usize) -> Option<&str> {
        self.paragraphs.get(index).map(|p| p.text.as_str())
    }

    fn set_paragraph_text(&mut self, index: usize, text: &str) -> Result<()> {
        let len = self.paragraphs.len();
        let paragraph = self
            .paragraphs
            .get_mut(index)
            .ok_or_else(|| paragraph_out_of_range(index, len))?;
        paragraph.text = text.to_string();
        Ok(())
    }

    fn insert_paragraph_before(
        &mut self,
        index: usize,
        text: &str,
        alignment: Option<HorizontalAlignment>,
    ) -> Result<()> {
        if index > self.paragraphs.len() {
            return Err(paragraph_out_of_range(index, self.paragraphs.len()));
        }
        self.paragraphs.insert(
            index,
            Paragraph {
                text: text.to_string(),
                alignment,
            },
        );
        Ok(())
    }

    fn append_paragraph(&mut self, text: &str) -> Result<()> {
        self.paragraphs.push(Paragraph::new(text));
        Ok(())
    }

    fn table_paragraph_count(&self) -> usize {
        self.table_paragraphs().count()
    }

    fn table_paragraph_text(&self, index: usize) -> Option<&str> {
        self.table_paragraphs().nth(index).map(|p| p.text.as_str())
    }

    fn set_table_paragraph_text(&mut self, index: usize, text: &str) -> Result<()> {
        let len = self.table_paragraph_count();
        let paragraph = self
            .table_paragraphs_mut()
            .nth(index)
            .ok_or_else(|| paragraph_out_of_range(index, len))?;
        paragraph.text = text.to_string();
        Ok(())
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Decodes template files written as JSON snapshots of the in-memory documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotCodec;

impl TemplateCodec for SnapshotCodec {
    fn decode(&self, format: TemplateFormat, bytes: &[u8]) -> Result<TemplateAsset> {
        match format {
            TemplateFormat::Spreadsheet => {
                Ok(TemplateAsset::Grid(Box::new(MemorySheet::from_json(bytes)?)))
            }
            TemplateFormat::WordProcessor => Ok(TemplateAsset::Paragraphs(Box::new(
                MemoryDocument::from_json(bytes)?,
            ))),
        }
    }
}

/// Keeps one serialized snapshot per variant and decodes a fresh copy on
/// every load.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateStore {
    snapshots: BTreeMap<DocumentVariant, Vec<u8>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_sheet(&mut self, variant: DocumentVariant, sheet: &MemorySheet) -> Result<()> {
        self.snapshots.insert(variant, sheet.to_bytes()?);
        Ok(())
    }

    pub fn insert_document(&mut self, variant: DocumentVariant, document: &MemoryDocument) -> Result<()> {
        self.snapshots.insert(variant, document.to_bytes()?);
        Ok(())
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load(&self, variant: DocumentVariant) -> Result<TemplateAsset> {
        let bytes = self
            .snapshots
            .get(&variant)
            .ok_or_else(|| DocumentError::TemplateNotFound {
                variant: variant.display_name().to_string(),
                path: variant.template_file().into(),
            })?;
        SnapshotCodec.decode(variant.format(), bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> CellRef {
        CellRef::parse(s).unwrap()
    }

    #[test]
    fn test_write_through_merged_region() {
        let mut sheet = MemorySheet::new().merge_range("B2:D2").unwrap();

        let target = sheet
            .write_text(cell("C2"), "Maria", &CellStyle::plain())
            .unwrap();
        assert_eq!(target, cell("B2"));
        assert_eq!(sheet.text_at("B2"), Some("Maria"));
        assert_eq!(sheet.text_at("C2"), None);

        let target = sheet
            .write_text(cell("A1"), "x", &CellStyle::plain())
            .unwrap();
        assert_eq!(target, cell("A1"));
    }

    #[test]
    fn test_direct_write_into_merged_cell_is_rejected() {
        let mut sheet = MemorySheet::new().merge_range("B2:D2").unwrap();
        let err = sheet
            .set_cell(cell("C2"), "x", &CellStyle::plain())
            .unwrap_err();
        assert!(matches!(err, DocumentError::MergedCellWrite(_)));
    }

    #[test]
    fn test_out_of_range_cell() {
        let mut sheet = MemorySheet::with_bounds(10, 50);
        let err = sheet
            .write_text(cell("K1"), "x", &CellStyle::plain())
            .unwrap_err();
        assert!(matches!(err, DocumentError::CellOutOfRange(_)));
        assert!(sheet.set_row_height(51, 20.0).is_err());
        assert!(sheet.merge_range("A49:A51").is_err());
    }

    #[test]
    fn test_restyle_keeps_text() {
        let mut sheet = MemorySheet::new();
        sheet
            .write_text(cell("A31"), "cláusula", &CellStyle::plain())
            .unwrap();
        sheet.restyle(cell("A31"), &CellStyle::justified()).unwrap();
        assert_eq!(sheet.text_at("A31"), Some("cláusula"));
        assert_eq!(sheet.style_at("A31"), Some(&CellStyle::justified()));
    }

    #[test]
    fn test_sheet_snapshot_is_stable() {
        let mut sheet = MemorySheet::new().merge_range("A8:L8").unwrap();
        sheet
            .write_text(cell("G4"), "Maria", &CellStyle::plain())
            .unwrap();
        sheet
            .write_text(cell("C4"), "Silva", &CellStyle::plain())
            .unwrap();
        sheet.set_row_height(8, 30.0).unwrap();

        let bytes = sheet.to_bytes().unwrap();
        let reloaded = MemorySheet::from_json(&bytes).unwrap();
        assert_eq!(reloaded, sheet);
        assert_eq!(reloaded.to_bytes().unwrap(), bytes);
        assert_eq!(reloaded.written_cells(), vec![cell("C4"), cell("G4")]);
    }

    #[test]
    fn test_paragraph_insertion() {
        let mut doc = MemoryDocument::from_lines(["a", "b"]);
        doc.insert_paragraph_before(1, "x", Some(HorizontalAlignment::Right))
            .unwrap();
        doc.insert_paragraph_before(3, "end", None).unwrap();
        let texts: Vec<&str> = doc.paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "x", "b", "end"]);
        assert_eq!(doc.paragraphs[1].alignment, Some(HorizontalAlignment::Right));
        assert!(doc.insert_paragraph_before(9, "no", None).is_err());
    }

    #[test]
    fn test_find_paragraph_ignores_case() {
        let doc = MemoryDocument::from_lines(["", "Recibo de Pagamento", "fim"]);
        assert_eq!(doc.find_paragraph("RECIBO DE PAGAMENTO"), Some(1));
        assert_eq!(doc.find_paragraph("assinatura"), None);
    }

    #[test]
    fn test_table_paragraphs_are_flattened() {
        let mut doc = MemoryDocument::new()
            .with_table_row(["Cliente: {CLIENTE}", "CPF: {CPF}"])
            .with_table_row(["Valor: {VALOR}"]);
        assert_eq!(doc.table_paragraph_count(), 3);
        assert_eq!(doc.table_paragraph_text(2), Some("Valor: {VALOR}"));
        doc.set_table_paragraph_text(1, "CPF: 123").unwrap();
        assert_eq!(doc.tables[0].rows[0][1].paragraphs[0].text, "CPF: 123");
    }

    #[test]
    fn test_memory_store_loads_fresh_copies() {
        let mut store = MemoryTemplateStore::new();
        let sheet = MemorySheet::new().merge_range("A1:B1").unwrap();
        store
            .insert_sheet(DocumentVariant::IncomeDeclaration, &sheet)
            .unwrap();

        let TemplateAsset::Grid(mut first) = store.load(DocumentVariant::IncomeDeclaration).unwrap() else {
            panic!("expected a grid");
        };
        first
            .write_text(cell("B1"), "x", &CellStyle::plain())
            .unwrap();

        let TemplateAsset::Grid(second) = store.load(DocumentVariant::IncomeDeclaration).unwrap() else {
            panic!("expected a grid");
        };
        assert_eq!(second.cell_text(cell("A1")).unwrap(), None);

        let err = store.load(DocumentVariant::PowerOfAttorney).unwrap_err();
        assert!(matches!(err, DocumentError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_codec_rejects_garbage() {
        let err = SnapshotCodec
            .decode(TemplateFormat::Spreadsheet, b"not json")
            .unwrap_err();
        assert!(matches!(err, DocumentError::TemplateFormat(_)));
    }
}
