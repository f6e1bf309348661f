//! Template collaborators.
//!
//! The assembler never parses or serializes spreadsheet or word-processor
//! files itself. It talks to documents through [`GridDocument`] and
//! [`ParagraphDocument`], and obtains them from a [`TemplateStore`].

use crate::catalog::{DocumentVariant, TemplateFormat};
use crate::error::{DocumentError, Result};
use crate::grid::{resolve_write_target, CellRange, CellRef, CellStyle, HorizontalAlignment};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// A loaded spreadsheet template.
pub trait GridDocument {
    fn merged_regions(&self) -> &[CellRange];

    fn cell_text(&self, cell: CellRef) -> Result<Option<String>>;

    /// Sets the text and style of `cell` exactly, without merged-region lookup.
    fn set_cell(&mut self, cell: CellRef, text: &str, style: &CellStyle) -> Result<()>;

    /// Applies `style` to `cell`, keeping its text.
    fn set_cell_style(&mut self, cell: CellRef, style: &CellStyle) -> Result<()>;

    fn set_row_height(&mut self, row: u32, height: f64) -> Result<()>;

    /// Serializes the document in its native format.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    fn write_target(&self, cell: CellRef) -> CellRef {
        resolve_write_target(self.merged_regions(), cell)
    }

    /// Writes through the merged-region resolver, returning the cell written.
    fn write_text(&mut self, cell: CellRef, text: &str, style: &CellStyle) -> Result<CellRef> {
        let target = self.write_target(cell);
        self.set_cell(target, text, style)?;
        Ok(target)
    }

    fn restyle(&mut self, cell: CellRef, style: &CellStyle) -> Result<CellRef> {
        let target = self.write_target(cell);
        self.set_cell_style(target, style)?;
        Ok(target)
    }
}

/// A loaded word-processor template: body paragraphs plus the paragraphs
/// found inside table cells, each addressed by position.
pub trait ParagraphDocument {
    fn paragraph_count(&self) -> usize;

    fn paragraph_text(&self, index: usize) -> Option<&str>;

    fn set_paragraph_text(&mut self, index: usize, text: &str) -> Result<()>;

    /// Inserts a new paragraph so that it ends up at `index`.
    fn insert_paragraph_before(
        &mut self,
        index: usize,
        text: &str,
        alignment: Option<HorizontalAlignment>,
    ) -> Result<()>;

    fn append_paragraph(&mut self, text: &str) -> Result<()>;

    fn table_paragraph_count(&self) -> usize;

    fn table_paragraph_text(&self, index: usize) -> Option<&str>;

    fn set_table_paragraph_text(&mut self, index: usize, text: &str) -> Result<()>;

    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Index of the first body paragraph containing `needle`, ignoring case.
    fn find_paragraph(&self, needle: &str) -> Option<usize> {
        let needle = needle.to_uppercase();
        (0..self.paragraph_count()).find(|&i| {
            self.paragraph_text(i)
                .map(|text| text.to_uppercase().contains(&needle))
                .unwrap_or(false)
        })
    }
}

pub enum TemplateAsset {
    Grid(Box<dyn GridDocument>),
    Paragraphs(Box<dyn ParagraphDocument>),
}

impl TemplateAsset {
    pub fn format(&self) -> TemplateFormat {
        match self {
            Self::Grid(_) => TemplateFormat::Spreadsheet,
            Self::Paragraphs(_) => TemplateFormat::WordProcessor,
        }
    }
}

impl std::fmt::Debug for TemplateAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TemplateAsset({:?})", self.format())
    }
}

/// Supplies a fresh, unmodified document for each variant.
pub trait TemplateStore {
    fn load(&self, variant: DocumentVariant) -> Result<TemplateAsset>;
}

impl<T: TemplateStore + ?Sized> TemplateStore for &T {
    fn load(&self, variant: DocumentVariant) -> Result<TemplateAsset> {
        (**self).load(variant)
    }
}

impl<T: TemplateStore + ?Sized> TemplateStore for Box<T> {
    fn load(&self, variant: DocumentVariant) -> Result<TemplateAsset> {
        (**self).load(variant)
    }
}

/// Turns the raw bytes of a template file into a document handle.
pub trait TemplateCodec {
    fn decode(&self, format: TemplateFormat, bytes: &[u8]) -> Result<TemplateAsset>;
}

/// Reads each variant's fixed asset file from one directory.
#[derive(Debug, Clone)]
pub struct DirectoryTemplateStore<C> {
    root: PathBuf,
    codec: C,
}

impl<C: TemplateCodec> DirectoryTemplateStore<C> {
    pub fn new(root: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            root: root.into(),
            codec,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, variant: DocumentVariant) -> PathBuf {
        self.root.join(variant.template_file())
    }
}

impl<C: TemplateCodec> TemplateStore for DirectoryTemplateStore<C> {
    fn load(&self, variant: DocumentVariant) -> Result<TemplateAsset> {
        let path = self.path_for(variant);
        if !path.is_file() {
            return Err(DocumentError::TemplateNotFound {
                variant: variant.display_name().to_string(),
                path,
            });
        }

        debug!("Loading template for '{}' from {}", variant, path.display());
        let bytes = fs::read(&path)?;
        let asset = self.codec.decode(variant.format(), &bytes)?;
        if asset.format() != variant.format() {
            return Err(DocumentError::TemplateFormat(format!(
                "{} decoded as {:?}, expected {:?}",
                path.display(),
                asset.format(),
                variant.format()
            )));
        }
        Ok(asset)
    }
}
