use crate::catalog::{
    fill_from_record, ClauseTable, Composition, DocumentVariant, TemplateFormat, VariantLayout,
};
use crate::config::EngineConfig;
use crate::dates::spell_date;
use crate::error::{DocumentError, Result};
use crate::grid::CellStyle;
use crate::receipt::{render_receipt, Receipt, ReceiptLayout};
use crate::schema::{fields, ClientRecord};
use crate::template::{GridDocument, TemplateAsset, TemplateStore};
use chrono::{Local, NaiveDateTime};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// A finished document in its template's native format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub variant: DocumentVariant,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Fills templates with client data.
///
/// The caller's record is never modified; locality defaults are applied to
/// a private copy for each call.
pub struct DocumentAssembler<S> {
    store: S,
    fee_clauses: ClauseTable,
    receipt_layout: ReceiptLayout,
    default_city: String,
}

impl<S: TemplateStore> DocumentAssembler<S> {
    pub fn new(store: S, config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            store,
            fee_clauses: config.fee_clauses()?,
            receipt_layout: config.receipt_layout(),
            default_city: config.default_city.clone(),
        })
    }

    /// Replaces the contingency fee rules.
    #[must_use]
    pub fn with_fee_clauses(mut self, fee_clauses: ClauseTable) -> Self {
        self.fee_clauses = fee_clauses;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Assembles `variant`. Receipts without DATA or HORA are stamped with
    /// the local clock.
    pub fn assemble(&self, variant: DocumentVariant, record: &ClientRecord) -> Result<RenderedDocument> {
        self.assemble_at(variant, record, Local::now().naive_local())
    }

    /// Assembles `variant`, using `now` wherever the document needs the
    /// current date or time and the record has none.
    pub fn assemble_at(
        &self,
        variant: DocumentVariant,
        record: &ClientRecord,
        now: NaiveDateTime,
    ) -> Result<RenderedDocument> {
        info!("Assembling '{}'", variant);
        let record = record.with_locality_defaults(&self.default_city);

        let bytes = match self.store.load(variant)? {
            TemplateAsset::Grid(mut sheet) if variant.format() == TemplateFormat::Spreadsheet => {
                self.fill_sheet(variant, sheet.as_mut(), &record)?;
                sheet.to_bytes()?
            }
            TemplateAsset::Paragraphs(mut document) if variant == DocumentVariant::Receipt => {
                let receipt = Receipt::from_record(&record, now)?;
                render_receipt(document.as_mut(), &receipt, &self.receipt_layout)?;
                document.to_bytes()?
            }
            other => {
                return Err(DocumentError::TemplateFormat(format!(
                    "template for '{}' loaded as {:?}, expected {:?}",
                    variant,
                    other.format(),
                    variant.format()
                )))
            }
        };

        let file_name = variant.output_file_name();
        info!("Assembled '{}' ({} bytes) as {}", variant, bytes.len(), file_name);
        Ok(RenderedDocument {
            variant,
            file_name,
            bytes,
        })
    }

    /// Assembles the four documents for a literate or illiterate client, in order.
    pub fn assemble_for_client(&self, literate: bool, record: &ClientRecord) -> Result<Vec<RenderedDocument>> {
        DocumentVariant::for_client(literate)
            .into_iter()
            .map(|variant| self.assemble(variant, record))
            .collect()
    }

    /// Writes `variant`'s layout into `sheet`: field values first, then the
    /// composed cells, restyles and row heights.
    pub fn fill_sheet(
        &self,
        variant: DocumentVariant,
        sheet: &mut dyn GridDocument,
        record: &ClientRecord,
    ) -> Result<()> {
        let layout = VariantLayout::for_variant(variant)?;
        let plain = CellStyle::plain();

        for placement in layout.field_map.iter() {
            let target = sheet.write_text(placement.cell, record.get(placement.field), &plain)?;
            debug!("{} -> {}", placement.field, target);
        }

        for composed in &layout.composed {
            let text = self.compose(&composed.content, record);
            let target = sheet.write_text(composed.cell, &text, &composed.style)?;
            debug!("{:?} -> {}", composed.content, target);
        }

        let justified = CellStyle::justified();
        for cell in &layout.restyled {
            sheet.restyle(*cell, &justified)?;
        }

        for row_height in &layout.row_heights {
            sheet.set_row_height(row_height.row, row_height.height)?;
        }
        Ok(())
    }

    /// Text of a composed cell for `record`.
    pub fn compose(&self, composition: &Composition, record: &ClientRecord) -> String {
        match composition {
            Composition::Narrative(template) => fill_from_record(template, record),
            Composition::PlaceAndDate => spell_date(
                record.get(fields::DATA),
                record.get(fields::CIDADE),
                record.get(fields::UF),
            ),
            Composition::ProfessionalFees => {
                let clause = self.fee_clauses.select(record);
                debug!("Fee clause for CIDADE '{}': {}", record.get(fields::CIDADE), clause);
                clause.to_string()
            }
            Composition::Signatory => {
                let name = record.get(fields::ROGATARIO_NOME).trim();
                if name.is_empty() {
                    String::new()
                } else {
                    format!("{}, CPF: {}", name, record.get(fields::ROGATARIO_CPF).trim())
                }
            }
        }
    }
}
