//! # Legal Document Builder
//!
//! Fills fixed-layout legal templates (service contracts, declarations,
//! powers of attorney and receipts) with client data, and writes the
//! Brazilian Portuguese long forms those documents require.
//!
//! ## Core Concepts
//!
//! - **Client record**: flat field name -> value map; absent fields render empty
//! - **Variants**: nine fixed templates, literate/illiterate x four documents plus the receipt
//! - **Field maps**: per-variant cell -> field tables built from shared bases
//! - **Merged regions**: writes aimed inside a merged block land on its top-left cell
//! - **Extenso**: numbers, amounts and dates spelled out in words
//!
//! ## Example
//!
//! ```rust,ignore
//! use legal_document_builder::*;
//!
//! let config = EngineConfig::from_env();
//! let store = DirectoryTemplateStore::new(&config.templates_dir, SnapshotCodec);
//! let assembler = DocumentAssembler::new(store, &config)?;
//!
//! let record = ClientRecord::new()
//!     .with(fields::CLIENTE, "Maria da Silva")
//!     .with(fields::CIDADE, "Manaus")
//!     .with(fields::UF, "AM")
//!     .with(fields::DATA, "15/03/2024");
//!
//! let contract = assembler.assemble(DocumentVariant::ServiceContract, &record)?;
//! std::fs::write(&contract.file_name, &contract.bytes)?;
//!
//! assert_eq!(
//!     spell_amount(rust_decimal::Decimal::new(123456, 2))?,
//!     "Mil duzentos e trinta e quatro reais e cinquenta e seis centavos"
//! );
//! ```

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod currency;
pub mod dates;
pub mod error;
pub mod extraction;
pub mod grid;
pub mod numerals;
pub mod receipt;
pub mod schema;
pub mod snapshot;
pub mod template;

#[cfg(feature = "openai")]
pub mod llm;

pub use assembler::{DocumentAssembler, RenderedDocument};
pub use catalog::{
    fee_clause_text, fill_from_record, interpolate, ClausePredicate, ClauseRule, ClauseTable,
    Composition, DocumentVariant, FieldMap, TemplateFormat, VariantLayout,
};
pub use config::EngineConfig;
pub use currency::{
    format_brl, parse_brl_amount, spell_amount, Currency, MonetaryAmount, BRAZILIAN_REAL,
};
pub use dates::{spell_date, spell_naive_date};
pub use error::{DocumentError, Result};
pub use extraction::{import_client_document, parse_extraction_response, ClientDataExtractor};
pub use grid::{resolve_write_target, CellRange, CellRef, CellStyle};
pub use numerals::{spell_number, spell_signed, MAX_SPELLABLE};
pub use receipt::{render_receipt, Receipt, ReceiptKind, ReceiptLayout};
pub use schema::{fields, ClientRecord, ExtractedClientData};
pub use snapshot::{MemoryDocument, MemorySheet, MemoryTemplateStore, SnapshotCodec};
pub use template::{
    DirectoryTemplateStore, GridDocument, ParagraphDocument, TemplateAsset, TemplateCodec,
    TemplateStore,
};

/// Assembles one variant with the default settings.
pub fn assemble_document<S: TemplateStore>(
    store: S,
    variant: DocumentVariant,
    record: &ClientRecord,
) -> Result<RenderedDocument> {
    DocumentAssembler::new(store, &EngineConfig::default())?.assemble(variant, record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_document_with_memory_store() {
        let mut store = MemoryTemplateStore::new();
        store
            .insert_sheet(DocumentVariant::PowerOfAttorney, &MemorySheet::new())
            .unwrap();
        let record = ClientRecord::new().with(fields::CLIENTE, "Maria");

        let rendered = assemble_document(&store, DocumentVariant::PowerOfAttorney, &record).unwrap();
        assert_eq!(rendered.file_name, "PROCURAÇÃO_AD_JUDICIA_ET_EXTRA.xlsx");

        let sheet = MemorySheet::from_json(&rendered.bytes).unwrap();
        assert_eq!(sheet.text_at("C3"), Some("Maria"));
    }

    #[test]
    fn test_missing_template_is_reported() {
        let err = assemble_document(
            MemoryTemplateStore::new(),
            DocumentVariant::ServiceContract,
            &ClientRecord::new(),
        )
        .unwrap_err();
        assert!(matches!(err, DocumentError::TemplateNotFound { .. }));
    }
}
