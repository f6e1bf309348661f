//! Receipts for legal services, rendered into a word-processor template.

use crate::catalog::interpolate;
use crate::currency::{format_brl, parse_brl_amount, spell_amount};
use crate::dates::{format_br_timestamp, spell_date};
use crate::error::Result;
use crate::grid::HorizontalAlignment;
use crate::schema::{fields, ClientRecord};
use crate::template::ParagraphDocument;
use chrono::NaiveDateTime;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Paragraph that anchors the receipt body.
pub const RECEIPT_TITLE: &str = "RECIBO DE PAGAMENTO";

/// Paragraphs between the title and the first body line.
const BODY_OFFSET: usize = 3;
/// The dated line is inserted before the paragraph this far above the signer.
const DATE_OFFSET: usize = 2;

/// Placeholder replaced by the spelled place and date.
pub const SPELLED_DATE_PLACEHOLDER: &str = "DATA em extenso";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReceiptKind {
    #[default]
    #[serde(rename = "CONSULTORIA JURÍDICA")]
    LegalConsultation,
    #[serde(rename = "ELABORAÇÃO DE PEÇA PROCESSUAL")]
    PleadingDrafting,
    #[serde(rename = "AUDIÊNCIA")]
    Hearing,
    #[serde(rename = "DILIGÊNCIA")]
    Diligence,
    #[serde(rename = "OUTROS")]
    Other,
}

impl ReceiptKind {
    pub const ALL: [ReceiptKind; 5] = [
        ReceiptKind::LegalConsultation,
        ReceiptKind::PleadingDrafting,
        ReceiptKind::Hearing,
        ReceiptKind::Diligence,
        ReceiptKind::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::LegalConsultation => "CONSULTORIA JURÍDICA",
            Self::PleadingDrafting => "ELABORAÇÃO DE PEÇA PROCESSUAL",
            Self::Hearing => "AUDIÊNCIA",
            Self::Diligence => "DILIGÊNCIA",
            Self::Other => "OUTROS",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_uppercase();
        Self::ALL.into_iter().find(|kind| kind.label() == wanted)
    }
}

impl fmt::Display for ReceiptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything printed on one receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub client_name: String,
    pub client_cpf: String,
    pub kind: ReceiptKind,
    pub amount: Decimal,
    pub amount_in_words: String,
    /// `DD/MM/YYYY`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub locality: String,
    pub region_code: String,
    /// Hand-edited body that replaces the generated sentence.
    pub custom_text: Option<String>,
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl Receipt {
    /// Reads the receipt fields from `record`. A blank DATA or HORA is
    /// stamped from `now`; a non-blank VALOR_EXTENSO overrides the spelled amount.
    pub fn from_record(record: &ClientRecord, now: NaiveDateTime) -> Result<Self> {
        let (today, current_time) = format_br_timestamp(now);

        let kind = match non_blank(record.get(fields::RECIBO_TIPO)) {
            Some(label) => ReceiptKind::from_label(&label).unwrap_or_else(|| {
                warn!("Unknown receipt kind '{}', using {}", label, ReceiptKind::Other);
                ReceiptKind::Other
            }),
            None => ReceiptKind::default(),
        };

        let amount = parse_brl_amount(record.get(fields::VALOR));
        let amount_in_words = match non_blank(record.get(fields::VALOR_EXTENSO)) {
            Some(manual) => manual,
            None => spell_amount(amount)?,
        };

        Ok(Self {
            client_name: non_blank(record.get(fields::CLIENTE)).unwrap_or_else(|| "CLIENTE".to_string()),
            client_cpf: non_blank(record.get(fields::CPF)).unwrap_or_else(|| "CPF".to_string()),
            kind,
            amount,
            amount_in_words,
            date: non_blank(record.get(fields::DATA)).unwrap_or(today),
            time: non_blank(record.get(fields::HORA)).unwrap_or(current_time),
            locality: record.get(fields::CIDADE).trim().to_string(),
            region_code: record.get(fields::UF).trim().to_string(),
            custom_text: non_blank(record.get(fields::RECIBO_TEXTO)),
        })
    }

    /// The generated receipt sentence.
    pub fn sentence(&self) -> String {
        format!(
            "Recebi de {}, portador(a) do CPF {}, a importância de R$ {} ({}), face à {} realizada no dia {}, às {} horas, qual dou plena quitação.",
            self.client_name,
            self.client_cpf,
            format_brl(self.amount),
            self.amount_in_words,
            self.kind.label().to_lowercase(),
            self.date,
            self.time
        )
    }

    /// The body written into the document: the edited text when present.
    pub fn body(&self) -> String {
        self.custom_text.clone().unwrap_or_else(|| self.sentence())
    }

    pub fn spelled_date(&self) -> String {
        spell_date(&self.date, &self.locality, &self.region_code)
    }

    /// Values for the `{NAME}` placeholders a receipt template may carry.
    pub fn placeholders(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (fields::CLIENTE.to_string(), self.client_name.clone()),
            (fields::CPF.to_string(), self.client_cpf.clone()),
            (fields::RECIBO_TIPO.to_string(), self.kind.label().to_string()),
            (fields::VALOR.to_string(), format_brl(self.amount)),
            (fields::VALOR_EXTENSO.to_string(), self.amount_in_words.clone()),
            (fields::DATA.to_string(), self.date.clone()),
            (fields::HORA.to_string(), self.time.clone()),
            (SPELLED_DATE_PLACEHOLDER.to_string(), self.spelled_date()),
        ])
    }
}

/// Where the receipt body and the dated line go in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLayout {
    pub title_marker: String,
    /// Text of the paragraph holding the signer's name. The dated line is
    /// placed above it; without a match it is appended at the end.
    pub signer_marker: Option<String>,
}

impl Default for ReceiptLayout {
    fn default() -> Self {
        Self {
            title_marker: RECEIPT_TITLE.to_string(),
            signer_marker: None,
        }
    }
}

/// Fills a receipt template in place.
///
/// Placeholders are replaced in body and table paragraphs first, then the
/// body lines go three paragraphs below the title and the spelled date is
/// inserted, right aligned, ahead of the paragraph two above the signer.
pub fn render_receipt(
    document: &mut dyn ParagraphDocument,
    receipt: &Receipt,
    layout: &ReceiptLayout,
) -> Result<()> {
    let values = receipt.placeholders();
    replace_placeholders(document, &values)?;

    let body = receipt.body();
    let lines: Vec<&str> = body.split('\n').collect();
    insert_below_title(document, &layout.title_marker, &lines)?;
    insert_dated_line(document, layout.signer_marker.as_deref(), &receipt.spelled_date())?;
    Ok(())
}

fn replace_placeholders(
    document: &mut dyn ParagraphDocument,
    values: &BTreeMap<String, String>,
) -> Result<()> {
    let lookup = |name: &str| values.get(name).cloned();

    for index in 0..document.paragraph_count() {
        let Some(original) = document.paragraph_text(index).map(str::to_string) else {
            continue;
        };
        let filled = interpolate(&original, lookup);
        if filled != original {
            document.set_paragraph_text(index, &filled)?;
        }
    }

    for index in 0..document.table_paragraph_count() {
        let Some(original) = document.table_paragraph_text(index).map(str::to_string) else {
            continue;
        };
        let filled = interpolate(&original, lookup);
        if filled != original {
            document.set_table_paragraph_text(index, &filled)?;
        }
    }
    Ok(())
}

fn insert_below_title(
    document: &mut dyn ParagraphDocument,
    title: &str,
    lines: &[&str],
) -> Result<()> {
    let Some(title_index) = document.find_paragraph(title) else {
        warn!("Receipt template has no '{}' paragraph, body not inserted", title);
        return Ok(());
    };

    let mut insert_at = title_index + BODY_OFFSET;
    while document.paragraph_count() <= insert_at {
        document.append_paragraph("")?;
    }
    for line in lines {
        document.insert_paragraph_before(insert_at, line, None)?;
        insert_at += 1;
    }
    debug!("Inserted {} receipt lines at paragraph {}", lines.len(), title_index + BODY_OFFSET);
    Ok(())
}

fn insert_dated_line(
    document: &mut dyn ParagraphDocument,
    signer: Option<&str>,
    dated_line: &str,
) -> Result<()> {
    if dated_line.is_empty() {
        return Ok(());
    }

    match signer.and_then(|name| document.find_paragraph(name)) {
        Some(signer_index) => {
            let insert_at = signer_index.saturating_sub(DATE_OFFSET);
            document.insert_paragraph_before(insert_at, dated_line, Some(HorizontalAlignment::Right))
        }
        None => {
            if let Some(name) = signer {
                warn!("Signer '{}' not found in receipt template, dating at the end", name);
            }
            let end = document.paragraph_count();
            document.insert_paragraph_before(end, dated_line, Some(HorizontalAlignment::Right))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MemoryDocument;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn record() -> ClientRecord {
        ClientRecord::new()
            .with(fields::CLIENTE, "Maria da Silva")
            .with(fields::CPF, "123.456.789-00")
            .with(fields::VALOR, "1.234,56")
            .with(fields::HORA, "10:35")
            .with(fields::DATA, "15/03/2024")
            .with(fields::CIDADE, "Manaus")
            .with(fields::UF, "AM")
    }

    fn texts(doc: &MemoryDocument) -> Vec<&str> {
        doc.paragraphs.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn test_receipt_sentence() {
        let receipt = Receipt::from_record(&record(), noon()).unwrap();
        assert_eq!(
            receipt.sentence(),
            "Recebi de Maria da Silva, portador(a) do CPF 123.456.789-00, a importância de R$ 1.234,56 \
             (Mil duzentos e trinta e quatro reais e cinquenta e seis centavos), face à consultoria jurídica \
             realizada no dia 15/03/2024, às 10:35 horas, qual dou plena quitação."
        );
    }

    #[test]
    fn test_blank_record_uses_labels_and_clock() {
        let receipt = Receipt::from_record(&ClientRecord::new(), noon()).unwrap();
        assert_eq!(receipt.client_name, "CLIENTE");
        assert_eq!(receipt.client_cpf, "CPF");
        assert_eq!(receipt.amount_in_words, "Zero reais");
        assert_eq!(receipt.date, "15/03/2024");
        assert_eq!(receipt.time, "12:00");
        assert!(receipt.sentence().contains("R$ 0,00 (Zero reais)"));
    }

    #[test]
    fn test_manual_amount_in_words_wins() {
        let record = record().with(fields::VALOR_EXTENSO, "mil e duzentos reais, aproximadamente");
        let receipt = Receipt::from_record(&record, noon()).unwrap();
        assert_eq!(receipt.amount_in_words, "mil e duzentos reais, aproximadamente");

        let record = record_with_blank_override();
        let receipt = Receipt::from_record(&record, noon()).unwrap();
        assert!(receipt.amount_in_words.starts_with("Mil duzentos"));
    }

    fn record_with_blank_override() -> ClientRecord {
        record().with(fields::VALOR_EXTENSO, "   ")
    }

    #[test]
    fn test_receipt_kind_labels() {
        assert_eq!(ReceiptKind::from_label("audiência"), Some(ReceiptKind::Hearing));
        assert_eq!(
            ReceiptKind::from_label("ELABORAÇÃO DE PEÇA PROCESSUAL"),
            Some(ReceiptKind::PleadingDrafting)
        );
        assert_eq!(ReceiptKind::from_label("xyz"), None);

        let record = record().with(fields::RECIBO_TIPO, "DILIGÊNCIA");
        let receipt = Receipt::from_record(&record, noon()).unwrap();
        assert!(receipt.sentence().contains("face à diligência realizada"));
    }

    #[test]
    fn test_render_inserts_body_and_date() {
        let mut doc = MemoryDocument::from_lines([
            "Escritório",
            "RECIBO DE PAGAMENTO",
            "",
            "",
            "",
            "",
            "",
            "Fulana de Tal",
            "Advogada",
        ])
        .with_table_row(["Valor: R$ {VALOR}", "Hora: {HORA}"]);
        let layout = ReceiptLayout {
            signer_marker: Some("fulana de tal".to_string()),
            ..ReceiptLayout::default()
        };
        let receipt = Receipt::from_record(&record(), noon()).unwrap();

        render_receipt(&mut doc, &receipt, &layout).unwrap();

        let body = texts(&doc);
        assert_eq!(body[4], receipt.sentence());
        let signer = body.iter().position(|t| *t == "Fulana de Tal").unwrap();
        assert_eq!(body[signer - 3], "Manaus - AM, 15 de março de 2024.");
        assert_eq!(doc.paragraphs[signer - 3].alignment, Some(HorizontalAlignment::Right));
        assert_eq!(doc.table_paragraph_text(0), Some("Valor: R$ 1.234,56"));
        assert_eq!(doc.table_paragraph_text(1), Some("Hora: 10:35"));
    }

    #[test]
    fn test_render_pads_short_template() {
        let mut doc = MemoryDocument::from_lines(["Recibo de pagamento"]);
        let record = record().with(fields::RECIBO_TEXTO, "Linha um\nLinha dois");
        let receipt = Receipt::from_record(&record, noon()).unwrap();

        render_receipt(&mut doc, &receipt, &ReceiptLayout::default()).unwrap();

        assert_eq!(
            texts(&doc),
            vec![
                "Recibo de pagamento",
                "",
                "",
                "Linha um",
                "Linha dois",
                "",
                "Manaus - AM, 15 de março de 2024."
            ]
        );
    }

    #[test]
    fn test_placeholders_in_paragraphs() {
        let mut doc = MemoryDocument::from_lines(["{CLIENTE} - {CPF}", "{DATA em extenso}", "{DESCONHECIDO}"]);
        let receipt = Receipt::from_record(&record(), noon()).unwrap();
        let layout = ReceiptLayout {
            title_marker: "não existe".to_string(),
            signer_marker: None,
        };
        render_receipt(&mut doc, &receipt, &layout).unwrap();
        assert_eq!(texts(&doc)[0], "Maria da Silva - 123.456.789-00");
        assert_eq!(texts(&doc)[1], "Manaus - AM, 15 de março de 2024.");
        assert_eq!(texts(&doc)[2], "{DESCONHECIDO}");
    }
}
