//! Client data extraction from uploaded documents.
//!
//! The model call itself lives behind [`ClientDataExtractor`]; this module
//! recovers the JSON payload from its answer and merges it into a record.

use crate::error::{DocumentError, Result};
use crate::schema::{ClientRecord, ExtractedClientData};
use async_trait::async_trait;
use log::{info, warn};

/// Reads a client document (usually a PDF) and answers with the JSON
/// payload described by [`ExtractedClientData::strict_response_schema`].
#[async_trait]
pub trait ClientDataExtractor: Send + Sync {
    async fn extract_raw(&self, document: &[u8], file_name: &str) -> Result<String>;
}

/// Parses an extraction answer. Text around the JSON object (code fences,
/// chatter) is tolerated; anything else is an [`DocumentError::ExtractionFailed`].
pub fn parse_extraction_response(raw: &str) -> Result<ExtractedClientData> {
    match serde_json::from_str(raw.trim()) {
        Ok(data) => Ok(data),
        Err(direct) => {
            let recovered = json_object_span(raw).ok_or_else(|| {
                DocumentError::ExtractionFailed(format!("no JSON object in response: {}", direct))
            })?;
            warn!("Extraction response was not clean JSON, recovering the object span");
            serde_json::from_str(recovered).map_err(|e| {
                DocumentError::ExtractionFailed(format!("invalid JSON in response: {}", e))
            })
        }
    }
}

fn json_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Runs `extractor` over `document` and merges every non-empty value into
/// `record`. Returns how many fields were written.
pub async fn import_client_document<E>(
    extractor: &E,
    document: &[u8],
    file_name: &str,
    record: &mut ClientRecord,
) -> Result<usize>
where
    E: ClientDataExtractor + ?Sized,
{
    info!("Extracting client data from {}", file_name);
    let raw = extractor.extract_raw(document, file_name).await?;
    let data = parse_extraction_response(&raw)?;
    let written = record.merge_non_empty(data.flatten());
    info!("Merged {} extracted fields from {}", written, file_name);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fields;

    const CLEAN: &str = r#"{
        "IDENTIFICACAO_CIVIL": {"CLIENTE": "Maria da Silva", "CPF": "123.456.789-00", "RG": null},
        "ENDERECO": {"CIDADE": "Manaus", "UF": "AM", "Nº": "12"},
        "CONTATO": {"EMAIL": ""}
    }"#;

    #[test]
    fn test_parse_clean_response() {
        let data = parse_extraction_response(CLEAN).unwrap();
        assert_eq!(data.identification.cliente.as_deref(), Some("Maria da Silva"));
        assert_eq!(data.identification.rg, None);
        assert_eq!(data.address.numero.as_deref(), Some("12"));
    }

    #[test]
    fn test_parse_recovers_fenced_json() {
        let raw = format!("Aqui estão os dados:\n```json\n{}\n```", CLEAN);
        let data = parse_extraction_response(&raw).unwrap();
        assert_eq!(data.address.uf.as_deref(), Some("AM"));
    }

    #[test]
    fn test_parse_failure() {
        let err = parse_extraction_response("não consegui ler o documento").unwrap_err();
        assert!(matches!(err, DocumentError::ExtractionFailed(_)));

        let err = parse_extraction_response("} nada {").unwrap_err();
        assert!(matches!(err, DocumentError::ExtractionFailed(_)));

        let err = parse_extraction_response("{ quebrado: }").unwrap_err();
        assert!(matches!(err, DocumentError::ExtractionFailed(_)));
    }

    #[test]
    fn test_merge_keeps_typed_values() {
        let mut record = ClientRecord::new()
            .with(fields::EMAIL, "maria@example.com")
            .with(fields::RG, "1234567");
        let data = parse_extraction_response(CLEAN).unwrap();
        let written = record.merge_non_empty(data.flatten());

        assert_eq!(written, 5);
        assert_eq!(record.get(fields::EMAIL), "maria@example.com");
        assert_eq!(record.get(fields::RG), "1234567");
        assert_eq!(record.get(fields::CLIENTE), "Maria da Silva");
        assert_eq!(record.get(fields::NUMERO), "12");
    }
}
