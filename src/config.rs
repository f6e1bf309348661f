use crate::catalog::ClauseTable;
use crate::error::{DocumentError, Result};
use crate::receipt::ReceiptLayout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TEMPLATES_DIR: &str = "contratos_cadastro";
pub const DEFAULT_EXTRACTION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CITY: &str = "Manaus";

/// Runtime settings for document assembly and client data extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding the template asset files.
    pub templates_dir: PathBuf,
    pub extraction_api_key: Option<String>,
    pub extraction_model: String,
    /// City whose clients get `reference_fee_percent`.
    pub reference_city: String,
    pub reference_fee_percent: u32,
    pub default_fee_percent: u32,
    /// Locality written when CIDADE is blank.
    pub default_city: String,
    /// Name printed under the receipt signature line.
    pub receipt_signer: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            extraction_api_key: None,
            extraction_model: DEFAULT_EXTRACTION_MODEL.to_string(),
            reference_city: DEFAULT_CITY.to_string(),
            reference_fee_percent: 30,
            default_fee_percent: 35,
            default_city: DEFAULT_CITY.to_string(),
            receipt_signer: None,
        }
    }
}

impl EngineConfig {
    /// Reads `MODELOS_DIR`, `OPENAI_API_KEY`, `EXTRACTION_MODEL` and
    /// `RECIBO_ASSINANTE` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            templates_dir: read("MODELOS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.templates_dir),
            extraction_api_key: read("OPENAI_API_KEY"),
            extraction_model: read("EXTRACTION_MODEL").unwrap_or(defaults.extraction_model),
            receipt_signer: read("RECIBO_ASSINANTE"),
            ..defaults
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.extraction_api_key.as_deref().ok_or_else(|| {
            DocumentError::MissingCredential(
                "OPENAI_API_KEY is not set; configure it in .env or the environment".to_string(),
            )
        })
    }

    /// The contingency fee rule table for these settings.
    pub fn fee_clauses(&self) -> Result<ClauseTable> {
        ClauseTable::professional_fees(
            &[(self.reference_city.as_str(), self.reference_fee_percent)],
            self.default_fee_percent,
        )
    }

    pub fn receipt_layout(&self) -> ReceiptLayout {
        ReceiptLayout {
            signer_marker: self.receipt_signer.clone(),
            ..ReceiptLayout::default()
        }
    }
}
