use crate::config::EngineConfig;
use crate::error::{DocumentError, Result};
use crate::extraction::ClientDataExtractor;
use crate::llm::prompts::{CLIENT_EXTRACTION_PROMPT, RESPONSE_FORMAT_NAME};
use crate::schema::ExtractedClientData;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use std::path::Path;
use tokio::fs;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Extraction through the OpenAI files and responses endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
            model,
        }
    }

    /// Fails with [`DocumentError::MissingCredential`] when no API key is configured.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self::new(api_key, config.extraction_model.clone()))
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Uploads `document` and returns its file id.
    pub async fn upload_document(&self, document: &[u8], file_name: &str) -> Result<String> {
        let mime_type = mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string();
        let part = Part::bytes(document.to_vec())
            .file_name(file_name.to_string())
            .mime_str(&mime_type)?;
        let form = Form::new().text("purpose", "assistants").part("file", part);

        let res = self
            .client
            .post(format!("{}/files", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await?;
            return Err(DocumentError::ExtractionFailed(format!(
                "File upload failed (status {}): {}",
                status, error_text
            )));
        }

        let body: Value = res.json().await?;
        let file_id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DocumentError::ExtractionFailed("Upload response missing 'id'".to_string())
            })?
            .to_string();

        debug!("Uploaded {} ({}, {} bytes) as {}", file_name, mime_type, document.len(), file_id);
        Ok(file_id)
    }

    /// Reads the file at `path` and runs the extraction on it.
    pub async fn extract_file(&self, path: &Path) -> Result<String> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DocumentError::ExtractionFailed("Invalid file name".to_string()))?;
        let document = fs::read(path).await?;
        self.extract_raw(&document, file_name).await
    }

    /// Asks the model for the structured client data of an uploaded file.
    pub async fn request_extraction(&self, file_id: &str) -> Result<String> {
        let schema = ExtractedClientData::strict_response_schema()?;
        let payload = json!({
            "model": self.model,
            "input": [{
                "role": "user",
                "content": [
                    { "type": "input_file", "file_id": file_id },
                    { "type": "input_text", "text": CLIENT_EXTRACTION_PROMPT },
                ],
            }],
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": RESPONSE_FORMAT_NAME,
                    "schema": schema,
                    "strict": true,
                }
            },
        });

        let res = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(DocumentError::ExtractionFailed(format!(
                "OpenAI API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: Value = res.json().await?;
        output_text(&body).ok_or_else(|| {
            DocumentError::ExtractionFailed("Response contained no output text".to_string())
        })
    }
}

/// Concatenates the `output_text` parts of a responses API body.
fn output_text(body: &Value) -> Option<String> {
    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let text: String = body
        .get("output")?
        .as_array()?
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    (!text.is_empty()).then_some(text)
}

#[async_trait]
impl ClientDataExtractor for OpenAiClient {
    async fn extract_raw(&self, document: &[u8], file_name: &str) -> Result<String> {
        info!("Uploading {} for extraction with {}", file_name, self.model);
        let file_id = self.upload_document(document, file_name).await?;
        self.request_extraction(&file_id).await
    }
}
