use dotenv::dotenv;
use legal_document_builder::llm::OpenAiClient;
use legal_document_builder::*;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = EngineConfig::from_env();

    let pdf_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("usage: extract_client_pdf <documentos.pdf>"))?;

    let client = OpenAiClient::from_config(&config)?;
    println!("📄 Extracting client data from {} with {}...", pdf_path.display(), client.model());

    let raw = client.extract_file(&pdf_path).await?;
    let extracted = parse_extraction_response(&raw)?;

    let mut record = ClientRecord::new();
    let written = record.merge_non_empty(extracted.flatten());
    println!("✅ {} fields extracted\n", written);
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}
