use dotenv::dotenv;
use legal_document_builder::*;
use std::fs;
use std::path::Path;

/// Writes blank snapshot templates for every spreadsheet variant, plus a
/// small receipt template, into `dir`.
fn seed_templates(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;
    for variant in DocumentVariant::ALL {
        let path = dir.join(variant.template_file());
        if path.exists() {
            continue;
        }
        let bytes = match variant.format() {
            TemplateFormat::Spreadsheet => MemorySheet::new()
                .merge_range("A29:L29")?
                .merge_range("A68:F68")?
                .to_bytes()?,
            TemplateFormat::WordProcessor => MemoryDocument::from_lines([
                "RECIBO DE PAGAMENTO",
                "",
                "",
                "",
                "",
                "Advogada responsável",
            ])
            .with_table_row(["Valor: R$ {VALOR}", "{VALOR_EXTENSO}"])
            .to_bytes()?,
        };
        fs::write(path, bytes)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let mut config = EngineConfig::from_env();
    if config.receipt_signer.is_none() {
        config.receipt_signer = Some("Advogada responsável".to_string());
    }

    println!("📂 Templates directory: {}", config.templates_dir.display());
    seed_templates(&config.templates_dir)?;

    let store = DirectoryTemplateStore::new(&config.templates_dir, SnapshotCodec);
    let assembler = DocumentAssembler::new(store, &config)?;

    let record = ClientRecord::new()
        .with(fields::CLIENTE, "Maria da Silva")
        .with(fields::ESTADO_CIVIL, "solteira")
        .with(fields::PROFISSAO, "professora")
        .with(fields::RG, "1234567-8")
        .with(fields::CPF, "123.456.789-00")
        .with(fields::ENDERECO, "Rua das Flores")
        .with(fields::NUMERO, "12")
        .with(fields::BAIRRO, "Centro")
        .with(fields::CEP, "69000-000")
        .with(fields::CIDADE, "Manaus")
        .with(fields::UF, "AM")
        .with(fields::DATA, "15/03/2024")
        .with(fields::VALOR, "1.234,56")
        .with(fields::HORA, "10:35");

    let out_dir = Path::new("target/generated_documents");
    fs::create_dir_all(out_dir)?;

    let mut documents = assembler.assemble_for_client(true, &record)?;
    documents.push(assembler.assemble(DocumentVariant::Receipt, &record)?);

    for document in &documents {
        let path = out_dir.join(&document.file_name);
        fs::write(&path, &document.bytes)?;
        println!("✅ {} -> {}", document.variant, path.display());
    }

    let amount = parse_brl_amount(record.get(fields::VALOR));
    println!(
        "\n💰 R$ {} = {}",
        format_brl(amount),
        spell_amount(amount)?
    );
    println!(
        "📅 {}",
        spell_date(record.get(fields::DATA), record.get(fields::CIDADE), record.get(fields::UF))
    );

    Ok(())
}
