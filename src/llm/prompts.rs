/// Instructions sent alongside the uploaded client document.
pub const CLIENT_EXTRACTION_PROMPT: &str = r#"
O PDF anexo reúne documentos de uma única pessoa atendida pelo escritório
(por exemplo RG, CNH, comprovante de residência). Extraia somente os dados
desse CLIENTE, organizados em três grupos:

1) IDENTIFICACAO_CIVIL: CLIENTE, ESTADO_CIVIL, DATA_NASC, PROFISSAO, RG, ORGAO_EXPEDIDOR, CPF
2) ENDERECO: ENDERECO, Nº, BAIRRO, COMPLEMENTO, CEP, CIDADE, UF
3) CONTATO: EMAIL, WHATSAPP, TELEFONE2, TELEFONE3

REGRAS:
- Use null para qualquer campo que não apareça no documento. Nunca deduza valores.
- Ignore dados de declarantes, testemunhas, rogatários ou outras pessoas.
- Quando dois documentos divergirem, prefira o mais recente ou o mais legível.
- Datas no formato DD/MM/AAAA; UF com duas letras maiúsculas.
"#;

/// Name given to the structured output format.
pub const RESPONSE_FORMAT_NAME: &str = "dados_cliente";
