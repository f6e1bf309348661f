use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field names understood by the templates.
pub mod fields {
    pub const CLIENTE: &str = "CLIENTE";
    pub const ESTADO_CIVIL: &str = "ESTADO_CIVIL";
    pub const DATA_NASC: &str = "DATA_NASC";
    pub const PROFISSAO: &str = "PROFISSAO";
    pub const RG: &str = "RG";
    pub const ORGAO_EXPEDIDOR: &str = "ORGAO_EXPEDIDOR";
    pub const CPF: &str = "CPF";

    pub const ENDERECO: &str = "ENDERECO";
    pub const NUMERO: &str = "Nº";
    pub const BAIRRO: &str = "BAIRRO";
    pub const COMPLEMENTO: &str = "COMPLEMENTO";
    pub const CEP: &str = "CEP";
    pub const CIDADE: &str = "CIDADE";
    pub const COMARCA: &str = "COMARCA";
    pub const UF: &str = "UF";
    pub const DATA: &str = "DATA";

    pub const EMAIL: &str = "EMAIL";
    pub const WHATSAPP: &str = "WHATSAPP";
    pub const TELEFONE2: &str = "TELEFONE2";
    pub const TELEFONE3: &str = "TELEFONE3";
    pub const SENHA_GOV: &str = "SENHA_GOV";

    pub const INDICACAO_CLIENTE: &str = "INDICACAO_CLIENTE";
    pub const PARCERIA_ADVOGADO: &str = "PARCERIA_ADVOGADO";
    pub const ATENDENTE: &str = "ATENDENTE";

    pub const DECLARANTE: &str = "DECLARANTE";
    pub const DECLARANTE_ESTADO_CIVIL: &str = "DECLARANTE_ESTADO_CIVIL";
    pub const DECLARANTE_PROFISSAO: &str = "DECLARANTE_PROFISSAO";

    pub const TESTEMUNHA1: &str = "TESTEMUNHA1";
    pub const TESTEMUNHA1_CPF: &str = "TESTEMUNHA1_CPF";
    pub const TESTEMUNHA1_RG: &str = "TESTEMUNHA1_RG";
    pub const TESTEMUNHA1_END: &str = "TESTEMUNHA1_END";
    pub const TESTEMUNHA2: &str = "TESTEMUNHA2";
    pub const TESTEMUNHA2_CPF: &str = "TESTEMUNHA2_CPF";
    pub const TESTEMUNHA2_RG: &str = "TESTEMUNHA2_RG";
    pub const TESTEMUNHA2_END: &str = "TESTEMUNHA2_END";

    pub const ROGATARIO_NOME: &str = "ROGATARIO_NOME";
    pub const ROGATARIO_RG: &str = "ROGATARIO_RG";
    pub const ROGATARIO_CPF: &str = "ROGATARIO_CPF";
    pub const ROGATARIO_END: &str = "ROGATARIO_END";

    pub const RECIBO_TIPO: &str = "RECIBO_TIPO";
    pub const VALOR: &str = "VALOR";
    pub const VALOR_EXTENSO: &str = "VALOR_EXTENSO";
    pub const HORA: &str = "HORA";
    /// Hand-edited receipt body.
    pub const RECIBO_TEXTO: &str = "RECIBO_TEXTO";
}

/// Client data keyed by field name. Absent fields read as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientRecord {
    values: BTreeMap<String, String>,
}

impl ClientRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_blank(&self, field: &str) -> bool {
        self.get(field).trim().is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Seeds or overwrites fields from `incoming`, skipping `None` and
    /// blank values so extracted data never erases something already typed.
    /// Returns how many fields were written.
    pub fn merge_non_empty<I, K>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        let mut written = 0;
        for (field, value) in incoming {
            let Some(value) = value else { continue };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            self.values.insert(field.into(), value.to_string());
            written += 1;
        }
        written
    }

    /// Copy with the form defaults applied: a blank CIDADE becomes
    /// `default_city` and a blank COMARCA follows CIDADE.
    #[must_use]
    pub fn with_locality_defaults(&self, default_city: &str) -> Self {
        let mut record = self.clone();
        if record.is_blank(fields::CIDADE) {
            record.set(fields::CIDADE, default_city);
        }
        if record.is_blank(fields::COMARCA) {
            let city = record.get(fields::CIDADE).to_string();
            record.set(fields::COMARCA, city);
        }
        record
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ClientRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CivilIdentification {
    #[serde(rename = "CLIENTE", default)]
    #[schemars(description = "Nome completo do cliente")]
    pub cliente: Option<String>,

    #[serde(rename = "ESTADO_CIVIL", default)]
    #[schemars(description = "Estado civil (solteiro, casado, ...)")]
    pub estado_civil: Option<String>,

    #[serde(rename = "DATA_NASC", default)]
    #[schemars(description = "Data de nascimento no formato DD/MM/AAAA")]
    pub data_nasc: Option<String>,

    #[serde(rename = "PROFISSAO", default)]
    pub profissao: Option<String>,

    #[serde(rename = "RG", default)]
    #[schemars(description = "Número do documento de identidade (RG)")]
    pub rg: Option<String>,

    #[serde(rename = "ORGAO_EXPEDIDOR", default)]
    #[schemars(description = "Órgão expedidor do RG, ex.: SSP/AM")]
    pub orgao_expedidor: Option<String>,

    #[serde(rename = "CPF", default)]
    pub cpf: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PostalAddress {
    #[serde(rename = "ENDERECO", default)]
    #[schemars(description = "Logradouro (rua, avenida, travessa)")]
    pub endereco: Option<String>,

    #[serde(rename = "Nº", default)]
    pub numero: Option<String>,

    #[serde(rename = "BAIRRO", default)]
    pub bairro: Option<String>,

    #[serde(rename = "COMPLEMENTO", default)]
    pub complemento: Option<String>,

    #[serde(rename = "CEP", default)]
    pub cep: Option<String>,

    #[serde(rename = "CIDADE", default)]
    pub cidade: Option<String>,

    #[serde(rename = "UF", default)]
    #[schemars(description = "Sigla do estado com duas letras, ex.: AM")]
    pub uf: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContactDetails {
    #[serde(rename = "EMAIL", default)]
    pub email: Option<String>,

    #[serde(rename = "WHATSAPP", default)]
    pub whatsapp: Option<String>,

    #[serde(rename = "TELEFONE2", default)]
    pub telefone2: Option<String>,

    #[serde(rename = "TELEFONE3", default)]
    pub telefone3: Option<String>,
}

/// Client data as returned by the document extraction model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedClientData {
    #[serde(rename = "IDENTIFICACAO_CIVIL", default)]
    pub identification: CivilIdentification,

    #[serde(rename = "ENDERECO", default)]
    pub address: PostalAddress,

    #[serde(rename = "CONTATO", default)]
    pub contact: ContactDetails,
}

impl ExtractedClientData {
    /// All three groups as one flat list of `(field, value)` pairs.
    pub fn flatten(&self) -> Vec<(&'static str, Option<String>)> {
        let id = &self.identification;
        let addr = &self.address;
        let contact = &self.contact;
        vec![
            (fields::CLIENTE, id.cliente.clone()),
            (fields::ESTADO_CIVIL, id.estado_civil.clone()),
            (fields::DATA_NASC, id.data_nasc.clone()),
            (fields::PROFISSAO, id.profissao.clone()),
            (fields::RG, id.rg.clone()),
            (fields::ORGAO_EXPEDIDOR, id.orgao_expedidor.clone()),
            (fields::CPF, id.cpf.clone()),
            (fields::ENDERECO, addr.endereco.clone()),
            (fields::NUMERO, addr.numero.clone()),
            (fields::BAIRRO, addr.bairro.clone()),
            (fields::COMPLEMENTO, addr.complemento.clone()),
            (fields::CEP, addr.cep.clone()),
            (fields::CIDADE, addr.cidade.clone()),
            (fields::UF, addr.uf.clone()),
            (fields::EMAIL, contact.email.clone()),
            (fields::WHATSAPP, contact.whatsapp.clone()),
            (fields::TELEFONE2, contact.telefone2.clone()),
            (fields::TELEFONE3, contact.telefone3.clone()),
        ]
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ExtractedClientData)
    }

    /// Schema for strict structured output: definitions inlined, every
    /// property required and no additional properties anywhere.
    pub fn strict_response_schema() -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(Self::generate_json_schema())?;
        let definitions = match value.as_object_mut() {
            Some(root) => {
                root.remove("$schema");
                root.remove("title");
                root.remove("definitions").unwrap_or(Value::Null)
            }
            None => Value::Null,
        };
        inline_refs(&mut value, &definitions);
        require_all_properties(&mut value);
        Ok(value)
    }
}

fn inline_refs(node: &mut Value, definitions: &Value) {
    match node {
        Value::Object(map) => {
            // a described $ref comes out as a one-element allOf
            let single = match map.get("allOf") {
                Some(Value::Array(items)) if items.len() == 1 => items.first().cloned(),
                _ => None,
            };
            if let Some(Value::Object(inner)) = single {
                map.remove("allOf");
                for (key, value) in inner {
                    map.entry(key).or_insert(value);
                }
            }

            let resolved = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| definitions.get(r.trim_start_matches("#/definitions/")))
                .cloned();
            if let Some(mut definition) = resolved {
                inline_refs(&mut definition, definitions);
                *node = definition;
                return;
            }
            for child in map.values_mut() {
                inline_refs(child, definitions);
            }
        }
        Value::Array(items) => {
            for child in items {
                inline_refs(child, definitions);
            }
        }
        _ => {}
    }
}

fn require_all_properties(node: &mut Value) {
    match node {
        Value::Object(map) => {
            if let Some(properties) = map.get("properties").and_then(Value::as_object) {
                let names: Vec<Value> = properties.keys().cloned().map(Value::String).collect();
                map.insert("required".to_string(), Value::Array(names));
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            map.remove("default");
            for child in map.values_mut() {
                require_all_properties(child);
            }
        }
        Value::Array(items) => {
            for child in items {
                require_all_properties(child);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_read_empty() {
        let record = ClientRecord::new().with(fields::CLIENTE, "Maria");
        assert_eq!(record.get(fields::CLIENTE), "Maria");
        assert_eq!(record.get(fields::CPF), "");
        assert!(record.is_blank(fields::CPF));
    }

    #[test]
    fn test_merge_skips_empty_and_null() {
        let mut record = ClientRecord::new()
            .with(fields::CLIENTE, "Maria")
            .with(fields::CPF, "123");
        let written = record.merge_non_empty(vec![
            (fields::CLIENTE, Some("   ".to_string())),
            (fields::CPF, None),
            (fields::RG, Some(" 998877 ".to_string())),
        ]);
        assert_eq!(written, 1);
        assert_eq!(record.get(fields::CLIENTE), "Maria");
        assert_eq!(record.get(fields::CPF), "123");
        assert_eq!(record.get(fields::RG), "998877");
    }

    #[test]
    fn test_locality_defaults() {
        let record = ClientRecord::new().with_locality_defaults("Manaus");
        assert_eq!(record.get(fields::CIDADE), "Manaus");
        assert_eq!(record.get(fields::COMARCA), "Manaus");

        let record = ClientRecord::new()
            .with(fields::CIDADE, "Itacoatiara")
            .with_locality_defaults("Manaus");
        assert_eq!(record.get(fields::COMARCA), "Itacoatiara");
    }

    #[test]
    fn test_extracted_payload_flattens() {
        let raw = r#"{
            "IDENTIFICACAO_CIVIL": {"CLIENTE": "João", "CPF": null},
            "ENDERECO": {"Nº": "12", "UF": "AM"},
            "CONTATO": {}
        }"#;
        let data: ExtractedClientData = serde_json::from_str(raw).unwrap();
        let flat = data.flatten();
        assert_eq!(flat.len(), 18);
        assert!(flat.contains(&(fields::CLIENTE, Some("João".to_string()))));
        assert!(flat.contains(&(fields::NUMERO, Some("12".to_string()))));
        assert!(flat.contains(&(fields::CPF, None)));
    }

    #[test]
    fn test_strict_schema_requires_everything() {
        let schema = ExtractedClientData::strict_response_schema().unwrap();
        let json = serde_json::to_string(&schema).unwrap();
        assert!(!json.contains("$ref"));
        assert!(!json.contains("definitions"));

        assert_eq!(schema["additionalProperties"], Value::Bool(false));
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);

        let address = &schema["properties"]["ENDERECO"];
        assert_eq!(address["additionalProperties"], Value::Bool(false));
        assert_eq!(address["required"].as_array().unwrap().len(), 7);
        assert!(address["properties"]["Nº"].is_object());
    }
}
