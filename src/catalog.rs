//! Template variants and where each one wants its data.
//!
//! Every spreadsheet variant owns a [`VariantLayout`]: the plain field
//! writes ([`FieldMap`]), the composed cells (narrative paragraphs, clauses,
//! the dated place line), cells that are only restyled, and row heights.
//! Near-identical variants are built from a shared base map plus overrides.

use crate::error::Result;
use crate::grid::{CellRef, CellStyle};
use crate::numerals::spell_number;
use crate::schema::fields::*;
use crate::schema::ClientRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentVariant {
    ServiceContract,
    IncomeDeclaration,
    ResidenceDeclaration,
    PowerOfAttorney,
    ServiceContractIlliterate,
    IncomeDeclarationIlliterate,
    ResidenceDeclarationIlliterate,
    PowerOfAttorneyIlliterate,
    Receipt,
}

/// Native format of a variant's template asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateFormat {
    Spreadsheet,
    WordProcessor,
}

impl DocumentVariant {
    pub const ALL: [DocumentVariant; 9] = [
        DocumentVariant::ServiceContract,
        DocumentVariant::IncomeDeclaration,
        DocumentVariant::ResidenceDeclaration,
        DocumentVariant::PowerOfAttorney,
        DocumentVariant::ServiceContractIlliterate,
        DocumentVariant::IncomeDeclarationIlliterate,
        DocumentVariant::ResidenceDeclarationIlliterate,
        DocumentVariant::PowerOfAttorneyIlliterate,
        DocumentVariant::Receipt,
    ];

    /// The four spreadsheet variants offered for a literate or an illiterate client.
    pub fn for_client(literate: bool) -> [DocumentVariant; 4] {
        if literate {
            [
                DocumentVariant::ServiceContract,
                DocumentVariant::IncomeDeclaration,
                DocumentVariant::ResidenceDeclaration,
                DocumentVariant::PowerOfAttorney,
            ]
        } else {
            [
                DocumentVariant::ServiceContractIlliterate,
                DocumentVariant::IncomeDeclarationIlliterate,
                DocumentVariant::ResidenceDeclarationIlliterate,
                DocumentVariant::PowerOfAttorneyIlliterate,
            ]
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ServiceContract => "CONTRATO DE PRESTAÇÃO DE SERVIÇOS ADVOCATÍCIOS",
            Self::IncomeDeclaration => "DECLARAÇÃO DE HIPOSSUFICIÊNCIA DE RENDA",
            Self::ResidenceDeclaration => "DECLARAÇÃO DE VIDA E RESIDÊNCIA",
            Self::PowerOfAttorney => "PROCURAÇÃO AD JUDICIA ET EXTRA",
            Self::ServiceContractIlliterate => {
                "CONTRATO DE PRESTAÇÃO DE SERVIÇOS ADVOCATÍCIOS_ANALFABETO(A)"
            }
            Self::IncomeDeclarationIlliterate => {
                "DECLARAÇÃO DE HIPOSSUFICIÊNCIA DE RENDA_ANALFABETO(A)"
            }
            Self::ResidenceDeclarationIlliterate => "DECLARAÇÃO DE VIDA E RESIDÊNCIA_ANALFABETO(A)",
            Self::PowerOfAttorneyIlliterate => "PROCURAÇÃO AD JUDICIA ET EXTRA_ANALFABETO(A)",
            Self::Receipt => "RECIBO DE SERVIÇOS JURÍDICOS",
        }
    }

    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.display_name() == name)
    }

    /// File name of the template asset inside the templates directory.
    pub fn template_file(&self) -> &'static str {
        match self {
            Self::ServiceContract => "CONTR.PREST.SERV.ADV.xlsx",
            Self::IncomeDeclaration => "DECLARAÇÃO DE HIPOSSUFICIÊNCIA DE RENDA.xlsx",
            Self::ResidenceDeclaration => "DECLAR.VIDA.RESIDÊNCIA.xlsx",
            Self::PowerOfAttorney => "PROCURAÇÃO AD JUDICIA ET EXTRA.xlsx",
            Self::ServiceContractIlliterate => "CONTR.PREST.SERV.ADV_ANALFABETO(A).xlsx",
            Self::IncomeDeclarationIlliterate => {
                "DECLARAÇÃO DE HIPOSSUFICIÊNCIA DE RENDA_ANALFABETO(A).xlsx"
            }
            Self::ResidenceDeclarationIlliterate => {
                "DECLARAÇÃO_DE_VIDA_E_RESIDÊNCIA_ANALFABETO(A).xlsx"
            }
            Self::PowerOfAttorneyIlliterate => "PROCURAÇÃO AD JUDICIA ET EXTRA_ANALFABETO(A).xlsx",
            Self::Receipt => "RECIBO DE SERVIÇOS JURÍDICOS.docx",
        }
    }

    pub fn format(&self) -> TemplateFormat {
        match self {
            Self::Receipt => TemplateFormat::WordProcessor,
            _ => TemplateFormat::Spreadsheet,
        }
    }

    pub fn is_illiterate(&self) -> bool {
        matches!(
            self,
            Self::ServiceContractIlliterate
                | Self::IncomeDeclarationIlliterate
                | Self::ResidenceDeclarationIlliterate
                | Self::PowerOfAttorneyIlliterate
        )
    }

    /// Suggested download name for the filled document.
    pub fn output_file_name(&self) -> String {
        match self.format() {
            TemplateFormat::WordProcessor => "Recibo_de_servicos_juridicos.docx".to_string(),
            TemplateFormat::Spreadsheet => format!("{}.xlsx", self.display_name().replace(' ', "_")),
        }
    }
}

impl fmt::Display for DocumentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldPlacement {
    pub cell: CellRef,
    pub field: &'static str,
}

/// Ordered `(cell, field)` pairs, one entry per cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldMap {
    placements: Vec<FieldPlacement>,
}

impl FieldMap {
    pub fn from_pairs(pairs: &[(&str, &'static str)]) -> Result<Self> {
        Self::default().with(pairs)
    }

    /// Adds placements; a cell that is already mapped keeps its position but
    /// takes the new field.
    pub fn with(mut self, pairs: &[(&str, &'static str)]) -> Result<Self> {
        for (cell, field) in pairs {
            let cell = CellRef::parse(cell)?;
            match self.placements.iter_mut().find(|p| p.cell == cell) {
                Some(existing) => existing.field = *field,
                None => self.placements.push(FieldPlacement {
                    cell,
                    field: *field,
                }),
            }
        }
        Ok(self)
    }

    pub fn without(mut self, cells: &[&str]) -> Result<Self> {
        let cells = cells
            .iter()
            .map(|c| CellRef::parse(c))
            .collect::<Result<Vec<_>>>()?;
        self.placements.retain(|p| !cells.contains(&p.cell));
        Ok(self)
    }

    pub fn field_at(&self, cell: CellRef) -> Option<&'static str> {
        self.placements
            .iter()
            .find(|p| p.cell == cell)
            .map(|p| p.field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldPlacement> {
        self.placements.iter()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// How the text of a composed cell is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composition {
    /// A fixed sentence with `{FIELD}` placeholders.
    Narrative(&'static str),
    /// `"<CIDADE> - <UF>, <dia> de <mês> de <ano>."` from DATA.
    PlaceAndDate,
    /// The contingency fee clause picked from the fee rule table.
    ProfessionalFees,
    /// `"<ROGATARIO_NOME>, CPF: <ROGATARIO_CPF>"`, empty without a name.
    Signatory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedCell {
    pub cell: CellRef,
    pub content: Composition,
    pub style: CellStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowHeight {
    pub row: u32,
    pub height: f64,
}

/// Everything a spreadsheet variant writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantLayout {
    pub field_map: FieldMap,
    pub composed: Vec<ComposedCell>,
    /// Cells that only get the justified style applied.
    pub restyled: Vec<CellRef>,
    pub row_heights: Vec<RowHeight>,
}

impl VariantLayout {
    fn with_field_map(field_map: FieldMap) -> Self {
        Self {
            field_map,
            ..Self::default()
        }
    }

    fn compose(mut self, cell: &str, content: Composition, style: CellStyle) -> Result<Self> {
        self.composed.push(ComposedCell {
            cell: CellRef::parse(cell)?,
            content,
            style,
        });
        Ok(self)
    }

    fn restyle(mut self, cells: &[&str]) -> Result<Self> {
        for cell in cells {
            self.restyled.push(CellRef::parse(cell)?);
        }
        Ok(self)
    }

    fn row_height(mut self, row: u32, height: f64) -> Self {
        self.row_heights.push(RowHeight { row, height });
        self
    }

    /// Layout for `variant`. The receipt has no grid layout and yields an empty one.
    pub fn for_variant(variant: DocumentVariant) -> Result<Self> {
        use DocumentVariant::*;
        match variant {
            ServiceContract => contract_layout(false),
            ServiceContractIlliterate => contract_layout(true),
            IncomeDeclaration => income_declaration_layout(false),
            IncomeDeclarationIlliterate => income_declaration_layout(true),
            ResidenceDeclaration => residence_declaration_layout(false),
            ResidenceDeclarationIlliterate => residence_declaration_layout(true),
            PowerOfAttorney => power_of_attorney_layout(false),
            PowerOfAttorneyIlliterate => power_of_attorney_layout(true),
            Receipt => Ok(Self::default()),
        }
    }
}

pub const INCOME_DECLARATION_TEXT: &str = "Eu, {CLIENTE}, brasileiro (a), estado civil {ESTADO_CIVIL}, Profissão {PROFISSAO}, \
RG {RG} SSP {UF}. Inscrito no CPF sob o nº {CPF} residente e domiciliado nesta cidade de \
{CIDADE}/{UF} na {ENDERECO} - {COMPLEMENTO} Nº {Nº}, Bairro: {BAIRRO}, CEP:{CEP}";

pub const RESIDENCE_DECLARATION_TEXT: &str = "Eu, {DECLARANTE}. Brasileiro (a), estado civil {DECLARANTE_ESTADO_CIVIL}, Profissão {DECLARANTE_PROFISSAO}.\n\
DECLARO para os devidos fins de comprovação de residência, sob as penas da lei (art. 2º da lei 7.115/83), que {CLIENTE}, \
Brasileiro (a), Estado Civil {ESTADO_CIVIL}, Profissão: {PROFISSAO}, portador(a), do RG: {RG} e CPF: {CPF}, \
é residente e domiciliado na {ENDERECO} - Nº {Nº} - {COMPLEMENTO}. Bairro: {BAIRRO}. \
CEP: {CEP}. Cidade: {CIDADE}, UF: {UF}.";

pub const POWER_OF_ATTORNEY_ADDRESS_TEXT: &str =
    "{ENDERECO}, Nº {Nº}, {BAIRRO}, CEP: {CEP}, {COMPLEMENTO}";

pub const FORUM_CLAUSE_TEXT: &str = "CLÁUSULA 17ª - As  partes  contratantes  elegem  o  foro  da  Comarca  de {COMARCA} para dirimir quaisquer controvérsias oriundas do presente contrato.";

const CLIENT_SIGNATURE_TEXT: &str = "{CLIENTE}";

const CONTRACT_BASE: &[(&str, &str)] = &[
    ("C8", CLIENTE),
    ("B10", ESTADO_CIVIL),
    ("G10", PROFISSAO),
    ("B12", RG),
    ("F12", ORGAO_EXPEDIDOR),
    ("H12", CPF),
    ("B14", ENDERECO),
    ("B16", CEP),
    ("F1", INDICACAO_CLIENTE),
    ("F2", PARCERIA_ADVOGADO),
    ("F3", ATENDENTE),
    ("E16", CIDADE),
    ("I16", UF),
    ("B18", EMAIL),
    ("B20", WHATSAPP),
    ("E20", TELEFONE2),
    ("H20", TELEFONE3),
    ("G68", CIDADE),
    ("B21", SENHA_GOV),
];

const CONTRACT_WITNESSES: &[(&str, &str)] = &[
    ("B84", TESTEMUNHA1),
    ("B85", TESTEMUNHA1_CPF),
    ("B86", TESTEMUNHA1_RG),
    ("B87", TESTEMUNHA1_END),
    ("G84", TESTEMUNHA2),
    ("G85", TESTEMUNHA2_CPF),
    ("G86", TESTEMUNHA2_RG),
    ("G87", TESTEMUNHA2_END),
];

const CONTRACT_ILLITERATE_SIGNERS: &[(&str, &str)] = &[
    ("B79", ROGATARIO_NOME),
    ("B80", ROGATARIO_RG),
    ("B81", ROGATARIO_CPF),
    ("B82", ROGATARIO_END),
    ("B85", TESTEMUNHA1),
    ("B87", TESTEMUNHA1_CPF),
    ("B86", TESTEMUNHA1_RG),
    ("B88", TESTEMUNHA1_END),
    ("B91", TESTEMUNHA2),
    ("B93", TESTEMUNHA2_CPF),
    ("B92", TESTEMUNHA2_RG),
    ("B94", TESTEMUNHA2_END),
    ("B102", TESTEMUNHA1),
    ("B103", TESTEMUNHA1_CPF),
    ("B104", TESTEMUNHA1_RG),
    ("B105", TESTEMUNHA1_END),
    ("G102", TESTEMUNHA2),
    ("G103", TESTEMUNHA2_CPF),
    ("G104", TESTEMUNHA2_RG),
    ("G105", TESTEMUNHA2_END),
];

const INCOME_DECLARATION_SIGNERS: &[(&str, &str)] = &[
    ("B24", ROGATARIO_NOME),
    ("B25", ROGATARIO_RG),
    ("B26", ROGATARIO_CPF),
    ("B27", ROGATARIO_END),
    ("B30", TESTEMUNHA1),
    ("B31", TESTEMUNHA1_RG),
    ("B32", TESTEMUNHA1_CPF),
    ("B33", TESTEMUNHA1_END),
    ("B36", TESTEMUNHA2),
    ("B37", TESTEMUNHA2_RG),
    ("B38", TESTEMUNHA2_CPF),
    ("B39", TESTEMUNHA2_END),
];

const RESIDENCE_DECLARATION_SIGNERS: &[(&str, &str)] = &[
    ("B26", ROGATARIO_NOME),
    ("B27", ROGATARIO_RG),
    ("B28", ROGATARIO_CPF),
    ("B29", ROGATARIO_END),
    ("B32", TESTEMUNHA1),
    ("B34", TESTEMUNHA1_CPF),
    ("B33", TESTEMUNHA1_RG),
    ("B35", TESTEMUNHA1_END),
    ("B38", TESTEMUNHA2),
    ("B40", TESTEMUNHA2_CPF),
    ("B39", TESTEMUNHA2_RG),
    ("B41", TESTEMUNHA2_END),
];

const POWER_OF_ATTORNEY_BASE: &[(&str, &str)] = &[
    ("C3", CLIENTE),
    ("C4", ESTADO_CIVIL),
    ("G4", PROFISSAO),
    ("B5", RG),
    ("G5", ORGAO_EXPEDIDOR),
    ("B6", CPF),
    ("B9", EMAIL),
];

const POWER_OF_ATTORNEY_WITNESSES: &[(&str, &str)] = &[
    ("B26", TESTEMUNHA1),
    ("B28", TESTEMUNHA1_CPF),
    ("B27", TESTEMUNHA1_END),
    ("G26", TESTEMUNHA2),
    ("G28", TESTEMUNHA2_CPF),
    ("G27", TESTEMUNHA2_END),
];

fn contract_layout(illiterate: bool) -> Result<VariantLayout> {
    let base = FieldMap::from_pairs(CONTRACT_BASE)?;
    let (field_map, restyled, forum, date, signature): (_, &[&str], _, _, _) = if illiterate {
        (
            base.with(&[("G14", COMPLEMENTO)])?
                .with(CONTRACT_ILLITERATE_SIGNERS)?,
            &["A31", "A34", "A58", "A64"],
            "A67",
            "I71",
            "A74",
        )
    } else {
        (
            base.with(&[("H14", COMPLEMENTO)])?.with(CONTRACT_WITNESSES)?,
            &[
                "A31", "A34", "A61", "A63", "A65", "B84", "B85", "B86", "B87", "G84", "G85",
                "G86", "G87",
            ],
            "A68",
            "F72",
            "A76",
        )
    };

    VariantLayout::with_field_map(field_map)
        .compose("A29", Composition::ProfessionalFees, CellStyle::justified())?
        .restyle(restyled)?
        .compose(
            forum,
            Composition::Narrative(FORUM_CLAUSE_TEXT),
            CellStyle::justified(),
        )?
        .compose(date, Composition::PlaceAndDate, CellStyle::right_top())?
        .compose(
            signature,
            Composition::Narrative(CLIENT_SIGNATURE_TEXT),
            CellStyle::justified(),
        )
}

fn income_declaration_layout(illiterate: bool) -> Result<VariantLayout> {
    let (field_map, text_cell, text_row, date) = if illiterate {
        (FieldMap::from_pairs(INCOME_DECLARATION_SIGNERS)?, "A6", 6, "K20")
    } else {
        (FieldMap::default(), "A8", 8, "D25")
    };

    Ok(VariantLayout::with_field_map(field_map)
        .compose(
            text_cell,
            Composition::Narrative(INCOME_DECLARATION_TEXT),
            CellStyle::justified(),
        )?
        .compose(
            date,
            Composition::PlaceAndDate,
            CellStyle::right_top().with_underline(),
        )?
        .row_height(text_row, 30.0))
}

fn residence_declaration_layout(illiterate: bool) -> Result<VariantLayout> {
    let (field_map, text_cell, text_row, date) = if illiterate {
        (FieldMap::from_pairs(RESIDENCE_DECLARATION_SIGNERS)?, "A6", 6, "I18")
    } else {
        (FieldMap::default(), "A8", 8, "I17")
    };

    Ok(VariantLayout::with_field_map(field_map)
        .compose(
            text_cell,
            Composition::Narrative(RESIDENCE_DECLARATION_TEXT),
            CellStyle::justified(),
        )?
        .compose(date, Composition::PlaceAndDate, CellStyle::right_top())?
        .row_height(text_row, 60.0))
}

fn power_of_attorney_layout(illiterate: bool) -> Result<VariantLayout> {
    let base = FieldMap::from_pairs(POWER_OF_ATTORNEY_BASE)?;
    if !illiterate {
        return VariantLayout::with_field_map(base)
            .compose(
                "A8",
                Composition::Narrative(POWER_OF_ATTORNEY_ADDRESS_TEXT),
                CellStyle::justified(),
            )?
            .compose("I17", Composition::PlaceAndDate, CellStyle::right_top());
    }

    let field_map = base
        .without(&["G4"])?
        .with(&[("F4", PROFISSAO)])?
        .with(POWER_OF_ATTORNEY_WITNESSES)?;

    VariantLayout::with_field_map(field_map)
        .compose(
            "A8",
            Composition::Narrative(POWER_OF_ATTORNEY_ADDRESS_TEXT),
            CellStyle::justified(),
        )?
        .compose("K17", Composition::PlaceAndDate, CellStyle::right_top())?
        .compose("E23", Composition::Signatory, CellStyle::plain())
}

/// Replaces each `{NAME}` in `template` with `lookup(NAME)`.
///
/// Placeholders the lookup does not know are left as written, and an
/// unmatched `{` is copied through.
pub fn interpolate<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if !after[..close].contains('{') => {
                let name = &after[..close];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[open..open + close + 2]),
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// [`interpolate`] against a client record; unknown fields render empty.
pub fn fill_from_record(template: &str, record: &ClientRecord) -> String {
    interpolate(template, |name| Some(record.get(name).to_string()))
}

/// Which record values select a clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClausePredicate {
    FieldEqualsIgnoreCase { field: String, value: String },
}

impl ClausePredicate {
    pub fn matches(&self, record: &ClientRecord) -> bool {
        match self {
            Self::FieldEqualsIgnoreCase { field, value } => {
                record.get(field).to_lowercase() == value.to_lowercase()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseRule {
    pub predicate: ClausePredicate,
    pub text: String,
}

/// Ordered predicate -> clause rules with a fallback. The first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseTable {
    pub rules: Vec<ClauseRule>,
    pub fallback: String,
}

impl ClauseTable {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            fallback: fallback.into(),
        }
    }

    #[must_use]
    pub fn with_rule(mut self, predicate: ClausePredicate, text: impl Into<String>) -> Self {
        self.rules.push(ClauseRule {
            predicate,
            text: text.into(),
        });
        self
    }

    pub fn select(&self, record: &ClientRecord) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.predicate.matches(record))
            .map(|rule| rule.text.as_str())
            .unwrap_or(self.fallback.as_str())
    }

    /// Contingency fee clause: `city_rates` entries apply when CIDADE matches
    /// (case-insensitively), `default_rate` everywhere else.
    pub fn professional_fees(city_rates: &[(&str, u32)], default_rate: u32) -> Result<Self> {
        let mut table = Self::new(fee_clause_text(default_rate)?);
        for (city, rate) in city_rates {
            table = table.with_rule(
                ClausePredicate::FieldEqualsIgnoreCase {
                    field: CIDADE.to_string(),
                    value: city.to_string(),
                },
                fee_clause_text(*rate)?,
            );
        }
        Ok(table)
    }
}

/// `"I) 30% (trinta por cento) sobre o valor recebido ..."`.
pub fn fee_clause_text(percent: u32) -> Result<String> {
    Ok(format!(
        "I) {}% ({} por cento) sobre o valor recebido pelo CONTRATANTE em razão de SENTENÇA ou ACORDO, seja este JUDICIAL ou EXTRAJUDICIAL;",
        percent,
        spell_number(u64::from(percent))?
    ))
}
