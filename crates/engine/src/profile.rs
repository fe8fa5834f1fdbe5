use serde::Deserialize;

use crate::assemble::CellStyle;
use crate::error::EngineError;
use crate::join::JoinSpec;
use crate::rules::{AlertRule, Reclassify, RuleSet, SumRule};

/// A report profile: everything that used to live as per-report magic
/// numbers, externalized so the one pipeline can run every report kind.
/// Built-in constructors carry the known production values; a TOML file
/// can override any of them.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportProfile {
    pub name: String,
    pub kind: ReportKind,
    /// Appended to the input file stem to form the output name.
    pub suffix: String,
    #[serde(default)]
    pub partition: Option<PartitionSpec>,
    /// Columns (by position) coerced to dates before output.
    #[serde(default)]
    pub date_column_indices: Vec<usize>,
    /// Leading preamble rows dropped before rule application.
    #[serde(default)]
    pub skip_rows: usize,
    #[serde(default)]
    pub rules: RuleSet,
    #[serde(default)]
    pub join: Option<JoinSpec>,
    /// Positional schema the reference file must match exactly.
    #[serde(default)]
    pub expected_reference_headers: Vec<String>,
    /// Named sheet to read from the reference workbook (first sheet
    /// when absent).
    #[serde(default)]
    pub reference_sheet: Option<String>,
    /// Output display formats, by column name.
    #[serde(default)]
    pub formats: Vec<ColumnFormat>,
    #[serde(default)]
    pub write_off: Option<WriteOffSpec>,
    #[serde(default)]
    pub sheet_names: SheetNames,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Single-dataset grouping into one sheet per classification value.
    Ageing,
    /// Preamble skip + reclassification/alert/sum over a report dump.
    Otc,
    /// Workbook-sourced grouping with date normalization.
    Unidentify,
    /// Two-dataset novel-record detection.
    Detraction,
    /// Zero-filter + sort + currency split into journal layout.
    WriteOff,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartitionSpec {
    pub class_column_index: usize,
    pub fallback_label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnFormat {
    pub column: String,
    pub style: CellStyle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetNames {
    /// Sheet holding the untouched input (rule reports).
    pub original: String,
    /// Sheet holding the adjusted rows (rule reports).
    pub adjusted: String,
    /// Sheet holding join results.
    pub joined: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            original: "Original".into(),
            adjusted: "Ajustado".into(),
            joined: "Nuevos Registros".into(),
        }
    }
}

/// Fixed journal layout for the write-off report. Each output column is
/// a constant, a copy of a named input column, or one of the computed
/// amount roles.
#[derive(Debug, Clone, Deserialize)]
pub struct WriteOffSpec {
    /// Column filtered to non-zero and sorted ascending.
    pub amount_column: String,
    pub currency_column: String,
    /// Currencies that get an output; rows in any other currency drop.
    pub currencies: Vec<String>,
    pub layout: Vec<WriteOffColumn>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteOffColumn {
    pub name: String,
    pub source: FieldSource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Constant(String),
    Copy(String),
    /// Absolute cleaned amount, two decimals.
    DebitAmount,
    /// Always zero, two decimals.
    CreditZero,
    /// The amount cell exactly as it arrived.
    RawAmount,
}

impl ReportProfile {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let profile: ReportProfile =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        match self.kind {
            ReportKind::Ageing | ReportKind::Unidentify => {
                if self.partition.is_none() {
                    return Err(EngineError::ConfigValidation(format!(
                        "profile '{}': a [partition] section is required",
                        self.name
                    )));
                }
            }
            ReportKind::Otc => {
                if self.rules.reclassify.is_empty()
                    && self.rules.alert.is_none()
                    && self.rules.sum.is_none()
                {
                    return Err(EngineError::ConfigValidation(format!(
                        "profile '{}': at least one rule is required",
                        self.name
                    )));
                }
            }
            ReportKind::Detraction => {
                if self.join.is_none() {
                    return Err(EngineError::ConfigValidation(format!(
                        "profile '{}': a [join] section is required",
                        self.name
                    )));
                }
                if self.expected_reference_headers.is_empty() {
                    return Err(EngineError::ConfigValidation(format!(
                        "profile '{}': expected_reference_headers must not be empty",
                        self.name
                    )));
                }
            }
            ReportKind::WriteOff => {
                let spec = self.write_off.as_ref().ok_or_else(|| {
                    EngineError::ConfigValidation(format!(
                        "profile '{}': a [write_off] section is required",
                        self.name
                    ))
                })?;
                if spec.currencies.is_empty() || spec.layout.is_empty() {
                    return Err(EngineError::ConfigValidation(format!(
                        "profile '{}': write_off currencies and layout must not be empty",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Receivables ageing: tab-delimited input, classified by the bank
    /// column (column 10).
    pub fn ageing() -> Self {
        Self {
            name: "ageing".into(),
            kind: ReportKind::Ageing,
            suffix: "AgeingReport".into(),
            partition: Some(PartitionSpec {
                class_column_index: 9,
                fallback_label: "SIN CLASIFICAR".into(),
            }),
            date_column_indices: vec![],
            skip_rows: 0,
            rules: RuleSet::default(),
            join: None,
            expected_reference_headers: vec![],
            reference_sheet: None,
            formats: vec![],
            write_off: None,
            sheet_names: SheetNames::default(),
        }
    }

    /// OTC dump: 16 preamble rows, account 4000427 reclassified to
    /// 4000425 in column 31, alert code F391501 counted in column 37,
    /// column 52 accumulated.
    pub fn otc() -> Self {
        Self {
            name: "otc".into(),
            kind: ReportKind::Otc,
            suffix: "OTC_Reporte".into(),
            partition: None,
            date_column_indices: vec![],
            skip_rows: 16,
            rules: RuleSet {
                reclassify: vec![Reclassify {
                    column: 30,
                    from: "4000427".into(),
                    to: "4000425".into(),
                }],
                alert: Some(AlertRule {
                    column: 36,
                    code: "F391501".into(),
                }),
                sum: Some(SumRule { column: 51 }),
            },
            join: None,
            expected_reference_headers: vec![],
            reference_sheet: None,
            formats: vec![],
            write_off: None,
            sheet_names: SheetNames {
                original: "OTC Original".into(),
                adjusted: "OTC Reclasificado".into(),
                joined: "Nuevos Registros".into(),
            },
        }
    }

    /// Unidentified receipts: workbook input, one sheet per bank
    /// (column 16), dates normalized in columns 6, 14 and 15.
    pub fn unidentified() -> Self {
        Self {
            name: "unidentify".into(),
            kind: ReportKind::Unidentify,
            suffix: "UnidentifyReport".into(),
            partition: Some(PartitionSpec {
                class_column_index: 15,
                fallback_label: "SIN BANCO".into(),
            }),
            date_column_indices: vec![5, 13, 14],
            skip_rows: 0,
            rules: RuleSet::default(),
            join: None,
            expected_reference_headers: vec![],
            reference_sheet: None,
            formats: vec![],
            write_off: None,
            sheet_names: SheetNames::default(),
        }
    }

    /// Detraction reconciliation: deposit statement vs. master ledger,
    /// keyed by the deposit voucher number.
    pub fn detraction() -> Self {
        Self {
            name: "detraction".into(),
            kind: ReportKind::Detraction,
            suffix: "Nuevos_Registros_Detracciones".into(),
            partition: None,
            date_column_indices: vec![],
            skip_rows: 0,
            rules: RuleSet::default(),
            join: Some(JoinSpec {
                key_column: "Numero Constancia".into(),
                provenance_column: "Cruce".into(),
                provenance_value: "Nuevo".into(),
                amount_column: Some("Monto de deposito".into()),
                text_column: Some("Numero de Documento Adquiriente".into()),
            }),
            expected_reference_headers: detraction_master_headers(),
            reference_sheet: Some("SGS DEL PERU S.A.C.".into()),
            formats: vec![
                ColumnFormat {
                    column: "Monto de deposito".into(),
                    style: CellStyle::Number2,
                },
                ColumnFormat {
                    column: "Fecha Pago".into(),
                    style: CellStyle::DateDmy,
                },
                ColumnFormat {
                    column: "Fecha de Descarga".into(),
                    style: CellStyle::DateIso,
                },
                ColumnFormat {
                    column: "Numero de Documento Adquiriente".into(),
                    style: CellStyle::TextForced,
                },
            ],
            write_off: None,
            sheet_names: SheetNames::default(),
        }
    }

    /// Write-off journal: drop zero amounts, sort ascending, split by
    /// currency into the fixed manual-journal layout.
    pub fn write_off() -> Self {
        let constant = |name: &str, value: &str| WriteOffColumn {
            name: name.into(),
            source: FieldSource::Constant(value.into()),
        };
        let copy = |name: &str| WriteOffColumn {
            name: name.into(),
            source: FieldSource::Copy(name.into()),
        };
        Self {
            name: "write_off".into(),
            kind: ReportKind::WriteOff,
            suffix: "ORDENADO".into(),
            partition: None,
            date_column_indices: vec![],
            skip_rows: 0,
            rules: RuleSet::default(),
            join: None,
            expected_reference_headers: vec![],
            reference_sheet: None,
            formats: vec![],
            write_off: Some(WriteOffSpec {
                amount_column: "Castigo moneda original".into(),
                currency_column: "Moneda".into(),
                currencies: vec!["PEN".into(), "USD".into()],
                layout: vec![
                    constant("FCODE", "F391501"),
                    copy("RECEIVABLE_ACCOUNT"),
                    copy("SECTOR"),
                    constant("ACT", "000000"),
                    copy("COST CENTER"),
                    constant("CL", "00"),
                    copy("LOCATION"),
                    constant("INTERCOMPANY", "0000000"),
                    constant("PROJECT", "00000000"),
                    constant("STATUTORY", "B"),
                    constant("RESERVED 1", "000000"),
                    constant("RESERVED 2", "000000"),
                    WriteOffColumn {
                        name: "DEBE".into(),
                        source: FieldSource::DebitAmount,
                    },
                    WriteOffColumn {
                        name: "HABER".into(),
                        source: FieldSource::CreditZero,
                    },
                    copy("Glosa"),
                    WriteOffColumn {
                        name: "Castigo moneda original".into(),
                        source: FieldSource::RawAmount,
                    },
                ],
            }),
            sheet_names: SheetNames::default(),
        }
    }
}

/// The 21-column master-file schema the detraction reference must match.
fn detraction_master_headers() -> Vec<String> {
    [
        "Fecha de Descarga",
        "Semana",
        "Nº",
        "Tipo de Cuenta",
        "Numero de Cuenta",
        "Numero Constancia",
        "OPERACIÓN ORACLE",
        "Periodo Tributario",
        "RUC Proveedor",
        "Nombre Proveedor",
        "Tipo de Documento Adquiriente",
        "Numero de Documento Adquiriente",
        "Nombre/Razon Social del Adquiriente",
        "Fecha Pago",
        "Monto de deposito",
        "Tipo Bien",
        "Tipo Operacion",
        "Tipo de Comprobante",
        "Serie de Comprobante",
        "Facturas",
        "Estado",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_profiles_validate() {
        for profile in [
            ReportProfile::ageing(),
            ReportProfile::otc(),
            ReportProfile::unidentified(),
            ReportProfile::detraction(),
            ReportProfile::write_off(),
        ] {
            profile.validate().unwrap();
        }
    }

    #[test]
    fn parse_minimal_toml_profile() {
        let input = r#"
name = "ageing-q3"
kind = "ageing"
suffix = "AgeingReport"

[partition]
class_column_index = 9
fallback_label = "SIN CLASIFICAR"
"#;
        let profile = ReportProfile::from_toml(input).unwrap();
        assert_eq!(profile.kind, ReportKind::Ageing);
        assert_eq!(profile.partition.unwrap().class_column_index, 9);
    }

    #[test]
    fn parse_otc_toml_with_rules() {
        let input = r#"
name = "otc-custom"
kind = "otc"
suffix = "OTC_Reporte"
skip_rows = 16

[[rules.reclassify]]
column = 30
from = "4000427"
to = "4000425"

[rules.alert]
column = 36
code = "F391501"

[rules.sum]
column = 51
"#;
        let profile = ReportProfile::from_toml(input).unwrap();
        assert_eq!(profile.skip_rows, 16);
        assert_eq!(profile.rules.reclassify.len(), 1);
        assert_eq!(profile.rules.alert.unwrap().code, "F391501");
    }

    #[test]
    fn reject_partition_kind_without_partition() {
        let input = r#"
name = "bad"
kind = "ageing"
suffix = "X"
"#;
        let err = ReportProfile::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("[partition]"));
    }

    #[test]
    fn reject_detraction_without_join() {
        let input = r#"
name = "bad"
kind = "detraction"
suffix = "X"
"#;
        let err = ReportProfile::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("[join]"));
    }

    #[test]
    fn master_schema_has_21_columns() {
        assert_eq!(ReportProfile::detraction().expected_reference_headers.len(), 21);
    }
}
