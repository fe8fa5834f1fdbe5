use std::collections::HashMap;

use crate::assemble::{
    resolve_styles, sheet_from_table, sheet_from_text_rows, sheets_from_partitions, CellStyle,
    SheetDoc, StyleMap,
};
use crate::cell::{clean_number, CellValue};
use crate::error::EngineError;
use crate::join::find_new;
use crate::partition::partition;
use crate::profile::{FieldSource, ReportKind, ReportProfile};
use crate::rules::{format_amount, RuleOutcome};
use crate::schema::{column_index, validate_headers};
use crate::table::Table;

/// Run severity. Alerts escalate success to warning but never to
/// failure; failures are `EngineError`s and produce no output at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RunStatus {
    pub severity: Severity,
    pub message: String,
}

/// Everything a completed run hands back to the caller: the annotated
/// sheets for the workbook writer plus the status line for the user.
#[derive(Debug)]
pub struct RunOutput {
    pub sheets: Vec<SheetDoc>,
    pub status: RunStatus,
    /// Rule accumulators, present for rule reports.
    pub outcome: Option<RuleOutcome>,
}

impl RunOutput {
    fn success(sheets: Vec<SheetDoc>, message: String) -> Self {
        Self {
            sheets,
            status: RunStatus {
                severity: Severity::Success,
                message,
            },
            outcome: None,
        }
    }
}

/// Single-dataset grouping: one output sheet per classification value,
/// in discovery order (ageing, unidentified receipts).
pub fn run_partition_report(profile: &ReportProfile, table: &Table) -> Result<RunOutput, EngineError> {
    let spec = profile
        .partition
        .as_ref()
        .ok_or_else(|| EngineError::ConfigValidation("partition section missing".into()))?;

    let parts = partition(table, spec.class_column_index, &spec.fallback_label)?;

    let styles: StyleMap = profile
        .date_column_indices
        .iter()
        .map(|&i| (i, CellStyle::DateDmy))
        .collect();

    let sheets = sheets_from_partitions(&parts, &styles);
    let message = format!(
        "classified {} rows into {} sheets",
        table.rows.len(),
        sheets.len()
    );
    Ok(RunOutput::success(sheets, message))
}

/// Rule report (OTC): the untouched input re-emitted as the first
/// sheet, then the preamble-stripped, reclassified rows as the second.
pub fn run_rule_report(
    profile: &ReportProfile,
    all_rows: &[Vec<CellValue>],
) -> Result<RunOutput, EngineError> {
    if all_rows.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let original_rows: Vec<Vec<String>> = all_rows
        .iter()
        .map(|row| row.iter().map(CellValue::as_text).collect())
        .collect();
    let original = sheet_from_text_rows(&profile.sheet_names.original, &original_rows);

    let mut adjusted: Vec<Vec<CellValue>> = all_rows
        .iter()
        .skip(profile.skip_rows)
        .cloned()
        .collect();
    let outcome = profile.rules.apply(&mut adjusted);

    let adjusted_rows: Vec<Vec<String>> = adjusted
        .iter()
        .map(|row| row.iter().map(CellValue::as_text).collect())
        .collect();
    let reclassified = sheet_from_text_rows(&profile.sheet_names.adjusted, &adjusted_rows);

    let mut message = format!(
        "report complete, sheets '{}' and '{}' written | total {}",
        profile.sheet_names.original,
        profile.sheet_names.adjusted,
        format_amount(outcome.total_sum)
    );
    let severity = if outcome.alert_count > 0 {
        let code = profile
            .rules
            .alert
            .as_ref()
            .map(|a| a.code.as_str())
            .unwrap_or("?");
        message.push_str(&format!(
            " | alert code {code} found {} time(s)",
            outcome.alert_count
        ));
        Severity::Warning
    } else {
        Severity::Success
    };

    Ok(RunOutput {
        sheets: vec![original, reclassified],
        status: RunStatus { severity, message },
        outcome: Some(outcome),
    })
}

/// Two-dataset reconciliation: rows of `primary` whose business key is
/// absent from `reference`, flagged and formatted. Zero new records is
/// a successful no-op with no sheets.
pub fn run_join_report(
    profile: &ReportProfile,
    primary: &Table,
    reference: &Table,
) -> Result<RunOutput, EngineError> {
    let join = profile
        .join
        .as_ref()
        .ok_or_else(|| EngineError::ConfigValidation("join section missing".into()))?;

    let expected: Vec<&str> = profile
        .expected_reference_headers
        .iter()
        .map(String::as_str)
        .collect();
    validate_headers(&reference.headers, &expected)?;

    let new_records = find_new(primary, reference, join);
    if new_records.rows.is_empty() {
        return Ok(RunOutput::success(
            vec![],
            "cross-check complete, no new records found".into(),
        ));
    }

    let by_name: Vec<(String, CellStyle)> = profile
        .formats
        .iter()
        .map(|f| (f.column.clone(), f.style))
        .collect();
    let styles = resolve_styles(&new_records.headers, &by_name);

    let count = new_records.rows.len();
    let sheet = sheet_from_table(&profile.sheet_names.joined, &new_records, &styles);
    Ok(RunOutput::success(
        vec![sheet],
        format!("cross-check complete, {count} new record(s) found"),
    ))
}

/// Write-off splitter: drop rows whose amount cleans to zero, sort the
/// rest ascending by amount, remap into the journal layout and split by
/// currency. One output sheet per configured currency with data.
pub fn run_write_off_report(
    profile: &ReportProfile,
    table: &Table,
) -> Result<RunOutput, EngineError> {
    let spec = profile
        .write_off
        .as_ref()
        .ok_or_else(|| EngineError::ConfigValidation("write_off section missing".into()))?;

    let amount_idx = column_index(&table.headers, &spec.amount_column).ok_or_else(|| {
        EngineError::ConfigValidation(format!("column '{}' not found", spec.amount_column))
    })?;
    let currency_idx = column_index(&table.headers, &spec.currency_column).ok_or_else(|| {
        EngineError::ConfigValidation(format!("column '{}' not found", spec.currency_column))
    })?;

    let amount_of = |row: &Vec<CellValue>| -> f64 {
        row.get(amount_idx)
            .and_then(|c| match c {
                CellValue::Number(n) => Some(*n),
                CellValue::Text(s) => clean_number(s),
                _ => None,
            })
            .unwrap_or(0.0)
    };

    let mut kept: Vec<&Vec<CellValue>> = table
        .rows
        .iter()
        .filter(|row| amount_of(row) != 0.0)
        .collect();
    let dropped = table.rows.len() - kept.len();
    kept.sort_by(|a, b| {
        amount_of(a)
            .partial_cmp(&amount_of(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let source_index: HashMap<&str, usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim(), i))
        .collect();

    let out_headers: Vec<String> = spec.layout.iter().map(|c| c.name.clone()).collect();
    let mut per_currency: HashMap<&str, Vec<Vec<CellValue>>> = spec
        .currencies
        .iter()
        .map(|c| (c.as_str(), Vec::new()))
        .collect();

    for row in kept {
        let currency = row
            .get(currency_idx)
            .map(|c| c.as_text().trim().to_uppercase())
            .unwrap_or_default();
        let Some(bucket) = per_currency.get_mut(currency.as_str()) else {
            continue; // currencies outside the configured set drop
        };

        let amount = amount_of(row);
        let out_row: Vec<CellValue> = spec
            .layout
            .iter()
            .map(|col| match &col.source {
                FieldSource::Constant(value) => CellValue::Text(value.clone()),
                FieldSource::Copy(name) => source_index
                    .get(name.as_str())
                    .and_then(|&i| row.get(i))
                    .cloned()
                    .unwrap_or(CellValue::Empty),
                FieldSource::DebitAmount => CellValue::Number((amount.abs() * 100.0).round() / 100.0),
                FieldSource::CreditZero => CellValue::Number(0.0),
                FieldSource::RawAmount => row.get(amount_idx).cloned().unwrap_or(CellValue::Empty),
            })
            .collect();
        bucket.push(out_row);
    }

    let styles = resolve_styles(
        &out_headers,
        &[
            ("DEBE".into(), CellStyle::Number2),
            ("HABER".into(), CellStyle::Number2),
        ],
    );

    let mut sheets = Vec::new();
    let mut total = 0usize;
    for currency in &spec.currencies {
        let rows = per_currency.remove(currency.as_str()).unwrap_or_default();
        if rows.is_empty() {
            continue;
        }
        total += rows.len();
        let out = Table::new(out_headers.clone(), rows);
        sheets.push(sheet_from_table(&format!("Reporte {currency}"), &out, &styles));
    }

    let message = format!(
        "dropped {dropped} zero-amount row(s), {total} record(s) across {} currency sheet(s)",
        sheets.len()
    );
    Ok(RunOutput::success(sheets, message))
}

/// Dispatch on the profile kind for single-input reports. Detraction
/// needs two inputs and has its own entrypoint.
pub fn run_single_input(profile: &ReportProfile, table: &Table) -> Result<RunOutput, EngineError> {
    match profile.kind {
        ReportKind::Ageing | ReportKind::Unidentify => run_partition_report(profile, table),
        ReportKind::WriteOff => run_write_off_report(profile, table),
        ReportKind::Otc => Err(EngineError::ConfigValidation(
            "otc reports run over raw rows, use run_rule_report".into(),
        )),
        ReportKind::Detraction => Err(EngineError::ConfigValidation(
            "detraction reports need a reference dataset, use run_join_report".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ReportProfile;

    fn text_row(fields: &[&str]) -> Vec<CellValue> {
        fields.iter().map(|s| CellValue::from(*s)).collect()
    }

    fn wide_row(width: usize, at: &[(usize, &str)]) -> Vec<CellValue> {
        let mut r = vec![CellValue::Text("x".into()); width];
        for (i, v) in at {
            r[*i] = CellValue::from(*v);
        }
        r
    }

    #[test]
    fn otc_twenty_rows_with_sixteen_row_preamble() {
        let mut all_rows: Vec<Vec<CellValue>> =
            (0..16).map(|i| text_row(&[&format!("preamble{i}")])).collect();
        all_rows.push(wide_row(52, &[(30, "4000427"), (51, "100.50")]));
        all_rows.push(wide_row(52, &[(36, "F391501"), (51, "50")]));
        all_rows.push(wide_row(52, &[(30, "4000427")]));
        all_rows.push(wide_row(52, &[]));
        assert_eq!(all_rows.len(), 20);

        let profile = ReportProfile::otc();
        let output = run_rule_report(&profile, &all_rows).unwrap();

        assert_eq!(output.sheets.len(), 2);
        assert_eq!(output.sheets[0].name, "OTC Original");
        assert_eq!(output.sheets[0].rows.len(), 20);
        assert_eq!(output.sheets[1].name, "OTC Reclasificado");
        assert_eq!(output.sheets[1].rows.len(), 4);

        // Reclassified in the adjusted sheet, untouched in the original.
        assert_eq!(
            output.sheets[1].rows[0][30].value,
            CellValue::Text("4000425".into())
        );
        assert_eq!(
            output.sheets[0].rows[16][30].value,
            CellValue::Text("4000427".into())
        );

        let outcome = output.outcome.unwrap();
        assert_eq!(outcome.alert_count, 1);
        assert_eq!(outcome.total_sum, 150.50);
        assert_eq!(output.status.severity, Severity::Warning);
        assert!(output.status.message.contains("150.50"));
    }

    #[test]
    fn otc_without_alert_is_success() {
        let all_rows = vec![wide_row(52, &[(51, "10")]); 17];
        let mut profile = ReportProfile::otc();
        profile.skip_rows = 0;
        let output = run_rule_report(&profile, &all_rows).unwrap();
        assert_eq!(output.status.severity, Severity::Success);
    }

    #[test]
    fn join_report_mismatched_reference_schema() {
        let mut profile = ReportProfile::detraction();
        profile.expected_reference_headers = vec!["A".into(), "C".into()];
        let primary = Table::new(vec!["Numero Constancia".into()], vec![]);
        let reference = Table::new(vec!["A".into(), "B".into()], vec![]);
        let err = run_join_report(&profile, &primary, &reference).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("column 2"));
        assert!(msg.contains("'C'"));
        assert!(msg.contains("'B'"));
    }

    #[test]
    fn join_report_no_new_records_is_success_without_sheets() {
        let mut profile = ReportProfile::detraction();
        profile.expected_reference_headers = vec!["Numero Constancia".into()];
        let primary = Table::new(
            vec!["Numero Constancia".into()],
            vec![text_row(&["K1"])],
        );
        let reference = Table::new(
            vec!["Numero Constancia".into()],
            vec![text_row(&["K1"])],
        );
        let output = run_join_report(&profile, &primary, &reference).unwrap();
        assert!(output.sheets.is_empty());
        assert_eq!(output.status.severity, Severity::Success);
    }

    #[test]
    fn write_off_filters_sorts_and_splits() {
        let headers: Vec<String> = [
            "RECEIVABLE_ACCOUNT",
            "SECTOR",
            "COST CENTER",
            "LOCATION",
            "Glosa",
            "Castigo moneda original",
            "Moneda",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        let rows = vec![
            text_row(&["1201", "90", "9115", "024", "castigo a", "-250.00", "PEN"]),
            text_row(&["1202", "90", "9115", "024", "castigo b", "0", "PEN"]),
            text_row(&["1203", "90", "9115", "024", "castigo c", "-100.00", "PEN"]),
            text_row(&["1204", "90", "9115", "024", "castigo d", "-75.50", "USD"]),
            text_row(&["1205", "90", "9115", "024", "castigo e", "-10.00", "EUR"]),
        ];
        let table = Table::new(headers, rows);

        let profile = ReportProfile::write_off();
        let output = run_write_off_report(&profile, &table).unwrap();

        assert_eq!(output.sheets.len(), 2);
        assert_eq!(output.sheets[0].name, "Reporte PEN");
        assert_eq!(output.sheets[1].name, "Reporte USD");

        let pen = &output.sheets[0];
        // header + two PEN rows; zero row and EUR row dropped
        assert_eq!(pen.rows.len(), 3);
        // ascending by amount: -250 before -100
        assert_eq!(pen.rows[1][15].value, CellValue::Text("-250.00".into()));
        assert_eq!(pen.rows[2][15].value, CellValue::Text("-100.00".into()));
        // DEBE carries the absolute amount, HABER zero
        assert_eq!(pen.rows[1][12].value, CellValue::Number(250.0));
        assert_eq!(pen.rows[1][13].value, CellValue::Number(0.0));
        // constants in place
        assert_eq!(pen.rows[1][0].value, CellValue::Text("F391501".into()));
        assert_eq!(pen.rows[1][9].value, CellValue::Text("B".into()));
        assert!(output.status.message.contains("dropped 1"));
        assert!(output.status.message.contains("3 record(s)"));
        assert!(output.status.message.contains("2 currency sheet(s)"));
    }

    #[test]
    fn ageing_dispatch_through_single_input() {
        let headers: Vec<String> = (0..10).map(|i| format!("H{i}")).collect();
        let table = Table::new(
            headers,
            vec![
                wide_row(10, &[(9, "BANK_A")]),
                wide_row(10, &[(9, "BANK_B")]),
            ],
        );
        let output = run_single_input(&ReportProfile::ageing(), &table).unwrap();
        assert_eq!(output.sheets.len(), 2);
        assert_eq!(output.sheets[0].name, "BANK_A");
        assert_eq!(output.sheets[1].name, "BANK_B");
        for sheet in &output.sheets {
            assert_eq!(sheet.rows.len(), 2);
        }
    }
}
