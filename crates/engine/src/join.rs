use std::collections::HashSet;

use crate::cell::{clean_number, coerce, CellValue, CoerceKind};
use crate::schema::column_index;
use crate::table::Table;

/// Novel-record detection between two datasets sharing a business key
/// column (e.g. a deposit voucher number).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct JoinSpec {
    /// Business key column name.
    pub key_column: String,
    /// Injected provenance column name.
    pub provenance_column: String,
    /// Value written into the provenance column of every new row.
    pub provenance_value: String,
    /// Amount column coerced to a number on new rows.
    #[serde(default)]
    pub amount_column: Option<String>,
    /// Identifier column forced to text on new rows, preserving leading
    /// zeros and avoiding scientific-notation display.
    #[serde(default)]
    pub text_column: Option<String>,
}

/// Rows of `primary` whose trimmed business key is non-empty and absent
/// from `reference`, with the provenance column injected immediately
/// after the key column (appended at the end when the primary header
/// does not carry the key column). Zero new rows is a successful no-op,
/// not an error.
pub fn find_new(primary: &Table, reference: &Table, spec: &JoinSpec) -> Table {
    let reference_keys: HashSet<String> = match column_index(&reference.headers, &spec.key_column) {
        Some(idx) => reference
            .rows
            .iter()
            .filter_map(|row| row.get(idx))
            .map(|cell| cell.as_text().trim().to_string())
            .filter(|key| !key.is_empty())
            .collect(),
        None => HashSet::new(),
    };

    let key_idx = column_index(&primary.headers, &spec.key_column);
    // Provenance goes right after the key column so reviewers see the
    // flag next to the voucher number.
    let insert_at = key_idx.map(|i| i + 1).unwrap_or(primary.headers.len());

    let mut headers = primary.headers.clone();
    headers.insert(insert_at, spec.provenance_column.clone());

    let amount_idx = spec
        .amount_column
        .as_deref()
        .and_then(|name| column_index(&primary.headers, name));
    let text_idx = spec
        .text_column
        .as_deref()
        .and_then(|name| column_index(&primary.headers, name));

    let mut rows = Vec::new();
    for row in &primary.rows {
        let key = key_idx
            .and_then(|i| row.get(i))
            .map(|cell| cell.as_text().trim().to_string())
            .unwrap_or_default();
        if key.is_empty() || reference_keys.contains(&key) {
            continue;
        }

        let mut new_row = row.clone();

        if let Some(i) = amount_idx {
            if let Some(cell) = new_row.get_mut(i) {
                if let CellValue::Text(s) = cell {
                    if let Some(n) = clean_number(s) {
                        *cell = CellValue::Number(n);
                    }
                }
            }
        }
        if let Some(i) = text_idx {
            if let Some(cell) = new_row.get_mut(i) {
                if !cell.is_empty() {
                    *cell = coerce(cell.clone(), CoerceKind::Text);
                }
            }
        }

        // Pad short rows so the provenance flag lands in its column.
        while new_row.len() < insert_at {
            new_row.push(CellValue::Empty);
        }
        new_row.insert(insert_at, CellValue::Text(spec.provenance_value.clone()));
        rows.push(new_row);
    }

    Table::new(headers, rows)
}
