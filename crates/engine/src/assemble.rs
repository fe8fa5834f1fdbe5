use std::collections::HashMap;

use crate::cell::{coerce, CellValue, CoerceKind};
use crate::partition::Partitions;
use crate::schema::column_index;
use crate::table::Table;

/// Workbook sheet names cap at 31 characters. Collisions after
/// truncation are not deduplicated; the writer surfaces them if the
/// underlying library enforces unique names.
pub const MAX_SHEET_NAME: usize = 31;

/// Display treatment for an output cell. The io layer maps these to
/// concrete number-format strings; this crate only tags intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStyle {
    #[default]
    Plain,
    /// Two decimals with thousands separator (`#,##0.00`).
    Number2,
    /// Day-first date (`dd/mm/yyyy`).
    DateDmy,
    /// ISO date (`yyyy-mm-dd`).
    DateIso,
    /// Forced text, so long digit runs keep leading zeros and never
    /// collapse into scientific notation.
    TextForced,
}

impl CellStyle {
    /// The coercion applied before a cell is tagged with this style.
    pub fn coerce_kind(self) -> Option<CoerceKind> {
        match self {
            Self::Plain => None,
            Self::Number2 => Some(CoerceKind::Number),
            Self::DateDmy | Self::DateIso => Some(CoerceKind::Date),
            Self::TextForced => Some(CoerceKind::Text),
        }
    }
}

/// Column-indexed style assignments for one sheet.
pub type StyleMap = HashMap<usize, CellStyle>;

/// Resolve named style assignments against a header row. Names that do
/// not appear in the header are dropped silently.
pub fn resolve_styles(headers: &[String], by_name: &[(String, CellStyle)]) -> StyleMap {
    let mut map = StyleMap::new();
    for (name, style) in by_name {
        if let Some(idx) = column_index(headers, name) {
            map.insert(idx, *style);
        }
    }
    map
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledCell {
    pub value: CellValue,
    pub style: CellStyle,
}

/// One named, fully annotated output sheet. The workbook-writer
/// collaborator turns a sequence of these into the binary payload.
#[derive(Debug, Clone)]
pub struct SheetDoc {
    pub name: String,
    pub rows: Vec<Vec<StyledCell>>,
}

impl SheetDoc {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.chars().take(MAX_SHEET_NAME).collect(),
            rows: Vec::new(),
        }
    }

    fn push_header(&mut self, headers: &[String]) {
        self.rows.push(
            headers
                .iter()
                .map(|h| StyledCell {
                    value: CellValue::Text(h.clone()),
                    style: CellStyle::Plain,
                })
                .collect(),
        );
    }

    fn push_data_row(&mut self, row: &[CellValue], styles: &StyleMap) {
        self.rows.push(
            row.iter()
                .enumerate()
                .map(|(i, cell)| {
                    let style = styles.get(&i).copied().unwrap_or_default();
                    let value = match style.coerce_kind() {
                        Some(kind) => coerce(cell.clone(), kind),
                        None => cell.clone(),
                    };
                    // A cell that resisted coercion keeps its weaker tag;
                    // do not pin a numeric/date format onto text.
                    let style = match (&value, style) {
                        (CellValue::Text(_), CellStyle::Number2)
                        | (CellValue::Text(_), CellStyle::DateDmy)
                        | (CellValue::Text(_), CellStyle::DateIso) => CellStyle::Plain,
                        _ => style,
                    };
                    StyledCell { value, style }
                })
                .collect(),
        );
    }
}

/// One sheet per partition, in partition discovery order.
pub fn sheets_from_partitions(partitions: &Partitions, styles: &StyleMap) -> Vec<SheetDoc> {
    partitions
        .iter()
        .map(|part| {
            let mut sheet = SheetDoc::new(&part.key);
            sheet.push_header(&part.headers);
            for row in &part.rows {
                sheet.push_data_row(row, styles);
            }
            sheet
        })
        .collect()
}

/// A single sheet holding a whole table.
pub fn sheet_from_table(name: &str, table: &Table, styles: &StyleMap) -> SheetDoc {
    let mut sheet = SheetDoc::new(name);
    sheet.push_header(&table.headers);
    for row in &table.rows {
        sheet.push_data_row(row, styles);
    }
    sheet
}

/// A sheet of raw text rows, no header/data distinction and no styles.
/// Used to re-emit the original input untouched.
pub fn sheet_from_text_rows(name: &str, rows: &[Vec<String>]) -> SheetDoc {
    let mut sheet = SheetDoc::new(name);
    for row in rows {
        sheet.rows.push(
            row.iter()
                .map(|s| StyledCell {
                    value: CellValue::from(s.as_str()),
                    style: CellStyle::Plain,
                })
                .collect(),
        );
    }
    sheet
}
