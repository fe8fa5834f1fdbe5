use std::collections::HashMap;

use crate::cell::CellValue;
use crate::error::EngineError;
use crate::table::Table;

/// One named group: the duplicated header row plus every data row whose
/// classification key matched, in original input order.
#[derive(Debug, Clone)]
pub struct Partition {
    pub key: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Partitions in first-occurrence order of their keys. Sheet order in
/// the output workbook follows this order, so it must be stable.
#[derive(Debug, Default)]
pub struct Partitions {
    groups: Vec<Partition>,
    index: HashMap<String, usize>,
}

impl Partitions {
    pub fn iter(&self) -> impl Iterator<Item = &Partition> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Partition> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    fn push_row(&mut self, key: String, headers: &[String], row: Vec<CellValue>) {
        match self.index.get(&key) {
            Some(&i) => self.groups[i].rows.push(row),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push(Partition {
                    key,
                    headers: headers.to_vec(),
                    rows: vec![row],
                });
            }
        }
    }
}

/// Group data rows by the string value of the classification column.
/// Empty or missing values fall back to `fallback_label`. The column
/// index is checked against the header once, up front — a bad index is
/// a configuration error, not a per-row condition.
pub fn partition(
    table: &Table,
    class_column_index: usize,
    fallback_label: &str,
) -> Result<Partitions, EngineError> {
    if class_column_index >= table.headers.len() {
        return Err(EngineError::MissingColumn {
            index: class_column_index,
            header_len: table.headers.len(),
        });
    }

    let mut partitions = Partitions::default();
    for row in &table.rows {
        let key = match row.get(class_column_index) {
            Some(cell) if !cell.is_empty() => cell.as_text(),
            _ => fallback_label.to_string(),
        };
        partitions.push_row(key, &table.headers, row.clone());
    }
    Ok(partitions)
}
