// Excel import (calamine) and export (rust_xlsxwriter)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use splitbook_engine::assemble::{CellStyle, SheetDoc};
use splitbook_engine::cell::{date_to_serial, serial_to_date, CellValue};

/// Sheet names in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, String> {
    let workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Read one sheet of a workbook as raw rows (header-inclusive row 0).
/// `sheet` selects by name; `None` takes the first sheet.
pub fn read_sheet_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<CellValue>>, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err("Excel file contains no sheets".to_string());
    }

    let target = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(format!("sheet '{}' does not exist in the workbook", name));
            }
            name.to_string()
        }
        None => sheet_names[0].clone(),
    };

    let range = workbook
        .worksheet_range(&target)
        .map_err(|e| format!("Failed to read sheet '{}': {}", target, e))?;

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for row in range.rows() {
        let cells: Vec<CellValue> = row.iter().map(convert_cell).collect();
        // Fully empty rows carry no information and would otherwise
        // become phantom partition members.
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        rows.push(cells);
    }
    Ok(rows)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => {
            // calamine hands dates over as day serials (1900 system)
            let serial = dt.as_f64();
            match serial_to_date(serial) {
                Some(date) => CellValue::Date(date),
                None => CellValue::Number(serial),
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Write annotated sheets as an xlsx workbook. Sheet order follows the
/// slice; duplicate names are the library's problem to report.
pub fn write_workbook(sheets: &[SheetDoc], path: &Path) -> Result<(), String> {
    let mut xlsx_workbook = XlsxWorkbook::new();

    let number_format = Format::new().set_num_format("#,##0.00");
    let date_dmy_format = Format::new().set_num_format("dd/mm/yyyy");
    let date_iso_format = Format::new().set_num_format("yyyy-mm-dd");
    let text_format = Format::new().set_num_format("@");

    for sheet in sheets {
        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", sheet.name, e))?;

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let r = row_idx as u32;
                let c = col_idx as u16;

                let result = match (&cell.value, cell.style) {
                    (CellValue::Empty, _) => continue,
                    (CellValue::Number(n), CellStyle::Number2) => {
                        worksheet.write_number_with_format(r, c, *n, &number_format)
                    }
                    (CellValue::Number(n), CellStyle::DateDmy) => {
                        worksheet.write_number_with_format(r, c, *n, &date_dmy_format)
                    }
                    (CellValue::Number(n), CellStyle::DateIso) => {
                        worksheet.write_number_with_format(r, c, *n, &date_iso_format)
                    }
                    (CellValue::Number(n), _) => worksheet.write_number(r, c, *n),
                    (CellValue::Date(d), CellStyle::DateIso) => {
                        worksheet.write_number_with_format(r, c, date_to_serial(*d), &date_iso_format)
                    }
                    // Dates are always day serials plus a display format,
                    // never pre-rendered strings.
                    (CellValue::Date(d), _) => {
                        worksheet.write_number_with_format(r, c, date_to_serial(*d), &date_dmy_format)
                    }
                    (CellValue::Text(s), CellStyle::TextForced) => {
                        worksheet.write_string_with_format(r, c, s, &text_format)
                    }
                    (CellValue::Text(s), _) => worksheet.write_string(r, c, s),
                };
                result.map_err(|e| {
                    format!(
                        "Failed to write cell {}:{} on sheet '{}': {}",
                        row_idx, col_idx, sheet.name, e
                    )
                })?;
            }
        }
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitbook_engine::assemble::{sheet_from_text_rows, StyledCell};
    use splitbook_engine::cell::CellValue;
    use tempfile::tempdir;

    fn styled(value: CellValue, style: CellStyle) -> StyledCell {
        StyledCell { value, style }
    }

    #[test]
    fn round_trip_text_and_numbers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let mut sheet = SheetDoc::new("BANK_A");
        sheet.rows.push(vec![
            styled(CellValue::Text("Banco".into()), CellStyle::Plain),
            styled(CellValue::Text("Monto".into()), CellStyle::Plain),
        ]);
        sheet.rows.push(vec![
            styled(CellValue::Text("BCP".into()), CellStyle::Plain),
            styled(CellValue::Number(1500.25), CellStyle::Number2),
        ]);
        write_workbook(&[sheet], &path).unwrap();

        let rows = read_sheet_rows(&path, None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], CellValue::Text("Banco".into()));
        assert_eq!(rows[1][1], CellValue::Number(1500.25));
    }

    #[test]
    fn named_sheet_selection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.xlsx");

        let first = sheet_from_text_rows("Primera", &[vec!["a".into()]]);
        let second = sheet_from_text_rows("Segunda", &[vec!["b".into()]]);
        write_workbook(&[first, second], &path).unwrap();

        let rows = read_sheet_rows(&path, Some("Segunda")).unwrap();
        assert_eq!(rows[0][0], CellValue::Text("b".into()));

        let err = read_sheet_rows(&path, Some("Tercera")).unwrap_err();
        assert!(err.contains("'Tercera'"));
    }

    #[test]
    fn forced_text_survives_as_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("text.xlsx");

        let mut sheet = SheetDoc::new("Nuevos Registros");
        sheet.rows.push(vec![styled(
            CellValue::Text("00123456".into()),
            CellStyle::TextForced,
        )]);
        write_workbook(&[sheet], &path).unwrap();

        let rows = read_sheet_rows(&path, None).unwrap();
        assert_eq!(rows[0][0], CellValue::Text("00123456".into()));
    }

    #[test]
    fn blank_rows_are_skipped_on_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gaps.xlsx");

        let mut sheet = SheetDoc::new("S");
        sheet.rows.push(vec![styled(CellValue::Text("top".into()), CellStyle::Plain)]);
        sheet.rows.push(vec![styled(CellValue::Empty, CellStyle::Plain)]);
        sheet.rows.push(vec![styled(CellValue::Text("bottom".into()), CellStyle::Plain)]);
        write_workbook(&[sheet], &path).unwrap();

        let rows = read_sheet_rows(&path, None).unwrap();
        assert_eq!(rows.len(), 2);
    }
}
