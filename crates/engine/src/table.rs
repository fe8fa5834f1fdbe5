use crate::cell::CellValue;
use crate::error::EngineError;

/// Header row + ordered data rows. Data rows align to the header by
/// position but may be shorter (missing trailing cells); consumers must
/// guard with `row.len() > index` rather than assuming full width.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    /// Parse tab-delimited text with row 0 as the header.
    pub fn from_delimited_text(content: &str) -> Result<Self, EngineError> {
        Self::from_sheet_rows(parse_delimited_rows(content)?)
    }

    /// Header-less view over tab-delimited text. Some report dumps carry
    /// a multi-row preamble instead of a header, so the caller decides
    /// what row 0 means.
    pub fn rows_from_delimited_text(content: &str) -> Result<Vec<Vec<CellValue>>, EngineError> {
        parse_delimited_rows(content)
    }

    /// Build from workbook rows (array-of-arrays with header-inclusive
    /// row 0), as handed over by the workbook-reader collaborator.
    pub fn from_sheet_rows(all_rows: Vec<Vec<CellValue>>) -> Result<Self, EngineError> {
        let mut iter = all_rows.into_iter();
        let headers: Vec<String> = match iter.next() {
            Some(row) => row.iter().map(CellValue::as_text).collect(),
            None => return Err(EngineError::EmptyInput),
        };
        Ok(Self {
            headers,
            rows: iter.collect(),
        })
    }

    /// Every row rendered as text, header first. Used where the original
    /// input must be re-emitted untouched.
    pub fn to_text_rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(self.headers.clone());
        for row in &self.rows {
            out.push(row.iter().map(CellValue::as_text).collect());
        }
        out
    }
}

/// Split on newline, trim each line, drop empty lines, split remaining
/// lines on the tab character. No quoting or escaping — a tab inside a
/// field is not representable in this format.
fn parse_delimited_rows(content: &str) -> Result<Vec<Vec<CellValue>>, EngineError> {
    let rows: Vec<Vec<CellValue>> = content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split('\t').map(CellValue::from).collect())
        .collect();
    if rows.is_empty() {
        return Err(EngineError::EmptyInput);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tab_delimited() {
        let table = Table::from_delimited_text("A\tB\tC\nx\ty\tz\n1\t2\t3\n").unwrap();
        assert_eq!(table.headers, vec!["A", "B", "C"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], CellValue::Text("y".into()));
    }

    #[test]
    fn blank_and_whitespace_lines_are_dropped() {
        let table = Table::from_delimited_text("A\tB\n\n  \r\nx\ty\n\n").unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn crlf_line_endings() {
        let table = Table::from_delimited_text("A\tB\r\nx\ty\r\n").unwrap();
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.rows[0][0], CellValue::Text("x".into()));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            Table::from_delimited_text("\n  \n"),
            Err(EngineError::EmptyInput)
        ));
    }

    #[test]
    fn ragged_rows_are_kept_short() {
        let table = Table::from_delimited_text("A\tB\tC\nx\n").unwrap();
        assert_eq!(table.rows[0].len(), 1);
    }

    #[test]
    fn sheet_rows_header_split() {
        let table = Table::from_sheet_rows(vec![
            vec![CellValue::Text("H".into())],
            vec![CellValue::Number(1.0)],
        ])
        .unwrap();
        assert_eq!(table.headers, vec!["H"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn sheet_rows_empty_is_an_error() {
        assert!(matches!(
            Table::from_sheet_rows(vec![]),
            Err(EngineError::EmptyInput)
        ));
    }
}
