use crate::error::EngineError;

/// Position of a named column, matching on trimmed header text.
pub fn column_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Hard precondition for the key-join: the reference file must carry
/// exactly the expected header sequence, positionally. Reports the first
/// mismatch with a 1-indexed column number, the way operators count.
pub fn validate_headers(found: &[String], expected: &[&str]) -> Result<(), EngineError> {
    if found.len() != expected.len() {
        return Err(EngineError::ColumnCountMismatch {
            expected: expected.len(),
            found: found.len(),
        });
    }
    for (i, (f, e)) in found.iter().zip(expected.iter()).enumerate() {
        if f != e {
            return Err(EngineError::StructureMismatch {
                position: i + 1,
                expected: (*e).to_string(),
                found: f.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn column_index_trims_header_text() {
        assert_eq!(column_index(&headers(&[" Moneda ", "X"]), "Moneda"), Some(0));
        assert_eq!(column_index(&headers(&["A"]), "B"), None);
    }

    #[test]
    fn validate_reports_first_mismatch_one_indexed() {
        let err = validate_headers(&headers(&["A", "B"]), &["A", "C"]).unwrap_err();
        match err {
            EngineError::StructureMismatch {
                position,
                expected,
                found,
            } => {
                assert_eq!(position, 2);
                assert_eq!(expected, "C");
                assert_eq!(found, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validate_rejects_wrong_column_count() {
        let err = validate_headers(&headers(&["A"]), &["A", "B"]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ColumnCountMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn validate_accepts_exact_match() {
        assert!(validate_headers(&headers(&["A", "B"]), &["A", "B"]).is_ok());
    }
}
