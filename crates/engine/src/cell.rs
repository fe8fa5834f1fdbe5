use chrono::NaiveDate;

/// A single typed cell. Raw input cells arrive as text or as
/// library-provided primitives; every cell is coerced into exactly one
/// of these tags at the ingestion boundary, so business logic never has
/// to re-check what a value "really" is.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// String-coerced view, used for partition keys, business keys and
    /// exact-match rule comparisons. Whole numbers render without a
    /// decimal point so `4000427.0` still matches the literal "4000427".
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Date(d) => format_dmy(*d),
        }
    }

    /// Numeric view after cleaning, `None` when the cell is not a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => clean_number(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

/// Coercion kind declared per column by a report profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoerceKind {
    Date,
    Number,
    Text,
}

/// Coerce a raw cell under the declared kind. Never fails: a value that
/// cannot be coerced keeps (or falls back to) the text tag.
pub fn coerce(value: CellValue, kind: CoerceKind) -> CellValue {
    match kind {
        CoerceKind::Date => match value {
            CellValue::Date(_) => value,
            // Workbook readers hand dates over as day serials.
            CellValue::Number(n) => match serial_to_date(n) {
                Some(d) => CellValue::Date(d),
                None => value,
            },
            CellValue::Text(ref s) => match parse_date(s) {
                Some(d) => CellValue::Date(d),
                None => value,
            },
            CellValue::Empty => CellValue::Empty,
        },
        CoerceKind::Number => match value {
            CellValue::Number(_) => value,
            CellValue::Text(ref s) => match clean_number(s) {
                Some(n) => CellValue::Number(n),
                None => value,
            },
            _ => value,
        },
        CoerceKind::Text => match value {
            CellValue::Text(s) => CellValue::Text(s.trim().to_string()),
            CellValue::Empty => CellValue::Empty,
            other => CellValue::Text(other.as_text()),
        },
    }
}

/// Parse a free-text amount, stripping thousands separators and currency
/// markers. Returns `None` (not NaN) when nothing numeric remains.
pub fn clean_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Accepted free-text date shapes. Day-first formats win ties because
/// the source reports are day-first.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d/%m/%y"];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Day/month/year, zero-padded.
pub fn format_dmy(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Epoch day zero of the 1900 date system: 1899-12-30. Serial 1 is
/// 1899-12-31 under this epoch; real-world report dates are all far
/// past the 1900-02-29 discontinuity, which we do not model.
fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("fixed epoch date")
}

/// Calendar date to spreadsheet day-count serial.
pub fn date_to_serial(date: NaiveDate) -> f64 {
    (date - epoch()).num_days() as f64
}

/// Day-count serial back to a calendar date. Fractional time-of-day is
/// dropped; out-of-range serials return `None`.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    epoch().checked_add_days(chrono::Days::new(serial.floor() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_number_strips_separators_and_currency() {
        assert_eq!(clean_number("1,234.56"), Some(1234.56));
        assert_eq!(clean_number("$2,500.00"), Some(2500.0));
        assert_eq!(clean_number("S/ 150.75"), Some(150.75));
        assert_eq!(clean_number("-42"), Some(-42.0));
    }

    #[test]
    fn clean_number_rejects_non_numeric() {
        assert_eq!(clean_number(""), None);
        assert_eq!(clean_number("N/A"), None);
        assert_eq!(clean_number("PEN"), None);
    }

    #[test]
    fn coerce_number_falls_back_to_text() {
        let out = coerce(CellValue::Text("pendiente".into()), CoerceKind::Number);
        assert_eq!(out, CellValue::Text("pendiente".into()));
    }

    #[test]
    fn coerce_date_parses_day_first() {
        let out = coerce(CellValue::Text("05/03/2024".into()), CoerceKind::Date);
        assert_eq!(
            out,
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
    }

    #[test]
    fn coerce_date_keeps_unparseable_text() {
        let out = coerce(CellValue::Text("sin fecha".into()), CoerceKind::Date);
        assert_eq!(out, CellValue::Text("sin fecha".into()));
    }

    #[test]
    fn coerce_text_preserves_leading_zeros() {
        let out = coerce(CellValue::Text(" 00123456 ".into()), CoerceKind::Text);
        assert_eq!(out, CellValue::Text("00123456".into()));
    }

    #[test]
    fn serial_round_trip_known_values() {
        // 1900 date system reference points, past the fake leap day.
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date_to_serial(d), 45292.0);
        assert_eq!(serial_to_date(45292.0), Some(d));

        let d = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(date_to_serial(d), 36526.0);
    }

    #[test]
    fn serial_out_of_range() {
        assert_eq!(serial_to_date(0.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn whole_number_text_has_no_decimal_point() {
        assert_eq!(CellValue::Number(4000427.0).as_text(), "4000427");
        assert_eq!(CellValue::Number(0.5).as_text(), "0.5");
    }
}
