use crate::cell::CellValue;

/// Positional business rules applied to a reclassified report. Each pass
/// is independent and guarded by `row.len() > index`; short rows skip
/// the rule instead of erroring.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RuleSet {
    /// Exact-match value substitution in a fixed column.
    #[serde(default)]
    pub reclassify: Vec<Reclassify>,
    /// Literal code whose presence in a fixed column is counted.
    #[serde(default)]
    pub alert: Option<AlertRule>,
    /// Column whose numeric values are accumulated.
    #[serde(default)]
    pub sum: Option<SumRule>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Reclassify {
    pub column: usize,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct AlertRule {
    pub column: usize,
    pub code: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct SumRule {
    pub column: usize,
}

/// Accumulators produced by one rule run. Returned explicitly rather
/// than captured in enclosing scope so a run has no shared state.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct RuleOutcome {
    pub alert_count: usize,
    pub total_sum: f64,
}

impl RuleSet {
    /// Apply all passes over the row set, mutating rows in place
    /// (reclassification) and folding counters into the outcome.
    /// Non-numeric cells in the sum column are skipped, not zeroed.
    pub fn apply(&self, rows: &mut [Vec<CellValue>]) -> RuleOutcome {
        rows.iter_mut().fold(RuleOutcome::default(), |mut acc, row| {
            for rule in &self.reclassify {
                if row.len() > rule.column && row[rule.column].as_text() == rule.from {
                    row[rule.column] = CellValue::Text(rule.to.clone());
                }
            }
            if let Some(ref alert) = self.alert {
                if row.len() > alert.column && row[alert.column].as_text() == alert.code {
                    acc.alert_count += 1;
                }
            }
            if let Some(ref sum) = self.sum {
                if row.len() > sum.column {
                    if let Some(value) = row[sum.column].as_number() {
                        acc.total_sum += value;
                    }
                }
            }
            acc
        })
    }
}

/// Two decimals with thousands separators, for the status line
/// ("1234567.5" -> "1,234,567.50").
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let int_grouped: String = grouped.chars().rev().collect();
    format!("{}{int_grouped}.{frac_part}", if negative { "-" } else { "" })
}
