use crate::error::EngineError;

/// Column layout of a manual journal line, matching the upload template
/// the accounting system expects.
pub const JOURNAL_HEADERS: [&str; 15] = [
    "FCODE",
    "CTA",
    "SECTOR",
    "CODE ACTIVITY",
    "CECOS",
    "CL",
    "LOCALIDAD",
    "INTERCOMPANY",
    "PROJECT",
    "STATUTORY",
    "RESERVED 1",
    "RESERVED 2",
    "DEBE",
    "HABER",
    "GLOSA",
];

const FCODE: &str = "F391501";

/// Ledger side an account takes on a posted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingSide {
    Debit,
    Credit,
}

/// Account pair a template posts against: the income account and its
/// liability/deferred counterpart, plus the side the income account
/// takes when the entry is posted. Each template family has its own
/// polarity: deferring pulls revenue out of income, recognizing books
/// it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalTemplate {
    pub income_account: &'static str,
    pub liability_account: &'static str,
    pub income_side: PostingSide,
}

/// Deferred-revenue entries: income 4000411 debited against deferred
/// 3500600.
pub const DEFERRAL_TEMPLATE: JournalTemplate = JournalTemplate {
    income_account: "4000411",
    liability_account: "3500600",
    income_side: PostingSide::Debit,
};

/// Income-recognition entries: income 4000415 credited against
/// liability 1651111.
pub const RECOGNITION_TEMPLATE: JournalTemplate = JournalTemplate {
    income_account: "4000415",
    liability_account: "1651111",
    income_side: PostingSide::Credit,
};

/// Whether the entry posts the movement or reverses a prior posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDirection {
    Post,
    Reverse,
}

/// One requested movement. Classification fields apply to the income
/// line only; the liability line always carries zero-filled fillers.
#[derive(Debug, Clone)]
pub struct JournalRequest {
    pub sector: String,
    pub code_activity: String,
    pub cost_center: String,
    pub location: String,
    pub amount: f64,
    pub memo: String,
}

impl JournalRequest {
    fn sector_or_default(&self) -> &str {
        if self.sector.trim().is_empty() { "90" } else { self.sector.trim() }
    }
    fn code_activity_or_default(&self) -> &str {
        if self.code_activity.trim().is_empty() { "9053" } else { self.code_activity.trim() }
    }
    fn cost_center_or_default(&self) -> &str {
        if self.cost_center.trim().is_empty() { "9115" } else { self.cost_center.trim() }
    }
    fn location_or_default(&self) -> &str {
        if self.location.trim().is_empty() { "024" } else { self.location.trim() }
    }
}

/// Build one balanced two-line entry. The debit line is emitted first,
/// accounting-ledger style. The amount must be a positive number.
pub fn build_entry(
    template: JournalTemplate,
    direction: EntryDirection,
    request: &JournalRequest,
) -> Result<Vec<Vec<String>>, EngineError> {
    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(EngineError::ConfigValidation(
            "journal amount must be a positive number".into(),
        ));
    }
    let amount = format!("{:.2}", request.amount.abs());

    // The template fixes the income side on posting; reversing swaps it.
    let income_is_debit = match direction {
        EntryDirection::Post => template.income_side == PostingSide::Debit,
        EntryDirection::Reverse => template.income_side == PostingSide::Credit,
    };

    let income_line = line(
        template.income_account,
        request.sector_or_default(),
        request.code_activity_or_default(),
        request.cost_center_or_default(),
        request.location_or_default(),
        if income_is_debit { &amount } else { "0" },
        if income_is_debit { "0" } else { &amount },
        &request.memo,
    );
    let liability_line = line(
        template.liability_account,
        "000",
        "000000",
        "0000",
        "000",
        if income_is_debit { "0" } else { &amount },
        if income_is_debit { &amount } else { "0" },
        &request.memo,
    );

    Ok(if income_is_debit {
        vec![income_line, liability_line]
    } else {
        vec![liability_line, income_line]
    })
}

#[allow(clippy::too_many_arguments)]
fn line(
    account: &str,
    sector: &str,
    code_activity: &str,
    cost_center: &str,
    location: &str,
    debit: &str,
    credit: &str,
    memo: &str,
) -> Vec<String> {
    vec![
        FCODE.to_string(),
        account.to_string(),
        sector.to_string(),
        code_activity.to_string(),
        cost_center.to_string(),
        "00".to_string(),
        location.to_string(),
        "0000000".to_string(),
        "00000000".to_string(),
        "B".to_string(),
        "000000".to_string(),
        "000000".to_string(),
        debit.to_string(),
        credit.to_string(),
        memo.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: f64) -> JournalRequest {
        JournalRequest {
            sector: "90".into(),
            code_activity: "9053".into(),
            cost_center: "9115".into(),
            location: "024".into(),
            amount,
            memo: "ingresos no identificados".into(),
        }
    }

    #[test]
    fn post_puts_liability_debit_first() {
        let lines = build_entry(RECOGNITION_TEMPLATE, EntryDirection::Post, &request(150.0)).unwrap();
        assert_eq!(lines.len(), 2);
        // Debit line first: liability debited on posting.
        assert_eq!(lines[0][1], "1651111");
        assert_eq!(lines[0][12], "150.00");
        assert_eq!(lines[0][13], "0");
        // Income credited.
        assert_eq!(lines[1][1], "4000415");
        assert_eq!(lines[1][12], "0");
        assert_eq!(lines[1][13], "150.00");
    }

    #[test]
    fn reverse_puts_income_debit_first() {
        let lines =
            build_entry(RECOGNITION_TEMPLATE, EntryDirection::Reverse, &request(99.9)).unwrap();
        assert_eq!(lines[0][1], "4000415");
        assert_eq!(lines[0][12], "99.90");
        assert_eq!(lines[1][1], "1651111");
        assert_eq!(lines[1][13], "99.90");
    }

    #[test]
    fn posting_the_deferral_debits_income() {
        let lines = build_entry(DEFERRAL_TEMPLATE, EntryDirection::Post, &request(10.0)).unwrap();
        // Deferring pulls revenue out of income: 4000411 debited first,
        // the deferred account 3500600 credited.
        assert_eq!(lines[0][1], "4000411");
        assert_eq!(lines[0][12], "10.00");
        assert_eq!(lines[0][13], "0");
        assert_eq!(lines[1][1], "3500600");
        assert_eq!(lines[1][12], "0");
        assert_eq!(lines[1][13], "10.00");
    }

    #[test]
    fn reversing_the_deferral_credits_income() {
        let lines =
            build_entry(DEFERRAL_TEMPLATE, EntryDirection::Reverse, &request(10.0)).unwrap();
        assert_eq!(lines[0][1], "3500600");
        assert_eq!(lines[0][12], "10.00");
        assert_eq!(lines[1][1], "4000411");
        assert_eq!(lines[1][13], "10.00");
    }

    #[test]
    fn liability_line_carries_zero_fillers() {
        let lines = build_entry(RECOGNITION_TEMPLATE, EntryDirection::Post, &request(1.0)).unwrap();
        let liability = &lines[0];
        assert_eq!(liability[2], "000");
        assert_eq!(liability[3], "000000");
        assert_eq!(liability[4], "0000");
        assert_eq!(liability[6], "000");
    }

    #[test]
    fn blank_classification_fields_use_defaults() {
        let mut req = request(5.0);
        req.sector = "  ".into();
        req.cost_center = String::new();
        let lines = build_entry(RECOGNITION_TEMPLATE, EntryDirection::Post, &req).unwrap();
        let income = &lines[1];
        assert_eq!(income[2], "90");
        assert_eq!(income[4], "9115");
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        assert!(build_entry(RECOGNITION_TEMPLATE, EntryDirection::Post, &request(0.0)).is_err());
        assert!(build_entry(RECOGNITION_TEMPLATE, EntryDirection::Post, &request(-5.0)).is_err());
        assert!(build_entry(RECOGNITION_TEMPLATE, EntryDirection::Post, &request(f64::NAN)).is_err());
    }
}
