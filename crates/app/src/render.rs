use engine::{
    FieldError, FieldPath, Item, ItemField, ItemKind, Money, TransactionDraft, ValidationErrors,
    datetime,
};

fn amount(draft: &TransactionDraft, value: Option<Money>) -> String {
    match (value, &draft.currency) {
        (None, _) => "-".to_string(),
        (Some(value), Some(currency)) => currency.format(value),
        (Some(value), None) => value.format_major(draft.decimals(), true),
    }
}

fn item_line(draft: &TransactionDraft, index: usize, item: &Item) -> String {
    let label = match &item.kind {
        ItemKind::Record {
            category_id: Some(id),
        } => format!("category {id}"),
        ItemKind::Record { category_id: None } => "category ?".to_string(),
        ItemKind::Flow { agent } if agent.is_empty() => "agent ?".to_string(),
        ItemKind::Flow { agent } => agent.clone(),
    };
    format!(
        "  {index:>2} {:<6} {label:<24} {:>14}",
        item.kind.as_str(),
        amount(draft, item.amount)
    )
}

/// Human-readable summary of a draft, one line per row.
pub fn draft_lines(draft: &TransactionDraft) -> Vec<String> {
    let mut lines = Vec::new();

    let account = match (draft.account_id, &draft.remote_agent) {
        (Some(id), _) => format!("account {id}"),
        (None, Some(remote)) if !remote.is_empty() => format!("remote, from {remote}"),
        (None, _) => "remote".to_string(),
    };
    let time = draft
        .time
        .map_or_else(|| "--:--".to_string(), datetime::format_time);
    lines.push(format!("{account} | {} {time}", draft.date));

    let direction = if draft.is_expense { "expense to" } else { "income from" };
    let agent = if draft.agent.is_empty() { "?" } else { draft.agent.as_str() };
    let currency = draft
        .currency
        .as_ref()
        .map_or_else(|| "?".to_string(), ToString::to_string);
    lines.push(format!(
        "{direction} {agent}: {} {currency}",
        amount(draft, draft.total())
    ));

    if draft.direct {
        lines.push("direct".to_string());
    } else {
        for (index, item) in draft.items().iter().enumerate() {
            lines.push(item_line(draft, index, item));
        }
    }

    if !draft.comment.is_empty() {
        lines.push(format!("comment: {}", draft.comment));
    }
    lines
}

fn is_amount(path: FieldPath) -> bool {
    matches!(
        path,
        FieldPath::Total
            | FieldPath::Item {
                field: ItemField::Amount,
                ..
            }
    )
}

/// One `path: message` line per invalid field. Missing or zero amounts get
/// the currency's input hint appended.
pub fn validation_lines(draft: &TransactionDraft, errors: &ValidationErrors) -> Vec<String> {
    errors
        .iter()
        .map(|(path, err)| {
            let hint = draft.currency.as_ref().filter(|_| {
                is_amount(path) && matches!(err, FieldError::EnterAmount | FieldError::ZeroAmount)
            });
            match hint {
                Some(currency) => format!(
                    "{path}: {err} ({}, min {})",
                    currency.input_hint(true),
                    currency.format(currency.step())
                ),
                None => format!("{path}: {err}"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use engine::Currency;

    use super::*;

    fn draft() -> TransactionDraft {
        let now = NaiveDate::from_ymd_opt(2023, 3, 4)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let mut draft = TransactionDraft::new(None, now);
        draft.currency = Some(Currency::new(1, "EUR", 2));
        draft.agent = "Market".to_string();
        draft.remote_agent = Some("Bob".to_string());
        draft
    }

    #[test]
    fn summary_lists_items_with_amounts() {
        let mut draft = draft();
        draft.push_item(Item::record(Some(2), None));
        draft.push_item(Item::flow("Ann", None));
        draft.set_total(Some(Money::new(123_450)));

        let lines = draft_lines(&draft);
        assert_eq!(lines[0], "remote, from Bob | 2023-03-04 09:05");
        assert_eq!(lines[1], "expense to Market: 1,234.50 EUR");
        assert!(lines[2].contains("record"));
        assert!(lines[2].contains("category 2"));
        assert!(lines[2].ends_with("1,234.50"));
        assert!(lines[3].contains("Ann"));
        assert!(lines[3].ends_with('-'));
    }

    #[test]
    fn direct_summary_hides_items() {
        let mut draft = draft();
        draft.direct = true;
        draft.is_expense = false;
        draft.comment = "refund".to_string();
        draft.push_item(Item::record(Some(2), None));

        let lines = draft_lines(&draft);
        assert_eq!(lines[1], "income from Market: - EUR");
        assert_eq!(lines[2], "direct");
        assert_eq!(lines[3], "comment: refund");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn validation_lines_name_field_paths() {
        let mut draft = draft();
        draft.push_item(Item::record(None, None));
        draft.agent.clear();

        let errors = draft.validate();
        assert_eq!(
            errors.get(FieldPath::item(0, ItemField::CategoryId)),
            Some(FieldError::SelectCategory)
        );
        let lines = validation_lines(&draft, &errors);
        assert!(lines.contains(&"agent: at least one character".to_string()));
        let hint = "(positive, up to 2 decimals, min 0.01)";
        assert!(lines.contains(&format!("amount: enter amount {hint}")));
        assert!(lines.contains(&"items.0.category_id: select category".to_string()));
        assert!(lines.contains(&format!("items.0.amount: enter amount {hint}")));

        draft.currency = None;
        let lines = validation_lines(&draft, &draft.validate());
        assert!(lines.contains(&"amount: enter amount".to_string()));
    }
}
