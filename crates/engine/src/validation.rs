//! Field-level validation of a draft.
//!
//! [`TransactionDraft::validate`] never fails: it returns every problem it
//! finds keyed by the field it belongs to, and an empty map means the draft
//! can be submitted.

use std::{collections::BTreeMap, fmt};

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{ItemKind, Money, TransactionDraft};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemField {
    Agent,
    CategoryId,
    Amount,
}

impl ItemField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::CategoryId => "category_id",
            Self::Amount => "amount",
        }
    }
}

/// Identity of a form field, rendered the way the form names its inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldPath {
    CurrencyId,
    Time,
    /// The transaction total (`amount` on the wire).
    Total,
    Agent,
    Direct,
    Item { index: usize, field: ItemField },
}

impl FieldPath {
    #[must_use]
    pub const fn item(index: usize, field: ItemField) -> Self {
        Self::Item { index, field }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrencyId => f.write_str("currency_id"),
            Self::Time => f.write_str("time"),
            Self::Total => f.write_str("amount"),
            Self::Agent => f.write_str("agent"),
            Self::Direct => f.write_str("direct"),
            Self::Item { index, field } => write!(f, "items.{index}.{}", field.as_str()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("choose currency")]
    ChooseCurrency,
    #[error("enter time")]
    EnterTime,
    #[error("enter amount")]
    EnterAmount,
    #[error("at least one character")]
    EmptyName,
    #[error("at least one record or flow")]
    NoItems,
    #[error("select category")]
    SelectCategory,
    #[error("duplicate agent")]
    DuplicateAgent,
    #[error("duplicate category")]
    DuplicateCategory,
    #[error("non-zero amount")]
    ZeroAmount,
    #[error("exceeds total")]
    ExceedsTotal,
    #[error("less than total")]
    LessThanTotal,
}

/// Validation result: at most one message per field, ordered by field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<FieldPath, FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, path: FieldPath) -> Option<FieldError> {
        self.0.get(&path).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldPath, FieldError)> + '_ {
        self.0.iter().map(|(path, err)| (*path, *err))
    }

    fn insert(&mut self, path: FieldPath, err: Option<FieldError>) {
        if let Some(err) = err {
            self.0.insert(path, err);
        }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (path, err) in &self.0 {
            map.serialize_entry(&path.to_string(), &err.to_string())?;
        }
        map.end()
    }
}

impl TransactionDraft {
    /// Checks every field and returns the messages to show.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        errors.insert(
            FieldPath::CurrencyId,
            self.currency.is_none().then_some(FieldError::ChooseCurrency),
        );
        errors.insert(
            FieldPath::Time,
            self.time.is_none().then_some(FieldError::EnterTime),
        );
        errors.insert(
            FieldPath::Total,
            self.total.is_none().then_some(FieldError::EnterAmount),
        );
        errors.insert(
            FieldPath::Agent,
            self.agent.is_empty().then_some(FieldError::EmptyName),
        );
        errors.insert(
            FieldPath::Direct,
            (!self.direct && self.items.is_empty()).then_some(FieldError::NoItems),
        );

        if self.direct {
            return errors;
        }

        for index in 0..self.items.len() {
            match &self.items[index].kind {
                ItemKind::Flow { agent } => errors.insert(
                    FieldPath::item(index, ItemField::Agent),
                    self.check_flow_agent(index, agent),
                ),
                ItemKind::Record { category_id } => errors.insert(
                    FieldPath::item(index, ItemField::CategoryId),
                    self.check_record_category(index, *category_id),
                ),
            }
            errors.insert(
                FieldPath::item(index, ItemField::Amount),
                self.check_item_amount(index),
            );
        }

        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "draft has validation errors");
        }
        errors
    }

    /// Only earlier items are scanned: the second of two duplicates is flagged.
    fn check_flow_agent(&self, index: usize, agent: &str) -> Option<FieldError> {
        if agent.is_empty() {
            return Some(FieldError::EmptyName);
        }
        self.items[..index]
            .iter()
            .any(|item| matches!(&item.kind, ItemKind::Flow { agent: other } if other == agent))
            .then_some(FieldError::DuplicateAgent)
    }

    fn check_record_category(&self, index: usize, category_id: Option<i64>) -> Option<FieldError> {
        let Some(id) = category_id else {
            return Some(FieldError::SelectCategory);
        };
        self.items[..index]
            .iter()
            .any(|item| {
                matches!(item.kind, ItemKind::Record { category_id: Some(other) } if other == id)
            })
            .then_some(FieldError::DuplicateCategory)
    }

    fn check_item_amount(&self, index: usize) -> Option<FieldError> {
        match self.items[index].amount {
            None => return Some(FieldError::EnterAmount),
            Some(amount) if amount.is_zero() => return Some(FieldError::ZeroAmount),
            Some(_) => {}
        }

        let total = self.total?;
        let running: Money = self.items[..=index].iter().map(|i| i.amount_or_zero()).sum();
        if running > total {
            return Some(FieldError::ExceedsTotal);
        }
        if index + 1 == self.items.len() && running < total {
            return Some(FieldError::LessThanTotal);
        }
        None
    }
}
