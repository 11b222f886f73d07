//! Transaction line items.
//!
//! An [`Item`] splits part of a transaction's total either to a counterparty
//! ([`ItemKind::Flow`]) or to a category ([`ItemKind::Record`]).

use serde::{Deserialize, Serialize};

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    /// Money moved to/from a named agent.
    Flow { agent: String },
    /// Money allocated to a category, unset until the user picks one.
    Record { category_id: Option<i64> },
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flow { .. } => "flow",
            Self::Record { .. } => "record",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// `None` while the amount input is blank.
    pub amount: Option<Money>,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    #[must_use]
    pub fn flow(agent: impl Into<String>, amount: Option<Money>) -> Self {
        Self {
            amount,
            kind: ItemKind::Flow {
                agent: agent.into(),
            },
        }
    }

    #[must_use]
    pub fn record(category_id: Option<i64>, amount: Option<Money>) -> Self {
        Self {
            amount,
            kind: ItemKind::Record { category_id },
        }
    }

    /// Amount with blanks counted as zero.
    #[must_use]
    pub fn amount_or_zero(&self) -> Money {
        self.amount.unwrap_or(Money::ZERO)
    }

    #[must_use]
    pub fn is_flow(&self) -> bool {
        matches!(self.kind, ItemKind::Flow { .. })
    }

    #[must_use]
    pub fn is_record(&self) -> bool {
        matches!(self.kind, ItemKind::Record { .. })
    }
}
