//! Draft transaction state and auto-balancing.
//!
//! A [`TransactionDraft`] is what the user is editing before submission. Its
//! line items are kept consistent with the total: whenever the total, an item
//! amount or the number of items changes, the difference between the total
//! and the sum of the items is redistributed front to back, skipping the item
//! the user just typed into. Every mutation re-balances in the same call, so
//! there is no intermediate state where counts and amounts disagree.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, Item, ItemKind, Money, ResultEngine, datetime};

/// Account a new draft is booked on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountRef {
    pub id: i64,
    pub currency: Currency,
}

/// Serializing a draft snapshots it; deserializing restores it as is, with
/// no correction pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// `None` for a remote transaction, i.e. one between external agents.
    pub account_id: Option<i64>,
    /// Amounts are scaled by its decimals; switch it with
    /// [`set_currency`](Self::set_currency) once amounts are set.
    pub currency: Option<Currency>,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub is_expense: bool,
    pub agent: String,
    pub comment: String,
    /// A single implicit flow of the whole total to `agent`; items are ignored.
    pub direct: bool,
    pub remote_agent: Option<String>,
    pub(crate) total: Option<Money>,
    pub(crate) items: Vec<Item>,
    #[serde(skip)]
    pub(crate) last_updated: Option<usize>,
}

impl TransactionDraft {
    /// Creates an empty draft issued at `now`.
    ///
    /// With an account, its currency is preselected. Without one the draft is
    /// a remote transaction and starts with an empty remote agent.
    #[must_use]
    pub fn new(account: Option<&AccountRef>, now: NaiveDateTime) -> Self {
        Self {
            account_id: account.map(|acc| acc.id),
            currency: account.map(|acc| acc.currency.clone()),
            date: now.date(),
            time: Some(datetime::to_minutes(now.time())),
            is_expense: true,
            agent: String::new(),
            comment: String::new(),
            direct: false,
            remote_agent: if account.is_some() {
                None
            } else {
                Some(String::new())
            },
            total: None,
            items: Vec::new(),
            last_updated: None,
        }
    }

    #[must_use]
    pub fn total(&self) -> Option<Money> {
        self.total
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Index of the item excluded from the next correction pass.
    #[must_use]
    pub fn last_updated(&self) -> Option<usize> {
        self.last_updated
    }

    /// Fraction digits of the draft currency.
    #[must_use]
    pub fn decimals(&self) -> u8 {
        self.currency
            .as_ref()
            .map_or(Currency::DEFAULT_DECIMALS, |c| c.decimals)
    }

    /// Switches the currency and rescales the total and every item amount
    /// so they keep their value in major units.
    pub fn set_currency(&mut self, currency: Option<Currency>) {
        let from = self.decimals();
        self.currency = currency;
        let to = self.decimals();
        if from == to {
            return;
        }

        self.total = self.total.map(|total| total.rescale(from, to));
        for item in &mut self.items {
            item.amount = item.amount.map(|amount| amount.rescale(from, to));
        }
        tracing::debug!(from, to, "rescaled draft amounts");
        self.last_updated = None;
        self.auto_balance();
    }

    /// Sum of all item amounts, blanks counted as zero.
    #[must_use]
    pub fn items_sum(&self) -> Money {
        self.items.iter().map(Item::amount_or_zero).sum()
    }

    /// Sets the transaction total and spreads the difference over all items.
    pub fn set_total(&mut self, total: Option<Money>) {
        self.total = total;
        self.last_updated = None;
        self.auto_balance();
    }

    /// Sets one item's amount and lets the other items absorb the difference.
    pub fn set_item_amount(&mut self, index: usize, amount: Option<Money>) -> ResultEngine<()> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(EngineError::ItemIndex { index, len })?;
        item.amount = amount;
        self.last_updated = Some(index);
        self.auto_balance();
        Ok(())
    }

    /// Appends an item and re-balances.
    pub fn push_item(&mut self, item: Item) {
        self.items.push(item);
        self.last_updated = None;
        self.auto_balance();
    }

    /// Removes an item and re-balances.
    pub fn remove_item(&mut self, index: usize) -> ResultEngine<Item> {
        if index >= self.items.len() {
            return Err(EngineError::ItemIndex {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        self.last_updated = None;
        self.auto_balance();
        Ok(removed)
    }

    /// Drops every item, e.g. before replacing the whole split.
    pub fn clear_items(&mut self) {
        self.items.clear();
        self.last_updated = None;
    }

    /// Renames the counterparty of a flow item.
    pub fn set_item_agent(&mut self, index: usize, name: impl Into<String>) -> ResultEngine<()> {
        match &mut self.item_mut(index)?.kind {
            ItemKind::Flow { agent } => {
                *agent = name.into();
                Ok(())
            }
            ItemKind::Record { .. } => Err(EngineError::ItemKind {
                index,
                expected: "flow",
            }),
        }
    }

    /// Changes the category of a record item.
    pub fn set_item_category(&mut self, index: usize, id: Option<i64>) -> ResultEngine<()> {
        match &mut self.item_mut(index)?.kind {
            ItemKind::Record { category_id } => {
                *category_id = id;
                Ok(())
            }
            ItemKind::Flow { .. } => Err(EngineError::ItemKind {
                index,
                expected: "record",
            }),
        }
    }

    fn item_mut(&mut self, index: usize) -> ResultEngine<&mut Item> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(EngineError::ItemIndex { index, len })
    }

    /// Distributes `total - sum(items)` over the items in order.
    ///
    /// The item at `last_updated` is never touched and no correction takes an
    /// item below zero, so a deficit that cannot be absorbed stays visible to
    /// validation. `last_updated` is cleared afterwards.
    pub fn auto_balance(&mut self) {
        let skip = self.last_updated.take();
        let Some(total) = self.total else {
            return;
        };
        if self.items.is_empty() {
            return;
        }

        let mut to_correct = total - self.items_sum();
        tracing::trace!(
            total = total.minor(),
            to_correct = to_correct.minor(),
            ?skip,
            "auto-balancing items"
        );

        for (i, item) in self.items.iter_mut().enumerate() {
            if to_correct.is_zero() {
                break;
            }
            if Some(i) == skip {
                continue;
            }
            let current = item.amount_or_zero();
            let correction = (-current).max(to_correct);
            item.amount = Some(current + correction);
            to_correct -= correction;
        }

        if !to_correct.is_zero() {
            tracing::debug!(
                remaining = to_correct.minor(),
                "items cannot absorb the whole difference"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 3, 4)
            .unwrap()
            .and_hms_opt(12, 30, 45)
            .unwrap()
    }

    fn draft_with(items: Vec<Item>) -> TransactionDraft {
        let mut draft = TransactionDraft::new(None, now());
        draft.items = items;
        draft
    }

    fn amounts(draft: &TransactionDraft) -> Vec<Option<i64>> {
        draft
            .items()
            .iter()
            .map(|item| item.amount.map(Money::minor))
            .collect()
    }

    #[test]
    fn new_draft_without_account_is_remote() {
        let draft = TransactionDraft::new(None, now());
        assert_eq!(draft.account_id, None);
        assert_eq!(draft.remote_agent.as_deref(), Some(""));
        assert!(draft.is_expense);
        assert_eq!(draft.time, NaiveTime::from_hms_opt(12, 30, 0));
    }

    #[test]
    fn new_draft_with_account_preselects_currency() {
        let account = AccountRef {
            id: 3,
            currency: Currency::new(1, "EUR", 2),
        };
        let draft = TransactionDraft::new(Some(&account), now());
        assert_eq!(draft.account_id, Some(3));
        assert_eq!(draft.currency.as_ref().map(|c| c.id), Some(1));
        assert_eq!(draft.remote_agent, None);
    }

    #[test]
    fn set_total_fills_first_item() {
        let mut draft = draft_with(vec![Item::record(Some(1), None), Item::flow("Bob", None)]);
        draft.set_total(Some(Money::new(100)));
        assert_eq!(amounts(&draft), vec![Some(100), None]);
    }

    #[test]
    fn editing_an_item_moves_the_rest_to_the_others() {
        let mut draft = draft_with(vec![Item::record(Some(1), None), Item::flow("Bob", None)]);
        draft.set_total(Some(Money::new(100)));
        draft.set_item_amount(0, Some(Money::new(60))).unwrap();
        assert_eq!(amounts(&draft), vec![Some(60), Some(40)]);
        assert_eq!(draft.last_updated(), None);
    }

    #[test]
    fn lowering_the_total_drains_items_front_to_back() {
        let mut draft = draft_with(vec![
            Item::record(Some(1), Some(Money::new(30))),
            Item::record(Some(2), Some(Money::new(70))),
        ]);
        draft.set_total(Some(Money::new(50)));
        assert_eq!(amounts(&draft), vec![Some(0), Some(50)]);
    }

    #[test]
    fn unabsorbable_deficit_is_left_over() {
        let mut draft = draft_with(vec![
            Item::record(Some(1), Some(Money::new(30))),
            Item::record(Some(2), Some(Money::new(70))),
        ]);
        draft.set_total(Some(Money::new(100)));
        draft.set_item_amount(1, Some(Money::new(200))).unwrap();
        assert_eq!(amounts(&draft), vec![Some(0), Some(200)]);
        assert_eq!(draft.items_sum(), Money::new(200));
    }

    #[test]
    fn blank_total_skips_balancing() {
        let mut draft = draft_with(vec![Item::record(Some(1), Some(Money::new(5)))]);
        draft.set_total(None);
        assert_eq!(amounts(&draft), vec![Some(5)]);
    }

    #[test]
    fn push_and_remove_rebalance() {
        let mut draft = draft_with(vec![]);
        draft.set_total(Some(Money::new(100)));
        draft.push_item(Item::record(Some(1), None));
        assert_eq!(amounts(&draft), vec![Some(100)]);

        draft.push_item(Item::flow("Bob", Some(Money::new(25))));
        assert_eq!(amounts(&draft), vec![Some(75), Some(25)]);

        let removed = draft.remove_item(0).unwrap();
        assert!(removed.is_record());
        assert_eq!(amounts(&draft), vec![Some(100)]);
    }

    #[test]
    fn out_of_bounds_edits_are_rejected() {
        let mut draft = draft_with(vec![Item::flow("Bob", None)]);
        assert_eq!(
            draft.set_item_amount(3, Some(Money::new(1))),
            Err(EngineError::ItemIndex { index: 3, len: 1 })
        );
        assert!(draft.remove_item(1).is_err());
        assert_eq!(draft.items().len(), 1);
    }

    #[test]
    fn item_field_edits_check_the_variant() {
        let mut draft = draft_with(vec![Item::flow("Bob", None), Item::record(None, None)]);
        draft.set_item_agent(0, "Alice").unwrap();
        draft.set_item_category(1, Some(9)).unwrap();
        assert_eq!(
            draft.items()[0].kind,
            ItemKind::Flow {
                agent: "Alice".to_string()
            }
        );
        assert!(matches!(
            draft.set_item_agent(1, "x"),
            Err(EngineError::ItemKind { index: 1, .. })
        ));
        assert!(matches!(
            draft.set_item_category(0, Some(1)),
            Err(EngineError::ItemKind { index: 0, .. })
        ));
    }

    #[test]
    fn currency_switch_keeps_major_values() {
        let mut draft = draft_with(vec![Item::record(Some(1), None), Item::flow("Bob", None)]);
        draft.currency = Some(Currency::new(1, "EUR", 2));
        draft.set_total(Some(Money::new(10_050)));
        draft.set_item_amount(1, Some(Money::new(2_525))).unwrap();

        draft.set_currency(Some(Currency::new(2, "JPY", 0)));
        assert_eq!(draft.total(), Some(Money::new(101)));
        assert_eq!(amounts(&draft), vec![Some(76), Some(25)]);
        assert_eq!(draft.items_sum(), Money::new(101));

        draft.set_currency(Some(Currency::new(3, "BHD", 3)));
        assert_eq!(draft.total(), Some(Money::new(101_000)));
        assert_eq!(amounts(&draft), vec![Some(76_000), Some(25_000)]);
    }

    #[test]
    fn extreme_amounts_saturate_instead_of_overflowing() {
        let mut draft = draft_with(vec![Item::record(Some(1), Some(Money::new(-1)))]);
        draft.set_total(Some(Money::new(i64::MAX)));
        draft.push_item(Item::record(Some(2), Some(Money::new(i64::MIN))));
        draft.set_item_amount(0, Some(Money::new(i64::MAX))).unwrap();

        assert_eq!(draft.items()[0].amount, Some(Money::new(i64::MAX)));
        assert!(!draft.validate().is_empty());
    }
}
