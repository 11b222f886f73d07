use std::collections::BTreeMap;

use serde_json::Value;

/// Server-side collections the client reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Transactions,
    Accounts,
    Changes,
    Currencies,
}

impl Collection {
    /// Collections a transaction add/edit can change on the server.
    pub const MUTATED_BY_TRANSACTIONS: [Self; 3] =
        [Self::Transactions, Self::Accounts, Self::Changes];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryKey {
    pub collection: Collection,
    pub id: Option<i64>,
}

impl QueryKey {
    pub const fn all(collection: Collection) -> Self {
        Self {
            collection,
            id: None,
        }
    }

    pub const fn one(collection: Collection, id: i64) -> Self {
        Self {
            collection,
            id: Some(id),
        }
    }
}

#[derive(Debug)]
struct Entry {
    value: Value,
    stale: bool,
}

/// Responses keyed by `(collection, id)`; stale entries are kept but never
/// served, the next fetch overwrites them.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: BTreeMap<QueryKey, Entry>,
}

impl QueryCache {
    pub fn get(&self, key: QueryKey) -> Option<&Value> {
        self.entries
            .get(&key)
            .filter(|entry| !entry.stale)
            .map(|entry| &entry.value)
    }

    pub fn insert(&mut self, key: QueryKey, value: Value) {
        self.entries.insert(key, Entry { value, stale: false });
    }

    /// Marks every key of `collection` stale and returns how many were fresh.
    pub fn invalidate(&mut self, collection: Collection) -> usize {
        let mut count = 0;
        for (_, entry) in self
            .entries
            .iter_mut()
            .filter(|(key, _)| key.collection == collection)
        {
            if !entry.stale {
                entry.stale = true;
                count += 1;
            }
        }
        count
    }

    pub fn invalidate_after_mutation(&mut self) -> usize {
        let count = Collection::MUTATED_BY_TRANSACTIONS
            .into_iter()
            .map(|collection| self.invalidate(collection))
            .sum();
        tracing::debug!(count, "invalidated cached queries");
        count
    }
}
