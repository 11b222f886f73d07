//! Transaction split engine.
//!
//! The engine holds a [`TransactionDraft`]: the total of a transaction and
//! the line items ([`Item`]) it is split into, either flows to counterparties
//! or records against categories. It keeps item amounts consistent with the
//! total while the user edits them, validates the draft field by field and
//! converts it from/to the backend's wire types.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use engine::{Currency, Item, Money, TransactionDraft};
//!
//! let now = NaiveDate::from_ymd_opt(2023, 3, 4).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let mut draft = TransactionDraft::new(None, now);
//! draft.currency = Some(Currency::new(1, "EUR", 2));
//! draft.agent = "Market".to_string();
//! draft.push_item(Item::record(Some(1), None));
//! draft.push_item(Item::flow("Bob", None));
//!
//! draft.set_total(Some(Money::new(100_00)));
//! draft.set_item_amount(0, Some(Money::new(60_00))).unwrap();
//!
//! assert_eq!(draft.items()[1].amount, Some(Money::new(40_00)));
//! assert!(draft.validate().is_empty());
//! ```

pub use currency::Currency;
pub use draft::{AccountRef, TransactionDraft};
pub use error::EngineError;
pub use items::{Item, ItemKind};
pub use money::Money;
pub use persisted::UNSET_CATEGORY;
pub use validation::{FieldError, FieldPath, ItemField, ValidationErrors};

pub mod datetime;

mod currency;
mod draft;
mod error;
mod items;
mod money;
mod persisted;
mod validation;

pub type ResultEngine<T> = Result<T, EngineError>;
