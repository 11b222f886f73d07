//! The module contains the errors the engine can return.
//!
//! Field-level validation problems are **not** errors: they are collected in
//! [`ValidationErrors`] so the caller can render them next to each input.
//! The variants here describe operations that cannot be carried out at all:
//!
//! - [`InvalidAmount`] when a user amount cannot be parsed.
//! - [`ItemIndex`] when an item operation targets a missing line item.
//! - [`ItemKind`] when a flow-only (or record-only) edit hits the other kind.
//! - [`InvalidTime`] when no timestamp can be built for the draft.
//! - [`InvalidDetail`] when a persisted transaction cannot be turned into a
//!   draft.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`ItemIndex`]: EngineError::ItemIndex
//!  [`ItemKind`]: EngineError::ItemKind
//!  [`InvalidTime`]: EngineError::InvalidTime
//!  [`InvalidDetail`]: EngineError::InvalidDetail
//!  [`ValidationErrors`]: crate::ValidationErrors
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Item {index} out of bounds ({len} items)")]
    ItemIndex { index: usize, len: usize },
    #[error("Item {index} is not a {expected}")]
    ItemKind { index: usize, expected: &'static str },
    #[error("Invalid time: {0}")]
    InvalidTime(String),
    #[error("Invalid transaction detail: {0}")]
    InvalidDetail(String),
}
