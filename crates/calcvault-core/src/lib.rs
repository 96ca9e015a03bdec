//! CalcVault calculator core
//!
//! This crate implements the calculator engine that fronts the hidden vault:
//! the incremental expression editor, the two-stack infix evaluator, the
//! covert PIN trigger, and the vault stream cipher. Everything here is pure,
//! single-threaded and I/O-free; storage and presentation live elsewhere.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cipher;
pub mod editor;
pub mod error;
pub mod evaluator;
pub mod pin_guard;

pub use cipher::{apply, hash_pin, is_valid_pin, verify_pin, PIN_LENGTH};
pub use editor::{BinOp, Calculation, ExpressionEditor, LastToken, Token, UnaryFunc};
pub use error::{Error, Result};
pub use evaluator::{evaluate, format_result};
pub use pin_guard::{PinGuard, VaultUnlock};
