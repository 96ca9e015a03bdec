//! SQLite persistence for the calculator vault
//!
//! Stores the PIN digest, the encrypted vault files, and the calculation
//! history in one database. File payloads arrive and leave as ciphertext;
//! this crate never sees a plaintext secret other than during a re-key,
//! which runs under a canary check inside a single transaction.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod database;
pub mod error;
pub mod migrations;
pub mod models;
pub mod repository;

pub use database::Database;
pub use error::{Error, Result};
pub use models::{HistoryEntry, NewVaultFile, VaultFile, VaultFileSummary};
pub use repository::Repository;
