//! Calculator and vault session orchestration
//!
//! Ties the pure calculator state machines to the SQLite store: a
//! [`CalculatorSession`] handles keypad input and covert PIN entry, and a
//! successful entry trades its [`calcvault_core::VaultUnlock`] for a
//! [`VaultSession`] over the encrypted file store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod calculator;
pub mod error;
pub mod mirror;
pub mod vault;

use calcvault_storage_sqlite::Database;
use std::sync::Arc;

pub use calculator::{CalculatorSession, Key, KeyEvent, KeyPress};
pub use error::{Error, Result};
pub use mirror::{merge_remote_history, JsonMirror, NoopMirror, RemoteMirror};
pub use vault::VaultSession;

/// Handle to the vault database, shareable between sessions.
pub type SharedDb = Arc<parking_lot::Mutex<Database>>;

/// Wrap an opened database for shared use.
pub fn shared(db: Database) -> SharedDb {
    Arc::new(parking_lot::Mutex::new(db))
}
