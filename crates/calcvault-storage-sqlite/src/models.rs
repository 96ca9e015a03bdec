//! Data models

use serde::{Deserialize, Serialize};

/// Timestamp format used for vault files and history rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in the stored timestamp format.
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A file stored in the vault, ciphertext included.
#[derive(Debug, Clone)]
pub struct VaultFile {
    /// Database id
    pub id: i64,
    /// Original file name
    pub file_name: String,
    /// MIME type (or best guess at import time)
    pub file_type: String,
    /// Plaintext size in bytes
    pub file_size: i64,
    /// When the file was added
    pub date_added: String,
    /// Encrypted file contents
    pub data: Vec<u8>,
}

/// Vault file metadata without the payload, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultFileSummary {
    /// Database id
    pub id: i64,
    /// Original file name
    pub file_name: String,
    /// MIME type
    pub file_type: String,
    /// Plaintext size in bytes
    pub file_size: i64,
    /// When the file was added
    pub date_added: String,
}

/// A file about to be stored (ciphertext already produced by the caller).
#[derive(Debug, Clone)]
pub struct NewVaultFile {
    /// Original file name
    pub file_name: String,
    /// MIME type
    pub file_type: String,
    /// Plaintext size in bytes
    pub file_size: i64,
    /// Encrypted file contents
    pub data: Vec<u8>,
}

/// One line of calculator history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Database id
    pub id: i64,
    /// The expression as displayed (markers stripped)
    pub expression: String,
    /// The formatted result
    pub result: String,
    /// When the calculation happened
    pub timestamp: String,
}
