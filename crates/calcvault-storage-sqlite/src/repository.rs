//! Data access layer

use crate::{models::*, Database, Error, Result};
use calcvault_core::{apply, hash_pin};
use rusqlite::{params, OptionalExtension};

/// Config key holding the SHA-256 hex digest of the PIN.
const CONFIG_PIN_HASH: &str = "pin_hash";
/// Config key holding the hex-encoded encrypted canary.
const CONFIG_CANARY: &str = "vault_canary";

/// Known plaintext the canary row must decrypt to. A PIN that fails this
/// check must never drive a corpus re-key: XOR with the wrong key would
/// silently destroy every file.
const CANARY_PLAINTEXT: &[u8] = b"calcvault-canary-v1";

/// Repository for database operations
pub struct Repository<'a> {
    db: &'a Database,
}

impl<'a> Repository<'a> {
    /// Create repository
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // ---- config ----

    fn get_config(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .conn()
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.db.conn().execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Stored PIN digest, if a PIN has been set up.
    pub fn pin_hash(&self) -> Result<Option<String>> {
        self.get_config(CONFIG_PIN_HASH)
    }

    /// True until the first PIN has been configured.
    pub fn is_first_run(&self) -> Result<bool> {
        Ok(self.pin_hash()?.is_none())
    }

    /// Store the PIN digest and seed the re-key canary under the same PIN.
    pub fn set_pin(&self, pin: &str) -> Result<()> {
        self.set_config(CONFIG_PIN_HASH, &hash_pin(pin))?;
        self.set_config(CONFIG_CANARY, &hex::encode(apply(CANARY_PLAINTEXT, pin)))?;
        Ok(())
    }

    /// Check that `pin` decrypts the stored canary to its known plaintext.
    /// False when no canary has been seeded.
    pub fn verify_canary(&self, pin: &str) -> Result<bool> {
        let Some(stored) = self.get_config(CONFIG_CANARY)? else {
            return Ok(false);
        };
        let ciphertext = hex::decode(&stored)
            .map_err(|e| Error::Corrupt(format!("canary is not valid hex: {e}")))?;
        Ok(apply(&ciphertext, pin) == CANARY_PLAINTEXT)
    }

    // ---- vault files ----

    /// Store an encrypted file, returning its id.
    pub fn insert_file(&self, file: &NewVaultFile) -> Result<i64> {
        self.db.conn().execute(
            "INSERT INTO vault_files (file_name, file_type, file_size, date_added, file_data)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                file.file_name,
                file.file_type,
                file.file_size,
                now_timestamp(),
                file.data
            ],
        )?;
        Ok(self.db.conn().last_insert_rowid())
    }

    /// All vault files, newest first, without their payloads.
    pub fn list_files(&self) -> Result<Vec<VaultFileSummary>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, file_name, file_type, file_size, date_added
             FROM vault_files ORDER BY date_added DESC, id DESC",
        )?;
        let files = stmt
            .query_map([], |row| {
                Ok(VaultFileSummary {
                    id: row.get(0)?,
                    file_name: row.get(1)?,
                    file_type: row.get(2)?,
                    file_size: row.get(3)?,
                    date_added: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(files)
    }

    /// One vault file with its encrypted payload.
    pub fn get_file(&self, id: i64) -> Result<VaultFile> {
        self.db
            .conn()
            .query_row(
                "SELECT id, file_name, file_type, file_size, date_added, file_data
                 FROM vault_files WHERE id = ?1",
                [id],
                |row| {
                    Ok(VaultFile {
                        id: row.get(0)?,
                        file_name: row.get(1)?,
                        file_type: row.get(2)?,
                        file_size: row.get(3)?,
                        date_added: row.get(4)?,
                        data: row.get(5)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("vault file {id}")))
    }

    /// Delete a vault file. Returns false when no such row existed.
    pub fn delete_file(&self, id: i64) -> Result<bool> {
        let rows = self
            .db
            .conn()
            .execute("DELETE FROM vault_files WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Number of files in the vault.
    pub fn file_count(&self) -> Result<i64> {
        let count = self
            .db
            .conn()
            .query_row("SELECT COUNT(*) FROM vault_files", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Re-encrypt every vault file from `old_pin` to `new_pin`, update the
    /// canary and the stored digest, all in one transaction. The canary is
    /// checked against `old_pin` first; on any failure nothing changes.
    pub fn rekey_vault(&self, old_pin: &str, new_pin: &str) -> Result<()> {
        let conn = self.db.conn();
        conn.execute_batch("BEGIN IMMEDIATE")?;

        let result = (|| -> Result<usize> {
            if !self.verify_canary(old_pin)? {
                return Err(Error::ReKey(
                    "old PIN does not match the stored canary".to_string(),
                ));
            }

            let mut stmt = conn.prepare("SELECT id, file_data FROM vault_files")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let count = rows.len();
            for (id, data) in rows {
                let rekeyed = apply(&apply(&data, old_pin), new_pin);
                conn.execute(
                    "UPDATE vault_files SET file_data = ?1 WHERE id = ?2",
                    params![rekeyed, id],
                )?;
            }

            self.set_pin(new_pin)?;
            Ok(count)
        })();

        match result {
            Ok(count) => {
                conn.execute_batch("COMMIT")?;
                tracing::info!("Re-keyed {} vault files", count);
                Ok(())
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                tracing::warn!("Vault re-key aborted: {}", e);
                Err(e)
            }
        }
    }

    // ---- calculation history ----

    /// Record a calculation with the current local time.
    pub fn insert_calculation(&self, expression: &str, result: &str) -> Result<i64> {
        self.insert_calculation_at(expression, result, &now_timestamp())
    }

    /// Record a calculation with an explicit timestamp (used when merging
    /// mirrored history).
    pub fn insert_calculation_at(
        &self,
        expression: &str,
        result: &str,
        timestamp: &str,
    ) -> Result<i64> {
        self.db.conn().execute(
            "INSERT INTO calculation_history (expression, result, timestamp)
             VALUES (?1, ?2, ?3)",
            params![expression, result, timestamp],
        )?;
        Ok(self.db.conn().last_insert_rowid())
    }

    /// History lines, newest first.
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.db.conn().prepare(
            "SELECT id, expression, result, timestamp
             FROM calculation_history ORDER BY timestamp DESC, id DESC",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(HistoryEntry {
                    id: row.get(0)?,
                    expression: row.get(1)?,
                    result: row.get(2)?,
                    timestamp: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// One history line by id.
    pub fn get_calculation(&self, id: i64) -> Result<HistoryEntry> {
        self.db
            .conn()
            .query_row(
                "SELECT id, expression, result, timestamp
                 FROM calculation_history WHERE id = ?1",
                [id],
                |row| {
                    Ok(HistoryEntry {
                        id: row.get(0)?,
                        expression: row.get(1)?,
                        result: row.get(2)?,
                        timestamp: row.get(3)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("history entry {id}")))
    }

    /// True when an identical history line already exists.
    pub fn calculation_exists(
        &self,
        expression: &str,
        result: &str,
        timestamp: &str,
    ) -> Result<bool> {
        let exists = self.db.conn().query_row(
            "SELECT EXISTS(
                SELECT 1 FROM calculation_history
                WHERE expression = ?1 AND result = ?2 AND timestamp = ?3
             )",
            params![expression, result, timestamp],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Delete one history line. Returns false when no such row existed.
    pub fn delete_calculation(&self, id: i64) -> Result<bool> {
        let rows = self
            .db
            .conn()
            .execute("DELETE FROM calculation_history WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Delete all history, returning how many lines were removed.
    pub fn clear_history(&self) -> Result<usize> {
        let rows = self
            .db
            .conn()
            .execute("DELETE FROM calculation_history", [])?;
        Ok(rows)
    }
}
