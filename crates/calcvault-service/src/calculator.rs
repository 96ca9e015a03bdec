//! Calculator session
//!
//! Drives the expression editor from keypad input while the PIN observer
//! watches the digit stream. To anyone using it this is a calculator; the
//! only difference is that `press` can return a vault unlock.

use crate::{mirror::RemoteMirror, Error, Result, SharedDb};
use calcvault_core::{
    editor::Backspace, hash_pin, is_valid_pin, BinOp, ExpressionEditor, PinGuard, VaultUnlock,
};
use calcvault_storage_sqlite::{HistoryEntry, Repository};

/// One keypad key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A digit key, 0 through 9.
    Digit(u8),
    /// The `00` key.
    DoubleZero,
    /// The decimal point.
    Dot,
    /// A binary operator key.
    Op(BinOp),
    /// Square root.
    Sqrt,
    /// Square.
    Square,
    /// Percent.
    Percent,
    /// Sign toggle.
    ToggleSign,
    /// Opening parenthesis.
    OpenParen,
    /// Closing parenthesis.
    CloseParen,
    /// Backspace.
    Backspace,
    /// Clear all.
    Clear,
    /// Equals.
    Equals,
}

/// What a key press produced beyond the updated display.
#[derive(Debug)]
pub enum KeyEvent {
    /// Nothing beyond the display update.
    None,
    /// Equals completed a calculation; it has been written to history.
    Evaluated(HistoryEntry),
    /// The digit stream matched the stored PIN.
    VaultUnlocked(VaultUnlock),
}

/// Result of one key press.
#[derive(Debug)]
pub struct KeyPress {
    /// The display line after the press.
    pub display: String,
    /// Side effect of the press, if any.
    pub event: KeyEvent,
}

/// A live calculator bound to the vault database.
pub struct CalculatorSession {
    db: SharedDb,
    editor: ExpressionEditor,
    guard: PinGuard,
    mirror: Option<Box<dyn RemoteMirror>>,
}

impl CalculatorSession {
    /// Start a session, arming the PIN observer with the stored digest if
    /// one exists.
    pub fn new(db: SharedDb) -> Result<Self> {
        let stored_hash = {
            let guard = db.lock();
            Repository::new(&guard).pin_hash()?
        };
        Ok(Self {
            db,
            editor: ExpressionEditor::new(),
            guard: PinGuard::new(stored_hash),
            mirror: None,
        })
    }

    /// True until a PIN has been configured.
    pub fn is_first_run(&self) -> Result<bool> {
        let db = self.db.lock();
        Ok(Repository::new(&db).is_first_run()?)
    }

    /// Configure the PIN for the first time (or reset it before any files
    /// exist). Rejects anything but exactly five digits.
    pub fn setup_pin(&mut self, pin: &str) -> Result<()> {
        if !is_valid_pin(pin) {
            return Err(Error::InvalidPin(
                "PIN must be exactly five digits".to_string(),
            ));
        }
        {
            let db = self.db.lock();
            Repository::new(&db).set_pin(pin)?;
        }
        self.guard.set_stored_hash(Some(hash_pin(pin)));
        tracing::info!("PIN configured");
        Ok(())
    }

    /// Re-read the stored digest, after a PIN change made through a vault
    /// session.
    pub fn refresh_pin_hash(&mut self) -> Result<()> {
        let stored_hash = {
            let db = self.db.lock();
            Repository::new(&db).pin_hash()?
        };
        self.guard.set_stored_hash(stored_hash);
        Ok(())
    }

    /// Attach a remote history mirror. Pushes are best effort and never
    /// fail a key press.
    pub fn set_mirror(&mut self, mirror: Box<dyn RemoteMirror>) {
        self.mirror = Some(mirror);
    }

    /// The display line as it currently reads.
    pub fn display(&self) -> String {
        self.editor.display_text()
    }

    /// Call when the calculator returns to the foreground: a partial PIN
    /// entry never survives leaving the screen.
    pub fn on_resume(&mut self) {
        self.guard.on_interruption();
    }

    /// Handle one key press.
    pub fn press(&mut self, key: Key) -> Result<KeyPress> {
        let mut event = KeyEvent::None;
        match key {
            Key::Digit(d) => {
                debug_assert!(d <= 9);
                let c = char::from(b'0' + d);
                // A suppressed digit never reaches the observer.
                if self.editor.digit(c) {
                    if let Some(unlock) = self.guard.on_digit(c) {
                        event = KeyEvent::VaultUnlocked(unlock);
                    }
                }
            }
            Key::DoubleZero => {
                if self.editor.double_zero() {
                    if let Some(unlock) = self.guard.on_digits("00") {
                        event = KeyEvent::VaultUnlocked(unlock);
                    }
                }
            }
            Key::Dot => {
                // A rejected point leaves the observer untouched.
                if self.editor.dot() {
                    self.guard.on_interruption();
                }
            }
            Key::Op(op) => {
                self.guard.on_interruption();
                self.editor.operator(op);
            }
            Key::Sqrt => {
                self.guard.on_interruption();
                self.editor.sqrt()?;
            }
            Key::Square => {
                self.guard.on_interruption();
                self.editor.square()?;
            }
            Key::Percent => {
                self.guard.on_interruption();
                self.editor.percent()?;
            }
            Key::ToggleSign => {
                self.guard.on_interruption();
                self.editor.toggle_sign();
            }
            Key::OpenParen => {
                self.guard.on_interruption();
                self.editor.open_paren();
            }
            Key::CloseParen => {
                self.guard.on_interruption();
                self.editor.close_paren();
            }
            Key::Backspace => {
                if self.editor.backspace() == Backspace::RemovedDigit {
                    self.guard.on_backspace_digit();
                }
            }
            Key::Clear => {
                self.guard.on_interruption();
                self.editor.clear();
            }
            Key::Equals => {
                self.guard.on_interruption();
                if let Some(calc) = self.editor.equals()? {
                    event = KeyEvent::Evaluated(self.record(calc.expression, calc.result)?);
                }
            }
        }
        Ok(KeyPress {
            display: self.editor.display_text(),
            event,
        })
    }

    fn record(&self, expression: String, result: String) -> Result<HistoryEntry> {
        let entry = {
            let db = self.db.lock();
            let repo = Repository::new(&db);
            let id = repo.insert_calculation(&expression, &result)?;
            repo.get_calculation(id)?
        };
        if let Some(mirror) = &self.mirror {
            if let Err(e) = mirror.push_calculation(&entry) {
                tracing::warn!("History mirror push failed: {}", e);
            }
        }
        Ok(entry)
    }

    /// History lines, newest first.
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        let db = self.db.lock();
        Ok(Repository::new(&db).history()?)
    }

    /// Delete one history line.
    pub fn delete_history(&self, id: i64) -> Result<bool> {
        let db = self.db.lock();
        Ok(Repository::new(&db).delete_calculation(id)?)
    }

    /// Delete all history, returning how many lines were removed.
    pub fn clear_history(&self) -> Result<usize> {
        let db = self.db.lock();
        Ok(Repository::new(&db).clear_history()?)
    }

    /// History as a JSON document, newest first.
    pub fn export_history_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.history()?)?)
    }
}
