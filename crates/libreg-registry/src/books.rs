//! The book table.

use std::collections::HashMap;

use libreg_types::{BookName, BookView, Condition, Identity};

use crate::error::{LibraryError, Result};

/// Stored state for a book name.
///
/// Removal only clears `exists`. The stale `owner` and `condition` stay in
/// the table but are never reported while `exists` is false.
#[derive(Clone, Debug)]
struct BookRecord {
    owner: Identity,
    condition: Condition,
    exists: bool,
}

/// Book name -> custody record.
#[derive(Clone, Debug, Default)]
pub struct BookRegistry {
    records: HashMap<BookName, BookRecord>,
}

impl BookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self, name: &str) -> Option<&BookRecord> {
        self.records.get(name).filter(|record| record.exists)
    }

    /// Whether `name` is currently registered.
    pub fn is_valid_book(&self, name: &str) -> bool {
        self.live(name).is_some()
    }

    /// Current custodian of `name`.
    pub fn owner_of(&self, name: &str) -> Result<Identity> {
        self.live(name)
            .map(|record| record.owner.clone())
            .ok_or_else(|| LibraryError::NotFound(name.to_string()))
    }

    /// Current condition of `name`.
    pub fn condition_of(&self, name: &str) -> Result<Condition> {
        self.live(name)
            .map(|record| record.condition)
            .ok_or_else(|| LibraryError::NotFound(name.to_string()))
    }

    /// Snapshot of `name`, or `None` if it is not registered.
    pub fn view(&self, name: &str) -> Option<BookView> {
        self.records
            .get_key_value(name)
            .filter(|(_, record)| record.exists)
            .map(|(key, record)| BookView {
                name: key.clone(),
                owner: record.owner.clone(),
                condition: record.condition,
            })
    }

    /// Snapshots of every registered book, sorted by name.
    pub fn views(&self) -> Vec<BookView> {
        let mut out: Vec<BookView> = self
            .records
            .keys()
            .filter_map(|name| self.view(name.as_str()))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Create (or resurrect) `name` in good condition, held by `owner`.
    pub(crate) fn register(&mut self, name: BookName, owner: Identity) {
        self.records.insert(
            name,
            BookRecord {
                owner,
                condition: Condition::Good,
                exists: true,
            },
        );
    }

    pub(crate) fn remove(&mut self, name: &str) {
        if let Some(record) = self.records.get_mut(name) {
            record.exists = false;
        }
    }

    pub(crate) fn set_custody(&mut self, name: &str, owner: Identity, condition: Condition) {
        if let Some(record) = self.records.get_mut(name).filter(|r| r.exists) {
            record.owner = owner;
            record.condition = condition;
        }
    }
}
