//! Append-only journal of committed registry changes.
//!
//! Every accepted operation produces exactly one [`Receipt`]. Receipts are
//! numbered from 1 and hash-chained: each receipt's hash covers its content
//! and the previous receipt's hash, so [`Journal::verify`] can detect gaps,
//! reordering, and edits. Rejected operations never reach the journal.

use libreg_types::{BookName, Condition, Identity};
use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};

const RECEIPT_DOMAIN: &[u8] = b"libreg-receipt-v1:";

/// A committed registry change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum LibraryEvent {
    LibrarianToggled {
        target: Identity,
        is_librarian: bool,
    },
    BookRegistered {
        name: BookName,
        owner: Identity,
    },
    BookRemoved {
        name: BookName,
    },
    CustodyTransferred {
        name: BookName,
        from: Identity,
        to: Identity,
        condition: Condition,
    },
}

/// One journal entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// 1-based, gap-free sequence number.
    pub seq: u64,
    /// Who requested the change.
    pub caller: Identity,
    pub event: LibraryEvent,
    pub prev_hash: Option<[u8; 32]>,
    pub hash: [u8; 32],
}

impl Receipt {
    /// Short hex form of the receipt hash.
    pub fn short_hash(&self) -> String {
        hex::encode(&self.hash[..4])
    }
}

#[derive(Serialize)]
struct ReceiptBody<'a> {
    seq: u64,
    caller: &'a Identity,
    event: &'a LibraryEvent,
    prev_hash: Option<[u8; 32]>,
}

fn receipt_hash(
    seq: u64,
    caller: &Identity,
    event: &LibraryEvent,
    prev_hash: Option<[u8; 32]>,
) -> Result<[u8; 32]> {
    let body = ReceiptBody {
        seq,
        caller,
        event,
        prev_hash,
    };
    let bytes =
        serde_json::to_vec(&body).map_err(|e| LibraryError::Serialization(e.to_string()))?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(RECEIPT_DOMAIN);
    hasher.update(&bytes);
    Ok(*hasher.finalize().as_bytes())
}

/// The receipt chain.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    receipts: Vec<Receipt>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build (but do not append) the next receipt.
    ///
    /// Split from [`Self::push`] so the engine can do all fallible work
    /// before it mutates any table.
    pub(crate) fn prepare(&self, caller: Identity, event: LibraryEvent) -> Result<Receipt> {
        let seq = self.receipts.len() as u64 + 1;
        let prev_hash = self.receipts.last().map(|r| r.hash);
        let hash = receipt_hash(seq, &caller, &event, prev_hash)?;
        Ok(Receipt {
            seq,
            caller,
            event,
            prev_hash,
            hash,
        })
    }

    pub(crate) fn push(&mut self, receipt: Receipt) {
        self.receipts.push(receipt);
    }

    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    /// The most recent receipt.
    pub fn head(&self) -> Option<&Receipt> {
        self.receipts.last()
    }

    /// Validate sequence numbering, hash links, and receipt hashes.
    pub fn verify(&self) -> Result<()> {
        let mut prev: Option<[u8; 32]> = None;
        for (index, receipt) in self.receipts.iter().enumerate() {
            let expected_seq = index as u64 + 1;
            if receipt.seq != expected_seq {
                return Err(violation(
                    receipt.seq,
                    format!("expected seq {expected_seq}, found {}", receipt.seq),
                ));
            }
            if receipt.prev_hash != prev {
                return Err(violation(receipt.seq, "previous hash link mismatch"));
            }
            let computed = receipt_hash(receipt.seq, &receipt.caller, &receipt.event, prev)?;
            if computed != receipt.hash {
                return Err(violation(receipt.seq, "receipt hash mismatch"));
            }
            prev = Some(receipt.hash);
        }
        Ok(())
    }
}

fn violation(seq: u64, reason: impl Into<String>) -> LibraryError {
    LibraryError::JournalIntegrity {
        seq,
        reason: reason.into(),
    }
}
