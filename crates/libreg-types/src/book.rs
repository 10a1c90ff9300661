//! Book keys and book condition.
//!
//! Any string is a valid book name. Names are compared exactly: "Clifford"
//! and "clifford" are different books.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// A book title, used as the key of the book registry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookName(String);

impl BookName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The title as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BookName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for BookName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<BookName> for String {
    fn from(name: BookName) -> Self {
        name.0
    }
}

impl Borrow<str> for BookName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BookName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BookName({:?})", self.0)
    }
}

impl fmt::Display for BookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Physical condition of a book.
///
/// Maps onto a single flag: `true` is [`Condition::Good`], `false` is
/// [`Condition::Damaged`]. There are no intermediate states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Good and available for lending. New books start here.
    #[default]
    Good,
    /// Damaged or otherwise unavailable.
    Damaged,
}

impl Condition {
    /// Returns `true` for [`Condition::Good`].
    pub fn is_good(self) -> bool {
        matches!(self, Self::Good)
    }

    /// Whether a custody transfer may move a book from `self` to `next`.
    ///
    /// A condition can always be kept or downgraded. The only forbidden move
    /// is declaring a damaged book good.
    pub fn permits_transition_to(self, next: Condition) -> bool {
        !matches!((self, next), (Self::Damaged, Self::Good))
    }
}

impl From<bool> for Condition {
    fn from(good: bool) -> Self {
        if good {
            Self::Good
        } else {
            Self::Damaged
        }
    }
}

impl From<Condition> for bool {
    fn from(condition: Condition) -> Self {
        condition.is_good()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Damaged => write!(f, "damaged"),
        }
    }
}

/// Read-only snapshot of an existing book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookView {
    pub name: BookName,
    /// Current custodian.
    pub owner: Identity,
    pub condition: Condition,
}
