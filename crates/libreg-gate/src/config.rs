use serde::{Deserialize, Serialize};

/// Who may register or remove books.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationPolicy {
    /// Any caller may toggle a book.
    #[default]
    Open,
    /// Only librarians may toggle a book.
    LibrarianOnly,
}

/// Configuration for the authorization gate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Policy applied to book registration and removal.
    pub book_registration: RegistrationPolicy,
    /// When `true`, a librarian may transfer custody of a book they do not
    /// own. The condition rule still applies.
    pub librarian_override: bool,
}

impl GateConfig {
    /// The strictest configuration: librarian-only registration, no override.
    pub fn strict() -> Self {
        Self {
            book_registration: RegistrationPolicy::LibrarianOnly,
            librarian_override: false,
        }
    }
}
