//! Librarian and book registries for the library registry.
//!
//! A [`Library`] owns two tables (who is a librarian, and which books exist
//! and who holds them) and guards every change with the
//! [`libreg_gate::AuthorizationGate`]. Operations are evaluated one at a
//! time: each call validates fully against the current tables and then
//! either commits or returns an error having changed nothing.
//!
//! # Modules
//!
//! - [`librarians`] — [`LibrarianRegistry`], identity -> librarian flag
//! - [`books`] — [`BookRegistry`], book name -> owner and condition
//! - [`library`] — [`Library`], the custody engine
//! - [`journal`] — [`Journal`], hash-chained receipts of committed changes
//! - [`error`] — [`LibraryError`]
//!
//! # Example
//!
//! ```rust
//! use libreg_registry::Library;
//! use libreg_types::{BookName, Condition, Identity};
//!
//! let head = Identity::from_label("head-librarian");
//! let reader = Identity::from_label("reader");
//! let mut library = Library::genesis(head.clone());
//!
//! let title = BookName::new("Clifford");
//! library.toggle_book(&title, &head).unwrap();
//! library.transfer_custody(&title, &reader, Condition::Good, &head).unwrap();
//! assert_eq!(library.owner_of("Clifford").unwrap(), reader);
//! ```

pub mod books;
pub mod error;
pub mod journal;
pub mod librarians;
pub mod library;

pub use books::BookRegistry;
pub use error::{LibraryError, Result};
pub use journal::{Journal, LibraryEvent, Receipt};
pub use librarians::LibrarianRegistry;
pub use library::{BookToggle, Library};
