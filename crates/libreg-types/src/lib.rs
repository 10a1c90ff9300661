//! Foundation types for the library registry.
//!
//! Every other libreg crate depends on `libreg-types`. The types here carry
//! no registry state; they only describe *who* is calling and *what* is
//! being tracked.
//!
//! # Key Types
//!
//! - [`Identity`] — Opaque caller token derived from [`IdentityMaterial`] with BLAKE3
//! - [`BookName`] — Book title used as the registry key
//! - [`Condition`] — Binary book condition (good or damaged)
//! - [`BookView`] — Snapshot of an existing book (name, owner, condition)

pub mod book;
pub mod error;
pub mod identity;

pub use book::{BookName, BookView, Condition};
pub use error::TypeError;
pub use identity::{Identity, IdentityMaterial};
