//! Authorization gate pipeline for the library registry.
//!
//! Every mutating registry operation is wrapped in a [`Proposal`] and must
//! pass through the gate before it is applied. The gate runs a fail-fast
//! pipeline of stages (existence, role, custody, condition) over a
//! [`GateContext`] snapshot and produces an accept/reject verdict with a
//! per-stage audit trail.
//!
//! # Quick Start
//!
//! ```rust
//! use libreg_gate::{AuthorizationGate, GateConfig, GateContext, Operation, Proposal};
//! use libreg_types::Identity;
//!
//! let gate = AuthorizationGate::with_default_stages(GateConfig::default());
//! let head = Identity::from_label("head-librarian");
//! let proposal = Proposal::new(
//!     head.clone(),
//!     Operation::ToggleLibrarian { target: Identity::from_label("assistant") },
//! );
//! let result = gate.evaluate(&proposal, GateContext::new(true, None)).unwrap();
//! assert!(result.is_accepted());
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod stage;
pub mod stages;

// Re-exports for convenience.
pub use config::{GateConfig, RegistrationPolicy};
pub use error::GateError;
pub use gate::{AuthorizationGate, GateResult, Verdict};
pub use stage::{
    GateContext, GateStage, Operation, Proposal, RejectionKind, StageDecision, StageResult,
};
pub use stages::{ConditionStage, CustodyStage, ExistenceStage, RoleStage};
