use std::fmt;
use std::time::Duration;

use libreg_types::{BookName, BookView, Condition, Identity};
use serde::{Deserialize, Serialize};

use crate::error::GateError;

// ---------------------------------------------------------------------------
// Operation / Proposal
// ---------------------------------------------------------------------------

/// A mutating registry operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Operation {
    /// Flip the librarian flag of `target`.
    ToggleLibrarian { target: Identity },
    /// Register `name` if absent, remove it if present.
    ToggleBook { name: BookName },
    /// Hand `name` to `new_owner`, recording `new_condition`.
    TransferCustody {
        name: BookName,
        new_owner: Identity,
        new_condition: Condition,
    },
}

impl Operation {
    /// Short kebab-case label, used in logs and receipts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ToggleLibrarian { .. } => "toggle-librarian",
            Self::ToggleBook { .. } => "toggle-book",
            Self::TransferCustody { .. } => "transfer-custody",
        }
    }

    /// The book this operation touches, if any.
    pub fn book(&self) -> Option<&BookName> {
        match self {
            Self::ToggleLibrarian { .. } => None,
            Self::ToggleBook { name } | Self::TransferCustody { name, .. } => Some(name),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToggleLibrarian { target } => write!(f, "toggle-librarian {target}"),
            Self::ToggleBook { name } => write!(f, "toggle-book '{name}'"),
            Self::TransferCustody {
                name,
                new_owner,
                new_condition,
            } => write!(f, "transfer '{name}' -> {new_owner} ({new_condition})"),
        }
    }
}

/// An operation together with the identity requesting it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Who is asking.
    pub caller: Identity,
    /// What they are asking for.
    pub operation: Operation,
}

impl Proposal {
    pub fn new(caller: Identity, operation: Operation) -> Self {
        Self { caller, operation }
    }
}

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// Why a proposal was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionKind {
    /// The caller lacks the required role or ownership.
    Unauthorized,
    /// The referenced book is not currently registered.
    NotFound,
    /// The requested condition conflicts with the book's current condition.
    StateConsistency,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not-found"),
            Self::StateConsistency => write!(f, "state-consistency"),
        }
    }
}

/// The outcome of a single gate stage evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// The stage passed; proceed to the next stage.
    Pass,
    /// The stage failed; the proposal must be rejected.
    Fail { kind: RejectionKind, reason: String },
}

impl StageDecision {
    /// Shorthand for a `Fail` decision.
    pub fn fail(kind: RejectionKind, reason: impl Into<String>) -> Self {
        Self::Fail {
            kind,
            reason: reason.into(),
        }
    }

    /// Returns `true` if the decision is `Pass`.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns `true` if the decision is `Fail`.
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }
}

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Recorded result from a completed stage evaluation.
#[derive(Clone, Debug)]
pub struct StageResult {
    /// Name of the stage that produced this result.
    pub stage_name: String,
    /// Whether the stage passed.
    pub passed: bool,
    /// Populated on failure.
    pub reason: Option<String>,
    /// Wall-clock time the stage took to evaluate.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// GateContext
// ---------------------------------------------------------------------------

/// Registry state visible to every gate stage.
///
/// The engine builds a fresh context for each proposal from its own tables,
/// so stages never touch the registries directly.
#[derive(Clone, Debug)]
pub struct GateContext {
    /// Whether the caller currently holds the librarian role.
    pub caller_is_librarian: bool,
    /// The book the operation touches, if it currently exists.
    pub book: Option<BookView>,
    /// Results from stages that have already run in this evaluation.
    pub previous_stages: Vec<StageResult>,
}

impl GateContext {
    pub fn new(caller_is_librarian: bool, book: Option<BookView>) -> Self {
        Self {
            caller_is_librarian,
            book,
            previous_stages: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// GateStage trait
// ---------------------------------------------------------------------------

/// A single evaluation stage in the gate pipeline.
///
/// Stages are evaluated in order. Each stage receives the proposal and the
/// shared context, and returns a pass/fail decision. Stages that do not care
/// about an operation simply pass it.
///
/// The trait is object-safe and `Send + Sync` so stages can be stored in
/// a `Vec<Box<dyn GateStage>>`.
pub trait GateStage: Send + Sync {
    /// Human-readable name of this stage (e.g. "role", "custody").
    fn name(&self) -> &str;

    /// Evaluate the proposal and return a decision.
    fn evaluate(
        &self,
        proposal: &Proposal,
        context: &GateContext,
    ) -> Result<StageDecision, GateError>;
}
