use crate::config::RegistrationPolicy;
use crate::error::GateError;
use crate::stage::{GateContext, GateStage, Operation, Proposal, RejectionKind, StageDecision};

/// Librarian role stage.
///
/// Only librarians may promote or demote librarians. Book registration is
/// role-gated only under [`RegistrationPolicy::LibrarianOnly`].
pub struct RoleStage {
    registration: RegistrationPolicy,
}

impl RoleStage {
    pub fn new(registration: RegistrationPolicy) -> Self {
        Self { registration }
    }
}

impl GateStage for RoleStage {
    fn name(&self) -> &str {
        "role"
    }

    fn evaluate(
        &self,
        proposal: &Proposal,
        context: &GateContext,
    ) -> Result<StageDecision, GateError> {
        if context.caller_is_librarian {
            return Ok(StageDecision::Pass);
        }

        match &proposal.operation {
            Operation::ToggleLibrarian { .. } => Ok(StageDecision::fail(
                RejectionKind::Unauthorized,
                format!("{} is not a librarian", proposal.caller),
            )),
            Operation::ToggleBook { name }
                if self.registration == RegistrationPolicy::LibrarianOnly =>
            {
                Ok(StageDecision::fail(
                    RejectionKind::Unauthorized,
                    format!(
                        "{} is not a librarian and cannot toggle book '{name}'",
                        proposal.caller
                    ),
                ))
            }
            _ => Ok(StageDecision::Pass),
        }
    }
}
