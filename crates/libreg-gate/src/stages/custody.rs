use crate::error::GateError;
use crate::stage::{GateContext, GateStage, Operation, Proposal, RejectionKind, StageDecision};

/// Custody stage.
///
/// Only the current owner of a book may hand it on. With the librarian
/// override enabled, a librarian may also transfer books they do not hold.
pub struct CustodyStage {
    librarian_override: bool,
}

impl CustodyStage {
    pub fn new(librarian_override: bool) -> Self {
        Self { librarian_override }
    }
}

impl GateStage for CustodyStage {
    fn name(&self) -> &str {
        "custody"
    }

    fn evaluate(
        &self,
        proposal: &Proposal,
        context: &GateContext,
    ) -> Result<StageDecision, GateError> {
        let Operation::TransferCustody { name, .. } = &proposal.operation else {
            return Ok(StageDecision::Pass);
        };
        let Some(book) = &context.book else {
            return Ok(StageDecision::fail(
                RejectionKind::NotFound,
                format!("book '{name}' is not registered"),
            ));
        };

        if book.owner == proposal.caller {
            return Ok(StageDecision::Pass);
        }
        if self.librarian_override && context.caller_is_librarian {
            tracing::debug!(book = %name, caller = %proposal.caller, "librarian override applied");
            return Ok(StageDecision::Pass);
        }

        Ok(StageDecision::fail(
            RejectionKind::Unauthorized,
            format!(
                "{} does not hold '{name}' (owner is {})",
                proposal.caller, book.owner
            ),
        ))
    }
}
