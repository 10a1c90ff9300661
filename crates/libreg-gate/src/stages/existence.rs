use crate::error::GateError;
use crate::stage::{GateContext, GateStage, Operation, Proposal, RejectionKind, StageDecision};

/// Existence stage.
///
/// Custody can only be transferred for a book that is currently registered.
/// Toggling a book is always structurally valid: absent books get created.
pub struct ExistenceStage;

impl GateStage for ExistenceStage {
    fn name(&self) -> &str {
        "existence"
    }

    fn evaluate(
        &self,
        proposal: &Proposal,
        context: &GateContext,
    ) -> Result<StageDecision, GateError> {
        match &proposal.operation {
            Operation::TransferCustody { name, .. } if context.book.is_none() => {
                Ok(StageDecision::fail(
                    RejectionKind::NotFound,
                    format!("book '{name}' is not registered"),
                ))
            }
            _ => Ok(StageDecision::Pass),
        }
    }
}
