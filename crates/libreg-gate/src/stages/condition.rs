use crate::error::GateError;
use crate::stage::{GateContext, GateStage, Operation, Proposal, RejectionKind, StageDecision};

/// Condition consistency stage.
///
/// A transfer may keep or downgrade a book's condition but never mark a
/// damaged book as good.
pub struct ConditionStage;

impl GateStage for ConditionStage {
    fn name(&self) -> &str {
        "condition"
    }

    fn evaluate(
        &self,
        proposal: &Proposal,
        context: &GateContext,
    ) -> Result<StageDecision, GateError> {
        let Operation::TransferCustody {
            name,
            new_condition,
            ..
        } = &proposal.operation
        else {
            return Ok(StageDecision::Pass);
        };
        let Some(book) = &context.book else {
            return Ok(StageDecision::fail(
                RejectionKind::NotFound,
                format!("book '{name}' is not registered"),
            ));
        };

        if book.condition.permits_transition_to(*new_condition) {
            Ok(StageDecision::Pass)
        } else {
            Ok(StageDecision::fail(
                RejectionKind::StateConsistency,
                format!(
                    "book '{name}' is {} and cannot be transferred as {new_condition}",
                    book.condition
                ),
            ))
        }
    }
}
