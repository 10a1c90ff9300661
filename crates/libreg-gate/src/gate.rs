use std::time::{Duration, Instant};

use crate::config::GateConfig;
use crate::error::GateError;
use crate::stage::{GateContext, GateStage, Proposal, RejectionKind, StageDecision, StageResult};
use crate::stages::{ConditionStage, CustodyStage, ExistenceStage, RoleStage};

// ---------------------------------------------------------------------------
// GateResult
// ---------------------------------------------------------------------------

/// Final verdict on a proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected { kind: RejectionKind, reason: String },
}

/// The outcome of running a proposal through the full gate pipeline.
#[derive(Clone, Debug)]
pub struct GateResult {
    pub verdict: Verdict,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
    /// Total wall-clock time for the pipeline evaluation.
    pub elapsed: Duration,
}

impl GateResult {
    /// Returns `true` if the proposal was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self.verdict, Verdict::Accepted)
    }

    /// The rejection kind, if the proposal was rejected.
    pub fn rejection(&self) -> Option<RejectionKind> {
        match &self.verdict {
            Verdict::Accepted => None,
            Verdict::Rejected { kind, .. } => Some(*kind),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthorizationGate
// ---------------------------------------------------------------------------

/// The authorization gate: a pipeline of stages that every mutating
/// registry operation must pass before it is applied.
///
/// The gate only reads the [`GateContext`] it is handed; it never mutates
/// registry state. Committing an accepted proposal is the caller's job.
pub struct AuthorizationGate {
    stages: Vec<Box<dyn GateStage>>,
    config: GateConfig,
}

impl AuthorizationGate {
    /// Create a new gate with the given configuration and no stages.
    ///
    /// Use [`Self::add_stage`] to add stages, or
    /// [`Self::with_default_stages`] for the standard pipeline.
    pub fn new(config: GateConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Create a gate with the default stage pipeline:
    /// Existence -> Role -> Custody -> Condition
    pub fn with_default_stages(config: GateConfig) -> Self {
        let mut gate = Self::new(config.clone());
        gate.add_stage(Box::new(ExistenceStage));
        gate.add_stage(Box::new(RoleStage::new(config.book_registration)));
        gate.add_stage(Box::new(CustodyStage::new(config.librarian_override)));
        gate.add_stage(Box::new(ConditionStage));
        gate
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn GateStage>) {
        self.stages.push(stage);
    }

    /// The current configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Evaluate a proposal through the full pipeline.
    ///
    /// The pipeline is **fail-fast**: the first stage that fails stops
    /// evaluation and produces a `Rejected` verdict. If all stages pass
    /// the verdict is `Accepted`.
    pub fn evaluate(
        &self,
        proposal: &Proposal,
        mut context: GateContext,
    ) -> Result<GateResult, GateError> {
        let pipeline_start = Instant::now();
        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(proposal, &context)?;
            let elapsed = stage_start.elapsed();

            tracing::debug!(
                stage = stage.name(),
                op = proposal.operation.label(),
                caller = %proposal.caller,
                passed = decision.is_pass(),
                "gate stage evaluated"
            );

            let reason = match &decision {
                StageDecision::Pass => None,
                StageDecision::Fail { reason, .. } => Some(reason.clone()),
            };
            let result = StageResult {
                stage_name: stage.name().to_string(),
                passed: decision.is_pass(),
                reason,
                elapsed,
            };
            stage_results.push(result.clone());
            context.previous_stages.push(result);

            // Fail-fast: stop on first failure.
            if let StageDecision::Fail { kind, reason } = decision {
                tracing::info!(
                    stage = stage.name(),
                    op = proposal.operation.label(),
                    caller = %proposal.caller,
                    %kind,
                    %reason,
                    "proposal rejected"
                );
                return Ok(GateResult {
                    verdict: Verdict::Rejected { kind, reason },
                    stage_results,
                    elapsed: pipeline_start.elapsed(),
                });
            }
        }

        Ok(GateResult {
            verdict: Verdict::Accepted,
            stage_results,
            elapsed: pipeline_start.elapsed(),
        })
    }
}
