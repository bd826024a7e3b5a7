use serde::Serialize;
use std::fmt;
use tracing::{debug, error};
use uuid::Uuid;

use crate::TARGET_PIPELINE;

/// A working stage of the pipeline, i.e. a state that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Prompting,
    AwaitingPrimary,
    Extracting,
    Validating,
    AwaitingSummary,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Prompting => "prompting",
            Stage::AwaitingPrimary => "awaiting-primary",
            Stage::Extracting => "extracting",
            Stage::Validating => "validating",
            Stage::AwaitingSummary => "awaiting-summary",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    Prompting,
    AwaitingPrimary,
    Extracting,
    Validating,
    AwaitingSummary,
    Done,
    Failed(Stage),
}

impl PipelineState {
    /// The stage this state represents, if it is a working state.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Prompting => Some(Stage::Prompting),
            PipelineState::AwaitingPrimary => Some(Stage::AwaitingPrimary),
            PipelineState::Extracting => Some(Stage::Extracting),
            PipelineState::Validating => Some(Stage::Validating),
            PipelineState::AwaitingSummary => Some(Stage::AwaitingSummary),
            PipelineState::Idle | PipelineState::Done | PipelineState::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }

    pub fn can_advance_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Idle, Prompting)
            | (Prompting, AwaitingPrimary)
            | (AwaitingPrimary, Extracting)
            | (Extracting, Validating)
            | (Validating, AwaitingSummary)
            | (AwaitingSummary, Done) => true,
            // Failure is reachable from any working state, naming that state.
            (current, Failed(stage)) => current.stage() == Some(stage),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => f.write_str("idle"),
            PipelineState::Done => f.write_str("done"),
            PipelineState::Failed(stage) => write!(f, "failed({})", stage),
            other => match other.stage() {
                Some(stage) => f.write_str(stage.name()),
                None => f.write_str("unknown"),
            },
        }
    }
}

/// The sequence of states one run passed through.
#[derive(Debug)]
pub struct Trail {
    run_id: Uuid,
    states: Vec<PipelineState>,
}

impl Trail {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            states: vec![PipelineState::Idle],
        }
    }

    pub fn current(&self) -> PipelineState {
        self.states
            .last()
            .copied()
            .unwrap_or(PipelineState::Idle)
    }

    pub fn advance(&mut self, next: PipelineState) {
        let current = self.current();
        if !current.can_advance_to(next) {
            error!(target: TARGET_PIPELINE, "[run {}]: illegal transition {} -> {}", self.run_id, current, next);
        }
        debug!(target: TARGET_PIPELINE, "[run {}]: {} -> {}", self.run_id, current, next);
        self.states.push(next);
    }

    /// Moves to `Failed` for the current working stage.
    pub fn fail(&mut self) -> Stage {
        let stage = self.current().stage().unwrap_or(Stage::Prompting);
        self.advance(PipelineState::Failed(stage));
        stage
    }

    pub fn into_states(self) -> Vec<PipelineState> {
        self.states
    }
}
