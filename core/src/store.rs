//! Form State Store: the in-progress record plus the active step.

use serde_json::Value;
use support_protocol::PatchError;
use support_protocol::RecordPatch;
use support_protocol::SupportRecord;
use support_protocol::TicketId;
use tracing::debug;

use crate::step::FlowOptions;
use crate::step::Step;
use crate::step::StepSequence;
use crate::validate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("the confirmation step is final; start a new request instead")]
    Terminal,

    #[error("step {step} is incomplete: {}", missing.join(", "))]
    Incomplete {
        step: Step,
        missing: Vec<&'static str>,
    },

    #[error("the review step is completed by submitting the request")]
    SubmissionRequired,

    #[error("cannot jump ahead to {0}")]
    ForwardJump(Step),

    #[error("the confirmation step is only reachable by submitting")]
    ConfirmationUnreachable,

    #[error("step {0} is not part of this form")]
    NotInFlow(Step),

    #[error("a submission is in progress")]
    SubmissionInFlight,
}

/// One entry of the progress bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepStatus {
    pub step: Step,
    pub label: &'static str,
    /// 1-based position shown to the user.
    pub position: usize,
    pub active: bool,
    pub completed: bool,
    /// Whether `jump_to(step)` would currently be accepted.
    pub reachable: bool,
}

#[derive(Debug, Clone)]
pub struct FormStore {
    sequence: StepSequence,
    record: SupportRecord,
    current: Step,
}

impl FormStore {
    pub fn new(options: FlowOptions) -> Self {
        let sequence = StepSequence::new(options);
        let current = sequence.first();
        Self {
            sequence,
            record: SupportRecord::default(),
            current,
        }
    }

    pub fn record(&self) -> &SupportRecord {
        &self.record
    }

    pub fn current_step(&self) -> Step {
        self.current
    }

    pub fn sequence(&self) -> &StepSequence {
        &self.sequence
    }

    /// Merge field changes into the record.
    pub fn update(&mut self, patch: RecordPatch) {
        self.record.apply(patch);
    }

    /// Merge a JSON object of field changes. List fields are normalized
    /// rather than rejected.
    pub fn update_json(&mut self, partial: Value) -> Result<(), PatchError> {
        let patch = RecordPatch::from_json(partial)?;
        self.update(patch);
        Ok(())
    }

    pub fn advance(&mut self) -> Result<Step, NavigationError> {
        match self.current {
            Step::Confirmation => return Err(NavigationError::Terminal),
            Step::Review => return Err(NavigationError::SubmissionRequired),
            _ => {}
        }

        let missing = validate::missing_fields(self.current, &self.record);
        if !missing.is_empty() {
            return Err(NavigationError::Incomplete {
                step: self.current,
                missing,
            });
        }

        let next = self
            .sequence
            .next(self.current)
            .ok_or(NavigationError::Terminal)?;
        debug!(from = %self.current, to = %next, "advance");
        self.current = next;
        Ok(next)
    }

    /// Step back once. At the first step this is a no-op.
    pub fn retreat(&mut self) -> Result<Step, NavigationError> {
        if self.current.is_terminal() {
            return Err(NavigationError::Terminal);
        }
        if let Some(previous) = self.sequence.previous(self.current) {
            debug!(from = %self.current, to = %previous, "retreat");
            self.current = previous;
        }
        Ok(self.current)
    }

    /// Whether `jump_to(step)` would be accepted right now.
    pub fn can_jump_to(&self, step: Step) -> Result<(), NavigationError> {
        if !self.sequence.contains(step) {
            return Err(NavigationError::NotInFlow(step));
        }
        if step == Step::Confirmation {
            return Err(NavigationError::ConfirmationUnreachable);
        }
        if step == self.sequence.first() {
            return Ok(());
        }
        if self.current.is_terminal() {
            return Err(NavigationError::Terminal);
        }

        let target = self.sequence.position(step).unwrap_or(usize::MAX);
        let current = self.sequence.position(self.current).unwrap_or(0);
        if target > current {
            return Err(NavigationError::ForwardJump(step));
        }

        match validate::first_incomplete(self.sequence.before(step), &self.record) {
            Some((step, missing)) => Err(NavigationError::Incomplete { step, missing }),
            None => Ok(()),
        }
    }

    /// Jump to an earlier step. Jumping to the first step starts a new
    /// request and resets every field.
    pub fn jump_to(&mut self, step: Step) -> Result<Step, NavigationError> {
        self.can_jump_to(step)?;
        if step == self.sequence.first() {
            self.reset();
        } else {
            debug!(from = %self.current, to = %step, "jump");
            self.current = step;
        }
        Ok(self.current)
    }

    pub fn reset(&mut self) {
        debug!("form reset");
        self.record = SupportRecord::default();
        self.current = self.sequence.first();
    }

    /// Percentage through the non-terminal steps, 100 at review.
    pub fn progress(&self) -> u8 {
        let index = self.sequence.position(self.current).unwrap_or(0);
        let last = self.sequence.visible().len().saturating_sub(1).max(1);
        let percent = (index * 100 + last / 2) / last;
        percent.min(100) as u8
    }

    /// Progress bar entries. Empty once the request is confirmed.
    pub fn step_statuses(&self) -> Vec<StepStatus> {
        if self.current.is_terminal() {
            return Vec::new();
        }
        let current = self.sequence.position(self.current).unwrap_or(0);
        self.sequence
            .visible()
            .iter()
            .enumerate()
            .map(|(index, step)| StepStatus {
                step: *step,
                label: step.label(),
                position: index + 1,
                active: index == current,
                completed: index < current,
                reachable: self.can_jump_to(*step).is_ok(),
            })
            .collect()
    }

    /// First step before review that does not validate.
    pub fn first_incomplete(&self) -> Option<(Step, Vec<&'static str>)> {
        validate::first_incomplete(self.sequence.before(Step::Review), &self.record)
    }

    pub fn is_complete(&self) -> bool {
        self.first_incomplete().is_none()
    }

    /// Record the ticket outcome and enter the confirmation step.
    pub(crate) fn complete_submission(
        &mut self,
        ticket_id: Option<TicketId>,
    ) -> Result<Step, NavigationError> {
        if self.current != Step::Review {
            return Err(NavigationError::ConfirmationUnreachable);
        }
        self.record.submitted_ticket_id = ticket_id;
        self.current = Step::Confirmation;
        Ok(self.current)
    }
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new(FlowOptions::default())
    }
}
