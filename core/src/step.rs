//! Steps of the intake flow and the sequence they are walked in.

use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;
use strum_macros::EnumString;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Step {
    ClientInfo,
    DeviceInfo,
    IssueDescription,
    /// Preferred support method, urgency and privacy consent.
    SupportRequest,
    Review,
    Confirmation,
}

impl Step {
    /// Short label used by the progress bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::ClientInfo => "Client",
            Self::DeviceInfo => "Device",
            Self::IssueDescription => "Issue",
            Self::SupportRequest => "Support",
            Self::Review => "Review",
            Self::Confirmation => "Done",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Confirmation
    }
}

/// Options that change which steps make up the flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowOptions {
    /// Insert the support-request/consent step before review.
    pub consent_step: bool,
}

/// Ordered steps for one session. Always starts at client info and ends
/// with review followed by the terminal confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSequence {
    steps: Vec<Step>,
}

impl StepSequence {
    pub fn new(options: FlowOptions) -> Self {
        let mut steps = vec![Step::ClientInfo, Step::DeviceInfo, Step::IssueDescription];
        if options.consent_step {
            steps.push(Step::SupportRequest);
        }
        steps.push(Step::Review);
        steps.push(Step::Confirmation);
        Self { steps }
    }

    pub fn first(&self) -> Step {
        Step::ClientInfo
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Steps shown in the progress bar (everything except confirmation).
    pub fn visible(&self) -> &[Step] {
        &self.steps[..self.steps.len() - 1]
    }

    pub fn position(&self, step: Step) -> Option<usize> {
        self.steps.iter().position(|candidate| *candidate == step)
    }

    pub fn contains(&self, step: Step) -> bool {
        self.position(step).is_some()
    }

    pub fn next(&self, step: Step) -> Option<Step> {
        self.position(step)
            .and_then(|index| self.steps.get(index + 1))
            .copied()
    }

    pub fn previous(&self, step: Step) -> Option<Step> {
        self.position(step)
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| self.steps.get(index))
            .copied()
    }

    /// Steps strictly before `step`.
    pub fn before(&self, step: Step) -> &[Step] {
        let end = self.position(step).unwrap_or(0);
        &self.steps[..end]
    }
}

impl Default for StepSequence {
    fn default() -> Self {
        Self::new(FlowOptions::default())
    }
}
