//! Submission session around a [`FormStore`].
//!
//! Wraps the store in a lock shared by the front end and owns the single
//! in-flight submission to the relay gateway.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use support_protocol::PatchError;
use support_protocol::RecordPatch;
use support_protocol::SupportPayload;
use support_protocol::SupportRecord;
use support_protocol::TicketId;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::classify::ClassifiedError;
use crate::gateway::TicketGateway;
use crate::step::FlowOptions;
use crate::step::Step;
use crate::store::FormStore;
use crate::store::NavigationError;
use crate::store::StepStatus;
use crate::views::StepView;
use crate::views::flow_step_view;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("a submission is already in progress")]
    AlreadySubmitting,

    #[error("requests are submitted from the review step, not {0}")]
    NotAtReview(Step),

    #[error("step {step} is incomplete: {}", missing.join(", "))]
    Incomplete {
        step: Step,
        missing: Vec<&'static str>,
    },

    #[error(transparent)]
    Rejected(#[from] ClassifiedError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub ticket_id: Option<TicketId>,
    pub message: String,
}

/// Clears the submitting flag when the submission finishes, however it
/// finishes.
struct SubmittingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SubmittingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// One intake session: the form store plus the gateway it submits through.
///
/// At most one submission is outstanding at a time. While it runs, step
/// navigation is refused so the session is still on review when the
/// outcome arrives.
pub struct SupportSession {
    store: Mutex<FormStore>,
    gateway: Arc<dyn TicketGateway>,
    submitting: AtomicBool,
}

impl SupportSession {
    pub fn new(options: FlowOptions, gateway: Arc<dyn TicketGateway>) -> Self {
        Self {
            store: Mutex::new(FormStore::new(options)),
            gateway,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub async fn record(&self) -> SupportRecord {
        self.store.lock().await.record().clone()
    }

    pub async fn current_step(&self) -> Step {
        self.store.lock().await.current_step()
    }

    pub async fn progress(&self) -> u8 {
        self.store.lock().await.progress()
    }

    pub async fn step_statuses(&self) -> Vec<StepStatus> {
        self.store.lock().await.step_statuses()
    }

    pub async fn view(&self) -> StepView {
        let store = self.store.lock().await;
        flow_step_view(store.sequence(), store.current_step(), store.record())
    }

    pub async fn update(&self, patch: RecordPatch) {
        self.store.lock().await.update(patch);
    }

    pub async fn update_json(&self, partial: serde_json::Value) -> Result<(), PatchError> {
        self.store.lock().await.update_json(partial)
    }

    pub async fn advance(&self) -> Result<Step, NavigationError> {
        self.ensure_idle()?;
        self.store.lock().await.advance()
    }

    pub async fn retreat(&self) -> Result<Step, NavigationError> {
        self.ensure_idle()?;
        self.store.lock().await.retreat()
    }

    pub async fn jump_to(&self, step: Step) -> Result<Step, NavigationError> {
        self.ensure_idle()?;
        self.store.lock().await.jump_to(step)
    }

    fn ensure_idle(&self) -> Result<(), NavigationError> {
        if self.is_submitting() {
            return Err(NavigationError::SubmissionInFlight);
        }
        Ok(())
    }

    /// Submit the record from the review step.
    ///
    /// On success the ticket id is stored and the session moves to
    /// confirmation. On any failure the record and step are left as they
    /// were so the user can retry.
    pub async fn submit(&self) -> Result<SubmitReceipt, SubmitError> {
        let Some(_guard) = SubmittingGuard::acquire(&self.submitting) else {
            debug!("submit ignored: already in flight");
            return Err(SubmitError::AlreadySubmitting);
        };

        let payload = {
            let store = self.store.lock().await;
            if store.current_step() != Step::Review {
                return Err(SubmitError::NotAtReview(store.current_step()));
            }
            if let Some((step, missing)) = store.first_incomplete() {
                return Err(SubmitError::Incomplete { step, missing });
            }
            SupportPayload::from(store.record())
        };

        let created = match self.gateway.submit(&payload).await {
            Ok(created) => created,
            Err(err) => {
                warn!(kind = %err.kind, status = ?err.status, "submission failed");
                return Err(err.into());
            }
        };

        self.store
            .lock()
            .await
            .complete_submission(created.ticket_id.clone())?;
        info!(ticket_id = ?created.ticket_id, "submission confirmed");
        Ok(SubmitReceipt {
            ticket_id: created.ticket_id,
            message: created.message,
        })
    }
}
