use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use linebiz_storage::{SubmissionId, SubmissionStore};
use snafu::Snafu;

use crate::runtime::{Dice, Sleeper};

use super::submission::FormSubmission;

/// Acknowledgement from a successful send.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitReceipt {
    /// Present when the payload was also written to the demo store.
    pub stored_as: Option<SubmissionId>,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TransportError {
    #[snafu(display("submission was rejected on `{stage}`: {details}"))]
    Rejected {
        stage: &'static str,
        details: String,
    },
    #[snafu(display("transport unavailable on `{stage}`: {details}"))]
    Unavailable {
        stage: &'static str,
        details: String,
    },
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Backend boundary for contact-form delivery. No partial success: a send
/// either yields a receipt or an error.
pub trait SubmitTransport {
    fn id(&self) -> &str;
    fn submit<'a>(
        &'a self,
        submission: &'a FormSubmission,
    ) -> LocalBoxFuture<'a, TransportResult<SubmitReceipt>>;
}

pub const SIMULATED_TRANSPORT_ID: &str = "simulated";

/// Stand-in backend: waits a fixed delay, optionally keeps the payload in the
/// demo store, then succeeds with the configured probability.
pub struct SimulatedTransport {
    sleeper: Rc<dyn Sleeper>,
    dice: Rc<dyn Dice>,
    delay_ms: u32,
    success_rate: f64,
    store: Option<Rc<dyn SubmissionStore>>,
}

impl SimulatedTransport {
    pub fn new(sleeper: Rc<dyn Sleeper>, dice: Rc<dyn Dice>, delay_ms: u32) -> Self {
        Self {
            sleeper,
            dice,
            delay_ms,
            success_rate: 1.0,
            store: None,
        }
    }

    pub fn with_success_rate(mut self, success_rate: f64) -> Self {
        self.success_rate = success_rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_store(mut self, store: Rc<dyn SubmissionStore>) -> Self {
        self.store = Some(store);
        self
    }

    fn persist(&self, submission: &FormSubmission) -> Option<SubmissionId> {
        let store = self.store.as_ref()?;
        match store.append_submission(submission.to_new_submission()) {
            Ok(record) => Some(record.id),
            Err(error) => {
                // The demo store is best effort; delivery does not depend on it.
                tracing::warn!(%error, "failed to keep submission in demo store");
                None
            }
        }
    }
}

impl SubmitTransport for SimulatedTransport {
    fn id(&self) -> &str {
        SIMULATED_TRANSPORT_ID
    }

    fn submit<'a>(
        &'a self,
        submission: &'a FormSubmission,
    ) -> LocalBoxFuture<'a, TransportResult<SubmitReceipt>> {
        async move {
            tracing::debug!(
                fields = submission.fields.len(),
                delay_ms = self.delay_ms,
                "simulating contact submission"
            );
            self.sleeper.sleep(self.delay_ms).await;

            let stored_as = self.persist(submission);
            if self.dice.unit() < self.success_rate {
                Ok(SubmitReceipt { stored_as })
            } else {
                RejectedSnafu {
                    stage: "simulated-send",
                    details: "simulated transient failure".to_string(),
                }
                .fail()
            }
        }
        .boxed_local()
    }
}
