use linebiz_storage::{NewSubmission, SubmissionContext};

/// Result slot of one submit action; resolves exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionOutcome {
    #[default]
    Pending,
    Success,
    Failure,
}

/// Snapshot of the form taken when a submit passes validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    /// Field values in document order.
    pub fields: Vec<(String, String)>,
    pub submitted_at_unix_millis: u64,
    pub context: SubmissionContext,
    outcome: SubmissionOutcome,
}

impl FormSubmission {
    pub fn new(
        fields: Vec<(String, String)>,
        submitted_at_unix_millis: u64,
        context: SubmissionContext,
    ) -> Self {
        Self {
            fields,
            submitted_at_unix_millis,
            context,
            outcome: SubmissionOutcome::Pending,
        }
    }

    pub fn outcome(&self) -> SubmissionOutcome {
        self.outcome
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Records the result. Returns false if the outcome was already set.
    pub fn resolve(&mut self, success: bool) -> bool {
        if self.outcome != SubmissionOutcome::Pending {
            return false;
        }
        self.outcome = if success {
            SubmissionOutcome::Success
        } else {
            SubmissionOutcome::Failure
        };
        true
    }

    /// Converts into the demo store's record input.
    pub fn to_new_submission(&self) -> NewSubmission {
        NewSubmission::new(self.fields.iter().cloned(), self.submitted_at_unix_millis)
            .with_context(self.context.clone())
    }
}
