use std::cell::{Cell, RefCell};
use std::rc::Rc;

use linebiz_storage::SubmissionContext;

use crate::config::FormSettings;
use crate::runtime::{Clock, Sleeper};

use super::field::{FieldValidator, FieldVerdict, FormField, FormReport};
use super::submission::{FormSubmission, SubmissionOutcome};
use super::transport::SubmitTransport;

/// Identifier for one send attempt.
///
/// This must change on every submit so a late banner timer from an earlier
/// attempt cannot settle a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmitTicket(pub u64);

impl SubmitTicket {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Stable handle for one result banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BannerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Lifecycle of the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Validating,
    Pending(SubmitTicket),
    Succeeded(SubmitTicket),
    Failed {
        ticket: SubmitTicket,
        message: String,
    },
}

/// State transition input for the form lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTransition {
    Submit,
    ValidationFailed,
    ValidationPassed(SubmitTicket),
    Succeed(SubmitTicket),
    Fail {
        ticket: SubmitTicket,
        message: String,
    },
    /// Result banner went away; the attempt is over.
    Settle(SubmitTicket),
}

/// Rejection reason for illegal form transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTransitionRejection {
    AlreadyPending(SubmitTicket),
    AlreadyValidating,
    NotValidating,
    NoPendingSubmit,
    TicketMismatch {
        active: SubmitTicket,
        attempted: SubmitTicket,
    },
}

pub type FormTransitionResult = Result<FormState, FormTransitionRejection>;

impl FormState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Applies one transition deterministically.
    ///
    /// A submit is refused while validating or pending. Results must carry the
    /// ticket of the pending attempt.
    pub fn apply(&self, transition: FormTransition) -> FormTransitionResult {
        match transition {
            FormTransition::Submit => self.apply_submit(),
            FormTransition::ValidationFailed => match self {
                Self::Validating => Ok(Self::Idle),
                _ => Err(FormTransitionRejection::NotValidating),
            },
            FormTransition::ValidationPassed(ticket) => match self {
                Self::Validating => Ok(Self::Pending(ticket)),
                _ => Err(FormTransitionRejection::NotValidating),
            },
            FormTransition::Succeed(ticket) => {
                self.apply_result(ticket, || Self::Succeeded(ticket))
            }
            FormTransition::Fail { ticket, message } => {
                self.apply_result(ticket, || Self::Failed { ticket, message })
            }
            FormTransition::Settle(ticket) => Ok(self.apply_settle(ticket)),
        }
    }

    fn apply_submit(&self) -> FormTransitionResult {
        match self {
            Self::Pending(active) => Err(FormTransitionRejection::AlreadyPending(*active)),
            Self::Validating => Err(FormTransitionRejection::AlreadyValidating),
            Self::Idle | Self::Succeeded(_) | Self::Failed { .. } => Ok(Self::Validating),
        }
    }

    fn apply_result(
        &self,
        ticket: SubmitTicket,
        next: impl FnOnce() -> Self,
    ) -> FormTransitionResult {
        match self {
            Self::Pending(active) if *active == ticket => Ok(next()),
            Self::Pending(active) => Err(FormTransitionRejection::TicketMismatch {
                active: *active,
                attempted: ticket,
            }),
            Self::Idle | Self::Validating | Self::Succeeded(_) | Self::Failed { .. } => {
                Err(FormTransitionRejection::NoPendingSubmit)
            }
        }
    }

    fn apply_settle(&self, ticket: SubmitTicket) -> Self {
        match self {
            Self::Succeeded(active) if *active == ticket => Self::Idle,
            Self::Failed { ticket: active, .. } if *active == ticket => Self::Idle,
            // A newer attempt owns the form now.
            _ => self.clone(),
        }
    }
}

/// Page-side surface the submission flow drives.
pub trait FormView {
    /// Current field values in document order.
    fn fields(&self) -> Vec<FormField>;
    fn context(&self) -> SubmissionContext;
    fn show_field_error(&self, name: &str, message: &str);
    fn clear_field_error(&self, name: &str);
    /// Disables the submit control and shows the loading label, or restores it.
    fn set_busy(&self, busy: bool);
    fn clear_fields(&self);
    /// Shows a banner, replacing any banner already on screen.
    fn show_banner(&self, id: BannerId, kind: BannerKind, text: &str);
    fn fade_banner(&self, id: BannerId);
    fn remove_banner(&self, id: BannerId);
}

/// What one submit trigger turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAttempt {
    /// Another attempt was still validating or pending.
    Ignored,
    Invalid(FormReport),
    Sent {
        ticket: SubmitTicket,
        outcome: SubmissionOutcome,
    },
}

#[derive(Debug, Clone)]
struct BannerCopy {
    dismiss_ms: u32,
    fade_ms: u32,
    success_text: String,
    failure_text: String,
}

/// Contact form controller: validation, single-flight send, result banners.
pub struct ContactFlow {
    state: RefCell<FormState>,
    next_ticket: Cell<u64>,
    next_banner: Cell<u64>,
    validator: FieldValidator,
    banner: BannerCopy,
    transport: Rc<dyn SubmitTransport>,
    sleeper: Rc<dyn Sleeper>,
    clock: Rc<dyn Clock>,
    view: Rc<dyn FormView>,
}

impl ContactFlow {
    pub fn new(
        settings: &FormSettings,
        transport: Rc<dyn SubmitTransport>,
        sleeper: Rc<dyn Sleeper>,
        clock: Rc<dyn Clock>,
        view: Rc<dyn FormView>,
    ) -> Self {
        Self {
            state: RefCell::new(FormState::Idle),
            next_ticket: Cell::new(1),
            next_banner: Cell::new(1),
            validator: FieldValidator::new(settings.messages.clone(), settings.strict_phone),
            banner: BannerCopy {
                dismiss_ms: settings.banner_dismiss_ms,
                fade_ms: settings.banner_fade_ms,
                success_text: settings.success_text.clone(),
                failure_text: settings.failure_text.clone(),
            },
            transport,
            sleeper,
            clock,
            view,
        }
    }

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn validator(&self) -> &FieldValidator {
        &self.validator
    }

    /// Validates one field (blur) and updates its inline error.
    pub fn check_field(&self, field: &FormField) -> FieldVerdict {
        let verdict = self.validator.validate(field);
        self.render_verdict(&field.name, &verdict);
        verdict
    }

    /// Typing into a field clears its error until the next check.
    pub fn field_edited(&self, name: &str) {
        self.view.clear_field_error(name);
    }

    /// Handles one submit trigger end to end, including the banner lifetime.
    pub async fn submit(&self) -> SubmitAttempt {
        if let Err(rejection) = self.transition(FormTransition::Submit) {
            tracing::debug!(?rejection, "submit ignored");
            return SubmitAttempt::Ignored;
        }

        let fields = self.view.fields();
        let report = self.validate_all(&fields);
        if !report.is_valid() {
            self.transition_or_log(FormTransition::ValidationFailed);
            tracing::debug!(
                failed = ?report.failed_names().collect::<Vec<_>>(),
                "contact form has invalid fields"
            );
            return SubmitAttempt::Invalid(report);
        }

        let ticket = self.allocate_ticket();
        self.transition_or_log(FormTransition::ValidationPassed(ticket));
        self.view.set_busy(true);

        let mut submission = FormSubmission::new(
            fields
                .into_iter()
                .map(|field| (field.name, field.value))
                .collect(),
            self.clock.now_unix_millis(),
            self.view.context(),
        );

        let result = self.transport.submit(&submission).await;
        let outcome = match result {
            Ok(receipt) => {
                submission.resolve(true);
                tracing::info!(
                    transport = self.transport.id(),
                    stored = receipt.stored_as.is_some(),
                    "contact submission sent"
                );
                self.transition_or_log(FormTransition::Succeed(ticket));
                self.view.set_busy(false);
                self.view.clear_fields();
                SubmissionOutcome::Success
            }
            Err(error) => {
                submission.resolve(false);
                tracing::warn!(transport = self.transport.id(), %error, "contact submission failed");
                self.transition_or_log(FormTransition::Fail {
                    ticket,
                    message: error.to_string(),
                });
                self.view.set_busy(false);
                SubmissionOutcome::Failure
            }
        };
        debug_assert_eq!(submission.outcome(), outcome);

        let (kind, text) = match outcome {
            SubmissionOutcome::Success => (BannerKind::Success, self.banner.success_text.clone()),
            SubmissionOutcome::Failure | SubmissionOutcome::Pending => {
                (BannerKind::Error, self.banner.failure_text.clone())
            }
        };
        self.run_banner(kind, &text).await;
        self.transition_or_log(FormTransition::Settle(ticket));

        SubmitAttempt::Sent { ticket, outcome }
    }

    async fn run_banner(&self, kind: BannerKind, text: &str) {
        let id = BannerId(self.next_banner.get());
        self.next_banner.set(id.0 + 1);

        self.view.show_banner(id, kind, text);
        self.sleeper.sleep(self.banner.dismiss_ms).await;
        self.view.fade_banner(id);
        self.sleeper.sleep(self.banner.fade_ms).await;
        self.view.remove_banner(id);
    }

    fn validate_all(&self, fields: &[FormField]) -> FormReport {
        let report = self.validator.validate_form(fields);
        for field in fields {
            match report.failures.iter().find(|(name, _)| *name == field.name) {
                Some((name, verdict)) => self.render_verdict(name, verdict),
                None => self.view.clear_field_error(&field.name),
            }
        }
        report
    }

    fn render_verdict(&self, name: &str, verdict: &FieldVerdict) {
        if verdict.valid {
            self.view.clear_field_error(name);
        } else {
            self.view.show_field_error(name, &verdict.message);
        }
    }

    fn allocate_ticket(&self) -> SubmitTicket {
        let ticket = SubmitTicket::new(self.next_ticket.get());
        self.next_ticket.set(ticket.0 + 1);
        ticket
    }

    fn transition(&self, transition: FormTransition) -> FormTransitionResult {
        let mut state = self.state.borrow_mut();
        let next = state.apply(transition)?;
        *state = next.clone();
        Ok(next)
    }

    fn transition_or_log(&self, transition: FormTransition) {
        if let Err(rejection) = self.transition(transition) {
            tracing::warn!(?rejection, "unexpected form transition rejected");
        }
    }
}
