//! Contact form: field rules, input assist, the submit state machine and the
//! delivery boundary.

mod assist;
mod field;
mod flow;
mod submission;
mod transport;

pub use assist::format_phone_input;
pub use field::{
    FieldKind, FieldRule, FieldValidator, FieldVerdict, FormField, FormReport,
    STRICT_PHONE_MIN_LEN, is_valid_email, is_valid_phone,
};
pub use flow::{
    BannerId, BannerKind, ContactFlow, FormState, FormTransition, FormTransitionRejection,
    FormTransitionResult, FormView, SubmitAttempt, SubmitTicket,
};
pub use submission::{FormSubmission, SubmissionOutcome};
pub use transport::{
    SIMULATED_TRANSPORT_ID, SimulatedTransport, SubmitReceipt, SubmitTransport, TransportError,
    TransportResult,
};
