//! Chat widget: message log, canned-response bot and session orchestration.

mod message;
mod responder;
mod session;

pub use message::{Author, ChatMessage, MessageId, MessageLog};
pub use responder::{FALLBACK_RESPONSES, KeywordResponder, Responder, Topic};
pub use session::{ChatSession, ChatView, Exchange};
