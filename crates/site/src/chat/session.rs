use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::ChatSettings;
use crate::runtime::{Clock, Sleeper};

use super::message::{Author, ChatMessage, MessageId, MessageLog};
use super::responder::Responder;

/// Page-side surface the chat session drives.
pub trait ChatView {
    /// Replaces the rendered conversation, oldest first, and scrolls to the end.
    fn render(&self, messages: &[ChatMessage]);
    fn clear_input(&self);
    fn set_open(&self, open: bool);
}

/// Ids produced by one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub question: MessageId,
    pub answer: MessageId,
}

/// Chat widget state: the message log, the panel's visibility and reply
/// scheduling.
pub struct ChatSession {
    log: RefCell<MessageLog>,
    open: Cell<bool>,
    reply_delay_ms: u32,
    responder: Rc<dyn Responder>,
    sleeper: Rc<dyn Sleeper>,
    clock: Rc<dyn Clock>,
    view: Rc<dyn ChatView>,
}

impl ChatSession {
    /// Creates the session seeded with the greeting and renders it.
    pub fn new(
        settings: &ChatSettings,
        responder: Rc<dyn Responder>,
        sleeper: Rc<dyn Sleeper>,
        clock: Rc<dyn Clock>,
        view: Rc<dyn ChatView>,
    ) -> Self {
        let mut log = MessageLog::new();
        log.push(Author::Bot, settings.greeting.clone(), clock.now_unix_millis());

        let session = Self {
            log: RefCell::new(log),
            open: Cell::new(false),
            reply_delay_ms: settings.reply_delay_ms,
            responder,
            sleeper,
            clock,
            view,
        };
        session.render();
        session
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.log.borrow().messages().to_vec()
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn toggle(&self) {
        self.set_open(!self.open.get());
    }

    pub fn open(&self) {
        self.set_open(true);
    }

    pub fn close(&self) {
        self.set_open(false);
    }

    fn set_open(&self, open: bool) {
        if self.open.replace(open) != open {
            self.view.set_open(open);
        }
    }

    /// Sends one user message and, after the reply delay, appends the bot's
    /// answer. Blank input is ignored and yields `None`.
    pub async fn send_message(&self, raw: &str) -> Option<Exchange> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        let question = self.append(Author::User, text);
        self.view.clear_input();
        self.render();

        self.sleeper.sleep(self.reply_delay_ms).await;

        let reply = self.responder.reply(text);
        let answer = self.append(Author::Bot, reply);
        self.render();
        Some(Exchange { question, answer })
    }

    fn append(&self, author: Author, text: impl Into<String>) -> MessageId {
        let now = self.clock.now_unix_millis();
        self.log.borrow_mut().push(author, text, now)
    }

    fn render(&self) {
        let log = self.log.borrow();
        self.view.render(log.messages());
    }
}

#[cfg(test)]
mod tests {
    use futures::channel::oneshot;
    use futures::executor::{LocalPool, block_on};
    use futures::future::{FutureExt, LocalBoxFuture};
    use futures::task::LocalSpawnExt;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chat::responder::{KeywordResponder, Topic};
    use crate::runtime::testing::{FixedClock, RecordingSleeper, ScriptedDice};

    #[derive(Default)]
    struct RecordingChatView {
        renders: RefCell<Vec<Vec<(Author, String)>>>,
        cleared: Cell<usize>,
        open_calls: RefCell<Vec<bool>>,
    }

    impl ChatView for RecordingChatView {
        fn render(&self, messages: &[ChatMessage]) {
            self.renders.borrow_mut().push(
                messages
                    .iter()
                    .map(|message| (message.author, message.text.clone()))
                    .collect(),
            );
        }

        fn clear_input(&self) {
            self.cleared.set(self.cleared.get() + 1);
        }

        fn set_open(&self, open: bool) {
            self.open_calls.borrow_mut().push(open);
        }
    }

    /// Sleeper that parks every delay until the test fires it.
    #[derive(Default)]
    struct ManualSleeper {
        pending: RefCell<Vec<oneshot::Sender<()>>>,
    }

    impl ManualSleeper {
        fn fire_all(&self) {
            for sender in self.pending.borrow_mut().drain(..) {
                let _ = sender.send(());
            }
        }
    }

    impl Sleeper for ManualSleeper {
        fn sleep(&self, _duration_ms: u32) -> LocalBoxFuture<'static, ()> {
            let (sender, receiver) = oneshot::channel();
            self.pending.borrow_mut().push(sender);
            receiver.map(|_| ()).boxed_local()
        }
    }

    fn session(sleeper: Rc<dyn Sleeper>, view: Rc<RecordingChatView>) -> ChatSession {
        ChatSession::new(
            &ChatSettings::default(),
            Rc::new(KeywordResponder::new(Rc::new(ScriptedDice::new([0.0])))),
            sleeper,
            Rc::new(FixedClock::at(5_000)),
            view,
        )
    }

    #[test]
    fn starts_with_greeting() {
        let view = Rc::new(RecordingChatView::default());
        let session = session(Rc::new(RecordingSleeper::default()), view.clone());

        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].author, Author::Bot);
        assert_eq!(messages[0].text, ChatSettings::default().greeting);
        assert_eq!(view.renders.borrow().len(), 1);
    }

    #[test]
    fn blank_input_is_ignored() {
        let view = Rc::new(RecordingChatView::default());
        let sleeper = Rc::new(RecordingSleeper::default());
        let session = session(sleeper.clone(), view.clone());

        assert_eq!(block_on(session.send_message("   ")), None);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(view.cleared.get(), 0);
        assert!(sleeper.requested.borrow().is_empty());
    }

    #[test]
    fn user_message_renders_before_delayed_reply() {
        let view = Rc::new(RecordingChatView::default());
        let sleeper = Rc::new(ManualSleeper::default());
        let session = Rc::new(session(sleeper.clone(), view.clone()));

        let mut pool = LocalPool::new();
        let exchange = Rc::new(RefCell::new(None));
        {
            let session = session.clone();
            let exchange = exchange.clone();
            pool.spawner()
                .spawn_local(async move {
                    *exchange.borrow_mut() = session.send_message("  料金を知りたい ").await;
                })
                .unwrap();
        }

        pool.run_until_stalled();
        assert_eq!(view.cleared.get(), 1);
        assert_eq!(
            view.renders.borrow().last().unwrap().last(),
            Some(&(Author::User, "料金を知りたい".to_string()))
        );
        assert!(exchange.borrow().is_none());

        sleeper.fire_all();
        pool.run_until_stalled();

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].author, Author::Bot);
        assert_eq!(
            messages[2].text,
            KeywordResponder::response_for(Topic::Pricing)
        );
        assert_eq!(
            *exchange.borrow(),
            Some(Exchange {
                question: messages[1].id,
                answer: messages[2].id,
            })
        );
        assert_eq!(view.renders.borrow().len(), 3);
    }

    #[test]
    fn reply_waits_configured_delay() {
        let sleeper = Rc::new(RecordingSleeper::default());
        let session = session(sleeper.clone(), Rc::default());

        block_on(session.send_message("こんにちは"));
        assert_eq!(*sleeper.requested.borrow(), vec![1000]);
    }

    #[test]
    fn panel_visibility_changes_are_reported_once() {
        let view = Rc::new(RecordingChatView::default());
        let session = session(Rc::new(RecordingSleeper::default()), view.clone());

        session.toggle();
        session.open();
        session.close();
        session.close();
        session.toggle();

        assert!(session.is_open());
        assert_eq!(*view.open_calls.borrow(), vec![true, false, true]);
    }
}
