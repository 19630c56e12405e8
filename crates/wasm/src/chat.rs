use std::rc::Rc;

use gloo::events::EventListener;
use linebiz::OsDice;
use linebiz::chat::{ChatMessage, ChatSession, ChatView, KeywordResponder};
use linebiz::config::ChatSettings;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, KeyboardEvent};

use crate::dom;
use crate::error::{DomResult, JsResultExt, MissingElementSnafu};
use crate::runtime::{BrowserClock, GlooSleeper};

const BUTTON_ID: &str = "chatButton";
const WIDGET_ID: &str = "chatWidget";
const CLOSE_ID: &str = "closeChatBtn";
const CONTENT_ID: &str = "chatContent";
const INPUT_ID: &str = "chatInput";

struct DomChatView {
    document: Document,
    widget: HtmlElement,
    content: Element,
    input: HtmlInputElement,
}

impl DomChatView {
    fn bubble(&self, message: &ChatMessage) -> DomResult<Element> {
        let bubble = dom::create(&self.document, "div", message.author.css_class())?;
        for (index, line) in message.lines().enumerate() {
            if index > 0 {
                let line_break = self
                    .document
                    .create_element("br")
                    .js_context("create-chat-line-break")?;
                bubble
                    .append_child(&line_break)
                    .js_context("append-chat-line-break")?;
            }
            bubble
                .append_child(&self.document.create_text_node(line))
                .js_context("append-chat-text")?;
        }
        Ok(bubble)
    }
}

impl ChatView for DomChatView {
    fn render(&self, messages: &[ChatMessage]) {
        self.content.set_inner_html("");
        for message in messages {
            let placed = self.bubble(message).and_then(|bubble| {
                self.content
                    .append_child(&bubble)
                    .js_context("append-chat-message")
            });
            if let Err(error) = placed {
                tracing::debug!(id = message.id.0, %error, "could not render chat message");
            }
        }
        self.content.set_scroll_top(self.content.scroll_height());
    }

    fn clear_input(&self) {
        self.input.set_value("");
    }

    fn set_open(&self, open: bool) {
        dom::set_style(&self.widget, "display", if open { "flex" } else { "none" });
        if open && self.input.focus().is_err() {
            tracing::debug!("chat input refused focus");
        }
    }
}

/// Floating chat widget.
pub(crate) struct ChatBinding {
    session: Rc<ChatSession>,
    _listeners: Vec<EventListener>,
}

impl ChatBinding {
    pub(crate) fn install(document: &Document, settings: &ChatSettings) -> DomResult<Self> {
        ensure_widget(document, settings)?;

        let widget: HtmlElement = lookup(document, WIDGET_ID)?;
        let button: Element = lookup(document, BUTTON_ID)?;
        let close: Element = lookup(document, CLOSE_ID)?;
        let view = Rc::new(DomChatView {
            document: document.clone(),
            widget,
            content: lookup(document, CONTENT_ID)?,
            input: lookup(document, INPUT_ID)?,
        });

        let session = Rc::new(ChatSession::new(
            settings,
            Rc::new(KeywordResponder::new(Rc::new(OsDice))),
            Rc::new(GlooSleeper),
            Rc::new(BrowserClock),
            view.clone(),
        ));

        let mut listeners = Vec::new();
        let toggle_session = Rc::clone(&session);
        listeners.push(EventListener::new(&button, "click", move |_event| {
            toggle_session.toggle();
        }));

        let close_session = Rc::clone(&session);
        listeners.push(EventListener::new(&close, "click", move |_event| {
            close_session.close();
        }));

        let send_session = Rc::clone(&session);
        let input = view.input.clone();
        listeners.push(EventListener::new(&view.input, "keydown", move |event: &Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            // Enter while an IME is composing confirms the conversion.
            if event.key() != "Enter" || event.is_composing() {
                return;
            }
            let text = input.value();
            let session = Rc::clone(&send_session);
            spawn_local(async move {
                session.send_message(&text).await;
            });
        }));

        Ok(Self {
            session,
            _listeners: listeners,
        })
    }
}

impl ChatBinding {
    pub(crate) fn close(&self) {
        self.session.close();
    }
}

fn lookup<T>(document: &Document, id: &'static str) -> DomResult<T>
where
    T: JsCast,
{
    dom::by_id(document, id).ok_or_else(|| {
        MissingElementSnafu {
            stage: "bind-chat-widget",
            selector: format!("#{id}"),
        }
        .build()
    })
}

/// Builds the button and panel unless the page already ships them.
fn ensure_widget(document: &Document, settings: &ChatSettings) -> DomResult<()> {
    if document.get_element_by_id(WIDGET_ID).is_some() {
        return Ok(());
    }
    let body = document.body().ok_or_else(|| {
        MissingElementSnafu {
            stage: "create-chat-widget",
            selector: "body".to_string(),
        }
        .build()
    })?;

    let button = dom::create(document, "div", "chat-button")?;
    button.set_id(BUTTON_ID);
    button.set_text_content(Some("💬"));
    body.append_child(&button).js_context("append-chat-button")?;

    let widget = dom::create(document, "div", "chat-widget")?;
    widget.set_id(WIDGET_ID);
    if let Some(widget) = widget.dyn_ref::<HtmlElement>() {
        dom::set_style(widget, "display", "none");
    }

    let header = dom::create(document, "div", "chat-header")?;
    let title = dom::create(document, "span", "chat-title")?;
    title.set_text_content(Some(&settings.title));
    let close = dom::create(document, "span", "chat-close")?;
    close.set_id(CLOSE_ID);
    close.set_text_content(Some("×"));
    header.append_child(&title).js_context("build-chat-header")?;
    header.append_child(&close).js_context("build-chat-header")?;

    let content = dom::create(document, "div", "chat-content")?;
    content.set_id(CONTENT_ID);

    let input_row = dom::create(document, "div", "chat-input")?;
    let input = document
        .create_element("input")
        .js_context("create-chat-input")?;
    input.set_id(INPUT_ID);
    input
        .set_attribute("type", "text")
        .js_context("create-chat-input")?;
    input
        .set_attribute("placeholder", &settings.placeholder)
        .js_context("create-chat-input")?;
    input_row.append_child(&input).js_context("build-chat-input")?;

    for part in [&header, &content, &input_row] {
        widget.append_child(part).js_context("build-chat-widget")?;
    }
    body.append_child(&widget).js_context("append-chat-widget")?;
    tracing::debug!("chat widget created");
    Ok(())
}
