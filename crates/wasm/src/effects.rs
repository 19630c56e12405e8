use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::future::TimeoutFuture;
use linebiz::config::EffectsSettings;
use linebiz::effects::{FocusMode, FocusTracker, Typewriter, parallax_transform};
use linebiz::timing::Throttle;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, Window};

use crate::dom;

struct TypewriterRun {
    element: Element,
    text: String,
    cancelled: Cell<bool>,
}

/// Typewriter headlines, parallax layers and the keyboard-focus body class.
pub(crate) struct EffectsBinding {
    typewriters: Vec<Rc<TypewriterRun>>,
    _listeners: Vec<EventListener>,
}

impl EffectsBinding {
    pub(crate) fn install(
        window: &Window,
        document: &Document,
        settings: &EffectsSettings,
        scroll_throttle_ms: u32,
    ) -> Self {
        let typewriters = start_typewriters(document, settings);

        let mut listeners = Vec::new();
        listeners.extend(parallax_listener(window, document, settings, scroll_throttle_ms));
        if let Some(body) = document.body() {
            listeners.extend(focus_listeners(document, body, &settings.keyboard_class));
        }

        tracing::debug!(
            typewriters = typewriters.len(),
            listeners = listeners.len(),
            "effects installed"
        );
        Self {
            typewriters,
            _listeners: listeners,
        }
    }
}

impl Drop for EffectsBinding {
    fn drop(&mut self) {
        // Unfinished headlines get their full text back.
        for run in &self.typewriters {
            run.cancelled.set(true);
            run.element.set_text_content(Some(&run.text));
        }
    }
}

fn start_typewriters(document: &Document, settings: &EffectsSettings) -> Vec<Rc<TypewriterRun>> {
    dom::query_all(document, &settings.typewriter_selector)
        .into_iter()
        .map(|element| {
            let text = element.text_content().unwrap_or_default();
            element.set_text_content(Some(""));
            let run = Rc::new(TypewriterRun {
                element,
                text,
                cancelled: Cell::new(false),
            });

            let steps = Typewriter::new(
                run.text.clone(),
                settings.typewriter_start_delay_ms,
                settings.typewriter_char_delay_ms,
            );
            let task = Rc::clone(&run);
            spawn_local(async move {
                for step in steps {
                    TimeoutFuture::new(step.delay_ms).await;
                    if task.cancelled.get() {
                        return;
                    }
                    task.element.set_text_content(Some(&step.shown));
                }
            });
            run
        })
        .collect()
}

fn parallax_listener(
    window: &Window,
    document: &Document,
    settings: &EffectsSettings,
    scroll_throttle_ms: u32,
) -> Option<EventListener> {
    let mut layers = Vec::new();
    for layer in &settings.parallax {
        let Some(element) = document
            .query_selector(&layer.selector)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        if let Some(transition) = &layer.transition {
            dom::set_style(&element, "transition", transition);
        }
        layers.push((element, layer.speed));
    }
    if layers.is_empty() {
        return None;
    }

    let throttle = RefCell::new(Throttle::new(scroll_throttle_ms));
    let scroll_window = window.clone();
    Some(EventListener::new(window, "scroll", move |event: &Event| {
        if !throttle.borrow_mut().try_fire(event.time_stamp()) {
            return;
        }
        let scroll_y = dom::scroll_y(&scroll_window);
        for (element, speed) in &layers {
            dom::set_style(element, "transform", &parallax_transform(scroll_y, *speed));
        }
    }))
}

fn focus_listeners(document: &Document, body: HtmlElement, class: &str) -> [EventListener; 2] {
    let tracker = Rc::new(RefCell::new(FocusTracker::default()));
    let apply = {
        let class = class.to_string();
        Rc::new(move |mode: Option<FocusMode>| {
            if let Some(mode) = mode {
                dom::set_class(&body, &class, mode == FocusMode::Keyboard);
            }
        })
    };

    let key_tracker = Rc::clone(&tracker);
    let key_apply = Rc::clone(&apply);
    let on_key = EventListener::new(document, "keydown", move |event: &Event| {
        if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
            key_apply(key_tracker.borrow_mut().on_key(&event.key()));
        }
    });

    let on_pointer = EventListener::new(document, "mousedown", move |_event| {
        apply(tracker.borrow_mut().on_pointer_down());
    });

    [on_key, on_pointer]
}
