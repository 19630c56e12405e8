use std::rc::Rc;

use gloo::events::EventListener;
use js_sys::Reflect;
use linebiz::{ErrorMonitor, ErrorReport, ErrorReporter, PageContext};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{ErrorEvent, Event, PromiseRejectionEvent, Window};

use crate::error::js_details;
use crate::runtime::BrowserClock;

/// Forwards uncaught errors and unhandled promise rejections to `reporter`.
pub(crate) fn install(window: &Window, reporter: Rc<dyn ErrorReporter>) -> Vec<EventListener> {
    let page = PageContext {
        url: window.location().href().unwrap_or_default(),
        user_agent: window.navigator().user_agent().unwrap_or_default(),
    };
    let monitor = Rc::new(ErrorMonitor::new(reporter, Rc::new(BrowserClock), page));

    let error_monitor = Rc::clone(&monitor);
    let on_error = EventListener::new(window, "error", move |event: &Event| {
        let report = match event.dyn_ref::<ErrorEvent>() {
            Some(event) => ErrorReport::uncaught(event.message())
                .at(event.filename(), event.lineno(), event.colno())
                .with_stack(stack_of(&event.error())),
            // Resource load failures arrive as plain events.
            None => ErrorReport::uncaught(format!("{} event", event.type_())),
        };
        error_monitor.record(report);
    });

    let on_rejection = EventListener::new(window, "unhandledrejection", move |event: &Event| {
        let report = match event.dyn_ref::<PromiseRejectionEvent>() {
            Some(event) => {
                let reason = event.reason();
                ErrorReport::unhandled_rejection(js_details(&reason)).with_stack(stack_of(&reason))
            }
            None => ErrorReport::unhandled_rejection(String::new()),
        };
        monitor.record(report);
    });

    vec![on_error, on_rejection]
}

fn stack_of(value: &JsValue) -> Option<String> {
    if !value.is_object() {
        return None;
    }
    Reflect::get(value, &JsValue::from_str("stack"))
        .ok()
        .and_then(|stack| stack.as_string())
}
