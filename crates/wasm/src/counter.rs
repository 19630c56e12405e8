use std::cell::RefCell;
use std::rc::Rc;

use linebiz::config::{CounterSettings, RevealSettings};
use linebiz::counter::{CounterAnimation, CounterGuard, CounterTarget};
use web_sys::{Document, Element, Window};

use crate::dom;
use crate::error::DomResult;
use crate::frames;
use crate::reveal::OnceObserver;

const TARGET_ATTRIBUTE: &str = "data-target";
const ANIMATED_ATTRIBUTE: &str = "data-animated";

/// Prepares `.stat-number` elements and counts each one up the first time it
/// becomes visible.
pub(crate) fn install(
    window: &Window,
    document: &Document,
    settings: &CounterSettings,
    reveal: &RevealSettings,
) -> DomResult<Option<OnceObserver>> {
    let mut counters = Vec::new();
    for element in dom::query_all(document, &settings.selector) {
        let text = element.text_content().unwrap_or_default();
        if CounterTarget::parse(&text).is_none() {
            tracing::debug!(text = %text.trim(), "skipping non-numeric counter");
            continue;
        }
        if element
            .set_attribute(TARGET_ATTRIBUTE, text.trim())
            .is_err()
        {
            continue;
        }
        element.set_text_content(Some("0"));
        counters.push(element);
    }

    let guard: Rc<RefCell<CounterGuard<Element>>> = Rc::default();
    let duration_ms = settings.duration_ms;
    let easing = settings.easing;
    OnceObserver::install(
        window,
        counters,
        reveal.threshold,
        &reveal.root_margin,
        move |element| {
            let Some(target) = element
                .get_attribute(TARGET_ATTRIBUTE)
                .as_deref()
                .and_then(CounterTarget::parse)
            else {
                return;
            };
            if !guard.borrow_mut().begin(element.clone()) {
                return;
            }

            let mut animation = CounterAnimation::new(target, duration_ms, easing);
            let element = element.clone();
            let guard = guard.clone();
            frames::drive(move |timestamp| {
                let frame = animation.frame(timestamp);
                element.set_text_content(Some(&frame.text));
                if frame.done {
                    if element.set_attribute(ANIMATED_ATTRIBUTE, "true").is_err() {
                        tracing::debug!("could not mark counter as animated");
                    }
                    guard.borrow_mut().finish(&element);
                }
                frame.done
            });
        },
    )
}
