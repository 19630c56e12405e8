use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use js_sys::{Array, Reflect};
use linebiz::config::RevealSettings;
use linebiz::reveal::{RevealObserver, RevealOutcome, bottom_margin_px, intersection_ratio};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Window,
};

use crate::dom;
use crate::error::{DomResult, JsResultExt};

type RevealState = Rc<RefCell<RevealObserver<Element>>>;
type EntriesCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;
type ListenerSlot = Rc<RefCell<Vec<EventListener>>>;

/// Runs `on_reveal` once per element the first time it scrolls into view.
///
/// Uses `IntersectionObserver` when the browser has it and falls back to
/// geometry checks on scroll and resize.
pub(crate) struct OnceObserver {
    state: RevealState,
    observer: Option<IntersectionObserver>,
    _callback: Option<EntriesCallback>,
    fallback: ListenerSlot,
}

impl OnceObserver {
    /// Returns `None` for an empty element set; no observer is created then.
    pub(crate) fn install<F>(
        window: &Window,
        elements: Vec<Element>,
        threshold: f64,
        root_margin: &str,
        on_reveal: F,
    ) -> DomResult<Option<Self>>
    where
        F: Fn(&Element) + 'static,
    {
        if elements.is_empty() {
            return Ok(None);
        }

        let state: RevealState = Rc::new(RefCell::new(RevealObserver::new(threshold)));
        for element in &elements {
            state.borrow_mut().observe(element.clone());
        }
        let on_reveal = Rc::new(on_reveal);

        let native = Reflect::has(window.as_ref(), &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false);
        if native {
            Self::install_native(state, elements, root_margin, on_reveal).map(Some)
        } else {
            tracing::info!("IntersectionObserver unavailable, using scroll fallback");
            Ok(Some(Self::install_fallback(window, state, root_margin, on_reveal)))
        }
    }

    fn install_native(
        state: RevealState,
        elements: Vec<Element>,
        root_margin: &str,
        on_reveal: Rc<dyn Fn(&Element)>,
    ) -> DomResult<Self> {
        let callback_state = state.clone();
        let callback: EntriesCallback = Closure::new(
            move |entries: Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    let target = entry.target();
                    let outcome = callback_state.borrow_mut().on_intersection(
                        &target,
                        entry.is_intersecting(),
                        entry.intersection_ratio(),
                    );
                    if outcome == RevealOutcome::Revealed {
                        observer.unobserve(&target);
                        on_reveal(&target);
                    }
                }
                if callback_state.borrow().is_settled() {
                    observer.disconnect();
                }
            },
        );

        let options = IntersectionObserverInit::new();
        let threshold = state.borrow().threshold();
        options.set_threshold(&JsValue::from_f64(threshold));
        options.set_root_margin(root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .js_context("create-intersection-observer")?;
        for element in &elements {
            observer.observe(element);
        }

        Ok(Self {
            state,
            observer: Some(observer),
            _callback: Some(callback),
            fallback: ListenerSlot::default(),
        })
    }

    fn install_fallback(
        window: &Window,
        state: RevealState,
        root_margin: &str,
        on_reveal: Rc<dyn Fn(&Element)>,
    ) -> Self {
        let bottom_margin = bottom_margin_px(root_margin);
        let fallback = ListenerSlot::default();
        let check = {
            let state = state.clone();
            let window = window.clone();
            let listeners: Weak<RefCell<Vec<EventListener>>> = Rc::downgrade(&fallback);
            Rc::new(move || {
                let viewport = dom::viewport_height(&window);
                let pending = state.borrow().pending().cloned().collect::<Vec<_>>();
                for element in pending {
                    let rect = element.get_bounding_client_rect();
                    let ratio =
                        intersection_ratio(rect.top(), rect.bottom(), viewport, bottom_margin);
                    let outcome = state
                        .borrow_mut()
                        .on_intersection(&element, ratio > 0.0, ratio);
                    if outcome == RevealOutcome::Revealed {
                        on_reveal(&element);
                    }
                }
                if state.borrow().is_settled()
                    && let Some(listeners) = listeners.upgrade()
                {
                    // Removed after the current dispatch returns, never from
                    // inside the listener being run.
                    spawn_local(async move {
                        let detached = listeners.take();
                        tracing::debug!(listeners = detached.len(), "reveal fallback settled");
                    });
                }
            })
        };

        check();
        if !state.borrow().is_settled() {
            let listeners = ["scroll", "resize"]
                .into_iter()
                .map(|event| {
                    let check = check.clone();
                    EventListener::new(window, event, move |_event| check())
                })
                .collect();
            *fallback.borrow_mut() = listeners;
        }

        Self {
            state,
            observer: None,
            _callback: None,
            fallback,
        }
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.state.borrow().pending_count()
    }
}

impl Drop for OnceObserver {
    fn drop(&mut self) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
        self.fallback.borrow_mut().clear();
    }
}

/// Adds the revealed class to configured targets as they come into view.
pub(crate) fn install(
    window: &Window,
    document: &web_sys::Document,
    settings: &RevealSettings,
) -> DomResult<Option<OnceObserver>> {
    let mut targets: Vec<Element> = Vec::new();
    for selector in &settings.selectors {
        for element in dom::query_all(document, selector) {
            if !targets.contains(&element) {
                targets.push(element);
            }
        }
    }

    let revealed_class = settings.revealed_class.clone();
    let observer = OnceObserver::install(
        window,
        targets,
        settings.threshold,
        &settings.root_margin,
        move |element| dom::set_class(element, &revealed_class, true),
    )?;
    if let Some(observer) = &observer {
        tracing::debug!(targets = observer.pending_count(), "reveal observer installed");
    }
    Ok(observer)
}
