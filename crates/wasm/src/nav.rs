use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::future::TimeoutFuture;
use linebiz::config::NavSettings;
use linebiz::nav::{PRESS_SCALE, ScrollAnimation, ScrollChrome, fragment_target, scroll_target};
use linebiz::timing::Throttle;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlElement, Window};

use crate::dom;
use crate::frames::{self, FrameLoop};
use crate::menu::MenuBinding;

const IN_PAGE_LINKS: &str = "a[href^=\"#\"]";
const SCROLL_TOP_VISIBLE_CLASS: &str = "visible";

/// Smooth in-page navigation plus the scroll-driven header and back-to-top
/// button.
pub(crate) struct NavBinding {
    settings: NavSettings,
    window: Window,
    document: Document,
    header: Option<HtmlElement>,
    scroll_top: Option<Element>,
    menu: Rc<MenuBinding>,
    chrome: RefCell<ScrollChrome>,
    throttle: RefCell<Throttle>,
    active_scroll: RefCell<Option<FrameLoop>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl NavBinding {
    pub(crate) fn install(
        window: &Window,
        document: &Document,
        settings: &NavSettings,
        menu: Rc<MenuBinding>,
    ) -> Rc<Self> {
        let binding = Rc::new(Self {
            settings: settings.clone(),
            window: window.clone(),
            document: document.clone(),
            header: dom::by_id(document, &settings.header_id),
            scroll_top: dom::by_id(document, &settings.scroll_top_id),
            menu,
            chrome: RefCell::new(ScrollChrome::new(
                settings.scroll_top_threshold,
                settings.header_condense_threshold,
            )),
            throttle: RefCell::new(Throttle::new(settings.scroll_throttle_ms)),
            active_scroll: RefCell::default(),
            listeners: RefCell::default(),
        });
        binding.install_listeners();
        binding.refresh_chrome();
        binding
    }

    fn install_listeners(self: &Rc<Self>) {
        let mut listeners = Vec::new();

        for anchor in dom::query_all(&self.document, IN_PAGE_LINKS) {
            let binding = Rc::clone(self);
            let link = anchor.clone();
            listeners.push(EventListener::new_with_options(
                &anchor,
                "click",
                EventListenerOptions::enable_prevent_default(),
                move |event: &Event| {
                    event.prevent_default();
                    binding.follow_link(&link);
                },
            ));
        }

        if let Some(button) = &self.scroll_top {
            let binding = Rc::clone(self);
            listeners.push(EventListener::new(button, "click", move |_event| {
                binding.animate_to(0.0);
            }));
        }

        let binding = Rc::clone(self);
        listeners.push(EventListener::new(&self.window, "scroll", move |event: &Event| {
            if binding.throttle.borrow_mut().try_fire(event.time_stamp()) {
                binding.refresh_chrome();
            }
        }));

        *self.listeners.borrow_mut() = listeners;
    }

    /// Cancels any running scroll and removes every listener, releasing the
    /// references the closures hold on this binding.
    pub(crate) fn detach(&self) {
        if let Some(scroll) = self.active_scroll.borrow_mut().take() {
            scroll.cancel();
        }
        let listeners = self.listeners.take();
        tracing::debug!(listeners = listeners.len(), "navigation detached");
    }

    fn follow_link(self: &Rc<Self>, anchor: &Element) {
        let href = anchor.get_attribute("href").unwrap_or_default();
        let Some(id) = fragment_target(&href) else {
            return;
        };
        if !self.scroll_to_section(id) {
            return;
        }

        if anchor.class_list().contains(&self.settings.point_item_class) {
            self.press(anchor);
        }
        self.menu.close();
    }

    /// Scrolls so the element with `id` clears the fixed header. Returns
    /// false when no such element exists.
    pub(crate) fn scroll_to_section(self: &Rc<Self>, id: &str) -> bool {
        let Some(element) = self.document.get_element_by_id(id) else {
            tracing::debug!(id, "in-page link target missing");
            return false;
        };

        let header_height = self
            .header
            .as_ref()
            .map_or(0.0, |header| f64::from(header.offset_height()));
        let target = scroll_target(
            dom::document_top(&self.window, &element),
            header_height,
            self.settings.fixed_padding,
        );
        self.animate_to(target);
        true
    }

    fn animate_to(self: &Rc<Self>, target: f64) {
        let mut animation = ScrollAnimation::new(
            dom::scroll_y(&self.window),
            target,
            self.settings.scroll_duration_ms,
            self.settings.scroll_easing,
        );
        if animation.is_noop() {
            return;
        }

        if let Some(previous) = self.active_scroll.borrow_mut().take() {
            previous.cancel();
        }
        let window = self.window.clone();
        let frames = frames::drive(move |timestamp| {
            let frame = animation.frame(timestamp);
            window.scroll_to_with_x_and_y(0.0, frame.position);
            frame.done
        });
        *self.active_scroll.borrow_mut() = Some(frames);
    }

    fn press(&self, anchor: &Element) {
        let Some(item) = anchor.dyn_ref::<HtmlElement>().cloned() else {
            return;
        };
        dom::set_style(&item, "transform", &format!("scale({PRESS_SCALE})"));
        let restore_ms = self.settings.press_restore_ms;
        spawn_local(async move {
            TimeoutFuture::new(restore_ms).await;
            dom::set_style(&item, "transform", "");
        });
    }

    fn refresh_chrome(&self) {
        let change = self.chrome.borrow_mut().update(dom::scroll_y(&self.window));
        if let (Some(visible), Some(button)) = (change.scroll_top_visible, &self.scroll_top) {
            dom::set_class(button, SCROLL_TOP_VISIBLE_CLASS, visible);
        }
        if let (Some(condensed), Some(header)) = (change.header_condensed, &self.header) {
            dom::set_class(header, &self.settings.header_condensed_class, condensed);
        }
    }
}
