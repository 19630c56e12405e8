use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::future::TimeoutFuture;
use linebiz::config::MenuSettings;
use linebiz::menu::{MenuEvent, MenuState, MobileMenu};
use linebiz::timing::Debounce;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, Node, Window};

use crate::dom;

/// Mobile navigation bound to the trigger and panel elements.
pub(crate) struct MenuBinding {
    menu: RefCell<MobileMenu>,
    resize: RefCell<Debounce>,
    toggle: Option<Element>,
    panel: Option<Element>,
    body: Option<HtmlElement>,
    active_class: String,
    listeners: RefCell<Vec<EventListener>>,
}

impl MenuBinding {
    pub(crate) fn install(
        window: &Window,
        document: &Document,
        settings: &MenuSettings,
        resize_debounce_ms: u32,
    ) -> Rc<Self> {
        let binding = Rc::new(Self {
            menu: RefCell::new(MobileMenu::new(settings.mobile_breakpoint)),
            resize: RefCell::new(Debounce::new(resize_debounce_ms)),
            toggle: dom::by_id(document, &settings.toggle_id),
            panel: dom::by_id(document, &settings.panel_id),
            body: document.body(),
            active_class: settings.active_class.clone(),
            listeners: RefCell::default(),
        });
        binding.install_listeners(window, document, &settings.link_selector);
        binding
    }

    fn install_listeners(self: &Rc<Self>, window: &Window, document: &Document, link_selector: &str) {
        let mut listeners = Vec::new();

        if let Some(toggle) = &self.toggle {
            let binding = Rc::clone(self);
            listeners.push(EventListener::new(toggle, "click", move |_event| {
                binding.apply(MenuEvent::Toggle);
            }));
        }

        if let Some(panel) = &self.panel {
            if let Ok(links) = panel.query_selector_all(link_selector) {
                for index in 0..links.length() {
                    let Some(link) = links.item(index) else {
                        continue;
                    };
                    let binding = Rc::clone(self);
                    listeners.push(EventListener::new(&link, "click", move |_event| {
                        binding.apply(MenuEvent::LinkSelected);
                    }));
                }
            }
        }

        let binding = Rc::clone(self);
        listeners.push(EventListener::new(document, "click", move |event: &Event| {
            if binding.is_open() && !binding.contains_target(event) {
                binding.apply(MenuEvent::OutsidePointer);
            }
        }));

        let binding = Rc::clone(self);
        listeners.push(EventListener::new(document, "keydown", move |event: &Event| {
            let is_escape = event
                .dyn_ref::<KeyboardEvent>()
                .is_some_and(|event| event.key() == "Escape");
            if is_escape {
                binding.apply(MenuEvent::Escape);
            }
        }));

        let binding = Rc::clone(self);
        let resize_window = window.clone();
        listeners.push(EventListener::new(window, "resize", move |_event| {
            binding.schedule_resize(resize_window.clone());
        }));

        *self.listeners.borrow_mut() = listeners;
    }

    fn schedule_resize(self: &Rc<Self>, window: Window) {
        let (ticket, delay_ms) = {
            let mut debounce = self.resize.borrow_mut();
            (debounce.arm(), debounce.delay_ms())
        };
        let binding = Rc::clone(self);
        spawn_local(async move {
            TimeoutFuture::new(delay_ms).await;
            if binding.resize.borrow().is_current(ticket) {
                let viewport_width = dom::viewport_width(&window);
                binding.apply(MenuEvent::Resized { viewport_width });
            }
        });
    }

    fn contains_target(&self, event: &Event) -> bool {
        let Some(target) = event.target().and_then(|target| target.dyn_into::<Node>().ok()) else {
            return false;
        };
        [&self.toggle, &self.panel]
            .into_iter()
            .flatten()
            .any(|element| element.contains(Some(&target)))
    }

    pub(crate) fn is_open(&self) -> bool {
        self.menu.borrow().is_open()
    }

    pub(crate) fn open(&self) {
        self.apply(MenuEvent::Open);
    }

    pub(crate) fn close(&self) {
        self.apply(MenuEvent::Close);
    }

    /// Closes the menu and removes every listener. The listener closures
    /// hold this binding, so clearing them is what lets it drop.
    pub(crate) fn detach(&self) {
        let change = self.menu.borrow_mut().stop();
        if let Some(state) = change {
            self.render(state);
        }
        let listeners = self.listeners.take();
        tracing::debug!(listeners = listeners.len(), "mobile menu detached");
    }

    fn apply(&self, event: MenuEvent) {
        let changed = self.menu.borrow_mut().apply(event);
        if let Some(state) = changed {
            self.render(state);
        }
    }

    fn render(&self, state: MenuState) {
        let open = state.is_open();
        for element in [&self.toggle, &self.panel].into_iter().flatten() {
            dom::set_class(element, &self.active_class, open);
        }
        if let Some(body) = &self.body {
            dom::set_style(body, "overflow", if open { "hidden" } else { "" });
        }
    }
}
