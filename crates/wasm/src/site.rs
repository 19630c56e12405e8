use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use gloo::events::EventListener;
use linebiz::config::CONFIG_ELEMENT_ID;
use linebiz::{ConfigStore, ErrorReporter, SiteConfig, TracingReporter};
use linebiz_storage::{JsonListStore, SubmissionRecord, SubmissionStore};
use snafu::ResultExt;

use crate::chat::ChatBinding;
use crate::effects::EffectsBinding;
use crate::error::{DomResult, StoreSnafu};
use crate::form::FormBinding;
use crate::menu::MenuBinding;
use crate::nav::NavBinding;
use crate::reveal::OnceObserver;
use crate::storage::LocalStorageBackend;
use crate::{counter, dom, monitor, reveal};

type DemoStore = JsonListStore<LocalStorageBackend>;

/// Every enhancement bound to the current page. [`Site::stop`] detaches
/// all listeners and observers; dropping a site stops it first.
pub struct Site {
    config: ConfigStore,
    store: Option<Rc<DemoStore>>,
    menu: Rc<MenuBinding>,
    nav: Rc<NavBinding>,
    reveal: RefCell<Option<OnceObserver>>,
    counters: RefCell<Option<OnceObserver>>,
    form: RefCell<Option<FormBinding>>,
    chat: RefCell<Option<ChatBinding>>,
    effects: RefCell<Option<EffectsBinding>>,
    monitor: RefCell<Vec<EventListener>>,
    stopped: Cell<bool>,
}

impl Site {
    /// Reads the inline config and binds every component present on the page.
    pub fn start() -> DomResult<Self> {
        Self::start_with_reporter(Rc::new(TracingReporter))
    }

    pub fn start_with_reporter(reporter: Rc<dyn ErrorReporter>) -> DomResult<Self> {
        let window = dom::window()?;
        let document = dom::document()?;

        let raw = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|element| element.text_content());
        let config = ConfigStore::load(raw.as_deref());
        let settings: Arc<SiteConfig> = config.current();

        let monitor = monitor::install(&window, reporter);
        let store = LocalStorageBackend::open(&window).map(|backend| Rc::new(JsonListStore::new(backend)));

        let reveal = reveal::install(&window, &document, &settings.reveal)?;
        let counters = counter::install(&window, &document, &settings.counter, &settings.reveal)?;
        // Installed after the fallible steps: these bindings only let go of
        // their listeners through `stop`.
        let menu = MenuBinding::install(
            &window,
            &document,
            &settings.menu,
            settings.nav.resize_debounce_ms,
        );
        let nav = NavBinding::install(&window, &document, &settings.nav, Rc::clone(&menu));
        let form = FormBinding::install(
            &window,
            &document,
            &settings.form,
            store.clone().map(|store| store as Rc<dyn SubmissionStore>),
        );
        let effects = EffectsBinding::install(
            &window,
            &document,
            &settings.effects,
            settings.nav.scroll_throttle_ms,
        );
        let chat = if settings.chat.enabled {
            match ChatBinding::install(&document, &settings.chat) {
                Ok(chat) => Some(chat),
                Err(error) => {
                    tracing::warn!(%error, "chat widget disabled");
                    None
                }
            }
        } else {
            None
        };

        tracing::info!(
            form = form.is_some(),
            chat = chat.is_some(),
            demo_store = store.is_some(),
            "site enhancements started"
        );
        Ok(Self {
            config,
            store,
            menu,
            nav,
            reveal: RefCell::new(reveal),
            counters: RefCell::new(counters),
            form: RefCell::new(form),
            chat: RefCell::new(chat),
            effects: RefCell::new(Some(effects)),
            monitor: RefCell::new(monitor),
            stopped: Cell::new(false),
        })
    }

    /// Closes the menu and chat panel, cancels any running scroll and
    /// detaches every listener and observer. Calling it again is a no-op.
    pub fn stop(&self) {
        if self.stopped.replace(true) {
            return;
        }
        self.menu.detach();
        self.nav.detach();
        if let Some(chat) = self.chat.take() {
            chat.close();
        }
        self.reveal.take();
        self.counters.take();
        self.form.take();
        self.effects.take();
        self.monitor.take();
        tracing::info!("site enhancements stopped");
    }

    pub fn config(&self) -> Arc<SiteConfig> {
        self.config.current()
    }

    pub fn scroll_to_section(&self, id: &str) -> bool {
        self.nav.scroll_to_section(id)
    }

    pub fn open_menu(&self) {
        self.menu.open();
    }

    pub fn close_menu(&self) {
        self.menu.close();
    }

    pub fn stored_submissions(&self) -> DomResult<Vec<SubmissionRecord>> {
        let Some(store) = &self.store else {
            return Ok(Vec::new());
        };
        store.list_submissions().context(StoreSnafu {
            stage: "list-stored-submissions",
        })
    }

    pub fn clear_stored_submissions(&self) -> DomResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        store.clear_submissions().context(StoreSnafu {
            stage: "clear-stored-submissions",
        })
    }
}

impl Drop for Site {
    fn drop(&mut self) {
        self.stop();
    }
}
