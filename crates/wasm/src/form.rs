use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use linebiz::config::FormSettings;
use linebiz::form::{
    BannerId, BannerKind, ContactFlow, FieldKind, FormField, FormView, SimulatedTransport,
    format_phone_input,
};
use linebiz::{OsDice, Sleeper};
use linebiz_storage::{SubmissionContext, SubmissionStore};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, Window,
};

use crate::dom;
use crate::runtime::{BrowserClock, GlooSleeper};

const CONTROLS: &str = "input[name], select[name], textarea[name]";
const FIELD_ERROR_CLASS: &str = "field-error";
const FIELD_INVALID_CLASS: &str = "error";
const ERROR_BORDER: &str = "#f44336";

/// Contact form as seen through the DOM.
pub(crate) struct DomFormView {
    window: Window,
    document: Document,
    form: HtmlFormElement,
    submit: Option<HtmlButtonElement>,
    loading_label: String,
    fade_ms: u32,
    idle_label: RefCell<Option<String>>,
    banner: RefCell<Option<(BannerId, Element)>>,
}

impl DomFormView {
    fn control(&self, name: &str) -> Option<Element> {
        self.form
            .query_selector(&format!("[name=\"{name}\"]"))
            .ok()
            .flatten()
    }

    fn error_node(field: &Element) -> Option<Element> {
        field
            .next_element_sibling()
            .filter(|sibling| sibling.class_list().contains(FIELD_ERROR_CLASS))
    }
}

/// Reads one named control; buttons and unchecked boxes carry no value.
fn read_control(element: &Element) -> Option<FormField> {
    let name = element.get_attribute("name")?;
    let (value, kind) = if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        let input_type = input.type_();
        match input_type.as_str() {
            "submit" | "button" | "reset" | "image" | "file" => return None,
            "checkbox" | "radio" if !input.checked() => return None,
            _ => (input.value(), FieldKind::from_input_type(&input_type)),
        }
    } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        (select.value(), FieldKind::Text)
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        (area.value(), FieldKind::Text)
    } else {
        return None;
    };

    let mut field = FormField::new(name, value).with_kind(kind);
    field.required = element.has_attribute("required");
    Some(field)
}

impl FormView for DomFormView {
    fn fields(&self) -> Vec<FormField> {
        dom::query_within(&self.form, CONTROLS)
            .iter()
            .filter_map(read_control)
            .collect()
    }

    fn context(&self) -> SubmissionContext {
        SubmissionContext {
            user_agent: self.window.navigator().user_agent().unwrap_or_default(),
            referrer: self.document.referrer(),
            url: self.document.url().unwrap_or_default(),
        }
    }

    fn show_field_error(&self, name: &str, message: &str) {
        let Some(field) = self.control(name) else {
            return;
        };
        self.clear_field_error(name);

        dom::set_class(&field, FIELD_INVALID_CLASS, true);
        if let Some(field) = field.dyn_ref::<HtmlElement>() {
            dom::set_style(field, "border-color", ERROR_BORDER);
        }
        let Ok(node) = dom::create(&self.document, "div", FIELD_ERROR_CLASS) else {
            return;
        };
        node.set_text_content(Some(message));
        if field.after_with_node_1(&node).is_err() {
            tracing::debug!(name, "could not place field error");
        }
    }

    fn clear_field_error(&self, name: &str) {
        let Some(field) = self.control(name) else {
            return;
        };
        dom::set_class(&field, FIELD_INVALID_CLASS, false);
        if let Some(field) = field.dyn_ref::<HtmlElement>() {
            dom::set_style(field, "border-color", "");
        }
        if let Some(node) = Self::error_node(&field) {
            node.remove();
        }
    }

    fn set_busy(&self, busy: bool) {
        let Some(button) = &self.submit else {
            return;
        };
        if busy {
            self.idle_label.replace(Some(button.inner_html()));
            button.set_disabled(true);
            button.set_inner_html(&self.loading_label);
        } else {
            if let Some(label) = self.idle_label.take() {
                button.set_inner_html(&label);
            }
            button.set_disabled(false);
        }
    }

    fn clear_fields(&self) {
        self.form.reset();
    }

    fn show_banner(&self, id: BannerId, kind: BannerKind, text: &str) {
        if let Some((_, previous)) = self.banner.take() {
            previous.remove();
        }

        let class = match kind {
            BannerKind::Success => "form-message form-success",
            BannerKind::Error => "form-message form-error",
        };
        let Ok(node) = dom::create(&self.document, "div", class) else {
            return;
        };
        node.set_text_content(Some(text));
        if let Some(node) = node.dyn_ref::<HtmlElement>() {
            dom::set_style(node, "transition", &format!("opacity {}ms", self.fade_ms));
        }
        if self.form.prepend_with_node_1(&node).is_err() {
            tracing::debug!("could not place form banner");
            return;
        }
        self.banner.replace(Some((id, node)));
    }

    fn fade_banner(&self, id: BannerId) {
        if let Some((current, node)) = self.banner.borrow().as_ref()
            && *current == id
            && let Some(node) = node.dyn_ref::<HtmlElement>()
        {
            dom::set_style(node, "opacity", "0");
        }
    }

    fn remove_banner(&self, id: BannerId) {
        let mut banner = self.banner.borrow_mut();
        if banner.as_ref().is_some_and(|(current, _)| *current == id)
            && let Some((_, node)) = banner.take()
        {
            node.remove();
        }
    }
}

/// Contact form wiring: submit, blur validation, edit clearing, phone assist.
pub(crate) struct FormBinding {
    _flow: Rc<ContactFlow>,
    _listeners: Vec<EventListener>,
}

impl FormBinding {
    /// Returns `None` on pages without the contact form.
    pub(crate) fn install(
        window: &Window,
        document: &Document,
        settings: &FormSettings,
        store: Option<Rc<dyn SubmissionStore>>,
    ) -> Option<Self> {
        let form: HtmlFormElement = dom::by_id(document, &settings.form_id)?;
        let submit = form
            .query_selector(&settings.submit_selector)
            .ok()
            .flatten()
            .and_then(|button| button.dyn_into::<HtmlButtonElement>().ok());

        let view = Rc::new(DomFormView {
            window: window.clone(),
            document: document.clone(),
            form: form.clone(),
            submit,
            loading_label: settings.loading_label.clone(),
            fade_ms: settings.banner_fade_ms,
            idle_label: RefCell::default(),
            banner: RefCell::default(),
        });

        let sleeper: Rc<dyn Sleeper> = Rc::new(GlooSleeper);
        let mut transport = SimulatedTransport::new(sleeper.clone(), Rc::new(OsDice), settings.send_delay_ms)
            .with_success_rate(settings.success_rate);
        if let Some(store) = store.filter(|_| settings.persist_submissions) {
            transport = transport.with_store(store);
        }
        let flow = Rc::new(ContactFlow::new(
            settings,
            Rc::new(transport),
            sleeper,
            Rc::new(BrowserClock),
            view,
        ));

        let listeners = Self::listeners(&form, &flow, settings.phone_assist);
        tracing::debug!(form = %settings.form_id, "contact form bound");
        Some(Self {
            _flow: flow,
            _listeners: listeners,
        })
    }

    fn listeners(
        form: &HtmlFormElement,
        flow: &Rc<ContactFlow>,
        phone_assist: bool,
    ) -> Vec<EventListener> {
        let mut listeners = Vec::new();

        let submit_flow = Rc::clone(flow);
        listeners.push(EventListener::new_with_options(
            form,
            "submit",
            EventListenerOptions::enable_prevent_default(),
            move |event: &Event| {
                event.prevent_default();
                let flow = Rc::clone(&submit_flow);
                spawn_local(async move {
                    flow.submit().await;
                });
            },
        ));

        // `blur` does not bubble; `focusout` does.
        let blur_flow = Rc::clone(flow);
        listeners.push(EventListener::new(form, "focusout", move |event: &Event| {
            if let Some(field) = event_control(event).as_ref().and_then(read_control) {
                blur_flow.check_field(&field);
            }
        }));

        let input_flow = Rc::clone(flow);
        listeners.push(EventListener::new(form, "input", move |event: &Event| {
            let Some(control) = event_control(event) else {
                return;
            };
            if let Some(name) = control.get_attribute("name") {
                input_flow.field_edited(&name);
            }
            if phone_assist
                && let Some(input) = control.dyn_ref::<HtmlInputElement>()
                && input.type_() == "tel"
            {
                let formatted = format_phone_input(&input.value());
                if formatted != input.value() {
                    input.set_value(&formatted);
                }
            }
        }));

        listeners
    }
}

fn event_control(event: &Event) -> Option<Element> {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .filter(|element| element.has_attribute("name"))
}
