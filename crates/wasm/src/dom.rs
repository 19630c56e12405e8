use snafu::OptionExt;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, NodeList, Window};

use crate::error::{DomResult, JsResultExt, NoDocumentSnafu, NoWindowSnafu};

pub(crate) fn window() -> DomResult<Window> {
    web_sys::window().context(NoWindowSnafu { stage: "window" })
}

pub(crate) fn document() -> DomResult<Document> {
    window()?
        .document()
        .context(NoDocumentSnafu { stage: "document" })
}

/// Looks up an element by id; a miss is logged and yields `None`.
pub(crate) fn by_id<T>(document: &Document, id: &str) -> Option<T>
where
    T: JsCast,
{
    let found = document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<T>().ok());
    if found.is_none() {
        tracing::debug!(id, "element not present on this page");
    }
    found
}

/// All elements matching `selector` in the document. Invalid selectors match nothing.
pub(crate) fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    match document.query_selector_all(selector) {
        Ok(list) => elements(&list),
        Err(_) => {
            tracing::warn!(selector, "invalid selector");
            Vec::new()
        }
    }
}

/// Like [`query_all`], scoped to the descendants of `root`.
pub(crate) fn query_within(root: &Element, selector: &str) -> Vec<Element> {
    match root.query_selector_all(selector) {
        Ok(list) => elements(&list),
        Err(_) => {
            tracing::warn!(selector, "invalid selector");
            Vec::new()
        }
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn create(document: &Document, tag: &str, class: &str) -> DomResult<Element> {
    let element = document
        .create_element(tag)
        .js_context("create-element")?;
    element.set_class_name(class);
    Ok(element)
}

pub(crate) fn set_class(element: &Element, class: &str, on: bool) {
    let classes = element.class_list();
    let result = if on {
        classes.add_1(class)
    } else {
        classes.remove_1(class)
    };
    if result.is_err() {
        tracing::debug!(class, "class list rejected token");
    }
}

pub(crate) fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if element.style().set_property(property, value).is_err() {
        tracing::debug!(property, "style property rejected");
    }
}

pub(crate) fn scroll_y(window: &Window) -> f64 {
    window.scroll_y().unwrap_or(0.0)
}

pub(crate) fn viewport_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|height| height.as_f64())
        .unwrap_or(0.0)
}

pub(crate) fn viewport_width(window: &Window) -> f64 {
    window
        .inner_width()
        .ok()
        .and_then(|width| width.as_f64())
        .unwrap_or(0.0)
}

/// Document-relative top edge of an element.
pub(crate) fn document_top(window: &Window, element: &Element) -> f64 {
    element.get_bounding_client_rect().top() + scroll_y(window)
}
