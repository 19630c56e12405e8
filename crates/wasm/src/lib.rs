//! Browser binding for the `linebiz` page enhancements.

use std::cell::RefCell;

use gloo::events::EventListener;
use serde::Serialize;
use snafu::ResultExt;
use wasm_bindgen::prelude::*;

mod chat;
mod counter;
mod dom;
mod effects;
pub mod error;
mod form;
mod frames;
mod menu;
mod monitor;
mod nav;
mod reveal;
pub mod runtime;
mod site;
pub mod storage;

pub use error::{DomError, DomResult};
pub use site::Site;

use error::ConvertSnafu;

thread_local! {
    static SITE: RefCell<Option<Site>> = const { RefCell::new(None) };
}

/// Initialize WASM module
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("linebiz WASM module initialized");

    let document = match dom::document() {
        Ok(document) => document,
        Err(error) => {
            tracing::error!(%error, "no document to enhance");
            return;
        }
    };
    if document.ready_state() == "loading" {
        EventListener::once(&document, "DOMContentLoaded", |_event| boot()).forget();
    } else {
        boot();
    }
}

fn boot() {
    match Site::start() {
        Ok(site) => SITE.with(|slot| *slot.borrow_mut() = Some(site)),
        Err(error) => tracing::error!(%error, "failed to start site enhancements"),
    }
}

fn with_site<R>(action: impl FnOnce(&Site) -> R) -> Option<R> {
    SITE.with(|slot| slot.borrow().as_ref().map(action))
}

/// Smoothly scrolls to the section with the given element id.
#[wasm_bindgen]
pub fn scroll_to_section(id: &str) -> bool {
    with_site(|site| site.scroll_to_section(id)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn open_mobile_menu() {
    with_site(Site::open_menu);
}

#[wasm_bindgen]
pub fn close_mobile_menu() {
    with_site(Site::close_menu);
}

/// Detaches every enhancement from the page. A later `start` is not
/// supported; reload the page instead.
#[wasm_bindgen]
pub fn stop_site() {
    let site = SITE.with(|slot| slot.borrow_mut().take());
    if let Some(site) = site {
        site.stop();
    }
}

/// Demo-store submissions as a plain JSON array.
#[wasm_bindgen]
pub fn stored_submissions() -> Result<JsValue, JsValue> {
    let records = with_site(Site::stored_submissions)
        .transpose()?
        .unwrap_or_default();
    let value = records
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .context(ConvertSnafu {
            stage: "serialize-stored-submissions",
        })?;
    Ok(value)
}

#[wasm_bindgen]
pub fn clear_stored_submissions() -> Result<(), JsValue> {
    with_site(Site::clear_stored_submissions)
        .transpose()?
        .unwrap_or_default();
    Ok(())
}
