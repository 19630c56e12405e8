use snafu::Snafu;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DomError {
    #[snafu(display("browser window is unavailable on `{stage}`"))]
    NoWindow { stage: &'static str },
    #[snafu(display("document is unavailable on `{stage}`"))]
    NoDocument { stage: &'static str },
    #[snafu(display("element `{selector}` not found on `{stage}`"))]
    MissingElement {
        stage: &'static str,
        selector: String,
    },
    #[snafu(display("browser call failed on `{stage}`: {details}"))]
    Js {
        stage: &'static str,
        details: String,
    },
    #[snafu(display("demo store failed on `{stage}`: {source}"))]
    Store {
        stage: &'static str,
        source: linebiz_storage::StorageError,
    },
    #[snafu(display("failed to convert value for JavaScript on `{stage}`: {source}"))]
    Convert {
        stage: &'static str,
        source: serde_wasm_bindgen::Error,
    },
}

pub type DomResult<T> = Result<T, DomError>;

impl From<DomError> for JsValue {
    fn from(error: DomError) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}

/// Best-effort text for a thrown JavaScript value.
pub(crate) fn js_details(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

pub(crate) trait JsResultExt<T> {
    fn js_context(self, stage: &'static str) -> DomResult<T>;
}

impl<T> JsResultExt<T> for Result<T, JsValue> {
    fn js_context(self, stage: &'static str) -> DomResult<T> {
        self.map_err(|value| {
            JsSnafu {
                stage,
                details: js_details(&value),
            }
            .build()
        })
    }
}
