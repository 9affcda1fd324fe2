use thiserror::Error;
use wasm_bindgen::JsValue;

/// Why a page behavior was not mounted.
///
/// None of these are user-facing: the page renders fine without the
/// behavior, so the boot sequence only logs them at debug level.
#[derive(Debug, Error)]
pub enum Unavailable {
    #[error("no browser window")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    /// A required element is not on this page.
    #[error("required element `{0}` is absent")]
    MissingElement(&'static str),

    /// A collection the behavior works on is empty.
    #[error("no elements match `{0}`")]
    NoMatches(&'static str),

    #[error("browser does not support {0}")]
    Unsupported(&'static str),

    #[error("nothing configured for {0}")]
    EmptyConfig(&'static str),

    /// A DOM call failed while wiring the behavior up.
    #[error("DOM call failed: {0}")]
    Dom(String),
}

impl From<JsValue> for Unavailable {
    fn from(value: JsValue) -> Self {
        Unavailable::Dom(
            value
                .as_string()
                .unwrap_or_else(|| format!("{:?}", value)),
        )
    }
}
