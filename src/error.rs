use thiserror::Error;

/// Errors raised by the rosbridge transport and its clients.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open websocket to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("websocket send failed: {0}")]
    Send(String),

    #[error("failed to encode message for {topic}: {source}")]
    Encode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode message on {topic}: {source}")]
    Decode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed rosbridge frame: {0}")]
    Frame(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Render a `JsValue` error for logs and error variants.
pub fn js_reason(value: &wasm_bindgen::JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
