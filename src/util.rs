// Browser helpers: query strings and localStorage

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Value of `param` in a `?a=1&b=2` search string, percent-decoded.
pub fn parse_query_param(search: &str, param: &str) -> Option<String> {
    let search = search.trim_start_matches('?');
    for pair in search.split('&') {
        let mut parts = pair.splitn(2, '=');
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            if key == param {
                return Some(decode_value(value));
            }
        }
    }
    None
}

/// Form-style decoding: `+` is a space. Undecodable input is kept verbatim.
fn decode_value(value: &str) -> String {
    let spaced = value.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::warn!("query value {:?} is not UTF-8: {}", value, e);
            value.to_string()
        }
    }
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn load_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let raw = storage()?.get_item(key).ok().flatten()?;
    serde_json::from_str(&raw).ok()
}

pub fn store_json<T: Serialize>(key: &str, value: &T) {
    if let (Some(store), Ok(raw)) = (storage(), serde_json::to_string(value)) {
        let _ = store.set_item(key, &raw);
    }
}
