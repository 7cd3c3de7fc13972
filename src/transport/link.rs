use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use super::ros::{ConnectionState, Ros};
use crate::error::{Error, Result, js_reason};

/// The byte pipe under a [`Ros`] handle.
pub trait Link {
    fn send(&self, frame: &str) -> Result<()>;
    fn close(&self);
}

/// Browser WebSocket carrying rosbridge text frames.
pub struct WebSocketLink {
    ws: WebSocket,
}

impl WebSocketLink {
    /// Open a socket to `ros.url()` and route its events into `ros`.
    pub fn open(ros: &Rc<Ros>) -> Result<Self> {
        let url = ros.url().to_string();
        let ws = WebSocket::new(&url).map_err(|e| Error::Connect {
            url: url.clone(),
            reason: js_reason(&e),
        })?;
        ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

        let weak: Weak<Ros> = Rc::downgrade(ros);
        let onopen = {
            let weak = weak.clone();
            let url = url.clone();
            Closure::wrap(Box::new(move |_: JsValue| {
                tracing::info!("rosbridge connected: {}", url);
                if let Some(ros) = weak.upgrade() {
                    ros.set_state(ConnectionState::Connected);
                }
            }) as Box<dyn FnMut(JsValue)>)
        };
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();

        let onmessage = {
            let weak = weak.clone();
            Closure::wrap(Box::new(move |e: MessageEvent| {
                if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
                    let text: String = text.into();
                    if let Some(ros) = weak.upgrade() {
                        ros.handle_text(&text);
                    }
                } else {
                    tracing::debug!("ignoring non-text rosbridge frame");
                }
            }) as Box<dyn FnMut(MessageEvent)>)
        };
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        let onerror = {
            let weak = weak.clone();
            // A socket `error` is a bare Event: no message, only its type
            Closure::wrap(Box::new(move |e: Event| {
                if let Some(ros) = weak.upgrade() {
                    ros.fail(&e.type_());
                }
            }) as Box<dyn FnMut(Event)>)
        };
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        let onclose = Closure::wrap(Box::new(move |e: CloseEvent| {
            tracing::info!("rosbridge closed (code {})", e.code());
            if let Some(ros) = weak.upgrade() {
                ros.set_state(ConnectionState::Closed);
            }
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();

        Ok(Self { ws })
    }
}

impl Link for WebSocketLink {
    fn send(&self, frame: &str) -> Result<()> {
        self.ws
            .send_with_str(frame)
            .map_err(|e| Error::Send(js_reason(&e)))
    }

    fn close(&self) {
        let _ = self.ws.close();
    }
}
