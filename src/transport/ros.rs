use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde_json::Value;

use super::link::{Link, WebSocketLink};
use super::protocol::{Incoming, Outgoing};
use crate::error::Result;

/// Lifecycle of the bridge connection as surfaced to the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Error,
    Closed,
}

type Handler = Rc<dyn Fn(&Value)>;
type StateListener = Rc<dyn Fn(ConnectionState)>;

struct Inner {
    state: ConnectionState,
    next_id: u64,
    /// Frames encoded before the socket opened. Only grows while connecting.
    pending: Vec<String>,
    handlers: HashMap<String, Vec<Handler>>,
    advertised: HashSet<String>,
    listeners: Vec<StateListener>,
}

/// Connection to a rosbridge server.
///
/// Everything is driven from browser callbacks on a single thread, so the
/// handle lives in an `Rc` and keeps its bookkeeping behind a `RefCell`.
/// Borrows never span a call into user handlers.
pub struct Ros {
    url: String,
    link: RefCell<Option<Box<dyn Link>>>,
    inner: RefCell<Inner>,
}

impl Ros {
    /// A handle with no link yet; frames queue until one is attached and opens.
    pub fn new(url: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            url: url.into(),
            link: RefCell::new(None),
            inner: RefCell::new(Inner {
                state: ConnectionState::Connecting,
                next_id: 0,
                pending: Vec::new(),
                handlers: HashMap::new(),
                advertised: HashSet::new(),
                listeners: Vec::new(),
            }),
        })
    }

    /// Open a WebSocket to `url`.
    pub fn connect(url: impl Into<String>) -> Result<Rc<Self>> {
        let ros = Self::new(url);
        tracing::info!("connecting to rosbridge at {}", ros.url);
        let link = WebSocketLink::open(&ros)?;
        ros.attach_link(Box::new(link));
        Ok(ros)
    }

    pub fn attach_link(&self, link: Box<dyn Link>) {
        *self.link.borrow_mut() = Some(link);
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.borrow().state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Register a connection lifecycle listener.
    pub fn on_connection_change(&self, listener: impl Fn(ConnectionState) + 'static) {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        let (pending, listeners) = {
            let mut inner = self.inner.borrow_mut();
            inner.state = state;
            let pending = match state {
                ConnectionState::Connecting => Vec::new(),
                ConnectionState::Connected => std::mem::take(&mut inner.pending),
                ConnectionState::Error | ConnectionState::Closed => {
                    let dropped = std::mem::take(&mut inner.pending);
                    if !dropped.is_empty() {
                        tracing::warn!("discarding {} unsent frames", dropped.len());
                    }
                    Vec::new()
                }
            };
            (pending, inner.listeners.clone())
        };
        for frame in pending {
            if let Err(e) = self.send_frame(&frame) {
                tracing::warn!("dropping queued frame: {}", e);
            }
        }
        for listener in listeners {
            listener(state);
        }
    }

    /// The socket reported an error; no further frames will go out.
    pub(crate) fn fail(&self, reason: &str) {
        tracing::error!("rosbridge error: {}", reason);
        self.set_state(ConnectionState::Error);
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    fn next_id(&self, prefix: &str, topic: &str) -> String {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        format!("{}:{}:{}", prefix, topic, inner.next_id)
    }

    fn send_frame(&self, frame: &str) -> Result<()> {
        match &*self.link.borrow() {
            Some(link) => link.send(frame),
            None => {
                self.inner.borrow_mut().pending.push(frame.to_string());
                Ok(())
            }
        }
    }

    /// Encode and send an operation. Frames queue while the socket is still
    /// opening and are dropped once it has failed or closed.
    pub fn send(&self, op: &Outgoing) -> Result<()> {
        let frame = serde_json::to_string(op)?;
        match self.state() {
            ConnectionState::Connected => self.send_frame(&frame),
            ConnectionState::Connecting => {
                self.inner.borrow_mut().pending.push(frame);
                Ok(())
            }
            state => {
                tracing::warn!("dropping frame while {:?}", state);
                Ok(())
            }
        }
    }

    /// Subscribe to raw JSON messages on `topic`.
    pub fn subscribe(
        &self,
        topic: &str,
        msg_type: &str,
        throttle_rate: u32,
        handler: impl Fn(&Value) + 'static,
    ) {
        let id = self.next_id("subscribe", topic);
        self.inner
            .borrow_mut()
            .handlers
            .entry(topic.to_string())
            .or_default()
            .push(Rc::new(handler));
        let op = Outgoing::Subscribe {
            id,
            topic: topic.to_string(),
            msg_type: msg_type.to_string(),
            throttle_rate,
            queue_length: 1,
        };
        if let Err(e) = self.send(&op) {
            tracing::warn!("subscribe to {} failed: {}", topic, e);
        }
    }

    /// Publish `msg` on `topic`, advertising the topic on first use.
    pub fn publish(&self, topic: &str, msg_type: &str, msg: Value) -> Result<()> {
        let first = self.inner.borrow_mut().advertised.insert(topic.to_string());
        if first {
            self.send(&Outgoing::Advertise {
                id: self.next_id("advertise", topic),
                topic: topic.to_string(),
                msg_type: msg_type.to_string(),
            })?;
        }
        self.send(&Outgoing::Publish {
            topic: topic.to_string(),
            msg,
        })
    }

    /// Route one text frame from the bridge.
    pub fn handle_text(&self, text: &str) {
        let frame: Incoming = match serde_json::from_str(text) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("malformed rosbridge frame: {}", e);
                return;
            }
        };
        match frame {
            Incoming::Publish { topic, msg } => {
                let handlers: Vec<Handler> = self
                    .inner
                    .borrow()
                    .handlers
                    .get(&topic)
                    .cloned()
                    .unwrap_or_default();
                if handlers.is_empty() {
                    tracing::debug!("no handler for {}", topic);
                }
                for handler in handlers {
                    handler(&msg);
                }
            }
            Incoming::Status { level, msg, id } => match level.as_str() {
                "error" => tracing::error!(?id, "rosbridge: {}", msg),
                "warning" => tracing::warn!(?id, "rosbridge: {}", msg),
                _ => tracing::info!(?id, "rosbridge: {}", msg),
            },
            Incoming::Unsupported => {}
        }
    }

    /// Close the socket. Listeners hear `Closed` once the browser confirms.
    pub fn close(&self) {
        if let Some(link) = &*self.link.borrow() {
            link.close();
        }
    }
}
