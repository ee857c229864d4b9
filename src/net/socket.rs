//! Browser side of the connection: a `WebSocket` transport and a
//! `setTimeout` reconnect timer. Both only push into the shared inbox; the
//! frame loop drains it.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use super::connection::{Transport, TransportEvent};
use super::{Inbox, NetEvent, ReconnectScheduler};
use crate::error::{ClientError, ClientResult};

struct Handlers {
    _open: Closure<dyn FnMut(Event)>,
    _message: Closure<dyn FnMut(MessageEvent)>,
    _close: Closure<dyn FnMut(CloseEvent)>,
    _error: Closure<dyn FnMut(Event)>,
}

pub struct WebSocketTransport {
    inbox: Inbox,
    socket: Option<WebSocket>,
    handlers: Option<Handlers>,
}

impl WebSocketTransport {
    pub fn new(inbox: Inbox) -> Self {
        Self {
            inbox,
            socket: None,
            handlers: None,
        }
    }

    fn detach(&mut self) {
        if let Some(ws) = self.socket.take() {
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onclose(None);
            ws.set_onerror(None);
            let _ = ws.close();
        }
        self.handlers = None;
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, url: &str) -> ClientResult<()> {
        self.detach();
        let ws = WebSocket::new(url)?;

        let open = {
            let inbox = self.inbox.clone();
            Closure::wrap(Box::new(move |_e: Event| {
                inbox
                    .borrow_mut()
                    .push_back(NetEvent::Transport(TransportEvent::Opened));
            }) as Box<dyn FnMut(_)>)
        };
        let message = {
            let inbox = self.inbox.clone();
            Closure::wrap(Box::new(move |e: MessageEvent| {
                match e.data().as_string() {
                    Some(text) => inbox
                        .borrow_mut()
                        .push_back(NetEvent::Transport(TransportEvent::Message(text))),
                    None => log::warn!("ignoring non-text socket frame"),
                }
            }) as Box<dyn FnMut(_)>)
        };
        let close = {
            let inbox = self.inbox.clone();
            Closure::wrap(Box::new(move |e: CloseEvent| {
                log::info!("socket closed: {} {}", e.code(), e.reason());
                inbox
                    .borrow_mut()
                    .push_back(NetEvent::Transport(TransportEvent::Closed));
            }) as Box<dyn FnMut(_)>)
        };
        let error = {
            let inbox = self.inbox.clone();
            Closure::wrap(Box::new(move |e: Event| {
                inbox
                    .borrow_mut()
                    .push_back(NetEvent::Transport(TransportEvent::Error(e.type_())));
            }) as Box<dyn FnMut(_)>)
        };

        ws.set_onopen(Some(open.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(message.as_ref().unchecked_ref()));
        ws.set_onclose(Some(close.as_ref().unchecked_ref()));
        ws.set_onerror(Some(error.as_ref().unchecked_ref()));

        self.socket = Some(ws);
        self.handlers = Some(Handlers {
            _open: open,
            _message: message,
            _close: close,
            _error: error,
        });
        Ok(())
    }

    fn send(&mut self, frame: &str) -> ClientResult<()> {
        let ws = self.socket.as_ref().ok_or(ClientError::NotConnected)?;
        ws.send_with_str(frame)?;
        Ok(())
    }

    fn close(&mut self) {
        self.detach();
    }

    fn is_open(&self) -> bool {
        self.socket
            .as_ref()
            .is_some_and(|ws| ws.ready_state() == WebSocket::OPEN)
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Reconnect timer backed by `window.setTimeout`.
pub struct TimeoutScheduler {
    inbox: Inbox,
}

impl TimeoutScheduler {
    pub fn new(inbox: Inbox) -> Self {
        Self { inbox }
    }
}

impl ReconnectScheduler for TimeoutScheduler {
    fn schedule(&mut self, delay_ms: u32, generation: u64) {
        let Some(window) = web_sys::window() else {
            log::error!("no window; cannot schedule reconnect");
            return;
        };
        let inbox = self.inbox.clone();
        let cb = Closure::once_into_js(move || {
            inbox
                .borrow_mut()
                .push_back(NetEvent::ReconnectDue(generation));
        });
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        if let Err(e) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay)
        {
            log::error!("setTimeout failed: {:?}", e);
        }
    }
}
