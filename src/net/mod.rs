pub mod channel;
pub mod connection;
pub mod session;
pub mod socket;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub use channel::{CommandChannel, SubscriptionId};
pub use connection::{
    BackoffPolicy, Connection, ConnectionState, Credential, Effect, LogoutReason, Transport,
    TransportEvent,
};
pub use session::{BrowserSession, SessionStore};
pub use socket::{TimeoutScheduler, WebSocketTransport};

/// Everything the browser callbacks report, queued until the next frame.
#[derive(Debug, Clone, PartialEq)]
pub enum NetEvent {
    Transport(TransportEvent),
    ReconnectDue(u64),
}

pub type Inbox = Rc<RefCell<VecDeque<NetEvent>>>;

pub fn new_inbox() -> Inbox {
    Rc::new(RefCell::new(VecDeque::new()))
}

pub trait ReconnectScheduler {
    fn schedule(&mut self, delay_ms: u32, generation: u64);
}
