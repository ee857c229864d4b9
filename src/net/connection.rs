//! Connection lifecycle: open, authenticate, reconnect with backoff, give up.
//!
//! This type never touches the browser. It drives a [`Transport`] and turns
//! transport events into [`Effect`]s for the caller to carry out, so the
//! whole policy can be exercised with a mock transport.

use crate::error::{ClientError, ClientResult};
use crate::protocol::{SocketCommand, subject, topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
    ServerUnreachable,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting…",
            ConnectionState::Connected => "Connected",
            ConnectionState::Error => "Connection error",
            ConnectionState::ServerUnreachable => "Server unavailable",
        }
    }
}

/// Raw events reported by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Closed,
    Error(String),
}

pub trait Transport {
    fn open(&mut self, url: &str) -> ClientResult<()>;
    fn send(&mut self, frame: &str) -> ClientResult<()>;
    fn close(&mut self);
    fn is_open(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user_id: String,
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    CredentialRejected,
    ServerUnreachable,
}

impl LogoutReason {
    pub fn message(self) -> &'static str {
        match self {
            LogoutReason::CredentialRejected => "Your session is invalid. Please login again.",
            LogoutReason::ServerUnreachable => "Server is unavailable. Please try again later.",
        }
    }

    pub fn as_error(self, attempts: u32) -> ClientError {
        match self {
            LogoutReason::CredentialRejected => ClientError::CredentialRejected,
            LogoutReason::ServerUnreachable => ClientError::ServerUnreachable { attempts },
        }
    }
}

/// Work the connection asks its owner to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Dispatch(SocketCommand),
    ScheduleReconnect {
        delay_ms: u32,
        attempt: u32,
        generation: u64,
    },
    ForceLogout(LogoutReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_delay_ms: u32,
    pub max_attempts: u32,
}

impl BackoffPolicy {
    /// Delay before attempt `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn delay_for(&self, attempt: u32) -> u32 {
        let shift = attempt.saturating_sub(1).min(20);
        self.base_delay_ms.saturating_mul(1u32 << shift)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_attempts: 5,
        }
    }
}

pub struct Connection<T: Transport> {
    transport: T,
    url: String,
    state: ConnectionState,
    policy: BackoffPolicy,
    attempts: u32,
    credential_rejected: bool,
    manual_disconnect: bool,
    /// Bumped whenever pending reconnects must be abandoned.
    generation: u64,
    credential: Option<Credential>,
    tab_id: String,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T, url: impl Into<String>, policy: BackoffPolicy, tab_id: String) -> Self {
        Self {
            transport,
            url: url.into(),
            state: ConnectionState::Disconnected,
            policy,
            attempts: 0,
            credential_rejected: false,
            manual_disconnect: false,
            generation: 0,
            credential: None,
            tab_id,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[cfg(test)]
    pub fn is_credential_rejected(&self) -> bool {
        self.credential_rejected
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn set_credential(&mut self, credential: Option<Credential>) {
        self.credential = credential;
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// User-initiated connect. No-op while a socket is open or opening.
    pub fn connect(&mut self) -> Option<Effect> {
        self.manual_disconnect = false;
        self.credential_rejected = false;
        if self.state == ConnectionState::ServerUnreachable {
            self.attempts = 0;
            self.state = ConnectionState::Disconnected;
        }
        self.open()
    }

    fn open(&mut self) -> Option<Effect> {
        if self.state == ConnectionState::Connecting {
            return None;
        }
        if self.state == ConnectionState::Connected && self.transport.is_open() {
            return None;
        }
        self.state = ConnectionState::Connecting;
        match self.transport.open(&self.url) {
            Ok(()) => None,
            Err(e) => {
                log::error!("failed to open {}: {}", self.url, e);
                self.state = ConnectionState::Error;
                self.schedule_reconnect()
            }
        }
    }

    pub fn on_event(&mut self, event: TransportEvent) -> Option<Effect> {
        match event {
            TransportEvent::Opened => {
                self.state = ConnectionState::Connected;
                self.authenticate();
                None
            }
            TransportEvent::Message(raw) => self.on_message(&raw),
            TransportEvent::Closed => {
                if self.state == ConnectionState::ServerUnreachable {
                    return None;
                }
                if self.manual_disconnect || self.credential_rejected {
                    self.state = ConnectionState::Disconnected;
                    return None;
                }
                self.state = ConnectionState::Disconnected;
                self.schedule_reconnect()
            }
            TransportEvent::Error(reason) => {
                log::warn!("socket error: {}", reason);
                if self.state != ConnectionState::ServerUnreachable {
                    self.state = ConnectionState::Error;
                }
                None
            }
        }
    }

    fn authenticate(&mut self) {
        let Some(cred) = self.credential.as_ref() else {
            log::warn!("socket open without a credential; skipping login");
            return;
        };
        let login = SocketCommand::login(&cred.token, &cred.user_id, &self.tab_id);
        self.send(&login);
    }

    fn on_message(&mut self, raw: &str) -> Option<Effect> {
        if self.credential_rejected {
            return None;
        }
        let cmd = match SocketCommand::parse(raw) {
            Ok(cmd) => cmd,
            Err(e) => {
                log::warn!("dropping malformed frame ({}): {}", e, raw);
                return None;
            }
        };
        if cmd.is(subject::CORE, topic::TOKEN_INVALID) {
            log::warn!("server rejected the session credential");
            self.credential_rejected = true;
            self.generation += 1;
            self.transport.close();
            self.state = ConnectionState::Disconnected;
            self.credential = None;
            return Some(Effect::ForceLogout(LogoutReason::CredentialRejected));
        }
        self.attempts = 0;
        Some(Effect::Dispatch(cmd))
    }

    fn schedule_reconnect(&mut self) -> Option<Effect> {
        if self.credential_rejected || self.manual_disconnect {
            return None;
        }
        if self.attempts < self.policy.max_attempts {
            self.attempts += 1;
            let delay_ms = self.policy.delay_for(self.attempts);
            log::info!(
                "reconnecting in {}ms (attempt {}/{})",
                delay_ms,
                self.attempts,
                self.policy.max_attempts
            );
            return Some(Effect::ScheduleReconnect {
                delay_ms,
                attempt: self.attempts,
                generation: self.generation,
            });
        }
        log::warn!("giving up after {} reconnect attempts", self.attempts);
        self.state = ConnectionState::ServerUnreachable;
        self.generation += 1;
        self.credential = None;
        Some(Effect::ForceLogout(LogoutReason::ServerUnreachable))
    }

    /// Fired by the reconnect timer. Stale timers and sessions that were
    /// closed or rejected in the meantime do nothing.
    pub fn on_reconnect_due(&mut self, generation: u64) -> Option<Effect> {
        if generation != self.generation
            || self.manual_disconnect
            || self.credential_rejected
            || self.credential.is_none()
        {
            log::debug!("skipping stale reconnect (generation {})", generation);
            return None;
        }
        self.open()
    }

    /// Closes the transport. Safe to call when already disconnected.
    pub fn disconnect(&mut self) {
        self.manual_disconnect = true;
        self.generation += 1;
        self.transport.close();
        if self.state != ConnectionState::ServerUnreachable {
            self.state = ConnectionState::Disconnected;
        }
    }

    /// Sends a command. Returns `false` (with a warning) when not connected.
    pub fn send(&mut self, cmd: &SocketCommand) -> bool {
        if self.state != ConnectionState::Connected || !self.transport.is_open() {
            log::warn!("not connected; dropping {}/{}", cmd.subject, cmd.topic);
            return false;
        }
        let frame = match cmd.to_json() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("cannot encode {}/{}: {}", cmd.subject, cmd.topic, e);
                return false;
            }
        };
        match self.transport.send(&frame) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("send failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Default)]
    pub(crate) struct MockTransport {
        pub open: bool,
        pub opens: u32,
        pub fail_open: bool,
        pub sent: Vec<String>,
    }

    impl Transport for MockTransport {
        fn open(&mut self, _url: &str) -> ClientResult<()> {
            self.opens += 1;
            if self.fail_open {
                return Err(ClientError::Transport("refused".into()));
            }
            Ok(())
        }

        fn send(&mut self, frame: &str) -> ClientResult<()> {
            self.sent.push(frame.to_string());
            Ok(())
        }

        fn close(&mut self) {
            self.open = false;
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    fn credential() -> Credential {
        Credential {
            user_id: "u1".into(),
            username: "ada".into(),
            token: "tok".into(),
        }
    }

    fn connection() -> Connection<MockTransport> {
        let mut c = Connection::new(
            MockTransport::default(),
            "ws://test",
            BackoffPolicy::default(),
            "tab-1".into(),
        );
        c.set_credential(Some(credential()));
        c
    }

    fn open(c: &mut Connection<MockTransport>) {
        c.transport_mut().open = true;
        assert_eq!(c.on_event(TransportEvent::Opened), None);
    }

    #[test]
    fn open_sends_login_with_tab_id() {
        let mut c = connection();
        assert_eq!(c.connect(), None);
        assert_eq!(c.state(), ConnectionState::Connecting);
        open(&mut c);
        assert_eq!(c.state(), ConnectionState::Connected);
        let login = SocketCommand::parse(&c.transport().sent[0]).unwrap();
        assert!(login.is("SOCKET_CONNECT", "LOGIN"));
        assert_eq!(login.data["tabid"], "tab-1");
        assert_eq!(login.data["token"], "tok");
    }

    #[test]
    fn connect_is_idempotent_while_open() {
        let mut c = connection();
        c.connect();
        open(&mut c);
        assert_eq!(c.connect(), None);
        assert_eq!(c.transport().opens, 1);
    }

    #[test]
    fn backoff_doubles_then_forces_logout() {
        let mut c = connection();
        c.connect();
        let mut delays = Vec::new();
        loop {
            match c.on_event(TransportEvent::Closed) {
                Some(Effect::ScheduleReconnect { delay_ms, generation, .. }) => {
                    delays.push(delay_ms);
                    assert_eq!(c.on_reconnect_due(generation), None);
                }
                Some(Effect::ForceLogout(reason)) => {
                    assert_eq!(reason, LogoutReason::ServerUnreachable);
                    break;
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);
        assert_eq!(c.state(), ConnectionState::ServerUnreachable);
        assert!(c.credential().is_none());
        let opens = c.transport().opens;
        assert_eq!(c.on_event(TransportEvent::Closed), None);
        assert_eq!(c.on_reconnect_due(0), None);
        assert_eq!(c.transport().opens, opens);
    }

    #[test]
    fn any_dispatched_message_resets_attempts() {
        let mut c = connection();
        c.connect();
        let Some(Effect::ScheduleReconnect { generation, .. }) = c.on_event(TransportEvent::Closed)
        else {
            panic!("expected reconnect");
        };
        c.on_event(TransportEvent::Closed);
        assert_eq!(c.attempts(), 2);
        c.on_reconnect_due(generation);
        open(&mut c);
        assert_eq!(c.attempts(), 2);
        let effect = c.on_event(TransportEvent::Message(
            r#"{"subject":"GAME","topic":"COUNTDOWN","data":{"seconds":3}}"#.into(),
        ));
        assert!(matches!(effect, Some(Effect::Dispatch(_))));
        assert_eq!(c.attempts(), 0);
    }

    #[test]
    fn malformed_frames_are_dropped_without_resetting() {
        let mut c = connection();
        c.connect();
        c.on_event(TransportEvent::Closed);
        assert_eq!(c.on_event(TransportEvent::Message("{oops".into())), None);
        assert_eq!(c.attempts(), 1);
    }

    #[test]
    fn token_rejection_logs_out_and_never_reconnects() {
        let mut c = connection();
        c.connect();
        open(&mut c);
        let effect = c.on_event(TransportEvent::Message(
            r#"{"subject":"CORE","topic":"TOKEN_INVALID","data":{}}"#.into(),
        ));
        assert_eq!(effect, Some(Effect::ForceLogout(LogoutReason::CredentialRejected)));
        assert!(c.is_credential_rejected());
        assert_eq!(c.on_event(TransportEvent::Closed), None);
        assert_eq!(c.on_reconnect_due(0), None);
        assert_eq!(c.transport().opens, 1);
    }

    #[test]
    fn manual_disconnect_abandons_pending_reconnect() {
        let mut c = connection();
        c.connect();
        let Some(Effect::ScheduleReconnect { generation, .. }) = c.on_event(TransportEvent::Closed)
        else {
            panic!("expected reconnect");
        };
        c.disconnect();
        c.disconnect();
        assert_eq!(c.on_reconnect_due(generation), None);
        assert_eq!(c.on_event(TransportEvent::Closed), None);
        assert_eq!(c.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn open_failure_schedules_a_reconnect() {
        let mut c = connection();
        c.transport_mut().fail_open = true;
        let effect = c.connect();
        assert!(matches!(effect, Some(Effect::ScheduleReconnect { delay_ms: 1000, .. })));
        assert_eq!(c.state(), ConnectionState::Error);
    }

    #[test]
    fn send_while_disconnected_is_a_no_op() {
        let mut c = connection();
        assert!(!c.send(&SocketCommand::get_stats()));
        assert!(c.transport().sent.is_empty());
    }
}
