//! Stored login and the forced-logout path.

use serde::Deserialize;

use super::connection::{Credential, LogoutReason};

pub const USER_KEY: &str = "user";
pub const TAB_ID_KEY: &str = "turrest_tab_id";
pub const INVALIDATED_KEY: &str = "turrest_session_invalidated";
pub const LOGIN_ROUTE: &str = "/login";
pub const LOBBY_ROUTE: &str = "/";

pub trait SessionStore {
    fn credential(&self) -> Option<Credential>;
    fn tab_id(&mut self) -> String;
    /// Clears the stored login, remembers why, and leaves for the login page.
    fn force_logout(&mut self, reason: LogoutReason);
}

#[derive(Deserialize)]
struct StoredUser {
    id: String,
    username: String,
    token: String,
}

/// Parses the `user` entry written by the login page.
pub fn parse_stored_user(raw: &str) -> Option<Credential> {
    let user: StoredUser = serde_json::from_str(raw).ok()?;
    if user.token.is_empty() {
        return None;
    }
    Some(Credential {
        user_id: user.id,
        username: user.username,
        token: user.token,
    })
}

/// localStorage/sessionStorage backed session.
#[derive(Default)]
pub struct BrowserSession;

impl BrowserSession {
    fn local() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }

    fn per_tab() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.session_storage().ok().flatten())
    }

    /// Message left by a forced logout, consumed once.
    pub fn take_logout_message() -> Option<String> {
        let store = Self::per_tab()?;
        let msg = store.get_item(INVALIDATED_KEY).ok().flatten()?;
        let _ = store.remove_item(INVALIDATED_KEY);
        Some(msg)
    }
}

impl SessionStore for BrowserSession {
    fn credential(&self) -> Option<Credential> {
        let store = Self::local()?;
        let raw = store.get_item(USER_KEY).ok().flatten()?;
        let cred = parse_stored_user(&raw);
        if cred.is_none() {
            log::warn!("discarding unreadable stored user");
            let _ = store.remove_item(USER_KEY);
        }
        cred
    }

    fn tab_id(&mut self) -> String {
        let store = Self::per_tab();
        if let Some(existing) = store
            .as_ref()
            .and_then(|s| s.get_item(TAB_ID_KEY).ok().flatten())
            .filter(|id| !id.is_empty())
        {
            return existing;
        }
        let id = uuid::Uuid::new_v4().to_string();
        if let Some(s) = store {
            let _ = s.set_item(TAB_ID_KEY, &id);
        }
        id
    }

    fn force_logout(&mut self, reason: LogoutReason) {
        log::warn!("forced logout: {}", reason.message());
        if let Some(store) = Self::per_tab() {
            let _ = store.set_item(INVALIDATED_KEY, reason.message());
        }
        if let Some(store) = Self::local() {
            let _ = store.remove_item(USER_KEY);
        }
        if let Some(win) = web_sys::window() {
            if let Err(e) = win.location().set_href(LOGIN_ROUTE) {
                log::error!("navigation to {} failed: {:?}", LOGIN_ROUTE, e);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory session used by engine tests.
    #[derive(Default)]
    pub(crate) struct MemorySession {
        pub credential: Option<Credential>,
        pub logouts: Vec<LogoutReason>,
    }

    impl SessionStore for MemorySession {
        fn credential(&self) -> Option<Credential> {
            self.credential.clone()
        }

        fn tab_id(&mut self) -> String {
            "tab-test".into()
        }

        fn force_logout(&mut self, reason: LogoutReason) {
            self.credential = None;
            self.logouts.push(reason);
        }
    }

    #[test]
    fn stored_user_parses_and_rejects_blank_tokens() {
        let cred = parse_stored_user(r#"{"id":"7","username":"ada","token":"abc"}"#).unwrap();
        assert_eq!(cred.user_id, "7");
        assert_eq!(cred.token, "abc");
        assert!(parse_stored_user(r#"{"id":"7","username":"ada","token":""}"#).is_none());
        assert!(parse_stored_user("not json").is_none());
    }
}
