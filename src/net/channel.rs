use crate::protocol::SocketCommand;

pub type SubscriptionId = u64;

type Handler = Box<dyn FnMut(&SocketCommand)>;

struct Subscription {
    id: SubscriptionId,
    subject: Option<String>,
    topic: Option<String>,
    handler: Handler,
}

impl Subscription {
    fn matches(&self, cmd: &SocketCommand) -> bool {
        let subject_ok = self
            .subject
            .as_deref()
            .is_none_or(|s| s.eq_ignore_ascii_case(&cmd.subject));
        let topic_ok = self
            .topic
            .as_deref()
            .is_none_or(|t| t.eq_ignore_ascii_case(&cmd.topic));
        subject_ok && topic_ok
    }
}

/// Inbound publish/subscribe keyed by subject and topic. `None` on either
/// axis matches everything. Handlers run in subscription order, once per
/// command, in arrival order.
#[derive(Default)]
pub struct CommandChannel {
    subscriptions: Vec<Subscription>,
    next_id: SubscriptionId,
}

impl CommandChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        subject: Option<&str>,
        topic: Option<&str>,
        handler: impl FnMut(&SocketCommand) + 'static,
    ) -> SubscriptionId {
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id: self.next_id,
            subject: subject.map(str::to_string),
            topic: topic.map(str::to_string),
            handler: Box::new(handler),
        });
        self.next_id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Delivers to every matching handler; returns how many ran.
    pub fn dispatch(&mut self, cmd: &SocketCommand) -> usize {
        let mut delivered = 0;
        for sub in self.subscriptions.iter_mut() {
            if sub.matches(cmd) {
                (sub.handler)(cmd);
                delivered += 1;
            }
        }
        if delivered == 0 {
            log::debug!("no subscriber for {}/{}", cmd.subject, cmd.topic);
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn cmd(subject: &str, topic: &str) -> SocketCommand {
        SocketCommand::new(subject, topic, json!({}))
    }

    #[test]
    fn matching_is_case_insensitive_and_wildcards_axes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut ch = CommandChannel::new();
        for (label, subject, topic) in [
            ("exact", Some("game"), Some("countdown")),
            ("subject", Some("GAME"), None),
            ("all", None, None),
            ("other", Some("LOBBY"), None),
        ] {
            let seen = seen.clone();
            ch.subscribe(subject, topic, move |_| seen.borrow_mut().push(label));
        }
        assert_eq!(ch.dispatch(&cmd("GAME", "COUNTDOWN")), 3);
        assert_eq!(*seen.borrow(), vec!["exact", "subject", "all"]);
    }

    #[test]
    fn delivery_follows_arrival_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut ch = CommandChannel::new();
        let s = seen.clone();
        ch.subscribe(Some("GAME"), None, move |c| s.borrow_mut().push(c.topic.clone()));
        for t in ["A", "B", "C"] {
            ch.dispatch(&cmd("GAME", t));
        }
        assert_eq!(*seen.borrow(), vec!["A", "B", "C"]);
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving() {
        let count = Rc::new(RefCell::new(0));
        let mut ch = CommandChannel::new();
        let c = count.clone();
        let id = ch.subscribe(None, None, move |_| *c.borrow_mut() += 1);
        ch.dispatch(&cmd("X", "Y"));
        assert!(ch.unsubscribe(id));
        assert!(!ch.unsubscribe(id));
        ch.dispatch(&cmd("X", "Y"));
        assert_eq!(*count.borrow(), 1);
        assert!(ch.is_empty());
    }
}
