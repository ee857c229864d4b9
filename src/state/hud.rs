// Overlay state: toasts, countdown, player hitpoints, game over, stats

use std::collections::BTreeMap;

use crate::model::GameOutcome;
use crate::protocol::GameStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub text: String,
    pub kind: ToastKind,
    pub expires_at_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    pub seconds: u32,
    pub started_at_ms: f64,
}

impl Countdown {
    /// Whole seconds left, rounded up; zero once elapsed.
    pub fn remaining(&self, now_ms: f64) -> u32 {
        let left_ms = self.seconds as f64 * 1000.0 - (now_ms - self.started_at_ms);
        if left_ms <= 0.0 {
            0
        } else {
            (left_ms / 1000.0).ceil() as u32
        }
    }
}

#[derive(Debug, Clone)]
pub struct HudState {
    toasts: Vec<Toast>,
    next_toast: u64,
    toast_duration_ms: f64,
    pub countdown: Option<Countdown>,
    pub player_hp: BTreeMap<u32, i32>,
    pub outcome: Option<GameOutcome>,
    pub stats: Option<GameStats>,
    version: u64,
}

impl Default for HudState {
    fn default() -> Self {
        Self::new(3000.0)
    }
}

impl HudState {
    pub fn new(toast_duration_ms: f64) -> Self {
        Self {
            toasts: Vec::new(),
            next_toast: 0,
            toast_duration_ms,
            countdown: None,
            player_hp: BTreeMap::new(),
            outcome: None,
            stats: None,
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn push_toast(&mut self, text: impl Into<String>, kind: ToastKind, now_ms: f64) -> u64 {
        self.next_toast += 1;
        self.toasts.push(Toast {
            id: self.next_toast,
            text: text.into(),
            kind,
            expires_at_ms: now_ms + self.toast_duration_ms,
        });
        self.version += 1;
        self.next_toast
    }

    /// Drops expired toasts. Returns whether any went.
    pub fn expire(&mut self, now_ms: f64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires_at_ms > now_ms);
        let changed = self.toasts.len() != before;
        if changed {
            self.version += 1;
        }
        changed
    }

    pub fn start_countdown(&mut self, seconds: u32, now_ms: f64) {
        self.countdown = Some(Countdown {
            seconds,
            started_at_ms: now_ms,
        });
        self.version += 1;
    }

    pub fn countdown_remaining(&self, now_ms: f64) -> Option<u32> {
        self.countdown
            .map(|c| c.remaining(now_ms))
            .filter(|left| *left > 0)
    }

    pub fn set_player_hp(&mut self, player_number: u32, hitpoints: i32) {
        self.player_hp.insert(player_number, hitpoints);
        self.version += 1;
    }

    pub fn set_outcome(&mut self, outcome: GameOutcome) {
        self.outcome = Some(outcome);
        self.version += 1;
    }

    pub fn set_stats(&mut self, stats: GameStats) {
        self.stats = Some(stats);
        self.version += 1;
    }

    pub fn clear_stats(&mut self) {
        if self.stats.take().is_some() {
            self.version += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_fixed_duration() {
        let mut hud = HudState::new(3000.0);
        hud.push_toast("Not enough resources", ToastKind::Error, 1000.0);
        assert!(!hud.expire(3999.0));
        assert_eq!(hud.toasts().len(), 1);
        assert!(hud.expire(4000.0));
        assert!(hud.toasts().is_empty());
    }

    #[test]
    fn countdown_rounds_up_and_ends() {
        let mut hud = HudState::default();
        hud.start_countdown(3, 0.0);
        assert_eq!(hud.countdown_remaining(0.0), Some(3));
        assert_eq!(hud.countdown_remaining(2500.0), Some(1));
        assert_eq!(hud.countdown_remaining(3000.0), None);
    }
}
