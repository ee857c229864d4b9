// Keyboard actions, default bindings and input contexts

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MenuToggle,
    MenuStats,
    SelectionCancel,
    CameraReset,
    ZoomIn,
    ZoomOut,
    Build(u32),
    Tower(u32),
    SendCreep(usize),
}

/// Lower variants win: a placement in progress takes Escape before the game
/// does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InputContext {
    TextInput,
    Modal,
    Placement,
    Game,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: &'static str,
    pub ctrl: Option<bool>,
    pub shift: Option<bool>,
    pub alt: Option<bool>,
}

impl KeyBinding {
    /// Plain key: Ctrl and Alt must be up, so browser shortcuts like
    /// Ctrl+W pass through. Shift is free since `+` needs it on most layouts.
    pub const fn key(key: &'static str) -> Self {
        Self {
            key,
            ctrl: Some(false),
            shift: None,
            alt: Some(false),
        }
    }

    pub const fn shift(key: &'static str) -> Self {
        Self {
            key,
            ctrl: Some(false),
            shift: Some(true),
            alt: Some(false),
        }
    }

    /// Key compares case-insensitively; a modifier only matters when the
    /// binding names it.
    pub fn matches(&self, key: &KeyPress) -> bool {
        if !self.key.eq_ignore_ascii_case(&key.key) {
            return false;
        }
        self.ctrl.is_none_or(|c| c == key.ctrl)
            && self.shift.is_none_or(|s| s == key.shift)
            && self.alt.is_none_or(|a| a == key.alt)
    }

    pub fn display(&self) -> String {
        let mut out = String::new();
        if self.ctrl == Some(true) {
            out.push_str("Ctrl+");
        }
        if self.shift == Some(true) {
            out.push_str("Shift+");
        }
        if self.alt == Some(true) {
            out.push_str("Alt+");
        }
        if self.key.chars().count() == 1 {
            out.push_str(&self.key.to_uppercase());
        } else {
            out.push_str(self.key);
        }
        out
    }
}

/// Browser-independent view of a keydown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyPress {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }
}

impl From<&web_sys::KeyboardEvent> for KeyPress {
    fn from(e: &web_sys::KeyboardEvent) -> Self {
        Self {
            key: e.key(),
            ctrl: e.ctrl_key(),
            shift: e.shift_key(),
            alt: e.alt_key(),
        }
    }
}

pub struct ActionMeta {
    pub action: InputAction,
    pub label: &'static str,
    pub binding: KeyBinding,
    pub contexts: &'static [InputContext],
}

const GAME: &[InputContext] = &[InputContext::Game];

/// Registry order breaks ties: first match wins.
pub const ACTIONS: [ActionMeta; 14] = [
    ActionMeta { action: InputAction::MenuToggle, label: "Toggle Menu", binding: KeyBinding::key("Escape"), contexts: &[InputContext::Game, InputContext::Modal] },
    ActionMeta { action: InputAction::SelectionCancel, label: "Cancel Selection", binding: KeyBinding::key("Escape"), contexts: &[InputContext::Placement] },
    ActionMeta { action: InputAction::MenuStats, label: "Quick Stats", binding: KeyBinding::key("Tab"), contexts: GAME },
    ActionMeta { action: InputAction::CameraReset, label: "Reset Camera", binding: KeyBinding::key("Home"), contexts: GAME },
    ActionMeta { action: InputAction::ZoomIn, label: "Zoom In", binding: KeyBinding::key("+"), contexts: GAME },
    ActionMeta { action: InputAction::ZoomOut, label: "Zoom Out", binding: KeyBinding::key("-"), contexts: GAME },
    ActionMeta { action: InputAction::Build(1), label: "Build Lumbercamp", binding: KeyBinding::key("Q"), contexts: GAME },
    ActionMeta { action: InputAction::Build(2), label: "Build Stone Quarry", binding: KeyBinding::key("W"), contexts: GAME },
    ActionMeta { action: InputAction::Build(3), label: "Build Gold Mine", binding: KeyBinding::key("E"), contexts: GAME },
    ActionMeta { action: InputAction::Tower(2), label: "Build Sniper Tower", binding: KeyBinding::shift("T"), contexts: GAME },
    ActionMeta { action: InputAction::Tower(1), label: "Build Basic Tower", binding: KeyBinding::key("T"), contexts: GAME },
    ActionMeta { action: InputAction::SendCreep(0), label: "Send Creep (Slot 1)", binding: KeyBinding::key("1"), contexts: GAME },
    ActionMeta { action: InputAction::SendCreep(1), label: "Send Creep (Slot 2)", binding: KeyBinding::key("2"), contexts: GAME },
    ActionMeta { action: InputAction::SendCreep(2), label: "Send Creep (Slot 3)", binding: KeyBinding::key("3"), contexts: GAME },
];

/// Stack of active contexts; the front one decides which bindings apply.
#[derive(Debug, Clone)]
pub struct InputState {
    stack: Vec<InputContext>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            stack: vec![InputContext::Game],
        }
    }
}

impl InputState {
    pub fn current(&self) -> InputContext {
        self.stack.first().copied().unwrap_or(InputContext::Game)
    }

    pub fn push(&mut self, ctx: InputContext) {
        if self.stack.first() == Some(&ctx) {
            return;
        }
        self.stack.retain(|c| *c != ctx);
        self.stack.insert(0, ctx);
    }

    pub fn pop(&mut self, ctx: InputContext) {
        self.stack.retain(|c| *c != ctx);
    }

    pub fn has(&self, ctx: InputContext) -> bool {
        self.stack.contains(&ctx)
    }

    pub fn resolve(&self, key: &KeyPress) -> Option<InputAction> {
        let ctx = self.current();
        if ctx == InputContext::TextInput {
            return None;
        }
        ACTIONS
            .iter()
            .filter(|m| m.contexts.contains(&ctx))
            .find(|m| m.binding.matches(key))
            .map(|m| m.action)
    }
}

pub fn action_meta(action: InputAction) -> Option<&'static ActionMeta> {
    ACTIONS.iter().find(|m| m.action == action)
}
