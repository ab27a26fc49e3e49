use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};
pub use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Down,
    Up,
}

/// One discrete press or release, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub state: KeyState,
}

impl KeyEvent {
    pub fn down(key: KeyCode) -> Self { Self { key, state: KeyState::Down } }
    pub fn up(key: KeyCode) -> Self { Self { key, state: KeyState::Up } }
    pub fn is_down(&self) -> bool { self.state == KeyState::Down }
    pub fn is_up(&self) -> bool { self.state == KeyState::Up }
}

/// Raw keyboard state for a single tick.
#[derive(Debug, Default)]
pub struct InputState {
    pub keys_held: HashSet<KeyCode>,
    pub keys_pressed: HashSet<KeyCode>,
    pub keys_released: HashSet<KeyCode>,
    /// Press/release events since the last tick.
    pub events: Vec<KeyEvent>,
    /// Printable characters typed since the last tick, for text fields.
    pub chars_typed: Vec<char>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_frame_state(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.events.clear();
        self.chars_typed.clear();
    }

    /// Record a key going down. OS key-repeat for an already held key is ignored.
    pub fn press(&mut self, key: KeyCode) {
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
            self.events.push(KeyEvent::down(key));
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
        self.keys_released.insert(key);
        self.events.push(KeyEvent::up(key));
    }

    pub fn type_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.chars_typed.push(ch);
        }
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool { self.keys_held.contains(&key) }
    pub fn is_key_pressed(&self, key: KeyCode) -> bool { self.keys_pressed.contains(&key) }
    pub fn is_key_released(&self, key: KeyCode) -> bool { self.keys_released.contains(&key) }
}

// ── Controls ────────────────────────────────────────────────────────────────

/// Logical fighter controls every binding maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Control {
    Left,
    Right,
    Up,
    Down,
    Light,
    Medium,
    Heavy,
    Dash,
    Special,
    Jump,
    Pause,
}

impl Control {
    pub const ALL: [Control; 11] = [
        Control::Left,
        Control::Right,
        Control::Up,
        Control::Down,
        Control::Light,
        Control::Medium,
        Control::Heavy,
        Control::Dash,
        Control::Special,
        Control::Jump,
        Control::Pause,
    ];
}

/// Maps logical actions to one or more physical keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionMap<A: Hash + Eq + Copy> {
    bindings: HashMap<A, Vec<KeyCode>>,
}

impl<A: Hash + Eq + Copy> ActionMap<A> {
    pub fn new() -> Self {
        Self { bindings: HashMap::new() }
    }

    pub fn bind(&mut self, action: A, key: KeyCode) {
        self.bindings.entry(action).or_default().push(key);
    }

    pub fn keys_for(&self, action: A) -> &[KeyCode] {
        self.bindings.get(&action).map_or(&[], Vec::as_slice)
    }

    /// Reverse lookup used to route key events.
    pub fn action_for(&self, key: KeyCode) -> Option<A> {
        self.bindings
            .iter()
            .find(|(_, keys)| keys.contains(&key))
            .map(|(action, _)| *action)
    }

    pub fn is_bound(&self, key: KeyCode) -> bool {
        self.action_for(key).is_some()
    }

    /// Returns true if the action was triggered this tick.
    pub fn is_pressed(&self, action: A, input: &InputState) -> bool {
        self.keys_for(action).iter().any(|k| input.is_key_pressed(*k))
    }

    pub fn is_held(&self, action: A, input: &InputState) -> bool {
        self.keys_for(action).iter().any(|k| input.is_key_held(*k))
    }

    pub fn is_released(&self, action: A, input: &InputState) -> bool {
        self.keys_for(action).iter().any(|k| input.is_key_released(*k))
    }

    /// Every action whose key is currently held.
    pub fn held(&self, input: &InputState) -> HashSet<A> {
        self.bindings
            .iter()
            .filter(|(_, keys)| keys.iter().any(|k| input.is_key_held(*k)))
            .map(|(action, _)| *action)
            .collect()
    }
}

impl<A: Hash + Eq + Copy> Default for ActionMap<A> {
    fn default() -> Self { Self::new() }
}

impl ActionMap<Control> {
    fn from_pairs(pairs: &[(Control, KeyCode)]) -> Self {
        let mut map = Self::new();
        for &(control, key) in pairs {
            map.bind(control, key);
        }
        map
    }

    pub fn player_one() -> Self {
        Self::from_pairs(&[
            (Control::Left, KeyCode::KeyA),
            (Control::Right, KeyCode::KeyD),
            (Control::Up, KeyCode::KeyW),
            (Control::Down, KeyCode::KeyS),
            (Control::Light, KeyCode::KeyU),
            (Control::Medium, KeyCode::KeyI),
            (Control::Heavy, KeyCode::KeyO),
            (Control::Dash, KeyCode::KeyP),
            (Control::Special, KeyCode::KeyJ),
            (Control::Pause, KeyCode::Escape),
            (Control::Jump, KeyCode::Space),
        ])
    }

    pub fn player_two() -> Self {
        Self::from_pairs(&[
            (Control::Left, KeyCode::ArrowLeft),
            (Control::Right, KeyCode::ArrowRight),
            (Control::Up, KeyCode::ArrowUp),
            (Control::Down, KeyCode::ArrowDown),
            (Control::Light, KeyCode::Digit1),
            (Control::Medium, KeyCode::Numpad8),
            (Control::Heavy, KeyCode::Numpad9),
            (Control::Dash, KeyCode::NumpadSubtract),
            (Control::Special, KeyCode::Numpad4),
            (Control::Pause, KeyCode::Backspace),
            (Control::Jump, KeyCode::Numpad0),
        ])
    }
}
