//! Keyboard state and demo key bindings

use std::collections::{HashMap, HashSet};
use winit::keyboard::KeyCode;

/// Everything the demo runner responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoAction {
    Reseed,
    TogglePause,
    LifetimeUp,
    LifetimeDown,
    AccelUp,
    AccelDown,
    OrbitLeft,
    OrbitRight,
    ZoomIn,
    ZoomOut,
    Exit,
}

impl DemoAction {
    /// Held actions repeat every frame; the rest fire once per press
    pub fn is_continuous(self) -> bool {
        matches!(
            self,
            DemoAction::OrbitLeft | DemoAction::OrbitRight | DemoAction::ZoomIn | DemoAction::ZoomOut
        )
    }
}

/// Tracks keyboard state per frame and resolves it to [`DemoAction`]s
pub struct InputState {
    /// Keys currently held down
    keys_down: HashSet<KeyCode>,
    /// Keys pressed this frame
    keys_just_pressed: HashSet<KeyCode>,
    bindings: HashMap<KeyCode, DemoAction>,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            bindings: Self::default_bindings(),
        }
    }

    fn default_bindings() -> HashMap<KeyCode, DemoAction> {
        HashMap::from([
            (KeyCode::KeyR, DemoAction::Reseed),
            (KeyCode::Space, DemoAction::TogglePause),
            (KeyCode::ArrowUp, DemoAction::LifetimeUp),
            (KeyCode::ArrowDown, DemoAction::LifetimeDown),
            (KeyCode::ArrowRight, DemoAction::AccelUp),
            (KeyCode::ArrowLeft, DemoAction::AccelDown),
            (KeyCode::KeyA, DemoAction::OrbitLeft),
            (KeyCode::KeyD, DemoAction::OrbitRight),
            (KeyCode::KeyW, DemoAction::ZoomIn),
            (KeyCode::KeyS, DemoAction::ZoomOut),
            (KeyCode::Escape, DemoAction::Exit),
        ])
    }

    /// Bind a key, replacing any previous binding for it
    pub fn bind(&mut self, key: KeyCode, action: DemoAction) {
        self.bindings.insert(key, action);
    }

    /// Process a key press event
    pub fn process_key_down(&mut self, key: KeyCode) {
        if self.keys_down.insert(key) {
            self.keys_just_pressed.insert(key);
        }
    }

    /// Process a key release event
    pub fn process_key_up(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// One-shot actions pressed this frame plus continuous actions being held
    pub fn active_actions(&self) -> Vec<DemoAction> {
        let mut actions: Vec<DemoAction> = self
            .bindings
            .iter()
            .filter(|(key, action)| {
                if action.is_continuous() {
                    self.keys_down.contains(key)
                } else {
                    self.keys_just_pressed.contains(key)
                }
            })
            .map(|(_, action)| *action)
            .collect();
        actions.sort_by_key(|a| *a as u8);
        actions.dedup();
        actions
    }
}
