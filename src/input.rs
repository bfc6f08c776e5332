use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
}

impl KeyCode {
    pub const ESCAPE: Self = Self::Named(NamedKey::Escape);

    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return None;
        };
        if ch.is_ascii_alphabetic() {
            return Some(Self::Character(ch.to_ascii_uppercase()));
        }
        ch.to_digit(10).map(|digit| Self::Digit(digit as u8))
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    match name {
        "Escape" | "Esc" => Some(KeyCode::ESCAPE),
        _ => None,
    }
}

/// Non-printing keys the navigation layer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Escape,
}

/// Read side of the keyboard, polled once per frame.
pub trait KeyboardState {
    fn is_down(&self, key: KeyCode) -> bool;
}

/// Set of keys currently held, fed by window events.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn set_key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn release_all(&mut self) {
        self.keys.clear();
    }

    pub fn is_key_down_by_name(&self, name: &str) -> bool {
        KeyCode::from_name(name).is_some_and(|key| self.is_down(key))
    }
}

impl KeyboardState for InputState {
    fn is_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_character_and_digit_keys() {
        assert_eq!(KeyCode::from_name("Esc"), Some(KeyCode::ESCAPE));
        assert_eq!(KeyCode::from_name("o"), Some(KeyCode::Character('O')));
        assert_eq!(KeyCode::from_name("3"), Some(KeyCode::Digit(3)));
        assert_eq!(KeyCode::from_name("OO"), None);
        assert_eq!(KeyCode::from_name(""), None);
        assert_eq!(KeyCode::from_name("é"), None);
    }

    #[test]
    fn only_escape_is_a_named_key() {
        for name in ["Space", "Enter", "Shift", "Tab", "ArrowUp"] {
            assert_eq!(KeyCode::from_name(name), None, "{name}");
        }
        assert_eq!(KeyCode::from_name("Escape"), Some(KeyCode::ESCAPE));
    }

    #[test]
    fn input_state_tracks_keys() {
        let mut state = InputState::new();
        state.set_key_down(KeyCode::Character('W'));
        assert!(state.is_key_down_by_name("w"));
        state.set_key_up(KeyCode::Character('W'));
        assert!(!state.is_key_down_by_name("W"));

        state.set_key_down(KeyCode::Digit(1));
        state.set_key_down(KeyCode::ESCAPE);
        state.release_all();
        assert!(!state.is_down(KeyCode::ESCAPE));
    }
}
