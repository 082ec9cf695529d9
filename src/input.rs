//! Terminal input translation
//!
//! Terminals deliver key auto-repeat as extra press events and often no
//! release event at all, which is unreliable for a held-key protocol.
//! Held keys are therefore tracked with a last-seen timestamp: a press
//! with live state is a repeat (swallowed), and a synthetic release
//! fires once the repeat stream goes quiet.

use crate::game::{GameKey, InputEvent};
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};

/// Quiet time after which a held key counts as released. Longer than the
/// 100 ms move-repeat cadence, so a genuinely held key survives at least
/// one repeat tick between terminal events.
const RELEASE_TIMEOUT: Duration = Duration::from_millis(150);

/// Key bindings resolved to key codes
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub rotate: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into a KeyCode
    fn parse_key(s: &str) -> KeyCode {
        match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            s if s.len() == 1 => KeyCode::Char(s.chars().next().unwrap()),
            _ => KeyCode::Char(' '), // fallback
        }
    }

    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().map(|s| Self::parse_key(s)).collect()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            rotate: Self::parse_keys(&settings.keys.rotate),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec![KeyCode::Left],
            move_right: vec![KeyCode::Right],
            soft_drop: vec![KeyCode::Down],
            rotate: vec![KeyCode::Up],
            quit: vec![KeyCode::Char('q'), KeyCode::Esc],
        }
    }
}

/// Translates raw key events into press/release messages
pub struct InputHandler {
    left_seen: Option<Instant>,
    right_seen: Option<Instant>,
    down_seen: Option<Instant>,
    rotate_seen: Option<Instant>,
    bindings: KeyBindings,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            left_seen: None,
            right_seen: None,
            down_seen: None,
            rotate_seen: None,
            bindings: KeyBindings::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bindings: KeyBindings::from_settings(settings),
            ..Self::new()
        }
    }

    pub fn is_quit(&self, code: KeyCode) -> bool {
        self.bindings.quit.contains(&normalize_key(code))
    }

    /// Handle a key press. A fresh press emits `Press`; terminal
    /// auto-repeat only refreshes the last-seen timestamp.
    pub fn key_down(&mut self, key: KeyEvent, now: Instant) -> Vec<InputEvent> {
        let code = normalize_key(key.code);
        let mut events = Vec::new();

        if self.bindings.move_left.contains(&code) {
            if self.left_seen.is_none() {
                events.push(InputEvent::Press(GameKey::Left));
            }
            self.left_seen = Some(now);
        } else if self.bindings.move_right.contains(&code) {
            if self.right_seen.is_none() {
                events.push(InputEvent::Press(GameKey::Right));
            }
            self.right_seen = Some(now);
        } else if self.bindings.soft_drop.contains(&code) {
            if self.down_seen.is_none() {
                events.push(InputEvent::Press(GameKey::SoftDrop));
            }
            self.down_seen = Some(now);
        } else if self.bindings.rotate.contains(&code) {
            if self.rotate_seen.is_none() {
                events.push(InputEvent::Press(GameKey::Rotate));
            }
            self.rotate_seen = Some(now);
        }

        events
    }

    /// Handle a key release (only delivered by some terminals)
    pub fn key_up(&mut self, key: KeyEvent) -> Vec<InputEvent> {
        let code = normalize_key(key.code);
        let mut events = Vec::new();

        if self.bindings.move_left.contains(&code) && self.left_seen.take().is_some() {
            events.push(InputEvent::Release(GameKey::Left));
        } else if self.bindings.move_right.contains(&code) && self.right_seen.take().is_some() {
            events.push(InputEvent::Release(GameKey::Right));
        } else if self.bindings.soft_drop.contains(&code) && self.down_seen.take().is_some() {
            events.push(InputEvent::Release(GameKey::SoftDrop));
        } else if self.bindings.rotate.contains(&code) {
            self.rotate_seen = None;
        }

        events
    }

    /// Synthesize releases for held keys whose repeat stream has gone
    /// quiet (call every frame).
    pub fn update(&mut self, now: Instant) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if timed_out(&mut self.left_seen, now) {
            events.push(InputEvent::Release(GameKey::Left));
        }
        if timed_out(&mut self.right_seen, now) {
            events.push(InputEvent::Release(GameKey::Right));
        }
        if timed_out(&mut self.down_seen, now) {
            events.push(InputEvent::Release(GameKey::SoftDrop));
        }
        timed_out(&mut self.rotate_seen, now);

        events
    }

    /// Drop all held state (used when leaving play)
    pub fn clear(&mut self) {
        self.left_seen = None;
        self.right_seen = None;
        self.down_seen = None;
        self.rotate_seen = None;
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Clear a held timestamp once it is stale; true if it just expired
fn timed_out(seen: &mut Option<Instant>, now: Instant) -> bool {
    match *seen {
        Some(last) if now.duration_since(last) > RELEASE_TIMEOUT => {
            *seen = None;
            true
        }
        _ => false,
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_fresh_press_emits_once() {
        let mut input = InputHandler::new();
        let now = Instant::now();
        let events = input.key_down(press(KeyCode::Left), now);
        assert_eq!(events, vec![InputEvent::Press(GameKey::Left)]);

        // Auto-repeat: same key again while held
        let events = input.key_down(press(KeyCode::Left), now + Duration::from_millis(30));
        assert!(events.is_empty());
    }

    #[test]
    fn test_release_after_quiet_timeout() {
        let mut input = InputHandler::new();
        let now = Instant::now();
        input.key_down(press(KeyCode::Right), now);

        assert!(input.update(now + Duration::from_millis(100)).is_empty());
        let events = input.update(now + Duration::from_millis(200));
        assert_eq!(events, vec![InputEvent::Release(GameKey::Right)]);

        // Released: the next press is fresh again
        let events = input.key_down(press(KeyCode::Right), now + Duration::from_millis(250));
        assert_eq!(events, vec![InputEvent::Press(GameKey::Right)]);
    }

    #[test]
    fn test_repeat_stream_keeps_key_held() {
        let mut input = InputHandler::new();
        let mut now = Instant::now();
        input.key_down(press(KeyCode::Down), now);
        // 33 ms repeats, typical terminal auto-repeat
        for _ in 0..10 {
            now += Duration::from_millis(33);
            input.key_down(press(KeyCode::Down), now);
            assert!(input.update(now).is_empty());
        }
    }

    #[test]
    fn test_explicit_key_up() {
        let mut input = InputHandler::new();
        let now = Instant::now();
        input.key_down(press(KeyCode::Left), now);
        let events = input.key_up(press(KeyCode::Left));
        assert_eq!(events, vec![InputEvent::Release(GameKey::Left)]);

        // Releasing an unheld key emits nothing
        assert!(input.key_up(press(KeyCode::Left)).is_empty());
    }

    #[test]
    fn test_rotate_press_filtered_on_repeat() {
        let mut input = InputHandler::new();
        let now = Instant::now();
        let events = input.key_down(press(KeyCode::Up), now);
        assert_eq!(events, vec![InputEvent::Press(GameKey::Rotate)]);
        let events = input.key_down(press(KeyCode::Up), now + Duration::from_millis(40));
        assert!(events.is_empty());
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut input = InputHandler::new();
        assert!(input.key_down(press(KeyCode::Char('x')), Instant::now()).is_empty());
    }

    #[test]
    fn test_quit_binding_is_case_insensitive() {
        let input = InputHandler::new();
        assert!(input.is_quit(KeyCode::Char('q')));
        assert!(input.is_quit(KeyCode::Char('Q')));
        assert!(input.is_quit(KeyCode::Esc));
        assert!(!input.is_quit(KeyCode::Enter));
    }

    #[test]
    fn test_clear_drops_held_state() {
        let mut input = InputHandler::new();
        let now = Instant::now();
        input.key_down(press(KeyCode::Left), now);
        input.clear();
        // No synthetic release after clearing
        assert!(input.update(now + Duration::from_secs(1)).is_empty());
    }
}
