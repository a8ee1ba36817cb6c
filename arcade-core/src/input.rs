use serde::{Deserialize, Serialize};

use crate::constants::BULLET_LIMIT;

/// Input sampled once per simulation step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// -1 up, 0 idle, 1 down.
    pub direction: i8,
    /// Fire presses queued since the previous step.
    pub fire_presses: u8,
    /// Accumulated touch drag since the previous step, in canvas pixels.
    pub touch_dy: f32,
}

impl Intent {
    pub const IDLE: Self = Self {
        direction: 0,
        fire_presses: 0,
        touch_dy: 0.0,
    };

    pub fn up() -> Self {
        Self {
            direction: -1,
            ..Self::IDLE
        }
    }

    pub fn down() -> Self {
        Self {
            direction: 1,
            ..Self::IDLE
        }
    }

    pub fn fire() -> Self {
        Self {
            fire_presses: 1,
            ..Self::IDLE
        }
    }

    pub fn with_fire(mut self) -> Self {
        self.fire_presses = self.fire_presses.saturating_add(1);
        self
    }
}

/// One-byte tape encoding: bit 0 up, bit 1 down, bit 2 fire. Touch drag is not
/// recorded.
#[inline]
pub fn encode_input_byte(intent: Intent) -> u8 {
    (if intent.direction < 0 { 0x01 } else { 0 })
        | (if intent.direction > 0 { 0x02 } else { 0 })
        | (if intent.fire_presses > 0 { 0x04 } else { 0 })
}

#[inline]
pub fn decode_input_byte(byte: u8) -> Intent {
    let direction = if byte & 0x01 != 0 {
        -1
    } else if byte & 0x02 != 0 {
        1
    } else {
        0
    };
    Intent {
        direction,
        fire_presses: u8::from(byte & 0x04 != 0),
        touch_dy: 0.0,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Fire,
    Other,
}

impl Key {
    /// Maps a DOM-style `KeyboardEvent.key` name.
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "ArrowUp" | "w" | "W" => Self::Up,
            "ArrowDown" | "s" | "S" => Self::Down,
            " " | "Space" | "Spacebar" => Self::Fire,
            _ => Self::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VirtualButton {
    Up,
    Down,
    Fire,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    TouchStart { y: f32 },
    TouchMove { y: f32 },
    TouchEnd,
    Click,
    ButtonPressed(VirtualButton),
    ButtonReleased(VirtualButton),
}

/// Collects asynchronous input events and hands the simulation a single intent per
/// step.
#[derive(Clone, Debug, Default)]
pub struct InputAdapter {
    key_up: bool,
    key_down: bool,
    button_up: bool,
    button_down: bool,
    pending_fire: u8,
    last_touch_y: Option<f32>,
    touch_dy: f32,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(Key::Up) => self.key_up = true,
            InputEvent::KeyDown(Key::Down) => self.key_down = true,
            InputEvent::KeyDown(Key::Fire) => self.queue_fire(),
            InputEvent::KeyUp(Key::Up) => self.key_up = false,
            InputEvent::KeyUp(Key::Down) => self.key_down = false,
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) => {}
            InputEvent::TouchStart { y } => {
                self.last_touch_y = Some(y);
                self.queue_fire();
            }
            InputEvent::TouchMove { y } => {
                if let Some(last) = self.last_touch_y {
                    self.touch_dy += y - last;
                    self.last_touch_y = Some(y);
                }
            }
            InputEvent::TouchEnd => self.last_touch_y = None,
            InputEvent::Click => self.queue_fire(),
            InputEvent::ButtonPressed(VirtualButton::Up) => self.button_up = true,
            InputEvent::ButtonPressed(VirtualButton::Down) => self.button_down = true,
            InputEvent::ButtonPressed(VirtualButton::Fire) => self.queue_fire(),
            InputEvent::ButtonReleased(VirtualButton::Up) => self.button_up = false,
            InputEvent::ButtonReleased(VirtualButton::Down) => self.button_down = false,
            InputEvent::ButtonReleased(VirtualButton::Fire) => {}
        }
    }

    /// Held directions persist across snapshots; fire presses and touch drag are
    /// consumed.
    pub fn snapshot(&mut self) -> Intent {
        let direction = if self.key_up || self.button_up {
            -1
        } else if self.key_down || self.button_down {
            1
        } else {
            0
        };
        let intent = Intent {
            direction,
            fire_presses: self.pending_fire,
            touch_dy: self.touch_dy,
        };
        self.pending_fire = 0;
        self.touch_dy = 0.0;
        intent
    }

    fn queue_fire(&mut self) {
        if usize::from(self.pending_fire) < BULLET_LIMIT {
            self.pending_fire += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_wins_over_down() {
        let mut adapter = InputAdapter::new();
        adapter.handle(InputEvent::KeyDown(Key::Down));
        adapter.handle(InputEvent::KeyDown(Key::Up));
        assert_eq!(adapter.snapshot().direction, -1);

        adapter.handle(InputEvent::KeyUp(Key::Up));
        assert_eq!(adapter.snapshot().direction, 1);
    }

    #[test]
    fn held_direction_persists_but_fire_is_consumed() {
        let mut adapter = InputAdapter::new();
        adapter.handle(InputEvent::ButtonPressed(VirtualButton::Down));
        adapter.handle(InputEvent::KeyDown(Key::Fire));
        adapter.handle(InputEvent::Click);

        let first = adapter.snapshot();
        assert_eq!(first.direction, 1);
        assert_eq!(first.fire_presses, 2);

        let second = adapter.snapshot();
        assert_eq!(second.direction, 1);
        assert_eq!(second.fire_presses, 0);
    }

    #[test]
    fn queued_fire_is_capped_at_bullet_limit() {
        let mut adapter = InputAdapter::new();
        for _ in 0..20 {
            adapter.handle(InputEvent::ButtonPressed(VirtualButton::Fire));
        }
        assert_eq!(usize::from(adapter.snapshot().fire_presses), BULLET_LIMIT);
    }

    #[test]
    fn touch_drag_accumulates_until_sampled() {
        let mut adapter = InputAdapter::new();
        adapter.handle(InputEvent::TouchStart { y: 100.0 });
        adapter.handle(InputEvent::TouchMove { y: 104.0 });
        adapter.handle(InputEvent::TouchMove { y: 110.0 });

        let intent = adapter.snapshot();
        assert_eq!(intent.fire_presses, 1);
        assert_eq!(intent.touch_dy, 10.0);

        adapter.handle(InputEvent::TouchEnd);
        adapter.handle(InputEvent::TouchMove { y: 200.0 });
        assert_eq!(adapter.snapshot().touch_dy, 0.0);
    }

    #[test]
    fn key_names_follow_browser_conventions() {
        assert_eq!(Key::from_key_name("ArrowUp"), Key::Up);
        assert_eq!(Key::from_key_name("w"), Key::Up);
        assert_eq!(Key::from_key_name("s"), Key::Down);
        assert_eq!(Key::from_key_name(" "), Key::Fire);
        assert_eq!(Key::from_key_name("Enter"), Key::Other);
    }

    #[test]
    fn input_byte_keeps_direction_and_fire() {
        let byte = encode_input_byte(Intent::up().with_fire());
        assert_eq!(byte, 0x05);
        let decoded = decode_input_byte(byte);
        assert_eq!(decoded.direction, -1);
        assert_eq!(decoded.fire_presses, 1);
        assert_eq!(decode_input_byte(0x02).direction, 1);
    }
}
