//! Hotkey bindings as the engine understands them: a key code plus a set of
//! modifiers, with left/right variants kept distinct so a binding like
//! "RCmd + Tab" does not also claim the left command key.
//!
//! The OS frontend is responsible for translating raw key events into these
//! values; this module only defines the data type and its textual form used
//! in the config file.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const SHIFT_LEFT: Modifiers = Modifiers(0b0000_0001);
    pub const SHIFT_RIGHT: Modifiers = Modifiers(0b0000_0010);
    pub const SHIFT: Modifiers = Modifiers(0b0000_0011);
    pub const CONTROL_LEFT: Modifiers = Modifiers(0b0000_0100);
    pub const CONTROL_RIGHT: Modifiers = Modifiers(0b0000_1000);
    pub const CONTROL: Modifiers = Modifiers(0b0000_1100);
    pub const ALT_LEFT: Modifiers = Modifiers(0b0001_0000);
    pub const ALT_RIGHT: Modifiers = Modifiers(0b0010_0000);
    pub const ALT: Modifiers = Modifiers(0b0011_0000);
    pub const META_LEFT: Modifiers = Modifiers(0b0100_0000);
    pub const META_RIGHT: Modifiers = Modifiers(0b1000_0000);
    pub const META: Modifiers = Modifiers(0b1100_0000);

    pub fn empty() -> Self {
        Modifiers(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn intersects(&self, other: Modifiers) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Modifiers) {
        self.0 &= !other.0;
    }

    pub fn insert_from_token(&mut self, token: &str) -> bool {
        let mods = match token.to_lowercase().as_str() {
            "shift" => Modifiers::SHIFT,
            "lshift" | "shiftleft" => Modifiers::SHIFT_LEFT,
            "rshift" | "shiftright" => Modifiers::SHIFT_RIGHT,
            "ctrl" | "control" => Modifiers::CONTROL,
            "lctrl" | "lcontrol" | "ctrlleft" => Modifiers::CONTROL_LEFT,
            "rctrl" | "rcontrol" | "ctrlright" => Modifiers::CONTROL_RIGHT,
            "alt" | "option" => Modifiers::ALT,
            "lalt" | "loption" | "altleft" => Modifiers::ALT_LEFT,
            "ralt" | "roption" | "altright" => Modifiers::ALT_RIGHT,
            "meta" | "cmd" | "command" => Modifiers::META,
            "lmeta" | "lcmd" | "lcommand" | "metaleft" | "cmdleft" => Modifiers::META_LEFT,
            "rmeta" | "rcmd" | "rcommand" | "metaright" | "cmdright" => Modifiers::META_RIGHT,
            _ => return false,
        };
        self.insert(mods);
        true
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = Vec::new();
        for (both, left, right, names) in [
            (Modifiers::CONTROL, Modifiers::CONTROL_LEFT, Modifiers::CONTROL_RIGHT, [
                "Ctrl", "LCtrl", "RCtrl",
            ]),
            (Modifiers::ALT, Modifiers::ALT_LEFT, Modifiers::ALT_RIGHT, [
                "Alt", "LAlt", "RAlt",
            ]),
            (Modifiers::SHIFT, Modifiers::SHIFT_LEFT, Modifiers::SHIFT_RIGHT, [
                "Shift", "LShift", "RShift",
            ]),
            (Modifiers::META, Modifiers::META_LEFT, Modifiers::META_RIGHT, [
                "Cmd", "LCmd", "RCmd",
            ]),
        ] {
            if self.contains(both) {
                parts.push(names[0]);
            } else if self.contains(left) {
                parts.push(names[1]);
            } else if self.contains(right) {
                parts.push(names[2]);
            }
        }
        write!(f, "{}", parts.join(" + "))
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Minus,
    Equal,
    BracketLeft,
    BracketRight,
    Semicolon,
    Quote,
    Backquote,
    Backslash,
    Comma,
    Period,
    Slash,
    Tab,
    Space,
    Enter,
    Escape,
    Backspace,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use KeyCode::*;
        let s = match self {
            KeyA => "A",
            KeyB => "B",
            KeyC => "C",
            KeyD => "D",
            KeyE => "E",
            KeyF => "F",
            KeyG => "G",
            KeyH => "H",
            KeyI => "I",
            KeyJ => "J",
            KeyK => "K",
            KeyL => "L",
            KeyM => "M",
            KeyN => "N",
            KeyO => "O",
            KeyP => "P",
            KeyQ => "Q",
            KeyR => "R",
            KeyS => "S",
            KeyT => "T",
            KeyU => "U",
            KeyV => "V",
            KeyW => "W",
            KeyX => "X",
            KeyY => "Y",
            KeyZ => "Z",
            Digit0 => "0",
            Digit1 => "1",
            Digit2 => "2",
            Digit3 => "3",
            Digit4 => "4",
            Digit5 => "5",
            Digit6 => "6",
            Digit7 => "7",
            Digit8 => "8",
            Digit9 => "9",
            Minus => "Minus",
            Equal => "Equal",
            BracketLeft => "BracketLeft",
            BracketRight => "BracketRight",
            Semicolon => "Semicolon",
            Quote => "Quote",
            Backquote => "Backquote",
            Backslash => "Backslash",
            Comma => "Comma",
            Period => "Period",
            Slash => "Slash",
            Tab => "Tab",
            Space => "Space",
            Enter => "Enter",
            Escape => "Escape",
            Backspace => "Backspace",
            ArrowLeft => "Left",
            ArrowRight => "Right",
            ArrowUp => "Up",
            ArrowDown => "Down",
            F1 => "F1",
            F2 => "F2",
            F3 => "F3",
            F4 => "F4",
            F5 => "F5",
            F6 => "F6",
            F7 => "F7",
            F8 => "F8",
            F9 => "F9",
            F10 => "F10",
            F11 => "F11",
            F12 => "F12",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for KeyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use KeyCode::*;
        match s.to_uppercase().as_str() {
            "A" => Ok(KeyA),
            "B" => Ok(KeyB),
            "C" => Ok(KeyC),
            "D" => Ok(KeyD),
            "E" => Ok(KeyE),
            "F" => Ok(KeyF),
            "G" => Ok(KeyG),
            "H" => Ok(KeyH),
            "I" => Ok(KeyI),
            "J" => Ok(KeyJ),
            "K" => Ok(KeyK),
            "L" => Ok(KeyL),
            "M" => Ok(KeyM),
            "N" => Ok(KeyN),
            "O" => Ok(KeyO),
            "P" => Ok(KeyP),
            "Q" => Ok(KeyQ),
            "R" => Ok(KeyR),
            "S" => Ok(KeyS),
            "T" => Ok(KeyT),
            "U" => Ok(KeyU),
            "V" => Ok(KeyV),
            "W" => Ok(KeyW),
            "X" => Ok(KeyX),
            "Y" => Ok(KeyY),
            "Z" => Ok(KeyZ),
            "0" => Ok(Digit0),
            "1" => Ok(Digit1),
            "2" => Ok(Digit2),
            "3" => Ok(Digit3),
            "4" => Ok(Digit4),
            "5" => Ok(Digit5),
            "6" => Ok(Digit6),
            "7" => Ok(Digit7),
            "8" => Ok(Digit8),
            "9" => Ok(Digit9),
            "-" | "MINUS" | "HYPHEN" => Ok(Minus),
            "=" | "EQUAL" | "EQUALS" => Ok(Equal),
            "[" | "BRACKETLEFT" | "LEFTBRACKET" => Ok(BracketLeft),
            "]" | "BRACKETRIGHT" | "RIGHTBRACKET" => Ok(BracketRight),
            ";" | "SEMICOLON" => Ok(Semicolon),
            "'" | "QUOTE" | "APOSTROPHE" => Ok(Quote),
            "`" | "BACKQUOTE" | "GRAVE" | "TILDE" => Ok(Backquote),
            "\\" | "BACKSLASH" => Ok(Backslash),
            "," | "COMMA" => Ok(Comma),
            "." | "DOT" | "PERIOD" => Ok(Period),
            "/" | "SLASH" => Ok(Slash),
            "TAB" => Ok(Tab),
            "SPACE" => Ok(Space),
            "ENTER" | "RETURN" => Ok(Enter),
            "ESC" | "ESCAPE" => Ok(Escape),
            "BACKSPACE" | "DELETE" => Ok(Backspace),
            "LEFT" | "ARROWLEFT" => Ok(ArrowLeft),
            "RIGHT" | "ARROWRIGHT" => Ok(ArrowRight),
            "UP" | "ARROWUP" => Ok(ArrowUp),
            "DOWN" | "ARROWDOWN" => Ok(ArrowDown),
            "F1" => Ok(F1),
            "F2" => Ok(F2),
            "F3" => Ok(F3),
            "F4" => Ok(F4),
            "F5" => Ok(F5),
            "F6" => Ok(F6),
            "F7" => Ok(F7),
            "F8" => Ok(F8),
            "F9" => Ok(F9),
            "F10" => Ok(F10),
            "F11" => Ok(F11),
            "F12" => Ok(F12),
            other => Err(anyhow!("Unrecognized key token: {}", other)),
        }
    }
}

#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key_code: KeyCode,
}

impl Hotkey {
    pub fn new(modifiers: Modifiers, key_code: KeyCode) -> Self {
        Self { modifiers, key_code }
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key_code)
        } else {
            write!(f, "{} + {}", self.modifiers, self.key_code)
        }
    }
}

impl FromStr for Hotkey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mods = Modifiers::empty();
        let mut key: Option<KeyCode> = None;
        for part in s.split('+').map(|p| p.trim()).filter(|p| !p.is_empty()) {
            if mods.insert_from_token(part) {
                continue;
            }
            key = Some(KeyCode::from_str(part)?);
        }
        let key_code = key.ok_or_else(|| anyhow!("No key specified in hotkey: {}", s))?;
        Ok(Hotkey::new(mods, key_code))
    }
}

impl<'de> Deserialize<'de> for Hotkey {
    fn deserialize<D>(deserializer: D) -> Result<Hotkey, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum HotkeyRepr {
            Str(String),
            Map { modifiers: Modifiers, key_code: KeyCode },
        }

        match HotkeyRepr::deserialize(deserializer)? {
            HotkeyRepr::Str(s) => Hotkey::from_str(&s).map_err(serde::de::Error::custom),
            HotkeyRepr::Map { modifiers, key_code } => Ok(Hotkey::new(modifiers, key_code)),
        }
    }
}
