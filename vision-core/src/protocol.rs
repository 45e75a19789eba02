//! Command protocol
//!
//! The client sends an unframed stream of single ASCII bytes; every byte is one command.
//! Decoding is total: bytes outside the table become [`CommandKind::Unknown`].

use crate::capability::MouseButton;

/// Continuous motion to the left
pub const CURSOR_LEFT: u8 = b'L';
/// Continuous motion to the right
pub const CURSOR_RIGHT: u8 = b'R';
/// Continuous motion up
pub const CURSOR_UP: u8 = b'U';
/// Continuous motion down
pub const CURSOR_DOWN: u8 = b'D';
/// Cursor is not moving
pub const CURSOR_PAUSE: u8 = b'P';
pub const CLICK_LEFT: u8 = b'l';
pub const CLICK_MID: u8 = b'm';
pub const CLICK_RIGHT: u8 = b'r';
/// Press and hold until [`BUTTON_RELEASE`]
pub const PRESS_LEFT: u8 = b'k';
pub const PRESS_MID: u8 = b'e';
pub const PRESS_RIGHT: u8 = b'n';
/// Release every held button
pub const BUTTON_RELEASE: u8 = b'Q';

/// What a command byte asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Pause,
    ClickLeft,
    ClickMid,
    ClickRight,
    PressLeft,
    PressMid,
    PressRight,
    Release,
    Unknown,
}

impl CommandKind {
    pub fn is_recognized(self) -> bool {
        self != CommandKind::Unknown
    }

    /// Button a click or press command acts on
    pub fn button(self) -> Option<MouseButton> {
        match self {
            CommandKind::ClickLeft | CommandKind::PressLeft => Some(MouseButton::Left),
            CommandKind::ClickMid | CommandKind::PressMid => Some(MouseButton::Middle),
            CommandKind::ClickRight | CommandKind::PressRight => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// A decoded command together with the byte it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub byte: u8,
}

/// Decode one command byte.
pub const fn decode(byte: u8) -> Command {
    let kind = match byte {
        CURSOR_LEFT => CommandKind::MoveLeft,
        CURSOR_RIGHT => CommandKind::MoveRight,
        CURSOR_UP => CommandKind::MoveUp,
        CURSOR_DOWN => CommandKind::MoveDown,
        CURSOR_PAUSE => CommandKind::Pause,
        CLICK_LEFT => CommandKind::ClickLeft,
        CLICK_MID => CommandKind::ClickMid,
        CLICK_RIGHT => CommandKind::ClickRight,
        PRESS_LEFT => CommandKind::PressLeft,
        PRESS_MID => CommandKind::PressMid,
        PRESS_RIGHT => CommandKind::PressRight,
        BUTTON_RELEASE => CommandKind::Release,
        _ => CommandKind::Unknown,
    };
    Command { kind, byte }
}

impl From<u8> for Command {
    fn from(byte: u8) -> Self {
        decode(byte)
    }
}
