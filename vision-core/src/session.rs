//! The session record: every piece of mutable state the control loop owns.
//!
//! Components receive the session by reference. Once the [`ErrorLatch`] is tripped, every
//! mutator below turns into a no-op.

use crate::capability::MouseButton;
use crate::status::HidStatus;
use crate::supervisor::ConnectionState;

/// Cursor position as tracked by the emulator (not clamped to any screen)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorPosition {
    pub x: i32,
    pub y: i32,
}

impl CursorPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn offset(&mut self, dx: i32, dy: i32) {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }
}

/// Held state of each mouse button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    left: bool,
    middle: bool,
    right: bool,
}

impl ButtonState {
    pub fn is_held(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Middle => self.middle,
            MouseButton::Right => self.right,
        }
    }

    pub fn any_held(&self) -> bool {
        self.left || self.middle || self.right
    }

    /// First held button in left, middle, right order
    pub fn first_held(&self) -> Option<MouseButton> {
        MouseButton::ALL.into_iter().find(|b| self.is_held(*b))
    }

    fn set(&mut self, button: MouseButton, held: bool) {
        match button {
            MouseButton::Left => self.left = held,
            MouseButton::Middle => self.middle = held,
            MouseButton::Right => self.right = held,
        }
    }
}

/// Write-once fatal error flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorLatch {
    tripped: bool,
}

impl ErrorLatch {
    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    fn trip(&mut self) {
        self.tripped = true;
    }
}

/// Device state owned by the control loop
#[derive(Debug, Clone, Default)]
pub struct Session {
    latch: ErrorLatch,
    connection: ConnectionState,
    hid_status: HidStatus,
    cursor: CursorPosition,
    buttons: ButtonState,
    client_attached: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latch(&self) -> ErrorLatch {
        self.latch
    }

    pub fn is_halted(&self) -> bool {
        self.latch.is_tripped()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn hid_status(&self) -> HidStatus {
        self.hid_status
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    pub fn buttons(&self) -> ButtonState {
        self.buttons
    }

    pub fn client_attached(&self) -> bool {
        self.client_attached
    }

    /// Enter the terminal `Halted` state and trip the latch.
    pub fn halt(&mut self) {
        if !self.latch.is_tripped() {
            self.connection = ConnectionState::Halted;
            self.latch.trip();
        }
    }

    pub(crate) fn set_connection(&mut self, state: ConnectionState) {
        if !self.latch.is_tripped() {
            self.connection = state;
        }
    }

    pub(crate) fn set_hid_status(&mut self, status: HidStatus) {
        if !self.latch.is_tripped() {
            self.hid_status = status;
        }
    }

    pub(crate) fn move_cursor(&mut self, dx: i32, dy: i32) {
        if !self.latch.is_tripped() {
            self.cursor.offset(dx, dy);
        }
    }

    pub(crate) fn set_button(&mut self, button: MouseButton, held: bool) {
        if !self.latch.is_tripped() {
            self.buttons.set(button, held);
        }
    }

    pub(crate) fn set_client_attached(&mut self, attached: bool) {
        if !self.latch.is_tripped() {
            self.client_attached = attached;
        }
    }

    /// Status to settle on once a command has been shown
    pub fn resting_status(&self) -> HidStatus {
        match self.buttons.first_held() {
            Some(button) => HidStatus::pressed(button),
            None if self.client_attached => HidStatus::IdleConnected,
            None => HidStatus::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halt_latches_and_freezes_state() {
        let mut session = Session::new();
        session.move_cursor(5, 0);
        session.set_button(MouseButton::Left, true);
        session.halt();

        session.move_cursor(5, 5);
        session.set_button(MouseButton::Left, false);
        session.set_hid_status(HidStatus::Motion);
        session.set_connection(ConnectionState::Connected);
        session.set_client_attached(true);

        assert!(session.is_halted());
        assert_eq!(session.connection(), ConnectionState::Halted);
        assert_eq!(session.cursor(), CursorPosition::new(5, 0));
        assert!(session.buttons().is_held(MouseButton::Left));
        assert_eq!(session.hid_status(), HidStatus::Idle);
        assert!(!session.client_attached());
    }

    #[test]
    fn resting_status_follows_first_held_button() {
        let mut session = Session::new();
        assert_eq!(session.resting_status(), HidStatus::Idle);

        session.set_button(MouseButton::Right, true);
        assert_eq!(session.resting_status(), HidStatus::PressRight);

        session.set_button(MouseButton::Middle, true);
        assert_eq!(session.resting_status(), HidStatus::PressMid);
    }

    #[test]
    fn resting_status_with_client_attached() {
        let mut session = Session::new();
        session.set_client_attached(true);
        assert_eq!(session.resting_status(), HidStatus::IdleConnected);

        session.set_button(MouseButton::Left, true);
        assert_eq!(session.resting_status(), HidStatus::PressLeft);

        session.set_button(MouseButton::Left, false);
        session.set_client_attached(false);
        assert_eq!(session.resting_status(), HidStatus::Idle);
    }

    #[test]
    fn cursor_saturates_instead_of_wrapping() {
        let mut cursor = CursorPosition::new(i32::MAX - 1, i32::MIN + 1);
        cursor.offset(5, -5);
        assert_eq!(cursor, CursorPosition::new(i32::MAX, i32::MIN));
    }
}
