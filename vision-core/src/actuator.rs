//! HID actuator: applies decoded commands to the session and the HID transport.

use crate::capability::{HidTransport, MouseButton};
use crate::protocol::{Command, CommandKind};
use crate::session::Session;
use crate::status::HidStatus;
use log::debug;

/// Turns decoded commands into HID transport calls
pub struct HidActuator<H> {
    transport: H,
    step: i8,
}

impl<H: HidTransport> HidActuator<H> {
    pub fn new(transport: H, step: i8) -> Self {
        Self { transport, step }
    }

    pub fn transport(&self) -> &H {
        &self.transport
    }

    /// Apply a command.
    ///
    /// Returns the status describing the action, or `None` when nothing happened (unknown
    /// byte or latched session).
    pub async fn apply(&mut self, command: Command, session: &mut Session) -> Option<HidStatus> {
        if session.is_halted() {
            return None;
        }

        let status = match command.kind {
            CommandKind::Unknown => return None,
            CommandKind::MoveLeft => self.nudge(session, -1, 0).await,
            CommandKind::MoveRight => self.nudge(session, 1, 0).await,
            CommandKind::MoveUp => self.nudge(session, 0, -1).await,
            CommandKind::MoveDown => self.nudge(session, 0, 1).await,
            CommandKind::Pause => HidStatus::Delaying,
            CommandKind::ClickLeft | CommandKind::ClickMid | CommandKind::ClickRight => {
                self.click(session, command.kind.button()?).await
            }
            CommandKind::PressLeft | CommandKind::PressMid | CommandKind::PressRight => {
                self.press(session, command.kind.button()?).await
            }
            CommandKind::Release => {
                self.release_all(session).await;
                HidStatus::Idle
            }
        };

        debug!("[HID] {:?} -> {:?}", command.kind, status);
        Some(status)
    }

    /// Release every held button. Nothing is sent for buttons that are not held.
    pub async fn release_all(&mut self, session: &mut Session) {
        if session.is_halted() {
            return;
        }
        for button in MouseButton::ALL {
            if session.buttons().is_held(button) {
                self.transport.set_button(button, false).await;
                session.set_button(button, false);
            }
        }
    }

    async fn nudge(&mut self, session: &mut Session, sx: i8, sy: i8) -> HidStatus {
        let dx = self.step.saturating_mul(sx);
        let dy = self.step.saturating_mul(sy);
        session.move_cursor(dx.into(), dy.into());
        self.transport.move_cursor(dx, dy).await;
        HidStatus::Motion
    }

    async fn click(&mut self, session: &mut Session, button: MouseButton) -> HidStatus {
        self.transport.set_button(button, true).await;
        self.transport.set_button(button, false).await;
        session.set_button(button, false);
        HidStatus::pressed(button)
    }

    async fn press(&mut self, session: &mut Session, button: MouseButton) -> HidStatus {
        if !session.buttons().is_held(button) {
            self.transport.set_button(button, true).await;
            session.set_button(button, true);
        }
        HidStatus::pressed(button)
    }
}
