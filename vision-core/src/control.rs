//! Control loop
//!
//! Owns the session and every capability. Runs the connection supervisor once, then handles
//! one network event per [`ControlLoop::step`]: decode, execute, render, pause.

use crate::actuator::HidActuator;
use crate::capability::{ActivitySwitch, HidTransport, Incoming, LedStrip, NetworkStack};
use crate::config::{DeviceConfig, Timing};
use crate::protocol::{CommandKind, decode};
use crate::session::Session;
use crate::status::{HidStatus, StatusIndicator};
use crate::supervisor::{ConnectionState, ConnectionSupervisor};
use embedded_hal_async::delay::DelayNs;
use log::{debug, info, trace};

/// What one step of the loop did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Latched error; only the error pattern was rendered
    Halted,
    /// Startup has not reached `Connected`; nothing was polled
    NotConnected,
    /// Nothing to do
    Idle,
    ClientConnected,
    ClientDisconnected,
    /// A recognised command was executed
    Executed(CommandKind),
    /// A recognised command arrived while the activity switch was off
    Suppressed(CommandKind),
    /// An unrecognised byte was dropped
    Dropped(u8),
}

/// The board: session, capabilities, startup supervisor and command loop
pub struct ControlLoop<N, H, L, D, S> {
    network: N,
    actuator: HidActuator<H>,
    indicator: StatusIndicator<L>,
    delay: D,
    switch: S,
    supervisor: ConnectionSupervisor,
    session: Session,
    timing: Timing,
}

impl<N, H, L, D, S> ControlLoop<N, H, L, D, S>
where
    N: NetworkStack,
    H: HidTransport,
    L: LedStrip,
    D: DelayNs,
    S: ActivitySwitch,
{
    pub fn new(config: &DeviceConfig, network: N, hid: H, strip: L, delay: D, switch: S) -> Self {
        Self {
            network,
            actuator: HidActuator::new(hid, config.mouse_step),
            indicator: StatusIndicator::new(strip, &config.strip),
            delay,
            switch,
            supervisor: ConnectionSupervisor::new(config),
            session: Session::new(),
            timing: config.timing,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn hid(&self) -> &H {
        self.actuator.transport()
    }

    pub fn indicator(&self) -> &StatusIndicator<L> {
        &self.indicator
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn switch_mut(&mut self) -> &mut S {
        &mut self.switch
    }

    /// Run the connection supervisor.
    pub async fn start(&mut self) -> ConnectionState {
        self.supervisor
            .establish(
                &mut self.network,
                &mut self.indicator,
                &mut self.delay,
                &mut self.session,
            )
            .await
    }

    /// Handle at most one network event.
    pub async fn step(&mut self) -> Step {
        if self.session.is_halted() {
            self.indicator.set(ConnectionState::Halted);
            self.delay.delay_ms(self.timing.halt_render_delay_ms).await;
            return Step::Halted;
        }
        if self.session.connection() != ConnectionState::Connected {
            return Step::NotConnected;
        }

        match self.network.poll().await {
            Incoming::Nothing => Step::Idle,
            Incoming::ClientConnected => {
                info!("[LOOP] Client connected");
                self.session.set_client_attached(true);
                self.render(HidStatus::IdleConnected);
                Step::ClientConnected
            }
            Incoming::ClientDisconnected => {
                info!("[LOOP] Client disconnected");
                self.actuator.release_all(&mut self.session).await;
                self.session.set_client_attached(false);
                self.render(HidStatus::Idle);
                Step::ClientDisconnected
            }
            Incoming::Byte(byte) => self.execute(byte).await,
        }
    }

    /// Start up, then loop forever.
    pub async fn run(mut self) -> ! {
        self.start().await;
        loop {
            self.step().await;
        }
    }

    async fn execute(&mut self, byte: u8) -> Step {
        let command = decode(byte);
        if !command.kind.is_recognized() {
            trace!("[LOOP] Dropping byte 0x{:02x}", byte);
            return Step::Dropped(byte);
        }
        if !self.switch.is_enabled() {
            debug!("[LOOP] Activity disabled, ignoring {:?}", command.kind);
            return Step::Suppressed(command.kind);
        }

        self.render(HidStatus::Receiving);
        if let Some(status) = self.actuator.apply(command, &mut self.session).await {
            self.render(status);
        }
        self.delay.delay_ms(self.timing.hid_pause_ms).await;
        let resting = self.session.resting_status();
        self.render(resting);

        Step::Executed(command.kind)
    }

    fn render(&mut self, status: HidStatus) {
        self.session.set_hid_status(status);
        self.indicator.set(status);
    }
}
