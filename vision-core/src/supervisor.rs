//! Connection supervisor
//!
//! Joins the WiFi network and registers the mDNS name with bounded retries. Exhausting either
//! bound trips the session's error latch and leaves the machine in the terminal `Halted` state;
//! only a reset gets the board out of it.

use crate::capability::{LedStrip, NetworkStack};
use crate::config::{DeviceConfig, NetworkCredentials, RetryPolicy, Timing};
use crate::session::Session;
use crate::status::StatusIndicator;
use embedded_hal_async::delay::DelayNs;
use log::{error, info, warn};

/// Connection state of the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Powered up, nothing attempted yet
    #[default]
    Idle,
    /// Joining WiFi or registering mDNS
    Connecting,
    /// Network joined and name registered
    Connected,
    /// mDNS registration attempts exhausted
    DiscoveryFailed,
    /// Latched error state, left only by reset
    Halted,
}

/// Phase of the `Connecting` state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Joining,
    Registering,
}

/// Events fed to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorEvent {
    Started,
    JoinSucceeded,
    JoinFailed,
    DiscoveryRegistered,
    DiscoveryFailed,
    Halt,
}

/// Result of feeding an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTransition {
    /// Keep the current state
    Stay,
    /// Move to a new state
    Transition(ConnectionState),
    /// Move to a new state (or stage) and reset the retry count
    TransitionWithReset(ConnectionState),
}

/// Connection state machine
#[derive(Debug, Clone)]
pub struct ConnectionStateMachine {
    current_state: ConnectionState,
    previous_state: Option<ConnectionState>,
    stage: Stage,
    retry_count: u32,
    retries: RetryPolicy,
}

impl ConnectionStateMachine {
    pub fn new(retries: RetryPolicy) -> Self {
        Self {
            current_state: ConnectionState::Idle,
            previous_state: None,
            stage: Stage::Joining,
            retry_count: 0,
            retries,
        }
    }

    pub fn get_current_state(&self) -> ConnectionState {
        self.current_state
    }

    pub fn get_previous_state(&self) -> Option<ConnectionState> {
        self.previous_state
    }

    pub fn get_stage(&self) -> Stage {
        self.stage
    }

    /// Failed attempts in the current stage
    pub fn get_retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn is_error_state(&self) -> bool {
        matches!(
            self.current_state,
            ConnectionState::DiscoveryFailed | ConnectionState::Halted
        )
    }

    /// Feed an event
    pub fn handle_event(&mut self, event: SupervisorEvent) -> StateTransition {
        let transition = self.get_state_transition(event);

        match transition {
            StateTransition::Transition(new_state) => {
                self.transition_to_state(new_state);
            }
            StateTransition::TransitionWithReset(new_state) => {
                self.retry_count = 0;
                self.transition_to_state(new_state);
            }
            StateTransition::Stay => {}
        }

        transition
    }

    fn transition_to_state(&mut self, new_state: ConnectionState) {
        if new_state != self.current_state {
            self.previous_state = Some(self.current_state);
            self.current_state = new_state;
        }
    }

    fn get_state_transition(&mut self, event: SupervisorEvent) -> StateTransition {
        match (self.current_state, self.stage, event) {
            (ConnectionState::Idle, _, SupervisorEvent::Started) => {
                StateTransition::TransitionWithReset(ConnectionState::Connecting)
            }

            (ConnectionState::Connecting, Stage::Joining, SupervisorEvent::JoinSucceeded) => {
                self.stage = Stage::Registering;
                StateTransition::TransitionWithReset(ConnectionState::Connecting)
            }
            (ConnectionState::Connecting, Stage::Joining, SupervisorEvent::JoinFailed) => {
                self.retry_count += 1;
                if self.retry_count < self.retries.max_connection_retries {
                    StateTransition::Stay
                } else {
                    StateTransition::Transition(ConnectionState::Halted)
                }
            }

            (
                ConnectionState::Connecting,
                Stage::Registering,
                SupervisorEvent::DiscoveryRegistered,
            ) => StateTransition::TransitionWithReset(ConnectionState::Connected),
            (ConnectionState::Connecting, Stage::Registering, SupervisorEvent::DiscoveryFailed) => {
                self.retry_count += 1;
                if self.retry_count < self.retries.max_discovery_retries {
                    StateTransition::Stay
                } else {
                    StateTransition::Transition(ConnectionState::DiscoveryFailed)
                }
            }

            (ConnectionState::DiscoveryFailed, _, SupervisorEvent::Halt) => {
                StateTransition::Transition(ConnectionState::Halted)
            }

            // Halted is terminal; anything else out of order is ignored
            _ => StateTransition::Stay,
        }
    }
}

/// Drives the startup sequence against the network and the status strip
pub struct ConnectionSupervisor {
    machine: ConnectionStateMachine,
    credentials: NetworkCredentials,
    discovery_name: &'static str,
    timing: Timing,
}

impl ConnectionSupervisor {
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            machine: ConnectionStateMachine::new(config.retries),
            credentials: config.credentials,
            discovery_name: config.discovery_name,
            timing: config.timing,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.machine.get_current_state()
    }

    pub fn machine(&self) -> &ConnectionStateMachine {
        &self.machine
    }

    /// Run the startup sequence once and return the resulting state.
    ///
    /// Calling it again after it has finished performs no network activity.
    pub async fn establish<N, L, D>(
        &mut self,
        network: &mut N,
        indicator: &mut StatusIndicator<L>,
        delay: &mut D,
        session: &mut Session,
    ) -> ConnectionState
    where
        N: NetworkStack,
        L: LedStrip,
        D: DelayNs,
    {
        if session.is_halted() {
            warn!("[SUPERVISOR] Error latch is set, not connecting");
            indicator.set(ConnectionState::Halted);
            return ConnectionState::Halted;
        }
        if self.state() != ConnectionState::Idle {
            return self.state();
        }

        indicator.set(session.hid_status());
        indicator.set(ConnectionState::Idle);
        delay.delay_ms(self.timing.init_delay_ms).await;
        self.advance(SupervisorEvent::Started, indicator, session);

        while self.is_in(Stage::Joining) {
            let attempt = self.machine.get_retry_count() + 1;
            info!("[WIFI] Connecting to '{}' (attempt {})", self.credentials.ssid, attempt);
            match network.join(&self.credentials).await {
                Ok(()) => {
                    info!("[WIFI] Joined network");
                    self.advance(SupervisorEvent::JoinSucceeded, indicator, session);
                }
                Err(e) => {
                    warn!("[WIFI] Join attempt {} failed: {:?}", attempt, e);
                    self.advance(SupervisorEvent::JoinFailed, indicator, session);
                    if self.is_in(Stage::Joining) {
                        indicator
                            .connecting_wipe(
                                delay,
                                self.timing.connection_delay_loop,
                                self.timing.connection_delay_ms,
                            )
                            .await;
                    }
                }
            }
        }

        while self.is_in(Stage::Registering) {
            let attempt = self.machine.get_retry_count() + 1;
            info!("[MDNS] Registering '{}' (attempt {})", self.discovery_name, attempt);
            match network.register_discovery(self.discovery_name).await {
                Ok(()) => {
                    info!("[MDNS] Registered {}.local", self.discovery_name);
                    self.advance(SupervisorEvent::DiscoveryRegistered, indicator, session);
                }
                Err(e) => {
                    warn!("[MDNS] Registration attempt {} failed: {:?}", attempt, e);
                    self.advance(SupervisorEvent::DiscoveryFailed, indicator, session);
                    if self.is_in(Stage::Registering) {
                        indicator
                            .discovery_flash(
                                delay,
                                self.timing.connection_loop,
                                self.timing.connection_loop_delay_ms,
                            )
                            .await;
                    }
                }
            }
        }

        if self.state() == ConnectionState::DiscoveryFailed {
            self.advance(SupervisorEvent::Halt, indicator, session);
        }

        if self.state() == ConnectionState::Connected {
            delay.delay_ms(self.timing.initialized_delay_ms).await;
            indicator
                .clear_wipe(delay, self.timing.strip_wipe_delay_ms)
                .await;
        }

        self.state()
    }

    fn is_in(&self, stage: Stage) -> bool {
        self.state() == ConnectionState::Connecting && self.machine.get_stage() == stage
    }

    fn advance<L: LedStrip>(
        &mut self,
        event: SupervisorEvent,
        indicator: &mut StatusIndicator<L>,
        session: &mut Session,
    ) {
        let transition = self.machine.handle_event(event);
        let new_state = match transition {
            StateTransition::Stay => return,
            StateTransition::Transition(state) | StateTransition::TransitionWithReset(state) => {
                state
            }
        };

        match new_state {
            ConnectionState::Halted => {
                error!("[SUPERVISOR] Startup failed, halting until reset");
                session.halt();
            }
            ConnectionState::DiscoveryFailed => {
                error!("[SUPERVISOR] mDNS registration retries exhausted");
                session.set_connection(new_state);
            }
            _ => {
                info!("[SUPERVISOR] {:?}", new_state);
                session.set_connection(new_state);
            }
        }
        indicator.set(new_state);
    }
}
