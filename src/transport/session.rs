//! Channel session state machine
//!
//! [`SessionManager`] maintains exactly one logical connection:
//!
//! ```text
//! Idle ──start──▶ Connecting ──opened──▶ Open
//!                     ▲                    │
//!                     │                 closed
//!               timer fires                │
//!                     │                    ▼
//!                     └──────────────── Closed
//! ```
//!
//! - Entering `Open` cancels any pending reconnect and sends the
//!   subscribe/sync request.
//! - Entering `Closed` (re)schedules the single reconnect timer; a second
//!   close before the delay elapses replaces the pending deadline.
//! - A frame that fails to decode is reported and dropped; it never changes
//!   the connection state.
//! - Outbound messages are only accepted while `Open`. Nothing is queued or
//!   retried.
//!
//! The manager never blocks. [`SessionManager::pump`] is called from the UI
//! loop with the current time; it drains transport events, delivers decoded
//! messages to the handler, and fires the reconnect timer when due.

use super::{Transport, TransportEvent};
use crate::error::{DashboardError, Result};
use crate::protocol::{decode, Decoded, InboundMessage, OutboundMessage};
use crate::types::ChannelState;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Session-level notifications delivered alongside decoded messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Channel opened and the subscribe request went out
    Opened,
    /// Channel closed; reconnect scheduled after `retry_in`
    Closed { reason: String, retry_in: Duration },
    /// Reconnect timer fired and a new attempt started
    Reconnecting { attempt: u64 },
    /// A frame could not be decoded and was dropped
    ParseError(String),
    /// A well-formed frame of an unrecognized kind was ignored
    UnknownKind(String),
    /// Transport reported a non-fatal error
    TransportError(String),
}

/// Receiver of everything the session delivers
pub trait MessageHandler {
    /// Apply one decoded inbound message
    fn handle_message(&mut self, message: InboundMessage);

    /// Observe a session-level event
    fn handle_session_event(&mut self, _event: SessionEvent) {}
}

/// Single-slot reconnect timer
///
/// At most one deadline is pending; scheduling replaces (and so cancels)
/// any previous one.
#[derive(Debug, Clone)]
pub struct ReconnectTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl ReconnectTimer {
    /// Create a timer with a fixed delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Fixed delay between close and reconnect
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a reconnect `delay` after `now`, cancelling any pending one
    pub fn schedule(&mut self, now: Instant) {
        if self.deadline.is_some() {
            debug!("Cancelling pending reconnect");
        }
        self.deadline = Some(now + self.delay);
    }

    /// Cancel the pending reconnect, if any
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a reconnect is pending
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending reconnect fires
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Consume the deadline if it has passed
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Owner of the one logical channel to the backend
pub struct SessionManager<T: Transport> {
    transport: T,
    state: ChannelState,
    timer: ReconnectTimer,
    subscribe: OutboundMessage,
    /// Connection attempts made, including the first
    attempts: u64,
}

impl<T: Transport> SessionManager<T> {
    /// Create an idle session
    pub fn new(transport: T, reconnect_delay: Duration, subscribe: OutboundMessage) -> Self {
        Self {
            transport,
            state: ChannelState::Idle,
            timer: ReconnectTimer::new(reconnect_delay),
            subscribe,
            attempts: 0,
        }
    }

    /// Current channel state
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Whether outbound messages are currently accepted
    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    /// Connection attempts made so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// The reconnect timer (for status display)
    pub fn timer(&self) -> &ReconnectTimer {
        &self.timer
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Leave `Idle` and start the first connection attempt
    ///
    /// Does nothing once the session has been started.
    pub fn start(&mut self) {
        if self.state != ChannelState::Idle {
            debug!("Session already started ({})", self.state);
            return;
        }
        self.begin_connect();
    }

    fn begin_connect(&mut self) {
        self.state = ChannelState::Connecting;
        self.attempts += 1;
        info!("Opening channel (attempt {})", self.attempts);
        self.transport.connect();
    }

    /// Send a message on the open channel
    ///
    /// Rejected with [`DashboardError::NotReady`] unless the channel is open.
    pub fn send(&mut self, message: &OutboundMessage) -> Result<()> {
        if self.state != ChannelState::Open {
            return Err(DashboardError::NotReady {
                state: self.state.to_string(),
            });
        }
        let text = message.encode()?;
        trace!("-> {}", text);
        self.transport.send(text)
    }

    /// Drain transport events and fire the reconnect timer if due
    ///
    /// Returns the number of transport events processed.
    pub fn pump(&mut self, now: Instant, handler: &mut dyn MessageHandler) -> usize {
        let mut processed = 0;

        while let Some(event) = self.transport.poll_event() {
            processed += 1;
            self.on_transport_event(event, now, handler);
        }

        if self.state == ChannelState::Closed && self.timer.fire_if_due(now) {
            self.begin_connect();
            handler.handle_session_event(SessionEvent::Reconnecting {
                attempt: self.attempts,
            });
        }

        processed
    }

    fn on_transport_event(
        &mut self,
        event: TransportEvent,
        now: Instant,
        handler: &mut dyn MessageHandler,
    ) {
        match event {
            TransportEvent::Opened => {
                self.state = ChannelState::Open;
                self.timer.cancel();
                info!("Channel open");
                let subscribe = self.subscribe.clone();
                if let Err(e) = self.send(&subscribe) {
                    warn!("Failed to send subscribe request: {}", e);
                }
                handler.handle_session_event(SessionEvent::Opened);
            }
            TransportEvent::Text(text) => match decode(&text) {
                Ok(Decoded::Message(message)) => {
                    trace!("<- {}", message.kind());
                    handler.handle_message(message);
                }
                Ok(Decoded::Unknown(kind)) => {
                    debug!("Ignoring message of unknown kind '{}'", kind);
                    handler.handle_session_event(SessionEvent::UnknownKind(kind));
                }
                Err(e) => {
                    warn!("Dropping undecodable frame: {}", e);
                    handler.handle_session_event(SessionEvent::ParseError(e.to_string()));
                }
            },
            TransportEvent::Closed { reason } => {
                self.state = ChannelState::Closed;
                self.timer.schedule(now);
                warn!(
                    "Channel closed ({}), reconnecting in {:?}",
                    reason,
                    self.timer.delay()
                );
                handler.handle_session_event(SessionEvent::Closed {
                    reason,
                    retry_in: self.timer.delay(),
                });
            }
            TransportEvent::Error(message) => {
                warn!("Transport error: {}", message);
                handler.handle_session_event(SessionEvent::TransportError(message));
            }
        }
    }
}
