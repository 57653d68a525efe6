//! Transport layer for the dashboard channel
//!
//! The transport is split in two halves:
//!
//! - **Worker** ([`worker::WsTransport`]): a tokio runtime on its own thread
//!   that owns the websocket. It connects only when asked and reports what
//!   happens as [`TransportEvent`]s. It never reconnects on its own.
//! - **Session** ([`session::SessionManager`]): runs on the UI thread, owns the
//!   channel state machine and the reconnect timer, decodes frames and hands
//!   them to the single registered [`session::MessageHandler`].
//!
//! The [`Transport`] trait is the seam between the two, so the session can be
//! driven by a scripted transport in tests.

pub mod session;
pub mod worker;

pub use session::{MessageHandler, ReconnectTimer, SessionEvent, SessionManager};
pub use worker::WsTransport;

use crate::error::Result;

/// Something that happened on the underlying connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is established
    Opened,
    /// A text frame arrived
    Text(String),
    /// The connection ended, or a connection attempt failed
    Closed { reason: String },
    /// A non-fatal error worth surfacing (a `Closed` follows if fatal)
    Error(String),
}

/// Non-blocking interface to a duplex text channel
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Start a connection attempt; the outcome arrives as an event
    fn connect(&mut self);

    /// Queue a text frame on the open connection
    fn send(&mut self, text: String) -> Result<()>;

    /// Take the next pending event, if any
    fn poll_event(&mut self) -> Option<TransportEvent>;
}
