//! Core types for the Stream Deck plugin protocol.
//!
//! This crate holds the protocol data only: the closed set of inbound event
//! records, the outbound commands, and the registry that maps a frame's
//! `event` discriminator to the record it decodes into. The connection and
//! dispatch runtime lives in `streamdeck-client`.

mod image;
pub mod received;
mod registry;
pub mod sent;

pub use image::{ImageData, ImageDataError};
pub use received::{Discriminator, Envelope, EventKind, InboundEvent, InboundShape};
pub use registry::{RegistryError, ShapeDescriptor, TypeRegistry};
pub use sent::{Command, Outbound, Registration, Target};

/// Connection lifecycle state.
///
/// Transitions only move forward; there is no reconnect. `Unconnected` and
/// `Connecting` are never observed through an open handle: the first covers
/// the handler registration phase, the second only the body of the connect
/// call, which yields a handle in `Open` or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handlers may still be registered.
    Unconnected,
    /// Transport is being opened and the registration frame sent.
    Connecting,
    /// Read loop is running; commands may be sent.
    Open,
    /// Transport reported a terminal error or closed.
    Closed,
}

impl ConnectionState {
    /// Whether this state is final.
    pub fn is_terminal(self) -> bool {
        self == Self::Closed
    }
}
