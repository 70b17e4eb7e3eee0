//! Client-side runtime for Stream Deck plugins.
//!
//! A plugin is one WebSocket connection to the Stream Deck application:
//! - register handlers on a [`Connection`], at most one per event
//! - [`Connection::connect`] sends the registration frame and starts the read loop
//! - send commands and wait for exit through the returned [`PluginHandle`]
//!
//! Unknown or malformed inbound frames are logged and dropped; they never
//! stop the read loop.

pub mod args;
mod connection;
pub mod error;
mod handler;
mod router;

pub use args::{ArgsError, RegistrationArgs};
pub use connection::{Connection, PluginHandle};
pub use error::ClientError;
pub use handler::{Handler, HandlerTable};
pub use router::{RouteOutcome, Router};
