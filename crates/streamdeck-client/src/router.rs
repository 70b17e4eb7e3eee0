//! Decode-and-route for inbound frames.
//!
//! Each frame is decoded in two steps. First only the `event` field is read
//! and looked up in the [`TypeRegistry`]; only a known discriminator gets the
//! full decode into its record. Unknown and malformed frames are logged and
//! dropped.

use std::sync::Arc;

use streamdeck_core::{Discriminator, EventKind, TypeRegistry};
use tracing::warn;

use crate::handler::HandlerTable;

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Decoded and handed to its handler.
    Dispatched(EventKind),
    /// Decoded, but no handler is registered for it.
    Unhandled(EventKind),
    /// The `event` value is not in the registry.
    Unknown(String),
    /// The frame could not be decoded.
    Malformed(String),
}

/// Registry plus handlers: everything the read loop needs per frame.
#[derive(Debug)]
pub struct Router {
    registry: Arc<TypeRegistry>,
    handlers: HandlerTable,
}

impl Router {
    pub fn new(registry: Arc<TypeRegistry>, handlers: HandlerTable) -> Self {
        Self { registry, handlers }
    }

    /// Decode one text frame and dispatch it.
    pub fn route(&self, raw: &str) -> RouteOutcome {
        let discriminator = match Discriminator::peek(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!("cannot decode frame: {}", e);
                return RouteOutcome::Malformed(e.to_string());
            }
        };

        let Some(descriptor) = self.registry.lookup(&discriminator) else {
            warn!(event = %discriminator, "no type registered for event");
            return RouteOutcome::Unknown(discriminator.into_owned());
        };

        let event = match descriptor.decode(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(event = %discriminator, "cannot unmarshal: {}", e);
                return RouteOutcome::Malformed(e.to_string());
            }
        };

        let kind = event.kind();
        if self.handlers.dispatch(event) {
            RouteOutcome::Dispatched(kind)
        } else {
            RouteOutcome::Unhandled(kind)
        }
    }
}
