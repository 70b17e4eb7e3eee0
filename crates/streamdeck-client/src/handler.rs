//! Handler table mapping each inbound event kind to one callback.
//!
//! Handlers are plain synchronous closures. They run on the read loop task,
//! one frame at a time, so a handler that blocks stalls every later frame.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use streamdeck_core::{EventKind, InboundEvent, InboundShape, TypeRegistry};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Type-erased callback stored in the table.
pub type Handler = Box<dyn Fn(InboundEvent) + Send + 'static>;

/// At most one handler per [`EventKind`].
#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<EventKind, Handler>,
}

impl HandlerTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for the record type `E`.
    ///
    /// Fails with [`ClientError::DuplicateHandler`] if `E` already has one.
    pub fn register<E, F>(&mut self, handler: F) -> Result<()>
    where
        E: InboundShape,
        F: Fn(E) + Send + 'static,
    {
        self.insert(
            E::KIND,
            Box::new(move |event| {
                if let Some(record) = E::from_event(event) {
                    handler(record);
                }
            }),
        )
    }

    /// Register a handler by `event` name.
    ///
    /// The name must be known to `registry`; otherwise this fails with
    /// [`ClientError::InvalidHandler`].
    pub fn register_by_name<F>(
        &mut self,
        registry: &TypeRegistry,
        discriminator: &str,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(InboundEvent) + Send + 'static,
    {
        let descriptor = registry
            .lookup(discriminator)
            .ok_or_else(|| ClientError::InvalidHandler(discriminator.to_string()))?;
        self.insert(descriptor.kind, Box::new(handler))
    }

    fn insert(&mut self, kind: EventKind, handler: Handler) -> Result<()> {
        match self.handlers.entry(kind) {
            Entry::Occupied(_) => Err(ClientError::DuplicateHandler(kind)),
            Entry::Vacant(slot) => {
                slot.insert(handler);
                Ok(())
            }
        }
    }

    /// Call the handler for `event`, if one is registered.
    ///
    /// Returns whether a handler ran. A missing handler is not an error.
    pub fn dispatch(&self, event: InboundEvent) -> bool {
        let kind = event.kind();
        match self.handlers.get(&kind) {
            Some(handler) => {
                debug!(event = %kind, "dispatching to handler");
                handler(event);
                true
            }
            None => {
                debug!(event = %kind, "no handler registered");
                false
            }
        }
    }

    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use streamdeck_core::received::{DeviceDidDisconnect, KeyDown, KeyUp};

    fn disconnect(device: &str) -> InboundEvent {
        InboundEvent::DeviceDidDisconnect(DeviceDidDisconnect {
            device: device.to_string(),
        })
    }

    #[test]
    fn register_distinct_kinds() {
        let mut table = HandlerTable::new();
        table.register(|_: KeyUp| {}).unwrap();
        table.register(|_: KeyDown| {}).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.is_registered(EventKind::KeyUp));
        assert!(table.is_registered(EventKind::KeyDown));
        assert!(!table.is_registered(EventKind::DialUp));
    }

    #[test]
    fn duplicate_handler_rejected() {
        let mut table = HandlerTable::new();
        table.register(|_: KeyUp| {}).unwrap();

        let err = table.register(|_: KeyUp| {}).unwrap_err();
        assert!(matches!(err, ClientError::DuplicateHandler(EventKind::KeyUp)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn duplicate_across_typed_and_named() {
        let registry = TypeRegistry::builtin();
        let mut table = HandlerTable::new();
        table.register(|_: KeyUp| {}).unwrap();

        let err = table
            .register_by_name(&registry, "keyUp", |_| {})
            .unwrap_err();
        assert!(matches!(err, ClientError::DuplicateHandler(EventKind::KeyUp)));
    }

    #[test]
    fn invalid_handler_name() {
        let registry = TypeRegistry::builtin();
        let mut table = HandlerTable::new();

        let err = table
            .register_by_name(&registry, "keyWiggle", |_| {})
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidHandler(name) if name == "keyWiggle"));
        assert!(table.is_empty());
    }

    #[test]
    fn dispatch_calls_matching_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = HandlerTable::new();
        let counter = calls.clone();
        table
            .register(move |event: DeviceDidDisconnect| {
                assert_eq!(event.device, "DEV");
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert!(table.dispatch(disconnect("DEV")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_without_handler_is_noop() {
        let table = HandlerTable::new();
        assert!(!table.dispatch(disconnect("DEV")));
    }

    #[test]
    fn named_handler_receives_whole_event() {
        let registry = TypeRegistry::builtin();
        let seen = Arc::new(AtomicUsize::new(0));
        let mut table = HandlerTable::new();
        let counter = seen.clone();
        table
            .register_by_name(&registry, "deviceDidDisconnect", move |event| {
                assert_eq!(event.kind(), EventKind::DeviceDidDisconnect);
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        table.dispatch(disconnect("A"));
        table.dispatch(disconnect("B"));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
