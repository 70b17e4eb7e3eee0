//! Discriminator to shape lookup.

use crate::received::*;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

/// Decodes a raw frame into one concrete shape.
pub type DecodeFn = fn(&str) -> serde_json::Result<InboundEvent>;

/// Everything needed to turn a frame with a known `event` into a record.
#[derive(Clone, Copy)]
pub struct ShapeDescriptor {
    pub kind: EventKind,
    pub discriminator: &'static str,
    decode: DecodeFn,
}

impl ShapeDescriptor {
    /// Descriptor for the record type `E`.
    pub fn of<E: InboundShape>() -> Self {
        Self {
            kind: E::KIND,
            discriminator: E::KIND.discriminator(),
            decode: decode_as::<E>,
        }
    }

    /// Fully decode `raw` into this shape.
    pub fn decode(&self, raw: &str) -> serde_json::Result<InboundEvent> {
        (self.decode)(raw)
    }
}

impl fmt::Debug for ShapeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeDescriptor")
            .field("kind", &self.kind)
            .field("discriminator", &self.discriminator)
            .finish_non_exhaustive()
    }
}

fn decode_as<E: InboundShape>(raw: &str) -> serde_json::Result<InboundEvent> {
    serde_json::from_str::<E>(raw).map(E::into_event)
}

impl EventKind {
    /// Descriptor for this shape.
    pub fn descriptor(self) -> ShapeDescriptor {
        match self {
            EventKind::KeyDown => ShapeDescriptor::of::<KeyDown>(),
            EventKind::KeyUp => ShapeDescriptor::of::<KeyUp>(),
            EventKind::WillAppear => ShapeDescriptor::of::<WillAppear>(),
            EventKind::WillDisappear => ShapeDescriptor::of::<WillDisappear>(),
            EventKind::DidReceiveSettings => ShapeDescriptor::of::<DidReceiveSettings>(),
            EventKind::DidReceiveGlobalSettings => {
                ShapeDescriptor::of::<DidReceiveGlobalSettings>()
            }
            EventKind::DidReceiveDeepLink => ShapeDescriptor::of::<DidReceiveDeepLink>(),
            EventKind::TouchTap => ShapeDescriptor::of::<TouchTap>(),
            EventKind::DialDown => ShapeDescriptor::of::<DialDown>(),
            EventKind::DialUp => ShapeDescriptor::of::<DialUp>(),
            EventKind::DialRotate => ShapeDescriptor::of::<DialRotate>(),
            EventKind::TitleParametersDidChange => {
                ShapeDescriptor::of::<TitleParametersDidChange>()
            }
            EventKind::DeviceDidConnect => ShapeDescriptor::of::<DeviceDidConnect>(),
            EventKind::DeviceDidDisconnect => ShapeDescriptor::of::<DeviceDidDisconnect>(),
            EventKind::ApplicationDidLaunch => ShapeDescriptor::of::<ApplicationDidLaunch>(),
            EventKind::ApplicationDidTerminate => {
                ShapeDescriptor::of::<ApplicationDidTerminate>()
            }
            EventKind::SystemDidWakeUp => ShapeDescriptor::of::<SystemDidWakeUp>(),
            EventKind::PropertyInspectorDidAppear => {
                ShapeDescriptor::of::<PropertyInspectorDidAppear>()
            }
            EventKind::PropertyInspectorDidDisappear => {
                ShapeDescriptor::of::<PropertyInspectorDidDisappear>()
            }
            EventKind::SendToPlugin => ShapeDescriptor::of::<SendToPlugin>(),
            EventKind::SendToPropertyInspector => {
                ShapeDescriptor::of::<SendToPropertyInspector>()
            }
        }
    }
}

/// Immutable map from `event` string to shape.
///
/// Built once before connecting and shared read-only with the connection.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    shapes: HashMap<&'static str, ShapeDescriptor>,
}

impl TypeRegistry {
    /// Registry of every shape this crate knows.
    pub fn builtin() -> Self {
        let shapes = EventKind::ALL
            .iter()
            .map(|kind| (kind.discriminator(), kind.descriptor()))
            .collect();
        Self { shapes }
    }

    /// Build a registry from an explicit descriptor list.
    ///
    /// Two descriptors sharing a discriminator is a configuration error.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ShapeDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut shapes = HashMap::new();
        for descriptor in descriptors {
            match shapes.entry(descriptor.discriminator) {
                Entry::Occupied(_) => {
                    return Err(RegistryError::Collision(descriptor.discriminator));
                }
                Entry::Vacant(slot) => {
                    slot.insert(descriptor);
                }
            }
        }
        Ok(Self { shapes })
    }

    /// Find the shape registered under `discriminator`.
    pub fn lookup(&self, discriminator: &str) -> Option<&ShapeDescriptor> {
        self.shapes.get(discriminator)
    }

    /// Whether any discriminator maps to `kind`.
    pub fn contains_kind(&self, kind: EventKind) -> bool {
        self.shapes.values().any(|d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShapeDescriptor> {
        self.shapes.values()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Error building a registry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("discriminator {0:?} registered twice")]
    Collision(&'static str),
}
