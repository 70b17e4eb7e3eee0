//! Events received from the Stream Deck application.
//!
//! Every inbound frame is a JSON object whose `event` field names one of the
//! records below. The set is closed: [`InboundEvent`] has one variant per
//! record and [`EventKind`] one tag per variant.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Position of an action on the device grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub column: u32,
    pub row: u32,
}

/// Payload of `keyDown` and `keyUp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPayload {
    /// Persistently stored action settings.
    #[serde(default)]
    pub settings: Value,
    /// Absent when the action is inside a Multi-Action.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Only set when the action has multiple states.
    #[serde(default)]
    pub state: Option<u32>,
    /// Only set when triggered from a Multi-Action with a specific value.
    #[serde(default)]
    pub user_desired_state: Option<u32>,
    #[serde(default)]
    pub is_in_multi_action: bool,
}

/// Payload of `willAppear` and `willDisappear`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearancePayload {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// `"Keypad"` or `"Encoder"`.
    #[serde(default)]
    pub controller: Option<String>,
    #[serde(default)]
    pub state: Option<u32>,
    #[serde(default)]
    pub is_in_multi_action: bool,
}

/// Payload of `didReceiveSettings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    pub settings: Value,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub state: Option<u32>,
    #[serde(default)]
    pub is_in_multi_action: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettingsPayload {
    pub settings: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepLinkPayload {
    /// The deep-link URL with the `streamdeck://plugins/message/<uuid>/` prefix removed.
    pub url: String,
}

/// Payload of `dialDown` and `dialUp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderPayload {
    #[serde(default)]
    pub settings: Value,
    pub controller: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialRotatePayload {
    #[serde(default)]
    pub settings: Value,
    pub controller: String,
    pub coordinates: Coordinates,
    /// Positive for clockwise rotation, negative for counterclockwise.
    pub ticks: i32,
    /// True when the encoder was held down while rotating.
    #[serde(default)]
    pub pressed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchTapPayload {
    #[serde(default)]
    pub settings: Value,
    pub controller: String,
    pub coordinates: Coordinates,
    /// `[x, y]` of the touch on the display.
    #[serde(default)]
    pub tap_pos: Vec<i32>,
    #[serde(default)]
    pub hold: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleParameters {
    pub font_family: String,
    pub font_size: u32,
    pub font_style: String,
    pub font_underline: bool,
    pub show_title: bool,
    /// `"top"`, `"middle"` or `"bottom"`.
    pub title_alignment: String,
    pub title_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleParametersPayload {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// The state whose title changed.
    pub state: u32,
    pub title: String,
    pub title_parameters: TitleParameters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSize {
    pub columns: u32,
    pub rows: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Name set by the user.
    pub name: String,
    /// Device model code (0 = Stream Deck, 1 = Mini, 2 = XL, ...).
    #[serde(rename = "type")]
    pub device_type: u32,
    pub size: DeviceSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationPayload {
    /// Bundle identifier on macOS, executable name on Windows.
    pub application: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDown {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: KeyPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyUp {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: KeyPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WillAppear {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: AppearancePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WillDisappear {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: AppearancePayload,
}

/// Reply to `getSettings`, or a settings change made in the Property Inspector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DidReceiveSettings {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: SettingsPayload,
}

/// Reply to `getGlobalSettings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DidReceiveGlobalSettings {
    pub payload: GlobalSettingsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DidReceiveDeepLink {
    pub payload: DeepLinkPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchTap {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: TouchTapPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialDown {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: EncoderPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialUp {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: EncoderPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialRotate {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: DialRotatePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleParametersDidChange {
    pub action: String,
    pub context: String,
    pub device: String,
    pub payload: TitleParametersPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDidConnect {
    pub device: String,
    pub device_info: DeviceInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDidDisconnect {
    pub device: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDidLaunch {
    pub payload: ApplicationPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDidTerminate {
    pub payload: ApplicationPayload,
}

/// May arrive several times per wake-up; devices are not guaranteed to be ready.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDidWakeUp {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInspectorDidAppear {
    pub action: String,
    pub context: String,
    pub device: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInspectorDidDisappear {
    pub action: String,
    pub context: String,
    pub device: String,
}

/// Arbitrary JSON sent by the Property Inspector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendToPlugin {
    pub action: String,
    pub context: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendToPropertyInspector {
    pub action: String,
    pub context: String,
    #[serde(default)]
    pub payload: Value,
}

mod sealed {
    pub trait Sealed {}
}

/// A record that is a member of the closed inbound set.
///
/// Implemented only by the records in this module, so a handler typed over
/// `E: InboundShape` always accepts exactly one known shape.
pub trait InboundShape: DeserializeOwned + Send + 'static + sealed::Sealed {
    /// Tag of the variant wrapping this record.
    const KIND: EventKind;

    /// Unwrap the record if `event` holds this shape.
    fn from_event(event: InboundEvent) -> Option<Self>;

    /// Wrap the record in its variant.
    fn into_event(self) -> InboundEvent;
}

macro_rules! inbound_events {
    ($($name:ident => $event:literal),+ $(,)?) => {
        /// A decoded inbound frame.
        #[derive(Debug, Clone, PartialEq)]
        pub enum InboundEvent {
            $($name($name),)+
        }

        /// Identifies one inbound shape without carrying its data.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EventKind {
            $($name,)+
        }

        impl EventKind {
            /// Every inbound shape, in declaration order.
            pub const ALL: &'static [EventKind] = &[$(EventKind::$name,)+];

            /// The `event` string this shape arrives under.
            pub fn discriminator(self) -> &'static str {
                match self {
                    $(EventKind::$name => $event,)+
                }
            }
        }

        impl InboundEvent {
            pub fn kind(&self) -> EventKind {
                match self {
                    $(InboundEvent::$name(_) => EventKind::$name,)+
                }
            }
        }

        $(
            impl sealed::Sealed for $name {}

            impl InboundShape for $name {
                const KIND: EventKind = EventKind::$name;

                fn from_event(event: InboundEvent) -> Option<Self> {
                    match event {
                        InboundEvent::$name(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn into_event(self) -> InboundEvent {
                    InboundEvent::$name(self)
                }
            }
        )+
    };
}

inbound_events! {
    KeyDown => "keyDown",
    KeyUp => "keyUp",
    WillAppear => "willAppear",
    WillDisappear => "willDisappear",
    DidReceiveSettings => "didReceiveSettings",
    DidReceiveGlobalSettings => "didReceiveGlobalSettings",
    DidReceiveDeepLink => "didReceiveDeepLink",
    TouchTap => "touchTap",
    DialDown => "dialDown",
    DialUp => "dialUp",
    DialRotate => "dialRotate",
    TitleParametersDidChange => "titleParametersDidChange",
    DeviceDidConnect => "deviceDidConnect",
    DeviceDidDisconnect => "deviceDidDisconnect",
    ApplicationDidLaunch => "applicationDidLaunch",
    ApplicationDidTerminate => "applicationDidTerminate",
    SystemDidWakeUp => "systemDidWakeUp",
    PropertyInspectorDidAppear => "propertyInspectorDidAppear",
    PropertyInspectorDidDisappear => "propertyInspectorDidDisappear",
    SendToPlugin => "sendToPlugin",
    SendToPropertyInspector => "sendToPropertyInspector",
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.discriminator())
    }
}

impl InboundEvent {
    /// The `event` string this frame arrived under.
    pub fn event_name(&self) -> &'static str {
        self.kind().discriminator()
    }

    /// The action instance this event targets, if it targets one.
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::KeyDown(e) => Some(&e.context),
            Self::KeyUp(e) => Some(&e.context),
            Self::WillAppear(e) => Some(&e.context),
            Self::WillDisappear(e) => Some(&e.context),
            Self::DidReceiveSettings(e) => Some(&e.context),
            Self::TouchTap(e) => Some(&e.context),
            Self::DialDown(e) => Some(&e.context),
            Self::DialUp(e) => Some(&e.context),
            Self::DialRotate(e) => Some(&e.context),
            Self::TitleParametersDidChange(e) => Some(&e.context),
            Self::PropertyInspectorDidAppear(e) => Some(&e.context),
            Self::PropertyInspectorDidDisappear(e) => Some(&e.context),
            Self::SendToPlugin(e) => Some(&e.context),
            Self::SendToPropertyInspector(e) => Some(&e.context),
            Self::DidReceiveGlobalSettings(_)
            | Self::DidReceiveDeepLink(_)
            | Self::DeviceDidConnect(_)
            | Self::DeviceDidDisconnect(_)
            | Self::ApplicationDidLaunch(_)
            | Self::ApplicationDidTerminate(_)
            | Self::SystemDidWakeUp(_) => None,
        }
    }
}

/// Only the `event` field of a frame.
///
/// Parsing into this commits to no shape; the rest of the object is skipped.
#[derive(Debug, Deserialize)]
pub struct Discriminator<'a> {
    #[serde(borrow)]
    pub event: Cow<'a, str>,
}

impl<'a> Discriminator<'a> {
    /// Extract the `event` field from a raw frame.
    pub fn peek(raw: &'a str) -> serde_json::Result<Cow<'a, str>> {
        serde_json::from_str::<Discriminator<'a>>(raw).map(|d| d.event)
    }
}

/// Shape-agnostic view of any frame, inbound or outbound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}
