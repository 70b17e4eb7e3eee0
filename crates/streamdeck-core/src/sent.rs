//! Commands sent to the Stream Deck application.
//!
//! Every outbound frame names itself in `event` and, when it acts on one
//! action instance, carries that instance's `context`.

use crate::ImageData;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which display a title or image change applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Target {
    /// Hardware and software.
    #[default]
    Both,
    Hardware,
    Software,
}

impl From<Target> for u8 {
    fn from(target: Target) -> Self {
        match target {
            Target::Both => 0,
            Target::Hardware => 1,
            Target::Software => 2,
        }
    }
}

impl TryFrom<u8> for Target {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Both),
            1 => Ok(Self::Hardware),
            2 => Ok(Self::Software),
            other => Err(format!("unknown target {other}")),
        }
    }
}

/// Anything that can be written to the connection as one frame.
pub trait Outbound: Serialize {
    /// The `event` value of the frame.
    fn event_name(&self) -> &str;

    /// The action instance the frame targets, if any.
    fn context(&self) -> Option<&str>;
}

/// The first frame of every session.
///
/// `event` is the registration event name handed to the plugin at launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub event: String,
    pub uuid: String,
}

impl Registration {
    pub fn new(event: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            uuid: uuid.into(),
        }
    }
}

impl Outbound for Registration {
    fn event_name(&self) -> &str {
        &self.event
    }

    fn context(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlPayload {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitlePayload {
    pub title: String,
    pub target: Target,
    /// Omitted to apply to every state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub image: ImageData,
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutPayload {
    /// Built-in layout id such as `$A1`, or a path to a custom layout file.
    pub layout: String,
}

/// Encoder hints; unset entries keep their current text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_touch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePayload {
    pub state: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub profile: String,
    #[serde(default)]
    pub page: u32,
}

/// A command for the Stream Deck application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Command {
    /// Persist settings for an action instance.
    SetSettings { context: String, payload: Value },
    /// Request a `didReceiveSettings` event.
    GetSettings { context: String },
    /// Persist settings shared by every instance; `context` is the plugin UUID.
    SetGlobalSettings { context: String, payload: Value },
    /// Request a `didReceiveGlobalSettings` event.
    GetGlobalSettings { context: String },
    /// Open a URL in the default browser.
    OpenUrl { payload: UrlPayload },
    /// Write to the Stream Deck application log.
    LogMessage { payload: MessagePayload },
    SetTitle { context: String, payload: TitlePayload },
    SetImage { context: String, payload: ImagePayload },
    /// Update values of the current touch display layout.
    SetFeedback { context: String, payload: Value },
    SetFeedbackLayout { context: String, payload: LayoutPayload },
    SetTriggerDescription { context: String, payload: TriggerDescription },
    /// Flash the alert icon on the key.
    ShowAlert { context: String },
    /// Flash the checkmark on the key.
    ShowOk { context: String },
    SetState { context: String, payload: StatePayload },
    /// Only works for profiles bundled with this plugin; `context` is the plugin UUID.
    SwitchToProfile {
        context: String,
        device: String,
        payload: ProfilePayload,
    },
    SendToPropertyInspector {
        context: String,
        action: String,
        payload: Value,
    },
    /// Property Inspector to plugin; only meaningful from a Property Inspector connection.
    SendToPlugin {
        context: String,
        action: String,
        payload: Value,
    },
}

impl Command {
    pub fn set_settings(context: impl Into<String>, settings: Value) -> Self {
        Self::SetSettings {
            context: context.into(),
            payload: settings,
        }
    }

    pub fn get_settings(context: impl Into<String>) -> Self {
        Self::GetSettings {
            context: context.into(),
        }
    }

    pub fn set_global_settings(plugin_uuid: impl Into<String>, settings: Value) -> Self {
        Self::SetGlobalSettings {
            context: plugin_uuid.into(),
            payload: settings,
        }
    }

    pub fn get_global_settings(plugin_uuid: impl Into<String>) -> Self {
        Self::GetGlobalSettings {
            context: plugin_uuid.into(),
        }
    }

    pub fn open_url(url: impl Into<String>) -> Self {
        Self::OpenUrl {
            payload: UrlPayload { url: url.into() },
        }
    }

    pub fn log_message(message: impl Into<String>) -> Self {
        Self::LogMessage {
            payload: MessagePayload {
                message: message.into(),
            },
        }
    }

    pub fn set_title(
        context: impl Into<String>,
        title: impl Into<String>,
        target: Target,
        state: Option<u32>,
    ) -> Self {
        Self::SetTitle {
            context: context.into(),
            payload: TitlePayload {
                title: title.into(),
                target,
                state,
            },
        }
    }

    pub fn set_image(
        context: impl Into<String>,
        image: ImageData,
        target: Target,
        state: Option<u32>,
    ) -> Self {
        Self::SetImage {
            context: context.into(),
            payload: ImagePayload {
                image,
                target,
                state,
            },
        }
    }

    pub fn set_feedback(context: impl Into<String>, payload: Value) -> Self {
        Self::SetFeedback {
            context: context.into(),
            payload,
        }
    }

    pub fn set_feedback_layout(context: impl Into<String>, layout: impl Into<String>) -> Self {
        Self::SetFeedbackLayout {
            context: context.into(),
            payload: LayoutPayload {
                layout: layout.into(),
            },
        }
    }

    pub fn set_trigger_description(
        context: impl Into<String>,
        description: TriggerDescription,
    ) -> Self {
        Self::SetTriggerDescription {
            context: context.into(),
            payload: description,
        }
    }

    pub fn show_alert(context: impl Into<String>) -> Self {
        Self::ShowAlert {
            context: context.into(),
        }
    }

    pub fn show_ok(context: impl Into<String>) -> Self {
        Self::ShowOk {
            context: context.into(),
        }
    }

    pub fn set_state(context: impl Into<String>, state: u32) -> Self {
        Self::SetState {
            context: context.into(),
            payload: StatePayload { state },
        }
    }

    pub fn switch_to_profile(
        plugin_uuid: impl Into<String>,
        device: impl Into<String>,
        profile: impl Into<String>,
        page: u32,
    ) -> Self {
        Self::SwitchToProfile {
            context: plugin_uuid.into(),
            device: device.into(),
            payload: ProfilePayload {
                profile: profile.into(),
                page,
            },
        }
    }

    pub fn send_to_property_inspector(
        context: impl Into<String>,
        action: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self::SendToPropertyInspector {
            context: context.into(),
            action: action.into(),
            payload,
        }
    }

    pub fn send_to_plugin(
        context: impl Into<String>,
        action: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self::SendToPlugin {
            context: context.into(),
            action: action.into(),
            payload,
        }
    }
}

impl Outbound for Command {
    fn event_name(&self) -> &str {
        match self {
            Self::SetSettings { .. } => "setSettings",
            Self::GetSettings { .. } => "getSettings",
            Self::SetGlobalSettings { .. } => "setGlobalSettings",
            Self::GetGlobalSettings { .. } => "getGlobalSettings",
            Self::OpenUrl { .. } => "openUrl",
            Self::LogMessage { .. } => "logMessage",
            Self::SetTitle { .. } => "setTitle",
            Self::SetImage { .. } => "setImage",
            Self::SetFeedback { .. } => "setFeedback",
            Self::SetFeedbackLayout { .. } => "setFeedbackLayout",
            Self::SetTriggerDescription { .. } => "setTriggerDescription",
            Self::ShowAlert { .. } => "showAlert",
            Self::ShowOk { .. } => "showOk",
            Self::SetState { .. } => "setState",
            Self::SwitchToProfile { .. } => "switchToProfile",
            Self::SendToPropertyInspector { .. } => "sendToPropertyInspector",
            Self::SendToPlugin { .. } => "sendToPlugin",
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::OpenUrl { .. } | Self::LogMessage { .. } => None,
            Self::SetSettings { context, .. }
            | Self::GetSettings { context }
            | Self::SetGlobalSettings { context, .. }
            | Self::GetGlobalSettings { context }
            | Self::SetTitle { context, .. }
            | Self::SetImage { context, .. }
            | Self::SetFeedback { context, .. }
            | Self::SetFeedbackLayout { context, .. }
            | Self::SetTriggerDescription { context, .. }
            | Self::ShowAlert { context }
            | Self::ShowOk { context }
            | Self::SetState { context, .. }
            | Self::SwitchToProfile { context, .. }
            | Self::SendToPropertyInspector { context, .. }
            | Self::SendToPlugin { context, .. } => Some(context),
        }
    }
}
