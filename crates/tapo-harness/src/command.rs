//! Method-name routing.
//!
//! Tapo methods follow a naming convention rather than a schema: `set_X`
//! updates what `get_X` returns, and anything carrying a command prefix is
//! dispatched by that prefix regardless of suffix. Parsing the name once into
//! a [`Command`] keeps the precedence in one place.

use tapo_proto::request::{
    CONTROL_CHILD, GET_CHILD_DEVICE_LIST, PLAY_ALARM, SET_LIGHTING_EFFECT, STOP_ALARM,
};

/// Routing decision for a method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the stored lighting effect descriptor.
    SetLightingEffect,

    /// Merge params into the entry of the paired getter.
    Set {
        /// Getter key, `get_X` for `set_X`.
        target: String,
    },

    /// Forward to a hub child.
    ControlChild,

    /// Turn the siren on.
    PlayAlarm,

    /// Turn the siren off.
    StopAlarm,

    /// Paginated child listing.
    GetChildList,

    /// Plain lookup by method name.
    Get,
}

impl Command {
    /// Parse `method` by prefix, first match wins.
    ///
    /// | Prefix                  | Command             |
    /// |-------------------------|---------------------|
    /// | `set_lighting_effect`   | `SetLightingEffect` |
    /// | `set_`                  | `Set`               |
    /// | `control_child`         | `ControlChild`      |
    /// | `play_alarm`            | `PlayAlarm`         |
    /// | `stop_alarm`            | `StopAlarm`         |
    /// | `get_child_device_list` | `GetChildList`      |
    /// | anything else           | `Get`               |
    pub fn parse(method: &str) -> Self {
        if method.starts_with(SET_LIGHTING_EFFECT) {
            Self::SetLightingEffect
        } else if let Some(attribute) = method.strip_prefix("set_") {
            Self::Set { target: format!("get_{attribute}") }
        } else if method.starts_with(CONTROL_CHILD) {
            Self::ControlChild
        } else if method.starts_with(PLAY_ALARM) {
            Self::PlayAlarm
        } else if method.starts_with(STOP_ALARM) {
            Self::StopAlarm
        } else if method.starts_with(GET_CHILD_DEVICE_LIST) {
            Self::GetChildList
        } else {
            Self::Get
        }
    }

    /// True for commands that change the state mapping.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::SetLightingEffect | Self::Set { .. } | Self::PlayAlarm | Self::StopAlarm
        )
    }
}
