//! Request payload types.
//!
//! A request is a method name plus params. Params come in four shapes on the
//! wire and are decoded untagged, so the JSON form matches what a device
//! expects byte for byte:
//!
//! - Flat attribute map: `{"device_on": true}`
//! - Pagination: `{"start_index": 0}`
//! - Multiple request: `{"requests": [...]}`
//! - Control child: `{"device_id": "...", "requestData": {...}}`

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Query the device info snapshot.
pub const GET_DEVICE_INFO: &str = "get_device_info";
/// Update fields of the device info snapshot.
pub const SET_DEVICE_INFO: &str = "set_device_info";
/// Page through the children of a hub or strip.
pub const GET_CHILD_DEVICE_LIST: &str = "get_child_device_list";
/// Replace the lighting effect of an LED strip.
pub const SET_LIGHTING_EFFECT: &str = "set_lighting_effect";
/// Forward a request to a hub child.
pub const CONTROL_CHILD: &str = "control_child";
/// Batch several requests into one.
pub const MULTIPLE_REQUEST: &str = "multipleRequest";
/// Start the hub siren.
pub const PLAY_ALARM: &str = "play_alarm";
/// Stop the hub siren.
pub const STOP_ALARM: &str = "stop_alarm";

/// A single protocol request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapoRequest {
    /// Method name, e.g. `get_device_info`.
    pub method: String,
    /// Method params (empty map when absent or null).
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "RequestParams::is_empty"
    )]
    pub params: RequestParams,
}

impl TapoRequest {
    /// Build a request with explicit params.
    pub fn new(method: impl Into<String>, params: RequestParams) -> Self {
        Self { method: method.into(), params }
    }

    /// Build a request without params.
    pub fn get(method: impl Into<String>) -> Self {
        Self::new(method, RequestParams::default())
    }

    /// `get_device_info`
    pub fn get_device_info() -> Self {
        Self::get(GET_DEVICE_INFO)
    }

    /// `set_device_info` with the given attribute updates.
    pub fn set_device_info(values: Map<String, Value>) -> Self {
        Self::new(SET_DEVICE_INFO, RequestParams::Values(values))
    }

    /// `get_child_device_list` starting at `start_index`.
    pub fn get_child_device_list(start_index: u64) -> Self {
        Self::new(GET_CHILD_DEVICE_LIST, RequestParams::Paginated(PaginationParams { start_index }))
    }

    /// `set_lighting_effect` with a full effect descriptor.
    pub fn set_lighting_effect(effect: Map<String, Value>) -> Self {
        Self::new(SET_LIGHTING_EFFECT, RequestParams::Values(effect))
    }

    /// `play_alarm`
    pub fn play_alarm() -> Self {
        Self::get(PLAY_ALARM)
    }

    /// `stop_alarm`
    pub fn stop_alarm() -> Self {
        Self::get(STOP_ALARM)
    }

    /// `multipleRequest` batching `requests`.
    pub fn multiple_request(requests: Vec<Self>) -> Self {
        Self::new(MULTIPLE_REQUEST, RequestParams::Multiple(MultipleRequestParams { requests }))
    }

    /// `control_child` forwarding `request` to the child `device_id`.
    ///
    /// The nested request is wrapped in a single-item `multipleRequest`, the
    /// way hubs expect it.
    pub fn control_child(device_id: impl Into<String>, request: Self) -> Self {
        Self::new(
            CONTROL_CHILD,
            RequestParams::ControlChild(ControlChildParams {
                device_id: device_id.into(),
                request_data: Box::new(Self::multiple_request(vec![request])),
            }),
        )
    }
}

/// Params of a [`TapoRequest`].
///
/// Variant order matters: untagged decoding tries each in turn and the
/// structured shapes reject unknown fields, so anything else falls through
/// to [`RequestParams::Values`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestParams {
    /// Forward a request to a hub child.
    ControlChild(ControlChildParams),
    /// Batch of requests.
    Multiple(MultipleRequestParams),
    /// Page selector for list queries.
    Paginated(PaginationParams),
    /// Flat attribute map.
    Values(Map<String, Value>),
}

impl Default for RequestParams {
    fn default() -> Self {
        Self::Values(Map::new())
    }
}

impl From<Map<String, Value>> for RequestParams {
    fn from(values: Map<String, Value>) -> Self {
        Self::Values(values)
    }
}

impl TryFrom<Value> for RequestParams {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

impl RequestParams {
    /// True for an empty flat map.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Values(values) if values.is_empty())
    }

    /// Page index of a list query.
    ///
    /// Accepts both the pagination shape and a flat map carrying
    /// `start_index`.
    pub fn start_index(&self) -> Option<u64> {
        match self {
            Self::Paginated(page) => Some(page.start_index),
            Self::Values(values) => values.get("start_index").and_then(Value::as_u64),
            Self::ControlChild(_) | Self::Multiple(_) => None,
        }
    }

    /// Encode the params as they appear on the wire.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Page selector for `get_child_device_list` and similar queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationParams {
    /// First item of the requested page.
    pub start_index: u64,
}

/// Params of a `multipleRequest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultipleRequestParams {
    /// Batched requests, answered in order.
    pub requests: Vec<TapoRequest>,
}

/// Params of a `control_child` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlChildParams {
    /// Identifier of the target child device.
    pub device_id: String,
    /// Wrapped request, normally a `multipleRequest`.
    #[serde(rename = "requestData")]
    pub request_data: Box<TapoRequest>,
}

impl ControlChildParams {
    /// First request nested inside the `multipleRequest` payload.
    pub fn first_request(&self) -> Option<&TapoRequest> {
        match &self.request_data.params {
            RequestParams::Multiple(multiple) => multiple.requests.first(),
            _ => None,
        }
    }

    /// Consume the params, returning the first nested request.
    pub fn into_first_request(self) -> Option<TapoRequest> {
        match self.request_data.params {
            RequestParams::Multiple(multiple) => multiple.requests.into_iter().next(),
            _ => None,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<RequestParams, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RequestParams>::deserialize(deserializer)?.unwrap_or_default())
}
