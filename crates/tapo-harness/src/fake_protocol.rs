//! Fixture-backed `Protocol` implementation.
//!
//! `FakeProtocol` owns a [`StateMap`] and answers every request from it.
//! Nothing is ever transmitted, nothing times out and nothing is retried.
//!
//! # Routing
//!
//! Requests are routed by [`Command::parse`]:
//!
//! - `set_lighting_effect*`: Replace `lighting_effect` in `get_device_info`
//! - `set_X`: Shallow-merge params into `get_X`
//! - `control_child*`: Re-key to `{method}_{device_id}` and dispatch again
//! - `play_alarm*` / `stop_alarm*`: Toggle `in_alarm` in `get_device_info`
//! - `get_child_device_list*`: Return `{method}_{start_index}`, `null` if absent
//! - anything else: Return the stored value, `{}` if absent
//!
//! # Invariants
//!
//! - Every answered request carries `error_code == 0`
//! - Mutations answer with an empty object
//! - A `set_X` without a `get_X` entry is a fixture bug and fails loudly with
//!   [`ProtocolError::MissingState`]

use async_trait::async_trait;
use serde_json::{Map, Value};
use tapo_proto::{
    ControlChildResult, Protocol, ProtocolError, ProtocolResult, RequestParams, TapoRequest,
    TapoResponse, request::GET_DEVICE_INFO,
};

use crate::{
    command::Command,
    fixture::{FixtureError, FixtureLoader, StateMap},
};

/// Name reported by [`FakeProtocol::name`].
pub const FAKE_PROTOCOL_NAME: &str = "Fake protocol";

/// Simulated device speaking the Tapo protocol from a state mapping.
#[derive(Debug, Clone, Default)]
pub struct FakeProtocol {
    state: StateMap,
}

impl FakeProtocol {
    /// Simulator answering from `state`.
    pub fn new(state: StateMap) -> Self {
        Self { state }
    }

    /// Simulator seeded from fixtures merged in order.
    pub fn from_fixtures<I, P>(loader: &FixtureLoader, names: I) -> Result<Self, FixtureError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<std::path::Path>,
    {
        loader.load_merged(names).map(Self::new)
    }

    /// Current simulated state.
    pub fn state(&self) -> &StateMap {
        &self.state
    }

    /// Consume the simulator, returning its final state.
    pub fn into_state(self) -> StateMap {
        self.state
    }

    /// Answer `request` against the state mapping.
    ///
    /// This is the synchronous core of [`Protocol::send`].
    pub fn dispatch(&mut self, request: TapoRequest) -> ProtocolResult<TapoResponse> {
        let command = Command::parse(&request.method);
        tracing::debug!(
            method = %request.method,
            params = ?request.params,
            mutation = command.is_mutation(),
            "simulated request"
        );

        match command {
            Command::SetLightingEffect => {
                let effect = request.params.to_value()?;
                self.object_mut(GET_DEVICE_INFO)?.insert("lighting_effect".to_string(), effect);
                Ok(empty_response())
            },
            Command::Set { target } => {
                let updates = params_object(&request)?;
                self.object_mut(&target)?.extend(updates);
                Ok(empty_response())
            },
            Command::ControlChild => self.control_child(request),
            Command::PlayAlarm => self.set_alarm(true),
            Command::StopAlarm => self.set_alarm(false),
            Command::GetChildList => {
                let page = request.params.start_index().ok_or_else(|| {
                    ProtocolError::MalformedRequest {
                        method: request.method.clone(),
                        reason: "missing start_index".to_string(),
                    }
                })?;
                let key = format!("{}_{page}", request.method);
                Ok(TapoResponse::ok(self.state.get(&key).cloned().unwrap_or(Value::Null)))
            },
            Command::Get => {
                let result = self.state.get(&request.method).cloned().unwrap_or_else(empty_object);
                Ok(TapoResponse::ok(result))
            },
        }
    }

    /// Forward the sole nested request of a `control_child` to the child's
    /// keyed entries and wrap the answer like a hub does.
    fn control_child(&mut self, request: TapoRequest) -> ProtocolResult<TapoResponse> {
        let TapoRequest { method, params } = request;
        let RequestParams::ControlChild(params) = params else {
            return Err(ProtocolError::MalformedRequest {
                method,
                reason: "expected device_id and requestData".to_string(),
            });
        };

        let device_id = params.device_id.clone();
        let nested = params.into_first_request().ok_or_else(|| ProtocolError::MalformedRequest {
            method,
            reason: "requestData carries no nested request".to_string(),
        })?;

        let child_request =
            TapoRequest::new(format!("{}_{device_id}", nested.method), nested.params);
        tracing::trace!(%device_id, method = %child_request.method, "delegating to child");

        self.dispatch(child_request).and_then(|response| child_response_of(response.result))
    }

    fn set_alarm(&mut self, in_alarm: bool) -> ProtocolResult<TapoResponse> {
        self.object_mut(GET_DEVICE_INFO)?.insert("in_alarm".to_string(), Value::Bool(in_alarm));
        Ok(empty_response())
    }

    fn object_mut(&mut self, key: &str) -> ProtocolResult<&mut Map<String, Value>> {
        match self.state.get_mut(key) {
            Some(Value::Object(entry)) => Ok(entry),
            Some(_) => Err(ProtocolError::NotAnObject { key: key.to_string() }),
            None => Err(ProtocolError::MissingState { key: key.to_string() }),
        }
    }
}

#[async_trait]
impl Protocol for FakeProtocol {
    fn name(&self) -> &str {
        FAKE_PROTOCOL_NAME
    }

    async fn send(&mut self, request: TapoRequest, _retry: u32) -> ProtocolResult<TapoResponse> {
        self.dispatch(request)
    }

    async fn close(&mut self) -> ProtocolResult<()> {
        Ok(())
    }
}

fn params_object(request: &TapoRequest) -> ProtocolResult<Map<String, Value>> {
    match request.params.to_value()? {
        Value::Object(values) => Ok(values),
        other => Err(ProtocolError::MalformedRequest {
            method: request.method.clone(),
            reason: format!("params must be an object, got {other}"),
        }),
    }
}

fn child_response_of(payload: Value) -> ProtocolResult<TapoResponse> {
    let envelope = serde_json::to_value(ControlChildResult::wrap(payload))?;
    Ok(TapoResponse::ok(envelope))
}

fn empty_response() -> TapoResponse {
    TapoResponse::ok(empty_object())
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
