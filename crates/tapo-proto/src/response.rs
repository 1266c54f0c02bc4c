//! Response payload types.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};

/// Response envelope returned by every method.
///
/// A zero `error_code` means success; `result` then carries the method's
/// payload. `msg` is usually empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapoResponse<T = Value> {
    /// Device status code, zero on success.
    pub error_code: i32,
    /// Method payload.
    pub result: T,
    /// Human-readable status (often empty).
    #[serde(default)]
    pub msg: String,
}

impl<T> TapoResponse<T> {
    /// Successful response carrying `result`.
    pub fn ok(result: T) -> Self {
        Self { error_code: 0, result, msg: String::new() }
    }

    /// True if the device reported success.
    pub fn is_success(&self) -> bool {
        self.error_code == 0
    }

    /// Unwrap the payload, turning a non-zero code into [`ProtocolError::Device`].
    pub fn into_result(self) -> ProtocolResult<T> {
        if self.is_success() {
            Ok(self.result)
        } else {
            Err(ProtocolError::Device { code: self.error_code, msg: self.msg })
        }
    }
}

impl TapoResponse<Value> {
    /// Decode the JSON payload into a typed response.
    pub fn decode<T: DeserializeOwned>(self) -> ProtocolResult<TapoResponse<T>> {
        let result = serde_json::from_value(self.result)?;
        Ok(TapoResponse { error_code: self.error_code, result, msg: self.msg })
    }
}

/// Payload of a `control_child` response.
///
/// Hubs answer child requests with the child's batch response nested under
/// `responseData`:
///
/// ```text
/// {"responseData": {"result": {"responses": [{"result": <payload>}]}}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlChildResult {
    /// The child's own response.
    #[serde(rename = "responseData")]
    pub response_data: ChildResponseData,
}

/// Child response nested inside [`ControlChildResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildResponseData {
    /// Batch result.
    pub result: MultipleResponse,
}

/// Result of a `multipleRequest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleResponse {
    /// One entry per batched request, in request order.
    pub responses: Vec<ChildResponse>,
}

/// Single entry of a [`MultipleResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildResponse {
    /// Payload of the batched request.
    pub result: Value,
}

impl ControlChildResult {
    /// Envelope holding exactly one child result.
    pub fn wrap(payload: Value) -> Self {
        Self {
            response_data: ChildResponseData {
                result: MultipleResponse { responses: vec![ChildResponse { result: payload }] },
            },
        }
    }

    /// Payload of the first batched response.
    pub fn first_result(&self) -> Option<&Value> {
        self.response_data.result.responses.first().map(|r| &r.result)
    }

    /// Consume the envelope, returning the first batched payload.
    pub fn into_first_result(self) -> Option<Value> {
        self.response_data.result.responses.into_iter().next().map(|r| r.result)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn ok_response_wire_shape() {
        let encoded = serde_json::to_value(TapoResponse::ok(json!({"device_on": true})))
            .expect("encode");
        assert_eq!(encoded, json!({"error_code": 0, "result": {"device_on": true}, "msg": ""}));
    }

    #[test]
    fn non_zero_code_becomes_device_error() {
        let response = TapoResponse { error_code: -1008, result: json!({}), msg: "bad".into() };
        assert!(!response.is_success());
        assert!(matches!(
            response.into_result(),
            Err(ProtocolError::Device { code: -1008, msg }) if msg == "bad"
        ));
    }

    #[test]
    fn child_envelope_wire_shape() {
        let encoded =
            serde_json::to_value(ControlChildResult::wrap(json!({"nickname": "trv"})))
                .expect("encode");
        assert_eq!(
            encoded,
            json!({"responseData": {"result": {"responses": [{"result": {"nickname": "trv"}}]}}})
        );
    }

    #[test]
    fn decode_child_envelope_from_untyped_response() {
        let response = TapoResponse::ok(json!({
            "responseData": {"result": {"responses": [{"result": {"temp": 19.5}}]}}
        }));

        let typed = response.decode::<ControlChildResult>().expect("decode");
        assert_eq!(typed.result.first_result(), Some(&json!({"temp": 19.5})));
        assert_eq!(typed.result.into_first_result(), Some(json!({"temp": 19.5})));
    }

    #[test]
    fn missing_msg_defaults_to_empty() {
        let response: TapoResponse =
            serde_json::from_value(json!({"error_code": 0, "result": null})).expect("decode");
        assert_eq!(response.msg, "");
        assert_eq!(response.result, Value::Null);
    }

    proptest! {
        #[test]
        fn into_result_keeps_code_and_payload(code in any::<i32>(), msg in ".{0,16}") {
            let response =
                TapoResponse { error_code: code, result: json!({"n": 1}), msg: msg.clone() };

            match response.into_result() {
                Ok(result) => {
                    prop_assert_eq!(code, 0);
                    prop_assert_eq!(result, json!({"n": 1}));
                },
                Err(ProtocolError::Device { code: got, msg: got_msg }) => {
                    prop_assert_ne!(code, 0);
                    prop_assert_eq!(got, code);
                    prop_assert_eq!(got_msg, msg);
                },
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
    }
}
