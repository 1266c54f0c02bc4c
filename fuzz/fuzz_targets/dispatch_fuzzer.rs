//! Fuzz target for [`FakeProtocol`] routing
//!
//! Keep the simulator total over well-formed requests against complete
//! fixtures, and keep child delegation equivalent to direct dispatch.
//!
//! # Strategy
//!
//! - Request sequences: Arbitrary mixes of every routing branch, including
//!   prefixed names with junk suffixes
//! - Hub children: `control_child` to paired and unpaired device ids
//! - Params: Flat maps, pagination, and nested batches
//!
//! # Invariants
//!
//! - Every non-`set_X` request with well-formed params succeeds
//! - Every success carries `error_code == 0`
//! - `set_X` fails only when `get_X` is missing, and leaves state untouched
//! - `control_child` answer equals the re-keyed direct answer wrapped in the
//!   hub envelope, and both leave identical state
//! - NEVER panic on unexpected method names

#![no_main]

use std::sync::OnceLock;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};
use tapo_harness::{FakeProtocol, FixtureLoader, StateMap, catalog};
use tapo_proto::{
    ControlChildResult, PaginationParams, ProtocolError, RequestParams, TapoRequest,
};

const TRV_ID: &str = "802E9A8B7C6D5E4F3A2B1C0D9E8F7A6B5C4D3E2F";

#[derive(Debug, Clone, Arbitrary)]
enum FuzzMethod {
    GetDeviceInfo,
    SetDeviceInfo,
    SetAttribute(String),
    SetLightingEffect,
    PlayAlarm { suffix: String },
    StopAlarm { suffix: String },
    ChildList,
    Raw(String),
}

#[derive(Debug, Clone, Arbitrary)]
enum FuzzParams {
    Empty,
    Page(u8),
    Flat(Vec<(String, i64)>),
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzRequest {
    method: FuzzMethod,
    params: FuzzParams,
    /// Route through `control_child` to the paired TRV (or an unknown id).
    via_child: Option<bool>,
}

fn hub_state() -> &'static StateMap {
    static STATE: OnceLock<StateMap> = OnceLock::new();
    STATE.get_or_init(|| {
        FixtureLoader::bundled().load_merged(catalog::TRVS[0]).expect("bundled TRV fixtures")
    })
}

fn build_request(fuzzed: &FuzzRequest) -> TapoRequest {
    let method = match &fuzzed.method {
        FuzzMethod::GetDeviceInfo => "get_device_info".to_string(),
        FuzzMethod::SetDeviceInfo => "set_device_info".to_string(),
        FuzzMethod::SetAttribute(attr) => format!("set_{attr}"),
        FuzzMethod::SetLightingEffect => "set_lighting_effect".to_string(),
        FuzzMethod::PlayAlarm { suffix } => format!("play_alarm{suffix}"),
        FuzzMethod::StopAlarm { suffix } => format!("stop_alarm{suffix}"),
        FuzzMethod::ChildList => "get_child_device_list".to_string(),
        FuzzMethod::Raw(raw) => raw.clone(),
    };

    let params = match &fuzzed.params {
        FuzzParams::Empty => RequestParams::default(),
        FuzzParams::Page(index) => {
            RequestParams::Paginated(PaginationParams { start_index: u64::from(*index % 4) })
        },
        FuzzParams::Flat(pairs) => RequestParams::Values(
            pairs.iter().map(|(k, v)| (k.clone(), Value::from(*v))).collect::<Map<_, _>>(),
        ),
    };

    TapoRequest::new(method, params)
}

fuzz_target!(|requests: Vec<FuzzRequest>| {
    let mut fake = FakeProtocol::new(hub_state().clone());

    for fuzzed in requests.iter().take(64) {
        let request = build_request(fuzzed);
        let before = fake.state().clone();

        match fuzzed.via_child {
            Some(paired) => {
                let device_id = if paired { TRV_ID } else { "unpaired" };
                let rekeyed = TapoRequest::new(
                    format!("{}_{device_id}", request.method),
                    request.params.clone(),
                );

                let mut direct = fake.clone();
                let direct_result = direct.dispatch(rekeyed);
                let hub_result = fake.dispatch(TapoRequest::control_child(device_id, request));

                match (hub_result, direct_result) {
                    (Ok(hub), Ok(direct_response)) => {
                        let envelope =
                            serde_json::to_value(ControlChildResult::wrap(direct_response.result))
                                .unwrap_or(Value::Null);
                        assert_eq!(hub.error_code, 0);
                        assert_eq!(hub.result, envelope, "child answer diverged from direct");
                    },
                    (Err(hub), Err(direct_err)) => {
                        assert_eq!(hub.to_string(), direct_err.to_string());
                    },
                    (hub, direct_result) => {
                        panic!("child {hub:?} and direct {direct_result:?} disagree");
                    },
                }
                assert_eq!(fake.state(), direct.state(), "child and direct state diverged");
            },
            None => {
                let method = request.method.clone();
                match fake.dispatch(request) {
                    Ok(response) => assert_eq!(response.error_code, 0),
                    Err(
                        ProtocolError::MissingState { key } | ProtocolError::NotAnObject { key },
                    ) => {
                        assert!(method.starts_with("set_"), "{method} failed on {key}");
                        assert_eq!(fake.state(), &before, "failed {method} mutated state");
                    },
                    Err(ProtocolError::MalformedRequest { .. }) => {
                        assert!(
                            method.starts_with("get_child_device_list")
                                || method.starts_with("control_child")
                                || method.starts_with("set_"),
                            "{method} rejected as malformed"
                        );
                    },
                    Err(other) => panic!("{method} failed unexpectedly: {other}"),
                }
            },
        }
    }
});
