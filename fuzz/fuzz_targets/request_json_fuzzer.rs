//! Fuzz target for request decoding and dispatch
//!
//! Arbitrary bytes decoded as a request must either fail to decode or be
//! answered without panicking.
//!
//! # Invariants
//!
//! - Decoded requests re-encode to JSON that decodes to the same request
//! - Dispatch of any decoded request returns, never panics
//! - Successful answers carry `error_code == 0`

#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use tapo_harness::{FakeProtocol, FixtureLoader, StateMap, catalog};
use tapo_proto::TapoRequest;

fn hub_state() -> &'static StateMap {
    static STATE: OnceLock<StateMap> = OnceLock::new();
    STATE.get_or_init(|| {
        FixtureLoader::bundled().load_merged(catalog::TRVS[0]).expect("bundled TRV fixtures")
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(request) = serde_json::from_slice::<TapoRequest>(data) else {
        return;
    };

    if let Ok(encoded) = serde_json::to_vec(&request) {
        let decoded: Result<TapoRequest, _> = serde_json::from_slice(&encoded);
        assert!(matches!(decoded, Ok(ref again) if *again == request), "re-encode changed request");
    }

    let mut fake = FakeProtocol::new(hub_state().clone());
    if let Ok(response) = fake.dispatch(request) {
        assert_eq!(response.error_code, 0);
    }
});
