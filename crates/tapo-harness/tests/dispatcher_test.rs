//! Simulated protocol tests
//!
//! Drive `FakeProtocol` through the `Protocol` trait the same way a device
//! abstraction would, then inspect the resulting state.

use serde_json::{Map, Value, json};
use tapo_harness::{FakeProtocol, FixtureLoader, catalog};
use tapo_proto::{DEFAULT_RETRIES, Protocol, RequestParams, TapoRequest, TapoResponse};

fn state(value: Value) -> Map<String, Value> {
    let Value::Object(state) = value else { panic!("state must be an object") };
    state
}

fn request(method: &str, params: Value) -> TapoRequest {
    TapoRequest::new(method, RequestParams::try_from(params).expect("params"))
}

async fn send(protocol: &mut dyn Protocol, request: TapoRequest) -> TapoResponse {
    protocol.send(request, DEFAULT_RETRIES).await.expect("simulated send never fails")
}

#[tokio::test]
async fn set_then_get_device_info() {
    let mut fake = FakeProtocol::new(state(json!({"get_device_info": {"device_on": false}})));

    let response = send(&mut fake, request("set_device_info", json!({"device_on": true}))).await;
    assert_eq!(response, TapoResponse::ok(json!({})));

    let response = send(&mut fake, TapoRequest::get_device_info()).await;
    assert_eq!(response.result, json!({"device_on": true}));
}

#[tokio::test]
async fn responses_carry_success_envelope() {
    let mut fake = FakeProtocol::new(state(json!({"get_device_info": {"model": "P100"}})));

    let response = send(&mut fake, TapoRequest::get_device_info()).await;
    let wire = serde_json::to_value(&response).expect("encode");

    assert_eq!(wire, json!({"error_code": 0, "result": {"model": "P100"}, "msg": ""}));
}

#[tokio::test]
async fn child_list_pages_are_addressed_by_start_index() {
    let page = json!({"child_device_list": [{"device_id": "a"}], "start_index": 0, "sum": 1});
    let mut fake = FakeProtocol::new(state(json!({"get_child_device_list_0": page.clone()})));

    let first = send(&mut fake, TapoRequest::get_child_device_list(0)).await;
    assert_eq!(first.result, page);

    let second = send(&mut fake, TapoRequest::get_child_device_list(1)).await;
    assert_eq!(second.result, Value::Null);
    assert!(second.is_success());
}

#[tokio::test]
async fn child_list_accepts_flat_start_index() {
    let mut fake =
        FakeProtocol::new(state(json!({"get_child_device_list_2": {"child_device_list": []}})));

    let response =
        send(&mut fake, request("get_child_device_list", json!({"start_index": 2, "x": 0}))).await;
    assert_eq!(response.result, json!({"child_device_list": []}));
}

#[tokio::test]
async fn unknown_method_returns_empty_object() {
    let mut fake = FakeProtocol::default();

    let response = send(&mut fake, TapoRequest::get("get_energy_usage")).await;
    assert_eq!(response, TapoResponse::ok(json!({})));
}

#[tokio::test]
async fn lighting_effect_replaces_instead_of_merging() {
    let loader = FixtureLoader::bundled();
    let mut fake = FakeProtocol::from_fixtures(&loader, catalog::LED_STRIPS).expect("fixtures");
    let effect = json!({"id": "TapoStrip_custom", "brightness": 40, "enable": 1});

    send(&mut fake, request("set_lighting_effect", effect.clone())).await;

    let info = send(&mut fake, TapoRequest::get_device_info()).await.result;
    assert_eq!(info["lighting_effect"], effect);
    assert!(info["lighting_effect"].get("display_colors").is_none());
    // Other device info fields are left alone
    assert_eq!(info["model"], json!("L930"));
}

#[tokio::test]
async fn alarm_round_trip_restores_idle() {
    let loader = FixtureLoader::bundled();
    let mut fake = FakeProtocol::from_fixtures(&loader, catalog::HUBS).expect("fixtures");

    send(&mut fake, TapoRequest::play_alarm()).await;
    send(&mut fake, TapoRequest::play_alarm()).await;
    assert_eq!(fake.state()["get_device_info"]["in_alarm"], json!(true));

    send(&mut fake, TapoRequest::stop_alarm()).await;
    let after_first_stop = fake.state().clone();
    send(&mut fake, TapoRequest::stop_alarm()).await;

    assert_eq!(fake.state()["get_device_info"]["in_alarm"], json!(false));
    assert_eq!(fake.state(), &after_first_stop);
}

#[tokio::test]
async fn plugs_toggle_from_fixture_state() {
    let loader = FixtureLoader::bundled();

    for name in catalog::PLUGS {
        let mut fake = FakeProtocol::from_fixtures(&loader, [name]).expect("fixture");
        let before = send(&mut fake, TapoRequest::get_device_info()).await.result;
        let was_on = before["device_on"].as_bool().expect("device_on");

        send(&mut fake, request("set_device_info", json!({"device_on": !was_on}))).await;

        let after = send(&mut fake, TapoRequest::get_device_info()).await.result;
        assert_eq!(after["device_on"], json!(!was_on), "{name}");
        assert_eq!(after["model"], before["model"], "{name}");
    }
}

#[tokio::test]
async fn retry_budget_is_ignored() {
    let mut fake = FakeProtocol::new(state(json!({"get_device_info": {"device_on": true}})));

    let none = fake.send(TapoRequest::get_device_info(), 0).await.expect("send");
    let many = fake.send(TapoRequest::get_device_info(), 100).await.expect("send");

    assert_eq!(none, many);
}

#[tokio::test]
async fn close_is_a_no_op() {
    let mut fake = FakeProtocol::new(state(json!({"get_device_info": {"device_on": true}})));

    fake.close().await.expect("close");
    let response = send(&mut fake, TapoRequest::get_device_info()).await;

    assert_eq!(response.result, json!({"device_on": true}));
    assert_eq!(fake.name(), "Fake protocol");
}

#[tokio::test]
async fn boxed_protocol_is_interchangeable() {
    let mut protocol: Box<dyn Protocol> =
        Box::new(FakeProtocol::new(state(json!({"get_device_info": {"model": "P105"}}))));

    let response = send(protocol.as_mut(), TapoRequest::get_device_info()).await;
    assert_eq!(response.result["model"], json!("P105"));
}
