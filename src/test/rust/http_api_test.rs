mod support;

use serde_json::{json, Value};
use warp::http::StatusCode;

use smart_monitor_bluetooth::routes;
use support::{
    Fault, FakeAudioRouter, FakeControlPlane, FakeDevice, Harness, HEADPHONES, SPEAKER,
};

fn body(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

fn headphones_nearby() -> Harness {
    Harness::new(
        |log| FakeControlPlane::new(log).with_nearby(FakeDevice::audio(HEADPHONES, "Headphones")),
        FakeAudioRouter::new,
    )
}

fn headphones_known() -> Harness {
    Harness::new(
        |log| FakeControlPlane::new(log).with_known(FakeDevice::audio(HEADPHONES, "Headphones")),
        FakeAudioRouter::new,
    )
}

#[tokio::test]
async fn test_connect_rejects_non_address_id() {
    let h = headphones_known();

    let response = warp::test::request()
        .method("POST")
        .path("/api/bluetooth")
        .json(&json!({
            "command": "bluetooth_audio_connect",
            "params": { "deviceId": "bm90LWEtbWFj" }
        }))
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body(&response);
    assert_eq!(body["success"], false);
    assert_eq!(body["needsPiScan"], true);
    assert!(h.log.is_empty(), "no tool call expected: {:?}", h.log.entries());
}

#[tokio::test]
async fn test_connect_reports_composite_result() {
    let h = headphones_known();

    let response = warp::test::request()
        .method("POST")
        .path("/api/bluetooth")
        .json(&json!({
            "command": "bluetooth_audio_connect",
            "params": { "deviceId": "aa:bb:cc:dd:ee:ff", "deviceName": "Headphones" }
        }))
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(&response);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["deviceId"], HEADPHONES);
    assert_eq!(body["data"]["connected"], true);
    assert_eq!(body["data"]["audioRouted"], true);
    assert_eq!(body["data"]["wasReconnected"], false);
    assert_eq!(
        body["data"]["sinkName"],
        "bluez_sink.AA_BB_CC_DD_EE_FF.a2dp_sink"
    );

    let steps = body["data"]["steps"].as_array().unwrap();
    assert_eq!(steps[0]["step"], "preflight");
    assert_eq!(steps[0]["outcome"]["status"], "succeeded");
}

#[tokio::test]
async fn test_connect_without_audio_is_partial_success() {
    let h = Harness::new(
        |log| FakeControlPlane::new(log).with_known(FakeDevice::audio(HEADPHONES, "Headphones")),
        |log| FakeAudioRouter::new(log).failing_routing(),
    );

    let response = warp::test::request()
        .method("POST")
        .path("/api/bluetooth")
        .json(&json!({
            "command": "bluetooth_audio_connect",
            "params": { "deviceId": HEADPHONES }
        }))
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(&response);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["connected"], true);
    assert_eq!(body["data"]["audioRouted"], false);
    assert!(body["message"].as_str().unwrap().contains("audio could not be routed"));
}

#[tokio::test]
async fn test_connect_failure_is_200_with_success_false() {
    let h = Harness::new(
        |log| {
            FakeControlPlane::new(log)
                .with_known(FakeDevice::audio(HEADPHONES, "Headphones"))
                .with_fault("connect", Fault::Fail)
        },
        FakeAudioRouter::new,
    );

    let response = warp::test::request()
        .method("POST")
        .path("/api/bluetooth")
        .json(&json!({
            "command": "bluetooth_audio_connect",
            "params": { "deviceId": HEADPHONES }
        }))
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(&response);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["connected"], false);
}

#[tokio::test]
async fn test_connect_requires_device_id() {
    let h = headphones_known();

    let response = warp::test::request()
        .method("POST")
        .path("/api/bluetooth")
        .json(&json!({ "command": "bluetooth_audio_connect" }))
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(h.log.is_empty());
}

#[tokio::test]
async fn test_unknown_command_is_rejected() {
    let h = headphones_known();

    let response = warp::test::request()
        .method("POST")
        .path("/api/bluetooth")
        .json(&json!({ "command": "bluetooth_audio_shuffle", "params": {} }))
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response)["success"], false);
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let h = headphones_known();

    let response = warp::test::request()
        .method("POST")
        .path("/api/bluetooth")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response)["success"], false);
}

#[tokio::test]
async fn test_non_json_content_type_is_415() {
    let h = headphones_known();

    let response = warp::test::request()
        .method("POST")
        .path("/api/bluetooth")
        .header("content-type", "text/plain;charset=UTF-8")
        .body(r#"{"command":"bluetooth_audio_status"}"#)
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body(&response)["success"], false);
    assert!(h.log.is_empty());
}

#[tokio::test]
async fn test_scan_lists_discovered_devices() {
    let h = headphones_nearby();

    let response = warp::test::request()
        .method("GET")
        .path("/bluetooth/scan")
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(&response);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["devices"],
        json!([{ "id": HEADPHONES, "name": "Headphones" }])
    );
}

#[tokio::test]
async fn test_scan_failure_is_200_with_success_false() {
    let h = Harness::new(
        |log| FakeControlPlane::new(log).with_fault("start-discovery", Fault::Timeout),
        FakeAudioRouter::new,
    );

    let response = warp::test::request()
        .method("GET")
        .path("/bluetooth/scan")
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(&response);
    assert_eq!(body["success"], false);
    assert_eq!(body["devices"], json!([]));
    assert_eq!(body["errorKind"], "tool_timeout");
}

#[tokio::test]
async fn test_connected_shape() {
    let h = Harness::new(
        |log| {
            FakeControlPlane::new(log)
                .with_known(FakeDevice::audio(HEADPHONES, "Headphones").connected())
        },
        FakeAudioRouter::new,
    );

    let response = warp::test::request()
        .method("GET")
        .path("/bluetooth/connected")
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(&response);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["connectedDevices"],
        json!([{
            "id": HEADPHONES,
            "name": "Headphones",
            "mac": HEADPHONES,
            "connected": true,
            "paired": true,
            "isAudioDevice": true
        }])
    );
    assert_eq!(body["isBluetoothAudio"], false);
    assert_eq!(body["hasConnectedAudioDevice"], true);
    assert!(body["currentAudioSink"].is_string());
}

#[tokio::test]
async fn test_status_includes_session_state() {
    let h = headphones_known();
    let filter = routes(h.service.clone());

    warp::test::request()
        .method("POST")
        .path("/api/bluetooth")
        .json(&json!({
            "command": "bluetooth_audio_connect",
            "params": { "deviceId": HEADPHONES }
        }))
        .reply(&filter)
        .await;

    let response = warp::test::request()
        .method("GET")
        .path("/api/bluetooth/status")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(&response);
    assert_eq!(body["serviceActive"], true);
    assert_eq!(body["isBluetoothAudio"], true);
    assert_eq!(body["activeDevice"], HEADPHONES);
    assert_eq!(body["audioDevices"].as_array().unwrap().len(), 1);
    assert_eq!(body["lastAttempt"]["connected"], true);
    assert_eq!(body["volume"], 50);
    assert_eq!(body["muted"], false);
    assert!(body["serviceReachable"].is_null());
}

#[tokio::test]
async fn test_status_command_wraps_snapshot() {
    let h = headphones_known();

    let response = warp::test::request()
        .method("POST")
        .path("/api/bluetooth")
        .json(&json!({ "command": "bluetooth_audio_status" }))
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(&response);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["serviceActive"], true);
}

#[tokio::test]
async fn test_disconnect_without_body_disconnects_all() {
    let h = Harness::new(
        |log| {
            FakeControlPlane::new(log)
                .with_known(FakeDevice::audio(HEADPHONES, "Headphones").connected())
                .with_known(FakeDevice::audio(SPEAKER, "Speaker").connected())
        },
        FakeAudioRouter::new,
    );

    let response = warp::test::request()
        .method("POST")
        .path("/bluetooth/disconnect")
        .body("")
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(&response);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["disconnected"].as_array().unwrap().len(), 2);
    assert!(!h.control.device(HEADPHONES).unwrap().connected);
    assert!(!h.control.device(SPEAKER).unwrap().connected);
}

#[tokio::test]
async fn test_disconnect_one_device() {
    let h = Harness::new(
        |log| {
            FakeControlPlane::new(log)
                .with_known(FakeDevice::audio(HEADPHONES, "Headphones").connected())
                .with_known(FakeDevice::audio(SPEAKER, "Speaker").connected())
        },
        FakeAudioRouter::new,
    );

    let response = warp::test::request()
        .method("POST")
        .path("/bluetooth/disconnect")
        .json(&json!({ "deviceId": SPEAKER }))
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["data"]["disconnected"], json!([SPEAKER]));
    assert!(h.control.device(HEADPHONES).unwrap().connected);
    assert!(!h.control.device(SPEAKER).unwrap().connected);
}

#[tokio::test]
async fn test_disconnect_rejects_non_address_id() {
    let h = headphones_known();

    let response = warp::test::request()
        .method("POST")
        .path("/bluetooth/disconnect")
        .json(&json!({ "deviceId": "bm90LWEtbWFj" }))
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response)["needsPiScan"], true);
    assert!(h.log.is_empty());
}

#[tokio::test]
async fn test_disconnect_unknown_device_reports_error_kind() {
    let h = Harness::new(FakeControlPlane::new, FakeAudioRouter::new);

    let response = warp::test::request()
        .method("POST")
        .path("/api/bluetooth")
        .json(&json!({
            "command": "bluetooth_audio_disconnect",
            "params": { "deviceId": SPEAKER }
        }))
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body(&response);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorKind"], "parse_error");
}

#[tokio::test]
async fn test_health_and_unknown_path() {
    let h = headphones_known();
    let filter = routes(h.service.clone());

    let health = warp::test::request().path("/health").reply(&filter).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body(&health)["status"], "healthy");

    let missing = warp::test::request().path("/bluetooth/pair").reply(&filter).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let h = headphones_known();

    let response = warp::test::request()
        .method("DELETE")
        .path("/bluetooth/connected")
        .reply(&routes(h.service.clone()))
        .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(h.log.is_empty());
}
