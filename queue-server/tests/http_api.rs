mod common;

use common::test_app;
use http::StatusCode;
use serde_json::json;

fn asha_order() -> serde_json::Value {
    json!({
        "name": "Asha",
        "items": [
            { "name": "Special Chai", "qty": 2 },
            { "name": "Bun Maska", "qty": 1 }
        ]
    })
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["stream"]["activeDays"], 0);
}

#[tokio::test]
async fn test_join_creates_ticket() {
    let app = test_app();
    app.stock(json!({ "chai": 10, "bun": 5 })).await;

    let (status, body) = app.call("POST", "/api/join", Some(asha_order()), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["position"], 1);
    assert_eq!(body["dateKey"], app.state.manager.today());
    assert_eq!(body["items"][0]["category"], "chai");
    assert!(body.get("existing").is_none());

    let (_, settings) = app.call("GET", "/api/settings", None, None).await;
    assert_eq!(settings["inventory"]["chai"], 8);
    assert_eq!(settings["inventory"]["bun"], 4);
}

#[tokio::test]
async fn test_join_idempotency_header() {
    let app = test_app();
    app.stock(json!({ "chai": 10, "bun": 5 })).await;

    let request = || {
        http::Request::builder()
            .method("POST")
            .uri("/api/join")
            .header("content-type", "application/json")
            .header("x-idempotency-key", "tap-1")
            .body(axum::body::Body::from(asha_order().to_string()))
            .unwrap()
    };

    let first = app.send(request()).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = app.send(request()).await;
    assert_eq!(second.status(), StatusCode::OK);

    let (_, queue) = app.call("GET", "/api/queue", None, None).await;
    assert_eq!(queue["tickets"].as_array().unwrap().len(), 1);

    let (_, settings) = app.call("GET", "/api/settings", None, None).await;
    assert_eq!(settings["inventory"]["chai"], 8);
}

#[tokio::test]
async fn test_body_idempotency_key_wins_over_header() {
    let app = test_app();
    app.stock(json!({ "chai": 10, "bun": 5 })).await;

    let mut order = asha_order();
    order["idempotencyKey"] = json!("body-key");
    let (status, first) = app.call("POST", "/api/join", Some(order), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut order = asha_order();
    order["idempotencyKey"] = json!("body-key");
    let request = http::Request::builder()
        .method("POST")
        .uri("/api/join")
        .header("content-type", "application/json")
        .header("x-idempotency-key", "other-key")
        .body(axum::body::Body::from(order.to_string()))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (_, queue) = app.call("GET", "/api/queue", None, None).await;
    assert_eq!(queue["tickets"][0]["id"], first["id"]);
    assert_eq!(queue["tickets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_join_validation_errors() {
    let app = test_app();

    let (status, body) = app
        .call(
            "POST",
            "/api/join",
            Some(json!({ "name": "   ", "items": [{ "name": "Special Chai", "qty": 1 }] })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
    assert_eq!(body["message"], "name required");

    let (status, body) = app
        .call(
            "POST",
            "/api/join",
            Some(json!({ "name": "Asha", "items": [{ "name": "Special Chai", "qty": 0 }] })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "at least one item required");

    let (status, body) = app
        .call(
            "POST",
            "/api/join",
            Some(json!({ "name": "Asha", "items": [{ "name": "Espresso", "qty": 1 }] })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
}

#[tokio::test]
async fn test_staff_routes_require_token() {
    let app = test_app();
    let today = app.state.manager.today();
    let ready = json!({ "id": "missing", "dateKey": today, "status": "ready" });

    let (status, body) = app.call("PATCH", "/api/ready", Some(ready.clone()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");

    let (status, body) = app
        .call("PATCH", "/api/ready", Some(ready.clone()), Some("not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3002");

    let customer = app.jwt.generate_token("c-1", "Asha", "customer").unwrap();
    let (status, body) = app
        .call("PATCH", "/api/ready", Some(ready.clone()), Some(&customer))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");

    let token = app.staff_token();
    let (status, body) = app.call("PATCH", "/api/ready", Some(ready), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");

    let (status, _) = app.call("DELETE", "/api/queue", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call("POST", "/api/pricing", Some(json!({ "chaiPrice": 20 })), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_reads_need_no_token() {
    let app = test_app();
    for uri in ["/api/queue", "/api/settings", "/api/pricing"] {
        let (status, _) = app.call("GET", uri, None, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn test_edit_rejects_oversell() {
    let app = test_app();
    app.stock(json!({ "chai": 3, "bun": 5 })).await;

    let (_, joined) = app.call("POST", "/api/join", Some(asha_order()), None).await;
    let edit = json!({
        "id": joined["id"],
        "dateKey": joined["dateKey"],
        "items": [{ "name": "Special Chai", "qty": 5 }]
    });
    let (status, body) = app.call("PATCH", "/api/ticket", Some(edit), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E4002");

    let (_, settings) = app.call("GET", "/api/settings", None, None).await;
    assert_eq!(settings["inventory"]["chai"], 1);
    assert_eq!(settings["inventory"]["bun"], 4);
}

#[tokio::test]
async fn test_delete_restores_stock() {
    let app = test_app();
    app.stock(json!({ "chai": 10, "bun": 5 })).await;

    let (_, joined) = app.call("POST", "/api/join", Some(asha_order()), None).await;
    let uri = format!(
        "/api/ticket?id={}&date={}",
        joined["id"].as_str().unwrap(),
        joined["dateKey"].as_str().unwrap()
    );
    let (status, body) = app.call("DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, _) = app.call("DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, settings) = app.call("GET", "/api/settings", None, None).await;
    assert_eq!(settings["inventory"]["chai"], 10);
    assert_eq!(settings["inventory"]["bun"], 5);
}

#[tokio::test]
async fn test_invalid_date_is_rejected() {
    let app = test_app();
    let (status, body) = app.call("GET", "/api/queue?date=17-10-2026", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    let (status, body) = app.call("GET", "/api/queue?date=2026-10-17", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dateKey"], "2026-10-17");
}

#[tokio::test]
async fn test_clear_today() {
    let app = test_app();
    app.stock(json!({ "chai": 10, "bun": 5 })).await;
    let token = app.staff_token();

    let (_, first) = app.call("POST", "/api/join", Some(asha_order()), None).await;
    app.call("POST", "/api/join", Some(asha_order()), None).await;

    let ready = json!({ "id": first["id"], "dateKey": first["dateKey"], "status": "ready" });
    let (status, _) = app.call("PATCH", "/api/ready", Some(ready), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call("DELETE", "/api/queue", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);
    assert_eq!(body["restored"]["chai"], 2);
    assert_eq!(body["restored"]["bun"], 1);

    let (_, queue) = app.call("GET", "/api/queue", None, None).await;
    let tickets = queue["tickets"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["status"], "ready");
}

#[tokio::test]
async fn test_pricing_rejects_negative() {
    let app = test_app();
    let token = app.staff_token();
    let (status, body) = app
        .call("POST", "/api/pricing", Some(json!({ "chaiPrice": -1 })), Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
}

#[tokio::test]
async fn test_settings_rejects_bad_time() {
    let app = test_app();
    let token = app.staff_token();
    let (status, _) = app
        .call("POST", "/api/settings", Some(json!({ "serviceStart": "25:99" })), Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, settings) = app.call("GET", "/api/settings", None, None).await;
    assert_eq!(settings["serviceStart"], "06:00");
}

/// Join, edit, check position, serve, pay, then cancel.
#[tokio::test]
async fn test_customer_and_staff_flow() {
    let app = test_app();
    let token = app.staff_token();
    app.stock(json!({ "chai": 10, "bun": 5 })).await;
    let (status, _) = app
        .call(
            "POST",
            "/api/pricing",
            Some(json!({ "chaiPrice": 20, "bunPrice": 30 })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, ravi) = app
        .call(
            "POST",
            "/api/join",
            Some(json!({ "name": "Ravi", "items": [{ "name": "Irani Chai", "qty": 1 }] })),
            None,
        )
        .await;
    let (_, asha) = app.call("POST", "/api/join", Some(asha_order()), None).await;
    assert_eq!(asha["position"], 2);
    let id = asha["id"].as_str().unwrap().to_string();
    let date = asha["dateKey"].as_str().unwrap().to_string();

    // Edit: 2 chai → 3 chai
    let edit = json!({
        "id": id,
        "dateKey": date,
        "items": [
            { "name": "Special Chai", "qty": 3 },
            { "name": "Bun Maska", "qty": 1 }
        ]
    });
    let (status, _) = app.call("PATCH", "/api/ticket", Some(edit), None).await;
    assert_eq!(status, StatusCode::OK);

    let position_uri = format!("/api/position?id={id}&date={date}");
    let (_, position) = app.call("GET", &position_uri, None, None).await;
    assert_eq!(position["position"], 2);
    assert_eq!(position["basePosition"], 2);

    // Ravi is served, Asha moves up
    let ready = json!({ "id": ravi["id"], "dateKey": date, "status": "ready" });
    app.call("PATCH", "/api/ready", Some(ready), Some(&token)).await;
    let (_, position) = app.call("GET", &position_uri, None, None).await;
    assert_eq!(position["position"], 1);

    let ready = json!({ "id": id, "dateKey": date, "status": "ready" });
    let (status, body) = app.call("PATCH", "/api/ready", Some(ready), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["total"].as_f64(), Some(90.0));

    let (_, position) = app.call("GET", &position_uri, None, None).await;
    assert!(position["position"].is_null());

    let paid = json!({ "id": id, "dateKey": date, "paid": true });
    let (status, body) = app.call("PATCH", "/api/payment", Some(paid), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paid"], true);

    let (_, settings) = app.call("GET", "/api/settings", None, None).await;
    assert_eq!(settings["inventory"]["chai"], 6);
    assert_eq!(settings["inventory"]["bun"], 4);

    // A ready ticket still gives its stock back when deleted
    let (status, _) = app
        .call("DELETE", &format!("/api/ticket?id={id}&date={date}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, settings) = app.call("GET", "/api/settings", None, None).await;
    assert_eq!(settings["inventory"]["chai"], 9);
    assert_eq!(settings["inventory"]["bun"], 5);
}
