use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::camp::domain::{AllocationRequest, LaborerId};
use crate::camp::extract::{PathParam, Payload};
use crate::camp::router::allocate_handler;
use crate::camp::{camp_router, CampAdministration, CampError, InMemoryCampRepository};

#[tokio::test]
async fn login_issues_a_token_that_unlocks_the_api() {
    let auth = authenticator();
    let router = camp_router(Arc::new(administration()), auth);

    let response = router
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "username": "camp_admin", "password": "stella@2024" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["token_type"], "Bearer");
    let token = payload["token"].as_str().expect("token string");

    let response = router
        .oneshot(request(
            Method::GET,
            "/api/v1/rooms",
            Some(&format!("Bearer {token}")),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await, json!([]));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let router = camp_router(Arc::new(administration()), authenticator());

    let response = router
        .oneshot(request(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "username": "camp_admin", "password": "guess" })),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "invalid_credentials");
}

#[tokio::test]
async fn protected_routes_require_a_valid_bearer() {
    let (router, _) = router_with(administration());

    for token in [None, Some("Bearer not-a-jwt"), Some("Basic Y2FtcDphZG1pbg==")] {
        let response = router
            .clone()
            .oneshot(request(Method::GET, "/api/v1/dashboard", token, None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response
                .headers()
                .get(header::WWW_AUTHENTICATE)
                .and_then(|value| value.to_str().ok()),
            Some("Bearer")
        );
    }
}

#[tokio::test]
async fn room_lifecycle_over_http() {
    let camp = administration();
    let ids = register_laborers(&camp, 3);
    let (router, token) = router_with(camp);
    let token = Some(token.as_str());

    let response = router
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/rooms",
            token,
            Some(json!({ "name": "R1", "capacity": 2 })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    let room_id = created["id"].as_u64().expect("numeric id");
    assert_eq!(created["occupancy"], 0);

    let allocations = format!("/api/v1/rooms/{room_id}/allocations");
    let response = router
        .clone()
        .oneshot(request(
            Method::POST,
            &allocations,
            token,
            Some(json!({ "laborer_ids": [ids[0].0, ids[1].0] })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["room"]["occupancy"], 2);

    let response = router
        .clone()
        .oneshot(request(
            Method::POST,
            &allocations,
            token,
            Some(json!({ "laborer_ids": [ids[2].0] })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_json_body(response).await["error"], "capacity_exceeded");

    let response = router
        .clone()
        .oneshot(request(
            Method::GET,
            "/api/v1/rooms/by-name/R1/laborers",
            token,
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let occupants = read_json_body(response).await;
    assert_eq!(occupants.as_array().map(Vec::len), Some(2));

    let response = router
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/api/v1/rooms/{room_id}"),
            token,
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    for laborer in &ids[..2] {
        let response = router
            .clone()
            .oneshot(request(
                Method::DELETE,
                &format!("/api/v1/laborers/{}/room", laborer.0),
                token,
                None,
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json_body(response).await["released_from"], "R1");
    }

    let response = router
        .oneshot(request(
            Method::DELETE,
            &format!("/api/v1/rooms/{room_id}"),
            token,
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn invalid_room_is_a_bad_request_and_missing_room_not_found() {
    let (router, token) = router_with(administration());
    let token = Some(token.as_str());

    let response = router
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/rooms",
            token,
            Some(json!({ "name": "R1", "capacity": 0 })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json_body(response).await["error"], "validation_error");

    let response = router
        .oneshot(request(
            Method::PUT,
            "/api/v1/rooms/31",
            token,
            Some(json!({ "capacity": 4 })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "not_found");
    assert_eq!(payload["message"], "room 31 not found");
}

#[tokio::test]
async fn malformed_requests_keep_the_json_error_shape() {
    let (router, token) = router_with(administration());

    let response = router
        .clone()
        .oneshot(request(
            Method::PUT,
            "/api/v1/rooms/first-floor",
            Some(&token),
            Some(json!({ "capacity": 4 })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "validation_error");
    assert!(payload["message"].as_str().is_some_and(|text| !text.is_empty()));

    let broken = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/rooms")
        .header(header::AUTHORIZATION, &token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ \"name\": \"R1\", "))
        .expect("request builds");
    let response = router
        .clone()
        .oneshot(broken)
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json_body(response).await["error"], "validation_error");

    let response = router
        .oneshot(request(
            Method::GET,
            "/api/v1/laborers?status=retired",
            Some(&token),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json_body(response).await["error"], "validation_error");
}

#[tokio::test]
async fn laborer_update_can_clear_the_contractor_link() {
    let camp = administration();
    let contractor_id = contractor(&camp, "Patil Constructions");
    let mut form = registration("Crew Member", "9876500001");
    form.contractor_id = Some(contractor_id);
    form.email = Some("crew@patil.example".to_string());
    let crew = camp.laborers.register(form).expect("registers").laborer.id;
    let (router, token) = router_with(camp);
    let token = Some(token.as_str());

    let response = router
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/api/v1/laborers/{}", crew.0),
            token,
            Some(json!({ "contractor_id": null, "email": "" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json_body(response).await;
    assert_eq!(updated["contractor_id"], Value::Null);
    assert_eq!(updated["email"], Value::Null);

    let response = router
        .oneshot(request(
            Method::DELETE,
            &format!("/api/v1/contractors/{}", contractor_id.0),
            token,
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn laborer_registration_and_status_over_http() {
    let (router, token) = router_with(administration());
    let token = Some(token.as_str());

    let response = router
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/laborers",
            token,
            Some(json!({
                "name": "Raj Kumar",
                "date_of_birth": "1990-05-10",
                "gender": "Male",
                "designation": "Mason",
                "mobile_number": "9876543210"
            })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let laborer = read_json_body(response).await;
    let laborer_id = laborer["id"].as_u64().expect("numeric id");
    assert_eq!(laborer["room"], Value::Null);
    assert!(laborer["age"].as_u64().is_some());

    let response = router
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/api/v1/laborers/{laborer_id}/status"),
            token,
            Some(json!({ "status": "suspended" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(request(
            Method::GET,
            "/api/v1/laborers?status=suspended",
            token,
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let listed = read_json_body(response).await;
    assert_eq!(listed[0]["id"], laborer_id);
    assert_eq!(listed[0]["status"], "suspended");
}

#[tokio::test]
async fn attendance_report_accepts_query_filters() {
    let camp = administration();
    let ids = register_laborers(&camp, 1);
    let (router, token) = router_with(camp);
    let token = Some(token.as_str());

    let response = router
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/attendance",
            token,
            Some(json!({
                "laborer_id": ids[0].0,
                "date": "2024-03-04",
                "status": "half-day",
                "check_in": "09:00:00",
                "check_out": "13:00:00"
            })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(request(
            Method::GET,
            "/api/v1/attendance?date=2024-03-04&status=half-day",
            token,
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let report = read_json_body(response).await;
    assert_eq!(report["summary"]["total"], 1);
    assert_eq!(report["summary"]["half_day"], 1);
    assert_eq!(report["records"][0]["laborer_name"], "Laborer 0");
}

#[tokio::test]
async fn store_outage_maps_to_service_unavailable() {
    let (router, token) = router_with(CampAdministration::new(Arc::new(UnavailableRepository)));

    let response = router
        .oneshot(request(Method::GET, "/api/v1/rooms", Some(&token), None))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(read_json_body(response).await["error"], "store_unavailable");
}

#[tokio::test]
async fn allocate_handler_reports_missing_laborers() {
    let camp = Arc::new(administration());
    let room_id = room(&camp, "R1", 2);

    let result = allocate_handler::<InMemoryCampRepository>(
        State(camp),
        PathParam(room_id),
        Payload(AllocationRequest {
            laborer_ids: vec![LaborerId(12)],
        }),
    )
    .await;

    match result {
        Err(CampError::NotFound { entity, id }) => {
            assert_eq!(entity, "laborer");
            assert_eq!(id, "12");
        }
        other => panic!("expected missing laborer, got {other:?}"),
    }
}
