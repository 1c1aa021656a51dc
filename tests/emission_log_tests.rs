// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip submission, log history and chart endpoint tests.

use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use ecofootprint::models::{Activity, FuelCategory};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, get, post_json, seed_user, session_token};

fn trip(user_id: &str, category: &str, efficiency: f64, distance: f64) -> Value {
    json!({
        "userId": user_id,
        "userName": "Alice",
        "vehicleName": "Daily driver",
        "vehicleType": "Sedan",
        "fuelCategory": category,
        "fuelEfficiency": efficiency,
        "distance": distance
    })
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn seed_day(state: &ecofootprint::AppState, user_id: &str, date: &str, emission: f64) {
    let activity = Activity {
        vehicle_name: "Car".to_string(),
        vehicle_type: "Sedan".to_string(),
        fuel_category: FuelCategory::Petrol,
        distance_km: dec!(10),
        fuel_efficiency: dec!(10),
        emission_kg: rust_decimal::Decimal::try_from(emission).unwrap(),
    };
    state
        .db
        .record_activity(user_id, "Alice", day(date), &activity, Utc::now())
        .await
        .unwrap();
}

// ─── Submission ──────────────────────────────────────────────

#[tokio::test]
async fn test_two_trips_same_day_accumulate() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    let token = session_token(&state, "alice");

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/emission-log",
            Some(&token),
            trip("alice", "Petrol", 15.0, 50.0),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["emission"], 7.7);
    assert_eq!(body["totalEmission"], 7.7);
    assert_eq!(body["lifetimeTotal"], 7.7);
    assert!(body.get("warning").is_none());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/emission-log",
            Some(&token),
            trip("alice", "Diesel", 20.0, 40.0),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["emission"], 5.36);
    assert_eq!(body["totalEmission"], 13.06);
    assert_eq!(body["lifetimeTotal"], 13.06);

    let response = app
        .oneshot(get("/api/emission-log/alice", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1, "both trips land in one daily log");
    assert_eq!(logs[0]["totalEmissionKg"], 13.06);

    let activities = logs[0]["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0]["fuelCategory"], "Petrol");
    assert_eq!(activities[1]["fuelCategory"], "Diesel");

    let user = state.db.get_user("alice").await.unwrap().unwrap();
    assert_eq!(user.total_emission_kg, dec!(13.06));
}

#[tokio::test]
async fn test_unknown_fuel_category_records_zero() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    let token = session_token(&state, "alice");

    let response = app
        .oneshot(post_json(
            "/api/emission-log",
            Some(&token),
            trip("alice", "Hydrogen", 100.0, 25.0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["emission"], 0.0);

    let logs = state.db.get_logs_for_user("alice").await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(
        logs[0].activities[0].fuel_category,
        FuelCategory::Other("Hydrogen".to_string())
    );
}

#[tokio::test]
async fn test_vehicle_category_alias_accepted() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    let token = session_token(&state, "alice");

    let response = app
        .oneshot(post_json(
            "/api/emission-log",
            Some(&token),
            json!({
                "userId": "alice",
                "userName": "Alice",
                "vehicleName": "Scooter",
                "vehicleType": "Two-wheeler",
                "vehicleCategory": "Electric",
                "fuelEfficiency": 7,
                "distance": 24
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["emission"], 0.17);
}

#[tokio::test]
async fn test_submission_validation_errors() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    let token = session_token(&state, "alice");

    let mut missing_distance = trip("alice", "Petrol", 15.0, 50.0);
    missing_distance.as_object_mut().unwrap().remove("distance");

    let mut blank_vehicle = trip("alice", "Petrol", 15.0, 50.0);
    blank_vehicle["vehicleName"] = json!("");

    let cases = [
        ("missing distance", missing_distance, "distance"),
        ("blank vehicle name", blank_vehicle, "vehicleName"),
        ("zero distance", trip("alice", "Petrol", 15.0, 0.0), "distance"),
        ("negative distance", trip("alice", "Petrol", 15.0, -3.0), "distance"),
        ("huge distance", trip("alice", "Petrol", 15.0, 2_000_000.0), "distance"),
        (
            "tiny efficiency",
            trip("alice", "Petrol", 4.62e-23, 1_000_000.0),
            "fuelEfficiency",
        ),
    ];

    for (label, body, field) in cases {
        let response = app
            .clone()
            .oneshot(post_json("/api/emission-log", Some(&token), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{label}");
        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error", "{label}");
        assert_eq!(body["field"], field, "{label}");
    }

    assert!(state.db.get_logs_for_user("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    let token = session_token(&state, "alice");

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/emission-log")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], "body");
}

#[tokio::test]
async fn test_zero_efficiency_trip_records_zero() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    let token = session_token(&state, "alice");

    let response = app
        .oneshot(post_json(
            "/api/emission-log",
            Some(&token),
            trip("alice", "Petrol", 0.0, 50.0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["emission"], 0.0);
}

#[tokio::test]
async fn test_submission_for_unknown_user_is_not_found() {
    let (app, state) = create_test_app();
    // Valid session, but no profile was ever created
    let token = session_token(&state, "ghost");

    let response = app
        .oneshot(post_json(
            "/api/emission-log",
            Some(&token),
            trip("ghost", "Petrol", 15.0, 50.0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
    assert!(state.db.get_logs_for_user("ghost").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_total_refresh_failure_is_reported_as_warning() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    let token = session_token(&state, "alice");

    state
        .db
        .as_memory()
        .unwrap()
        .set_fail_log_queries(true);

    let response = app
        .oneshot(post_json(
            "/api/emission-log",
            Some(&token),
            trip("alice", "Petrol", 15.0, 50.0),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["emission"], 7.7);
    assert_eq!(body["totalEmission"], 7.7);
    assert!(body["lifetimeTotal"].is_null());
    assert_eq!(body["warning"]["kind"], "secondary_update_failure");

    // The trip itself was saved
    let log = state
        .db
        .get_daily_log("alice", ecofootprint::time_utils::local_calendar_date(Utc::now()))
        .await
        .unwrap()
        .expect("daily log written");
    assert_eq!(log.total_emission_kg, dec!(7.70));
}

#[tokio::test]
async fn test_concurrent_submissions_are_all_kept() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    let token = Arc::new(session_token(&state, "alice"));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let app = app.clone();
            let token = token.clone();
            tokio::spawn(async move {
                app.oneshot(post_json(
                    "/api/emission-log",
                    Some(token.as_str()),
                    trip("alice", "Petrol", 23.1, 10.0),
                ))
                .await
                .unwrap()
                .status()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let logs = state.db.get_logs_for_user("alice").await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].activities.len(), 20);
    // 20 trips of 1.00 kg each
    assert_eq!(logs[0].total_emission_kg, dec!(20.00));
}

// ─── History ─────────────────────────────────────────────────

#[tokio::test]
async fn test_logs_newest_first() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    seed_day(&state, "alice", "2025-03-01", 1.0).await;
    seed_day(&state, "alice", "2025-03-03", 3.0).await;
    seed_day(&state, "alice", "2025-03-02", 2.0).await;
    let token = session_token(&state, "alice");

    let response = app
        .oneshot(get("/api/emission-log/alice", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let dates: Vec<&str> = body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, ["2025-03-03", "2025-03-02", "2025-03-01"]);
}

#[tokio::test]
async fn test_logs_for_unknown_user_not_found() {
    let (app, state) = create_test_app();
    let token = session_token(&state, "ghost");

    let response = app
        .oneshot(get("/api/emission-log/ghost", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ─── Chart ───────────────────────────────────────────────────

#[tokio::test]
async fn test_chart_series_and_axis() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    seed_day(&state, "alice", "2025-01-01", 12.5).await;
    seed_day(&state, "alice", "2025-01-10", 47.0).await;
    seed_day(&state, "alice", "2025-01-20", 3.25).await;
    // Outside the requested range
    seed_day(&state, "alice", "2025-02-01", 99.0).await;
    let token = session_token(&state, "alice");

    let response = app
        .oneshot(get(
            "/api/emission-log/chart-data/alice?startDate=2025-01-01&endDate=2025-01-31",
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["date"], "2025-01-01");
    assert_eq!(data[1]["emission"], 47.0);
    assert_eq!(data[2]["date"], "2025-01-20");

    assert_eq!(body["chartConfig"]["yAxisMax"], 50.0);
    assert_eq!(body["chartConfig"]["yAxisStep"], 5.0);
}

#[tokio::test]
async fn test_chart_empty_range_defaults_axis() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    let token = session_token(&state, "alice");

    let response = app
        .oneshot(get(
            "/api/emission-log/chart-data/alice?startDate=2025-01-01&endDate=2025-01-31",
            Some(&token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["chartConfig"]["yAxisMax"], 100.0);
    assert_eq!(body["chartConfig"]["yAxisStep"], 10.0);
}

#[tokio::test]
async fn test_chart_requires_valid_dates() {
    let (app, state) = create_test_app();
    seed_user(&state, "alice", "Alice").await;
    let token = session_token(&state, "alice");

    let cases = [
        ("/api/emission-log/chart-data/alice?endDate=2025-01-31", "startDate"),
        ("/api/emission-log/chart-data/alice?startDate=2025-01-01", "endDate"),
        (
            "/api/emission-log/chart-data/alice?startDate=yesterday&endDate=2025-01-31",
            "startDate",
        ),
    ];

    for (uri, field) in cases {
        let response = app.clone().oneshot(get(uri, Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["field"], field, "{uri}");
    }
}
