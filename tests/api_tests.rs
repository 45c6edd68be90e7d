//! API integration tests
//!
//! Run against a live server started with a bootstrap owner:
//! `SALON_AUTH__BOOTSTRAP_LOGIN=owner SALON_AUTH__BOOTSTRAP_PASSWORD=owner-password`
//!
//! The owner is only created when the users table is empty, so the first
//! start against a fresh database must carry those variables. Later runs
//! reuse the account it created.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const DAY: &str = "2025-12-20";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "owner",
            "password": "owner-password"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn post(client: &Client, token: &str, path: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn put(client: &Client, token: &str, path: &str, body: Value) -> reqwest::Response {
    client
        .put(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn get(client: &Client, token: &str, path: &str) -> Value {
    client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

/// A fresh employee, client and 60-minute service so runs never share a schedule
async fn fixtures(client: &Client, token: &str) -> (i64, i64, i64) {
    let employee: Value = post(client, token, "/employees", json!({ "name": "Integration Stylist" }))
        .await
        .json()
        .await
        .unwrap();
    let customer: Value = post(client, token, "/clients", json!({ "name": "Integration Client" }))
        .await
        .json()
        .await
        .unwrap();
    let service: Value = post(
        client,
        token,
        "/services",
        json!({ "name": "Corte", "recommended_price": "50.00", "duration_minutes": 60 }),
    )
    .await
    .json()
    .await
    .unwrap();

    (
        employee["id"].as_i64().unwrap(),
        customer["id"].as_i64().unwrap(),
        service["id"].as_i64().unwrap(),
    )
}

async fn book(client: &Client, token: &str, ids: (i64, i64, i64), time: &str, minutes: i32) -> reqwest::Response {
    let (employee_id, client_id, service_id) = ids;
    post(
        client,
        token,
        "/appointments",
        json!({
            "client_id": client_id,
            "employee_id": employee_id,
            "service_id": service_id,
            "appointment_date": DAY,
            "appointment_time": time,
            "duration_minutes": minutes
        }),
    )
    .await
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "owner",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_overlapping_booking_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let ids = fixtures(&client, &token).await;

    let a = book(&client, &token, ids, "09:00", 60).await;
    assert_eq!(a.status(), 201);

    let b = book(&client, &token, ids, "09:30", 30).await;
    assert_eq!(b.status(), 409);
    let body: Value = b.json().await.unwrap();
    assert_eq!(body["error"], "ScheduleConflict");
    assert_eq!(body["code"], 6);

    // Starts exactly when A ends
    let c = book(&client, &token, ids, "10:00", 30).await;
    assert_eq!(c.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_availability_excludes_booked_slot() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let ids = fixtures(&client, &token).await;

    let booked = book(&client, &token, ids, "09:00", 30).await;
    assert_eq!(booked.status(), 201);

    let body = get(
        &client,
        &token,
        &format!("/appointments/availability?employee_id={}&date={}", ids.0, DAY),
    )
    .await;

    let starts: Vec<&str> = body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start_time"].as_str().unwrap())
        .collect();
    assert!(!starts.iter().any(|s| s.starts_with("09:00")));
    assert!(starts.iter().any(|s| s.starts_with("09:30")));
    assert_eq!(starts.len(), 19);
}

#[tokio::test]
#[ignore]
async fn test_complete_updates_client_once() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let ids = fixtures(&client, &token).await;

    let created: Value = book(&client, &token, ids, "11:00", 60).await.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let confirmed = post(&client, &token, &format!("/appointments/{}/confirm", id), json!({})).await;
    assert_eq!(confirmed.status(), 200);

    let completed = post(&client, &token, &format!("/appointments/{}/complete", id), json!({})).await;
    assert_eq!(completed.status(), 200);
    let body: Value = completed.json().await.unwrap();
    assert_eq!(body["status"], "completed");

    let again = post(&client, &token, &format!("/appointments/{}/complete", id), json!({})).await;
    assert_eq!(again.status(), 422);

    let customer = get(&client, &token, &format!("/clients/{}", ids.1)).await;
    assert_eq!(customer["total_visits"], 1);
    assert_eq!(customer["total_spent"], "50.00");
    assert_eq!(customer["last_visit"], DAY);
}

#[tokio::test]
#[ignore]
async fn test_cancel_frees_slot_without_metrics() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let ids = fixtures(&client, &token).await;

    let created: Value = book(&client, &token, ids, "14:00", 60).await.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let canceled = post(&client, &token, &format!("/appointments/{}/cancel", id), json!({})).await;
    assert_eq!(canceled.status(), 200);

    let customer = get(&client, &token, &format!("/clients/{}", ids.1)).await;
    assert_eq!(customer["total_visits"], 0);

    // The canceled booking no longer blocks the time
    let rebooked = book(&client, &token, ids, "14:00", 60).await;
    assert_eq!(rebooked.status(), 201);

    let confirm = post(&client, &token, &format!("/appointments/{}/confirm", id), json!({})).await;
    assert_eq!(confirm.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_finished_appointment_accepts_notes_only() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let ids = fixtures(&client, &token).await;

    let created: Value = book(&client, &token, ids, "15:00", 60).await.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    let path = format!("/appointments/{}", id);

    let completed = post(&client, &token, &format!("{}/complete", path), json!({})).await;
    assert_eq!(completed.status(), 200);

    let moved = put(&client, &token, &path, json!({ "appointment_time": "16:00" })).await;
    assert_eq!(moved.status(), 422);
    let body: Value = moved.json().await.unwrap();
    assert_eq!(body["error"], "InvalidTransition");

    let noted = put(&client, &token, &path, json!({ "notes": "paid by card" })).await;
    assert_eq!(noted.status(), 200);
    let body: Value = noted.json().await.unwrap();
    assert_eq!(body["notes"], "paid by card");
    assert_eq!(body["appointment_time"], "15:00:00");
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
#[ignore]
async fn test_reschedule_checks_conflicts() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let ids = fixtures(&client, &token).await;

    let a: Value = book(&client, &token, ids, "09:00", 60).await.json().await.unwrap();
    let b: Value = book(&client, &token, ids, "10:00", 30).await.json().await.unwrap();
    let a_id = a["id"].as_i64().unwrap();
    let b_id = b["id"].as_i64().unwrap();

    // B onto A's hour
    let clash = put(
        &client,
        &token,
        &format!("/appointments/{}", b_id),
        json!({ "appointment_time": "09:30" }),
    )
    .await;
    assert_eq!(clash.status(), 409);

    // A over part of its own old interval
    let shifted = put(
        &client,
        &token,
        &format!("/appointments/{}", a_id),
        json!({ "appointment_time": "08:30" }),
    )
    .await;
    assert_eq!(shifted.status(), 200);
    let body: Value = shifted.json().await.unwrap();
    assert_eq!(body["appointment_time"], "08:30:00");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_bookings_only_one_wins() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let ids = fixtures(&client, &token).await;

    let (first, second) = tokio::join!(
        book(&client, &token, ids, "12:00", 60),
        book(&client, &token, ids, "12:30", 60),
    );

    let mut statuses = vec![first.status().as_u16(), second.status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, vec![201, 409]);
}

#[tokio::test]
#[ignore]
async fn test_edit_racing_completion_keeps_totals_consistent() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    for time in ["08:00", "10:00", "12:00", "14:00", "16:00"] {
        let ids = fixtures(&client, &token).await;
        let created: Value = book(&client, &token, ids, time, 60).await.json().await.unwrap();
        let path = format!("/appointments/{}", created["id"].as_i64().unwrap());

        let complete_path = format!("{}/complete", path);
        let (edited, completed) = tokio::join!(
            put(&client, &token, &path, json!({ "price": "999.00" })),
            post(&client, &token, &complete_path, json!({})),
        );
        assert_eq!(completed.status(), 200);
        assert!(matches!(edited.status().as_u16(), 200 | 422));

        // Whichever won, the client was charged what the appointment says
        let appointment = get(&client, &token, &path).await;
        let customer = get(&client, &token, &format!("/clients/{}", ids.1)).await;
        assert_eq!(appointment["status"], "completed");
        assert_eq!(customer["total_spent"], appointment["price"]);
    }
}
