mod common;

use common::{authenticated_request, TestEvent, TestServer};
use http::{Method, StatusCode};
use serde_json::json;

async fn fetch_report(server: &TestServer, event: &TestEvent) -> serde_json::Value {
    let uri = format!("/api/v1/events/{}/report", event.id);
    let (status, body) = server
        .send(authenticated_request(Method::GET, &uri, &event.auth_header()))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn test_report_after_single_rsvp() {
    let server = TestServer::new().await;
    let event = server.create_default_event().await;
    let invites = server.create_invites(&event, json!({ "count": 1 })).await;

    server
        .rsvp(
            &event.id,
            json!({
                "invite_id": invites[0]["id"],
                "guest_name": "Amy",
                "guest_email": "a@x.com",
                "attendance": "yes",
                "guest_count": 2,
                "dietary_options": ["vegan"]
            }),
        )
        .await;

    let report = fetch_report(&server, &event).await;
    assert_eq!(report["event_id"], event.id.as_str());
    assert_eq!(report["summary"]["total_invites"], 1);
    assert_eq!(report["summary"]["total_responses"], 1);
    assert_eq!(report["summary"]["attending"], 1);
    assert_eq!(report["summary"]["total_guests"], 2);
    assert_eq!(report["summary"]["response_rate"], 100.0);
    assert_eq!(report["dietary"]["preferences"]["vegan"], 2);
    assert_eq!(report["dietary"]["total_with_dietary"], 1);
    assert_eq!(report["guests"]["guest_count_distribution"]["2"], 1);
    assert!(report["capacity"].is_null());
}

#[tokio::test]
async fn test_empty_event_report() {
    let server = TestServer::new().await;
    let event = server.create_default_event().await;

    let report = fetch_report(&server, &event).await;
    assert_eq!(report["summary"]["total_invites"], 0);
    assert_eq!(report["summary"]["total_responses"], 0);
    assert_eq!(report["summary"]["response_rate"], 0.0);
    assert_eq!(report["milestones"], json!([]));
    assert_eq!(report["trends"]["daily"], json!({}));
}

#[tokio::test]
async fn test_declined_guest_count_does_not_move_total() {
    let server = TestServer::new().await;
    let event = server.create_default_event().await;
    let invites = server.create_invites(&event, json!({ "count": 2 })).await;

    server
        .rsvp(
            &event.id,
            json!({
                "invite_id": invites[0]["id"],
                "guest_name": "Amy",
                "guest_email": "a@x.com",
                "attendance": "yes",
                "guest_count": 3
            }),
        )
        .await;
    let decline = |count: i64| {
        json!({
            "invite_id": invites[1]["id"],
            "guest_name": "Ben",
            "guest_email": "b@x.com",
            "attendance": "no",
            "guest_count": count
        })
    };

    server.rsvp(&event.id, decline(1)).await;
    let before = fetch_report(&server, &event).await;
    server.rsvp(&event.id, decline(6)).await;
    let after = fetch_report(&server, &event).await;

    assert_eq!(before["summary"]["total_guests"], 3);
    assert_eq!(after["summary"]["total_guests"], 3);
    assert_eq!(after["summary"]["not_attending"], 1);
}

#[tokio::test]
async fn test_response_rate_capped_without_invites() {
    let server = TestServer::new().await;
    let event = server.create_default_event().await;
    server.create_invites(&event, json!({ "count": 1 })).await;

    for name in ["Amy", "Ben", "Cal"] {
        server
            .rsvp(
                &event.id,
                json!({
                    "guest_name": name,
                    "guest_email": format!("{name}@x.com"),
                    "attendance": "maybe"
                }),
            )
            .await;
    }

    let report = fetch_report(&server, &event).await;
    assert_eq!(report["summary"]["total_responses"], 3);
    assert_eq!(report["summary"]["response_rate"], 100.0);
}

#[tokio::test]
async fn test_capacity_reported_when_event_has_limit() {
    let server = TestServer::new().await;
    let date = (chrono::Utc::now() + chrono::Duration::days(10))
        .format("%Y-%m-%d")
        .to_string();
    let event = server
        .create_event(json!({ "name": "Dinner", "date": date, "max_guests": 4 }))
        .await;

    server
        .rsvp(
            &event.id,
            json!({
                "guest_name": "Amy",
                "guest_email": "a@x.com",
                "attendance": "yes",
                "guest_count": 5
            }),
        )
        .await;

    let report = fetch_report(&server, &event).await;
    assert_eq!(report["capacity"]["max_guests"], 4);
    assert_eq!(report["capacity"]["remaining"], 0);
    assert_eq!(report["capacity"]["over_capacity"], true);
}

#[tokio::test]
async fn test_report_milestones_and_trends_follow_responses() {
    let server = TestServer::new().await;
    let event = server.create_default_event().await;
    let invites = server.create_invites(&event, json!({ "count": 2 })).await;

    server
        .rsvp(
            &event.id,
            json!({
                "invite_id": invites[0]["id"],
                "guest_name": "Amy",
                "guest_email": "a@x.com",
                "attendance": "yes"
            }),
        )
        .await;

    let report = fetch_report(&server, &event).await;
    let milestones = report["milestones"].as_array().unwrap();
    // One of two invites answered reaches 25% and 50%.
    let percents: Vec<u64> = milestones
        .iter()
        .map(|m| m["percent"].as_u64().unwrap())
        .collect();
    assert_eq!(percents, vec![25, 50]);

    let daily = report["trends"]["daily"].as_object().unwrap();
    assert_eq!(daily.len(), 1);
    let bucket = daily.values().next().unwrap();
    assert_eq!(bucket["responses"], 1);
    assert_eq!(bucket["attending"], 1);
    assert_eq!(report["trends"]["weekly"].as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_report_requires_host_token() {
    let server = TestServer::new().await;
    let event = server.create_default_event().await;
    let other = server.create_default_event().await;

    let uri = format!("/api/v1/events/{}/report", event.id);
    let (status, body) = server
        .send(authenticated_request(Method::GET, &uri, &other.auth_header()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_huge_guest_counts_are_capped() {
    let server = TestServer::new().await;
    let event = server.create_default_event().await;

    for name in ["Amy", "Ben"] {
        let (status, body) = server
            .rsvp(
                &event.id,
                json!({
                    "guest_name": name,
                    "guest_email": format!("{name}@x.com"),
                    "attendance": "yes",
                    "guest_count": "1e30",
                    "dietary_options": ["vegan"]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["guest_count"], 1000);
    }

    let report = fetch_report(&server, &event).await;
    assert_eq!(report["summary"]["total_guests"], 2000);
    assert_eq!(report["dietary"]["preferences"]["vegan"], 2000);
}
