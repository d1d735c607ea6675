mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{TestApp, CRON_SECRET};
use custody_backend::domain::models::{
    calendar_date::next_week_start,
    family::{ParentRole, Plan},
    notification::NotificationKind,
};
use serde_json::{json, Value};

const WEEK: &str = "2026-02-02";

async fn pending_count(app: &TestApp, family_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM week_proposals WHERE family_id = ? AND status = 'pending'")
        .bind(family_id)
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

async fn only_proposal(app: &TestApp, family_id: &str, token: &str) -> Value {
    let (status, body) = app.send("GET", &format!("/api/v1/families/{}/proposals", family_id), Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    list[0].clone()
}

fn parents(proposal: &Value) -> Vec<String> {
    proposal["days"].as_array().unwrap()
        .iter()
        .map(|d| d["parent"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_blocked_midweek_scenario() {
    let app = TestApp::new().await;
    let couple = app.seed_couple().await;
    app.add_block(&couple.family.id, &couple.parent_a, "2026-02-03", "2026-02-05").await;

    let (status, summary) = app.trigger_weekly(WEEK).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["week_start"], WEEK);
    assert_eq!(summary["families_processed"], 1);
    assert_eq!(summary["proposals_created"], 1);

    let token = app.token_for(&couple.parent_a.id);
    let proposal = only_proposal(&app, &couple.family.id, &token).await;
    assert_eq!(proposal["status"], "pending");
    assert_eq!(proposal["approvals"], json!({}));
    assert_eq!(
        parents(&proposal),
        vec!["parent_a", "parent_b", "parent_b", "parent_b", "parent_a", "parent_b", "parent_a"]
    );

    let days = proposal["days"].as_array().unwrap();
    assert_eq!(days[0]["date"], "2026-02-02");
    assert_eq!(days[6]["date"], "2026-02-08");
    assert_eq!(days[1]["location"], "parent_b_home");
    assert_eq!(days[0]["location"], "parent_a_home");

    let created = app.notifier.of_kind(NotificationKind::ProposalCreated);
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0, vec![couple.parent_a.id.clone(), couple.parent_b.id.clone()]);
}

#[tokio::test]
async fn test_trigger_twice_keeps_one_pending_proposal() {
    let app = TestApp::new().await;
    let couple = app.seed_couple().await;

    let (_, first) = app.trigger_weekly(WEEK).await;
    assert_eq!(first["proposals_created"], 1);

    let (status, second) = app.trigger_weekly(WEEK).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["proposals_created"], 0);
    assert_eq!(second["already_pending"], 1);

    assert_eq!(pending_count(&app, &couple.family.id).await, 1);
    assert_eq!(app.notifier.of_kind(NotificationKind::ProposalCreated).len(), 1);
}

#[tokio::test]
async fn test_trigger_requires_secret() {
    let app = TestApp::new().await;

    let (status, _) = app.send("POST", "/api/v1/cron/weekly-proposals", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send("POST", "/api/v1/cron/weekly-proposals", Some("wrong"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send("GET", "/api/v1/cron/weekly-proposals?secret=nope", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let uri = format!("/api/v1/cron/weekly-proposals?secret={}&week_start={}", CRON_SECRET, WEEK);
    let (status, body) = app.send("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["families_processed"], 0);
    assert_eq!(body["proposals_created"], 0);
}

#[tokio::test]
async fn test_trigger_defaults_to_next_monday() {
    let app = TestApp::new().await;
    app.seed_couple().await;

    let (status, body) = app.send("POST", "/api/v1/cron/weekly-proposals", Some(CRON_SECRET), None).await;
    assert_eq!(status, StatusCode::OK);

    let expected = next_week_start(Utc::now().date_naive()).unwrap();
    assert_eq!(body["week_start"], expected.as_str());
    assert_eq!(body["proposals_created"], 1);
}

#[tokio::test]
async fn test_trigger_rejects_non_monday() {
    let app = TestApp::new().await;
    let (status, _) = app.trigger_weekly("2026-02-03").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.trigger_weekly("2026-2-2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ineligible_families_are_skipped() {
    let app = TestApp::new().await;

    // Free plan
    let a1 = app.seed_user("A1", Some(ParentRole::ParentA)).await;
    let b1 = app.seed_user("B1", Some(ParentRole::ParentB)).await;
    app.seed_family(Plan::Free, &[&a1, &b1]).await;

    // Single member
    let solo = app.seed_user("Solo", Some(ParentRole::ParentA)).await;
    app.seed_family(Plan::Premium, &[&solo]).await;

    // Both members claim the same slot
    let a2 = app.seed_user("A2", Some(ParentRole::ParentA)).await;
    let a3 = app.seed_user("A3", Some(ParentRole::ParentA)).await;
    app.seed_family(Plan::Premium, &[&a2, &a3]).await;

    let (status, summary) = app.trigger_weekly(WEEK).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["families_processed"], 3);
    assert_eq!(summary["proposals_created"], 0);
    assert_eq!(summary["skipped"], 3);
    assert_eq!(summary["failed"], 0);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM week_proposals")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_out_of_order_approval_commits_on_second() {
    let app = TestApp::new().await;
    let couple = app.seed_couple().await;
    app.trigger_weekly(WEEK).await;

    let token_a = app.token_for(&couple.parent_a.id);
    let token_b = app.token_for(&couple.parent_b.id);
    let proposal = only_proposal(&app, &couple.family.id, &token_a).await;
    let approve_uri = format!(
        "/api/v1/families/{}/proposals/{}/approve",
        couple.family.id,
        proposal["id"].as_str().unwrap()
    );

    // Parent B first: recorded only.
    let (status, body) = app.send("POST", &approve_uri, Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "recorded");
    assert_eq!(body["proposal"]["status"], "pending");
    assert_eq!(app.count_events(&couple.family.id).await, 0);

    let approved_by = app.notifier.of_kind(NotificationKind::ProposalApprovedBy);
    assert_eq!(approved_by.len(), 1);
    assert_eq!(approved_by[0].0, vec![couple.parent_a.id.clone()]);
    assert!(approved_by[0].1.title.contains("Bob"));

    // Parent A completes the set.
    let (status, body) = app.send("POST", &approve_uri, Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "committed");
    assert_eq!(body["proposal"]["status"], "approved");
    assert_eq!(body["proposal"]["approvals"].as_object().unwrap().len(), 2);

    let (_, events) = app.send(
        "GET",
        &format!("/api/v1/families/{}/events?start=2026-02-02&end=2026-02-08", couple.family.id),
        Some(&token_a),
        None,
    ).await;
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 7);
    for (event, day) in events.iter().zip(proposal["days"].as_array().unwrap()) {
        assert_eq!(event["date"], day["date"]);
        assert_eq!(event["party"], day["parent"]);
        assert_eq!(event["location"], day["location"]);
        assert_eq!(event["created_by"], couple.parent_a.id.as_str());
    }

    let applied = app.notifier.of_kind(NotificationKind::ScheduleApplied);
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].0.len(), 2);
}

#[tokio::test]
async fn test_reapproval_is_idempotent() {
    let app = TestApp::new().await;
    let couple = app.seed_couple().await;
    app.trigger_weekly(WEEK).await;

    let token_a = app.token_for(&couple.parent_a.id);
    let token_b = app.token_for(&couple.parent_b.id);
    let proposal = only_proposal(&app, &couple.family.id, &token_a).await;
    let approve_uri = format!(
        "/api/v1/families/{}/proposals/{}/approve",
        couple.family.id,
        proposal["id"].as_str().unwrap()
    );

    app.send("POST", &approve_uri, Some(&token_a), None).await;
    let (status, body) = app.send("POST", &approve_uri, Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "recorded");
    let approvals = body["proposal"]["approvals"].as_object().unwrap();
    assert_eq!(approvals.len(), 1);
    assert!(approvals.contains_key(&couple.parent_a.id));

    let (_, body) = app.send("POST", &approve_uri, Some(&token_b), None).await;
    assert_eq!(body["outcome"], "committed");

    // Approving an approved proposal changes nothing.
    let (status, body) = app.send("POST", &approve_uri, Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "already_approved");
    assert_eq!(app.count_events(&couple.family.id).await, 7);
    assert_eq!(app.notifier.of_kind(NotificationKind::ScheduleApplied).len(), 1);
}

#[tokio::test]
async fn test_commit_replaces_existing_events_on_week_dates() {
    let app = TestApp::new().await;
    let couple = app.seed_couple().await;
    let token_a = app.token_for(&couple.parent_a.id);
    let token_b = app.token_for(&couple.parent_b.id);
    let events_uri = format!("/api/v1/families/{}/events", couple.family.id);

    let (status, manual) = app.send(
        "POST",
        &events_uri,
        Some(&token_a),
        Some(json!({ "date": "2026-02-04", "party": "together", "location": "school", "title": "Recital" })),
    ).await;
    assert_eq!(status, StatusCode::CREATED);

    // Outside the proposal week; must survive.
    let (status, outside) = app.send(
        "POST",
        &events_uri,
        Some(&token_a),
        Some(json!({ "date": "2026-02-09", "party": "parent_b" })),
    ).await;
    assert_eq!(status, StatusCode::CREATED);

    app.trigger_weekly(WEEK).await;
    let proposal = only_proposal(&app, &couple.family.id, &token_a).await;
    let approve_uri = format!(
        "/api/v1/families/{}/proposals/{}/approve",
        couple.family.id,
        proposal["id"].as_str().unwrap()
    );
    app.send("POST", &approve_uri, Some(&token_a), None).await;
    let (_, body) = app.send("POST", &approve_uri, Some(&token_b), None).await;
    assert_eq!(body["outcome"], "committed");

    let (_, events) = app.send("GET", &events_uri, Some(&token_a), None).await;
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 8);

    let ids: Vec<&str> = events.iter().map(|e| e["id"].as_str().unwrap()).collect();
    assert!(!ids.contains(&manual["id"].as_str().unwrap()));
    assert!(ids.contains(&outside["id"].as_str().unwrap()));

    let wednesday: Vec<&Value> = events.iter().filter(|e| e["date"] == "2026-02-04").collect();
    assert_eq!(wednesday.len(), 1);
    assert_eq!(wednesday[0]["party"], "parent_a");
}

#[tokio::test]
async fn test_proposal_access_requires_membership() {
    let app = TestApp::new().await;
    let couple = app.seed_couple().await;
    let outsider = app.seed_user("Eve", Some(ParentRole::ParentA)).await;
    app.trigger_weekly(WEEK).await;

    let token_a = app.token_for(&couple.parent_a.id);
    let proposal = only_proposal(&app, &couple.family.id, &token_a).await;
    let proposal_uri = format!("/api/v1/families/{}/proposals/{}", couple.family.id, proposal["id"].as_str().unwrap());

    let (status, _) = app.send("GET", &proposal_uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send("GET", &proposal_uri, Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let outsider_token = app.token_for(&outsider.id);
    let (status, _) = app.send("GET", &proposal_uri, Some(&outsider_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("POST", &format!("{}/approve", proposal_uri), Some(&outsider_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(pending_count(&app, &couple.family.id).await, 1);

    let (status, body) = app.send("GET", &proposal_uri, Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["week_start"], WEEK);

    let (status, _) = app.send(
        "GET",
        &format!("/api/v1/families/{}/proposals/missing", couple.family.id),
        Some(&token_a),
        None,
    ).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_proposals_filters_by_status() {
    let app = TestApp::new().await;
    let couple = app.seed_couple().await;
    let token = app.token_for(&couple.parent_a.id);
    app.trigger_weekly(WEEK).await;

    let base = format!("/api/v1/families/{}/proposals", couple.family.id);
    let (_, pending) = app.send("GET", &format!("{}?status=pending", base), Some(&token), None).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (_, approved) = app.send("GET", &format!("{}?status=approved", base), Some(&token), None).await;
    assert!(approved.as_array().unwrap().is_empty());

    let (status, _) = app.send("GET", &format!("{}?status=rejected", base), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preview_does_not_persist() {
    let app = TestApp::new().await;
    let couple = app.seed_couple().await;
    app.add_block(&couple.family.id, &couple.parent_b, "2026-02-02", "2026-02-02").await;
    let token = app.token_for(&couple.parent_b.id);

    let (status, body) = app.send(
        "GET",
        &format!("/api/v1/families/{}/proposals/preview?week_start={}", couple.family.id, WEEK),
        Some(&token),
        None,
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["week_start"], WEEK);
    assert_eq!(body["days"].as_array().unwrap().len(), 7);
    assert_eq!(body["days"][0]["parent"], "parent_a");
    assert_eq!(body["days"][1]["parent"], "parent_b");

    let (status, _) = app.send(
        "GET",
        &format!("/api/v1/families/{}/proposals/preview?week_start=2026-02-04", couple.family.id),
        Some(&token),
        None,
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(pending_count(&app, &couple.family.id).await, 0);
}

#[tokio::test]
async fn test_failing_notification_sink_does_not_fail_lifecycle() {
    let app = TestApp::with_failing_notifier().await;
    let couple = app.seed_couple().await;

    let (status, summary) = app.trigger_weekly(WEEK).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["proposals_created"], 1);
    assert_eq!(summary["failed"], 0);

    let token_a = app.token_for(&couple.parent_a.id);
    let token_b = app.token_for(&couple.parent_b.id);
    let proposal = only_proposal(&app, &couple.family.id, &token_a).await;
    let approve_uri = format!(
        "/api/v1/families/{}/proposals/{}/approve",
        couple.family.id,
        proposal["id"].as_str().unwrap()
    );

    let (status, body) = app.send("POST", &approve_uri, Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "recorded");

    let (status, body) = app.send("POST", &approve_uri, Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "committed");
    assert_eq!(app.count_events(&couple.family.id).await, 7);

    // Every delivery was attempted even though each one failed.
    assert_eq!(app.notifier.of_kind(NotificationKind::ProposalCreated).len(), 1);
    assert_eq!(app.notifier.of_kind(NotificationKind::ProposalApprovedBy).len(), 1);
    assert_eq!(app.notifier.of_kind(NotificationKind::ScheduleApplied).len(), 1);
}

#[tokio::test]
async fn test_failed_commit_leaves_proposal_pending() {
    let app = TestApp::new().await;
    let couple = app.seed_couple().await;
    let token_a = app.token_for(&couple.parent_a.id);
    let token_b = app.token_for(&couple.parent_b.id);
    let events_uri = format!("/api/v1/families/{}/events", couple.family.id);

    let (status, _) = app.send(
        "POST",
        &events_uri,
        Some(&token_a),
        Some(json!({ "date": "2026-02-03", "party": "together", "title": "Recital" })),
    ).await;
    assert_eq!(status, StatusCode::CREATED);

    app.trigger_weekly(WEEK).await;
    let proposal = only_proposal(&app, &couple.family.id, &token_a).await;
    let approve_uri = format!(
        "/api/v1/families/{}/proposals/{}/approve",
        couple.family.id,
        proposal["id"].as_str().unwrap()
    );
    app.send("POST", &approve_uri, Some(&token_a), None).await;

    app.fail_inserts("schedule_events", "NEW.date = '2026-02-06'").await;
    let (status, _) = app.send("POST", &approve_uri, Some(&token_b), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // Nothing from the week landed and the manual event survived the rollback.
    assert_eq!(app.count_events(&couple.family.id).await, 1);
    assert_eq!(pending_count(&app, &couple.family.id).await, 1);
    let (_, current) = app.send("GET", &format!("/api/v1/families/{}/proposals/{}", couple.family.id, proposal["id"].as_str().unwrap()), Some(&token_a), None).await;
    assert_eq!(current["status"], "pending");
    assert!(app.notifier.of_kind(NotificationKind::ScheduleApplied).is_empty());

    // Once the fault clears, approving again commits.
    app.clear_failing_inserts("schedule_events").await;
    let (status, body) = app.send("POST", &approve_uri, Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "committed");
    assert_eq!(app.count_events(&couple.family.id).await, 7);
}

#[tokio::test]
async fn test_week_ending_past_year_9999_is_rejected() {
    let app = TestApp::new().await;
    let couple = app.seed_couple().await;

    let (status, _) = app.trigger_weekly("9999-12-27").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let token = app.token_for(&couple.parent_a.id);
    let (status, _) = app.send(
        "GET",
        &format!("/api/v1/families/{}/proposals/preview?week_start=9999-12-27", couple.family.id),
        Some(&token),
        None,
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM week_proposals")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(total, 0);

    let (status, list) = app.send("GET", &format!("/api/v1/families/{}/proposals", couple.family.id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_one_family_failure_does_not_stop_the_run() {
    let app = TestApp::new().await;
    let broken = app.seed_couple().await;
    let healthy = app.seed_couple().await;

    app.fail_inserts("week_proposals", &format!("NEW.family_id = '{}'", broken.family.id)).await;

    let (status, summary) = app.trigger_weekly(WEEK).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["families_processed"], 2);
    assert_eq!(summary["proposals_created"], 1);
    assert_eq!(summary["failed"], 1);

    assert_eq!(pending_count(&app, &broken.family.id).await, 0);
    assert_eq!(pending_count(&app, &healthy.family.id).await, 1);

    let created = app.notifier.of_kind(NotificationKind::ProposalCreated);
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].1.family_id, healthy.family.id);
}
