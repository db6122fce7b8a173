//! Integration tests for dashboard aggregation.

use chrono::{Duration, Utc};
use idamctl::api::types::{AuditEvent, Principal, SecretSummary};
use idamctl::dashboard::{aggregate, DashboardSources};
use idamctl::errors::ConsoleError;

fn event(action: &str, age: Duration) -> AuditEvent {
    serde_json::from_value(serde_json::json!({
        "id": "e-1",
        "username": "alice",
        "action": action,
        "resource": "auth",
        "ip_address": "10.0.0.9",
        "user_agent": "idamctl",
        "created_at": (Utc::now() - age).to_rfc3339(),
    }))
    .unwrap()
}

fn user(name: &str) -> Principal {
    serde_json::from_value(serde_json::json!({
        "id": name,
        "username": name,
        "email": format!("{name}@example.com"),
    }))
    .unwrap()
}

fn secret(name: &str) -> SecretSummary {
    serde_json::from_value(serde_json::json!({
        "id": name,
        "name": name,
        "created_by": "u-1",
        "created_by_username": "alice",
        "created_at": "2026-08-01T00:00:00Z",
        "updated_at": "2026-08-01T00:00:00Z",
    }))
    .unwrap()
}

#[test]
fn recent_logins_counts_only_the_trailing_day() {
    // Success 2h ago, success 30h ago, failure 1h ago — exactly one
    // recent login.
    let audit = vec![
        event("auth.login.success", Duration::hours(2)),
        event("auth.login.success", Duration::hours(30)),
        event("auth.login.failed", Duration::hours(1)),
    ];

    let dashboard = aggregate(
        DashboardSources {
            users: Ok(vec![user("alice"), user("bob"), user("carol")]),
            secrets: Ok(vec![secret("prod-db"), secret("api-key")]),
            audit: Ok(audit),
        },
        Utc::now(),
    );

    assert_eq!(dashboard.stats.total_users, 3);
    assert_eq!(dashboard.stats.total_secrets, 2);
    assert_eq!(dashboard.stats.recent_logins, 1);
    assert_eq!(dashboard.stats.total_audit_logs, 3);
}

#[test]
fn one_failed_slice_degrades_without_touching_the_others() {
    let dashboard = aggregate(
        DashboardSources {
            users: Ok(vec![user("alice")]),
            secrets: Err(ConsoleError::Network("connection reset".into())),
            audit: Ok(vec![event("auth.login.success", Duration::minutes(5))]),
        },
        Utc::now(),
    );

    assert_eq!(dashboard.stats.total_users, 1);
    assert_eq!(dashboard.stats.total_secrets, 0);
    assert_eq!(dashboard.stats.recent_logins, 1);
    assert_eq!(dashboard.degraded.len(), 1);
    assert!(dashboard.degraded[0].contains("connection reset"));
}

#[test]
fn recent_activity_is_capped_and_ordered_as_received() {
    let audit: Vec<AuditEvent> = (0..10)
        .map(|i| event("secrets.read", Duration::minutes(i)))
        .collect();

    let dashboard = aggregate(
        DashboardSources {
            users: Ok(vec![]),
            secrets: Ok(vec![]),
            audit: Ok(audit),
        },
        Utc::now(),
    );

    // The server returns newest-first; the dashboard shows the head.
    assert_eq!(dashboard.recent_activity.len(), 5);
    assert!(dashboard.recent_activity[0].created_at >= dashboard.recent_activity[4].created_at);
}
