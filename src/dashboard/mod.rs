//! Dashboard Aggregator — summary statistics derived from the raw
//! user, secret, and audit collections.
//!
//! Pure: the three fetches happen elsewhere and their results are
//! handed in, so aggregation is trivially testable with canned data.
//! Failure policy is partial degradation — a failed slice contributes
//! zeros and its error message travels along in `degraded`, so one
//! broken endpoint never blanks the whole dashboard.

use chrono::{DateTime, Duration, Utc};

use crate::api::types::{AuditEvent, Principal, SecretSummary, LOGIN_SUCCESS_ACTION};
use crate::errors::Result;

/// How many audit events the "recent activity" list shows.
const RECENT_ACTIVITY_LEN: usize = 5;

/// Length of the trailing window for `recent_logins`.
const RECENT_LOGIN_WINDOW_HOURS: i64 = 24;

/// The three collections the dashboard is derived from, as fetched.
pub struct DashboardSources {
    pub users: Result<Vec<Principal>>,
    pub secrets: Result<Vec<SecretSummary>>,
    pub audit: Result<Vec<AuditEvent>>,
}

/// The headline numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_secrets: usize,
    /// Successful logins inside the trailing 24-hour window.
    pub recent_logins: usize,
    pub total_audit_logs: usize,
}

/// Aggregated dashboard: stats, the most recent activity, and the
/// error messages of any slices that failed to load.
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_activity: Vec<AuditEvent>,
    pub degraded: Vec<String>,
}

/// Derive the dashboard from the three source fetches at wall-clock
/// time `now`.
pub fn aggregate(sources: DashboardSources, now: DateTime<Utc>) -> Dashboard {
    let mut stats = DashboardStats::default();
    let mut degraded = Vec::new();
    let mut recent_activity = Vec::new();

    match sources.users {
        Ok(users) => stats.total_users = users.len(),
        Err(e) => degraded.push(format!("users: {e}")),
    }

    match sources.secrets {
        Ok(secrets) => stats.total_secrets = secrets.len(),
        Err(e) => degraded.push(format!("secrets: {e}")),
    }

    match sources.audit {
        Ok(events) => {
            stats.total_audit_logs = events.len();
            stats.recent_logins = events
                .iter()
                .filter(|e| is_recent_login(e, now))
                .count();
            recent_activity = events.into_iter().take(RECENT_ACTIVITY_LEN).collect();
        }
        Err(e) => degraded.push(format!("audit: {e}")),
    }

    Dashboard {
        stats,
        recent_activity,
        degraded,
    }
}

/// A successful login inside the trailing window ending at `now`.
///
/// Matched by substring because the server writes the fully qualified
/// action (`auth.login.success`).
fn is_recent_login(event: &AuditEvent, now: DateTime<Utc>) -> bool {
    event.action.contains(LOGIN_SUCCESS_ACTION)
        && event.created_at > now - Duration::hours(RECENT_LOGIN_WINDOW_HOURS)
        && event.created_at <= now
}
