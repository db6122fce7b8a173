//! Wire types for the IDAM-PAM REST API.
//!
//! Field names mirror the server's snake_case JSON. Identifiers are
//! server-assigned UUIDs carried as opaque strings — the console never
//! generates or interprets them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated identity associated with the current session.
///
/// Returned inside the login response (id/username/email only) and by
/// the `/users` endpoints (full shape), so everything beyond the core
/// identity fields defaults when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A role attached to a principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Vault entry metadata, as returned by `GET /secrets`.
///
/// Never contains the decrypted payload — safe to hold in memory for
/// as long as the listing is on screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_by: String,
    #[serde(default)]
    pub created_by_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single vault entry with its decrypted payload, as returned by
/// `GET /secrets/{id}`. Fetched only on explicit reveal.
#[derive(Debug, Clone, Deserialize)]
pub struct SecretRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The decrypted secret value.
    pub data: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One immutable entry of the server-side audit trail.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Denormalized actor name; empty when the actor row is gone.
    #[serde(default)]
    pub username: String,
    pub action: String,
    pub resource: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    /// Action-dependent payload, shaped by the server — kept opaque.
    #[serde(default)]
    pub details: serde_json::Value,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

/// Substring every successful-login audit action contains
/// (the server writes `auth.login.success`).
pub const LOGIN_SUCCESS_ACTION: &str = "login.success";

/// Body of `POST /auth/login`.
///
/// Transient by design: built from the in-flight attempt, serialized
/// once, and dropped when the call resolves.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totp_code: Option<String>,
}

/// Raw response of `POST /auth/login` before interpretation.
///
/// The server answers with exactly one of three shapes: a granted
/// session (`token` + `user`), a step-up signal (`requires_totp`), or
/// an error body. `AuthFlow` turns this into a typed [`LoginOutcome`].
///
/// [`LoginOutcome`]: crate::auth::LoginOutcome
#[derive(Debug, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<Principal>,
    #[serde(default)]
    pub requires_totp: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response of `POST /totp/enable`.
#[derive(Debug, Deserialize)]
pub struct TotpEnrollment {
    /// Base32 TOTP secret for manual authenticator entry.
    pub secret: String,
    /// otpauth:// provisioning URL (rendered as a QR code by clients
    /// that can).
    #[serde(default)]
    pub qr_url: String,
}

/// Body of `POST /secrets`.
#[derive(Debug, Serialize)]
pub struct CreateSecretRequest {
    pub name: String,
    pub description: String,
    pub data: String,
}

/// Response of `POST /secrets`.
#[derive(Debug, Deserialize)]
pub struct CreatedSecret {
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `PUT /users/{id}` — only set fields are sent.
#[derive(Debug, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Body of `POST /users/{id}/roles`.
#[derive(Debug, Serialize)]
pub struct AssignRoleRequest {
    pub role_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_reply_parses_granted_session() {
        let json = r#"{
            "token": "jwt-abc",
            "user": {"id": "u1", "username": "alice", "email": "a@example.com"}
        }"#;
        let reply: LoginReply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.token.as_deref(), Some("jwt-abc"));
        assert!(!reply.requires_totp);

        let user = reply.user.unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.roles.is_empty());
    }

    #[test]
    fn login_reply_parses_totp_challenge() {
        let json = r#"{"requires_totp": true, "message": "TOTP code required"}"#;
        let reply: LoginReply = serde_json::from_str(json).unwrap();
        assert!(reply.requires_totp);
        assert!(reply.token.is_none());
        assert!(reply.user.is_none());
    }

    #[test]
    fn login_request_omits_absent_totp_code() {
        let req = LoginRequest {
            username: "alice".into(),
            password: "hunter22".into(),
            totp_code: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("totp_code"));

        let req = LoginRequest {
            totp_code: Some("123456".into()),
            ..req
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"totp_code\":\"123456\""));
    }

    #[test]
    fn audit_event_tolerates_nulls_and_arbitrary_details() {
        let json = r#"{
            "id": "e1",
            "user_id": null,
            "username": "",
            "action": "auth.login.failed",
            "resource": "auth",
            "resource_id": null,
            "details": {"reason": "user_not_found", "attempt": 3},
            "ip_address": "10.0.0.9",
            "user_agent": "curl/8.0",
            "created_at": "2026-08-01T12:00:00Z"
        }"#;
        let event: AuditEvent = serde_json::from_str(json).unwrap();
        assert!(event.user_id.is_none());
        assert_eq!(event.details["reason"], "user_not_found");
    }

    #[test]
    fn secret_record_carries_decrypted_data() {
        let json = r#"{
            "id": "s1",
            "name": "prod-db",
            "description": "primary postgres",
            "data": "postgres://root:pw@db/prod",
            "created_by": "u1",
            "created_at": "2026-08-01T12:00:00Z",
            "updated_at": "2026-08-02T12:00:00Z"
        }"#;
        let record: SecretRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.data, "postgres://root:pw@db/prod");
    }
}
