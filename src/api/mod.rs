//! API Gateway Client — typed calls over the IDAM-PAM REST API.
//!
//! A thin transport layer: every method maps to exactly one endpoint,
//! attaches the bearer token when one is present, and normalizes
//! non-2xx responses into [`ConsoleError`] values. No retry logic, no
//! caching — callers own those policies.

pub mod types;

use std::time::Duration;

use crate::errors::{ConsoleError, Result};

use types::{
    AssignRoleRequest, AuditEvent, CreateSecretRequest, CreatedSecret, LoginReply, LoginRequest,
    Principal, RegisterRequest, SecretRecord, SecretSummary, TotpEnrollment, UserUpdate,
};

/// Blocking HTTP client for the IDAM-PAM backend.
///
/// Holds the one bearer token the process may have — there is no
/// multi-account support. A missing token omits the `Authorization`
/// header entirely rather than sending an empty one.
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client for `base_url` (no trailing slash) with a
    /// per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("idamctl/", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Replace the bearer token for subsequent requests.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach `Authorization: Bearer <token>` when a token is held.
    fn authorize(&self, req: ureq::Request) -> ureq::Request {
        match &self.token {
            Some(token) => req.set("Authorization", &format!("Bearer {token}")),
            None => req,
        }
    }

    // ------------------------------------------------------------------
    // Auth endpoints
    // ------------------------------------------------------------------

    /// `POST /auth/login`. Never sends a bearer token, and a 401 here
    /// means "bad credentials", not "session expired" — it must not
    /// invalidate an unrelated stored session.
    pub fn login(&self, req: &LoginRequest) -> Result<LoginReply> {
        let response = self
            .agent
            .post(&self.endpoint("/auth/login"))
            .send_json(req)
            .map_err(|e| normalize_error(e, EndpointKind::Login))?;

        parse_json(response)
    }

    /// `POST /auth/register`. Returns the server's confirmation message.
    pub fn register(&self, req: &RegisterRequest) -> Result<String> {
        let response = self
            .agent
            .post(&self.endpoint("/auth/register"))
            .send_json(req)
            .map_err(|e| normalize_error(e, EndpointKind::Login))?;

        let body: serde_json::Value = parse_json(response)?;
        Ok(body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Registration successful")
            .to_string())
    }

    /// `POST /totp/enable` — begin TOTP enrollment for the signed-in
    /// principal.
    pub fn enable_totp(&self) -> Result<TotpEnrollment> {
        let response = self
            .authorize(self.agent.post(&self.endpoint("/totp/enable")))
            .call()
            .map_err(|e| normalize_error(e, EndpointKind::Protected))?;

        parse_json(response)
    }

    // ------------------------------------------------------------------
    // User endpoints
    // ------------------------------------------------------------------

    /// `GET /users`.
    pub fn list_users(&self) -> Result<Vec<Principal>> {
        let response = self
            .authorize(self.agent.get(&self.endpoint("/users")))
            .call()
            .map_err(|e| normalize_error(e, EndpointKind::Protected))?;

        parse_json_list(response)
    }

    /// `GET /users/{id}`.
    pub fn get_user(&self, id: &str) -> Result<Principal> {
        let response = self
            .authorize(self.agent.get(&self.endpoint(&format!("/users/{id}"))))
            .call()
            .map_err(|e| normalize_error(e, EndpointKind::Protected))?;

        parse_json(response)
    }

    /// `PUT /users/{id}`.
    pub fn update_user(&self, id: &str, update: &UserUpdate) -> Result<()> {
        self.authorize(self.agent.put(&self.endpoint(&format!("/users/{id}"))))
            .send_json(update)
            .map_err(|e| normalize_error(e, EndpointKind::Protected))?;

        Ok(())
    }

    /// `POST /users/{id}/roles`.
    pub fn assign_role(&self, user_id: &str, role_id: &str) -> Result<()> {
        let body = AssignRoleRequest {
            role_id: role_id.to_string(),
        };
        self.authorize(
            self.agent
                .post(&self.endpoint(&format!("/users/{user_id}/roles"))),
        )
        .send_json(&body)
        .map_err(|e| normalize_error(e, EndpointKind::Protected))?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Secret endpoints
    // ------------------------------------------------------------------

    /// `GET /secrets` — metadata only, no decrypted payloads.
    pub fn list_secrets(&self) -> Result<Vec<SecretSummary>> {
        let response = self
            .authorize(self.agent.get(&self.endpoint("/secrets")))
            .call()
            .map_err(|e| normalize_error(e, EndpointKind::Protected))?;

        parse_json_list(response)
    }

    /// `GET /secrets/{id}` — the server decrypts and returns the
    /// payload. Only called on explicit reveal.
    pub fn get_secret(&self, id: &str) -> Result<SecretRecord> {
        let response = self
            .authorize(self.agent.get(&self.endpoint(&format!("/secrets/{id}"))))
            .call()
            .map_err(|e| normalize_error(e, EndpointKind::Protected))?;

        parse_json(response)
    }

    /// `POST /secrets`.
    pub fn create_secret(&self, req: &CreateSecretRequest) -> Result<CreatedSecret> {
        let response = self
            .authorize(self.agent.post(&self.endpoint("/secrets")))
            .send_json(req)
            .map_err(|e| normalize_error(e, EndpointKind::Protected))?;

        parse_json(response)
    }

    /// `DELETE /secrets/{id}`.
    pub fn delete_secret(&self, id: &str) -> Result<()> {
        self.authorize(self.agent.delete(&self.endpoint(&format!("/secrets/{id}"))))
            .call()
            .map_err(|e| normalize_error(e, EndpointKind::Protected))?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Audit endpoint
    // ------------------------------------------------------------------

    /// `GET /audit?limit=&offset=`.
    pub fn audit_logs(&self, limit: usize, offset: usize) -> Result<Vec<AuditEvent>> {
        let response = self
            .authorize(self.agent.get(&self.endpoint("/audit")))
            .query("limit", &limit.to_string())
            .query("offset", &offset.to_string())
            .call()
            .map_err(|e| normalize_error(e, EndpointKind::Protected))?;

        parse_json_list(response)
    }
}

impl crate::auth::LoginGateway for ApiClient {
    fn submit(&self, req: &LoginRequest) -> Result<crate::auth::LoginOutcome> {
        match self.login(req) {
            Ok(reply) => Ok(crate::auth::LoginOutcome::from_reply(reply)),
            // A login 401 is a denied attempt, not an expired session.
            Err(ConsoleError::AuthenticationFailed(reason)) => {
                Ok(crate::auth::LoginOutcome::Denied(reason))
            }
            Err(e) => Err(e),
        }
    }
}

impl crate::vault::SecretFetch for ApiClient {
    fn fetch_value(&self, id: &str) -> Result<String> {
        Ok(self.get_secret(id)?.data)
    }
}

/// Whether a 401 from an endpoint means "bad credentials" (login) or
/// "session invalid" (everything else).
#[derive(Clone, Copy, PartialEq, Eq)]
enum EndpointKind {
    Login,
    Protected,
}

/// Map a transport-level error into the console taxonomy.
///
/// Non-2xx responses are parsed as `{"error": "..."}`; a missing or
/// unparsable body yields "Unknown error" (the server's contract).
fn normalize_error(err: ureq::Error, kind: EndpointKind) -> ConsoleError {
    match err {
        ureq::Error::Status(code, response) => {
            let message = response
                .into_json::<serde_json::Value>()
                .ok()
                .and_then(|body| {
                    body.get("error")
                        .and_then(|e| e.as_str())
                        .map(ToString::to_string)
                })
                .unwrap_or_else(|| "Unknown error".to_string());

            match (code, kind) {
                (401, EndpointKind::Login) => ConsoleError::AuthenticationFailed(message),
                (401, EndpointKind::Protected) => ConsoleError::Unauthorized,
                _ => ConsoleError::Api(message),
            }
        }
        ureq::Error::Transport(t) => ConsoleError::Network(t.to_string()),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(response: ureq::Response) -> Result<T> {
    response
        .into_json()
        .map_err(|e| ConsoleError::Serialization(format!("invalid response body: {e}")))
}

/// Parse a JSON array response, treating `null` as empty.
///
/// The backend serializes empty collections as `null` (nil slice), so
/// a fresh deployment's `/secrets` and `/audit` answer `null`, not `[]`.
fn parse_json_list<T: serde::de::DeserializeOwned>(response: ureq::Response) -> Result<Vec<T>> {
    let list: Option<Vec<T>> = response
        .into_json()
        .map_err(|e| ConsoleError::Serialization(format!("invalid response body: {e}")))?;
    Ok(list.unwrap_or_default())
}
