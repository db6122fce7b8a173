//! Integration tests for the login flow wired to the session store.
//!
//! The collaborator is a scripted fake gateway, so these cover the
//! whole client-side path: state machine transitions, session
//! persistence, and 401-driven invalidation.

use std::cell::RefCell;
use std::collections::VecDeque;

use idamctl::api::types::Principal;
use idamctl::auth::{Advance, AuthFlow, AuthState, LoginGateway, LoginOutcome};
use idamctl::errors::{ConsoleError, Result};
use idamctl::session::{require_session, SessionStore};
use tempfile::TempDir;

fn principal(username: &str) -> Principal {
    serde_json::from_value(serde_json::json!({
        "id": "u-1",
        "username": username,
        "email": format!("{username}@example.com"),
        "is_active": true,
    }))
    .unwrap()
}

struct ScriptedGateway {
    outcomes: RefCell<VecDeque<Result<LoginOutcome>>>,
}

impl ScriptedGateway {
    fn new(outcomes: Vec<Result<LoginOutcome>>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into()),
        }
    }
}

impl LoginGateway for ScriptedGateway {
    fn submit(&self, _req: &idamctl::api::types::LoginRequest) -> Result<LoginOutcome> {
        self.outcomes
            .borrow_mut()
            .pop_front()
            .expect("unexpected login call")
    }
}

/// Drive a full password-only login and persist the result, the way
/// the login command does.
#[test]
fn successful_login_populates_the_session_store() {
    let dir = TempDir::new().unwrap();
    let mut store = SessionStore::load(dir.path()).unwrap();

    let gateway = ScriptedGateway::new(vec![Ok(LoginOutcome::Granted {
        token: "jwt-abc".into(),
        principal: principal("alice"),
    })]);

    let mut flow = AuthFlow::new();
    match flow.submit_password(&gateway, "alice", "hunter22").unwrap() {
        Advance::Authenticated { token, principal } => {
            store.set(token, *principal).unwrap();
        }
        other => panic!("expected Authenticated, got {other:?}"),
    }

    // The guard lets protected commands through immediately.
    let session = require_session(&store).unwrap();
    assert_eq!(session.token, "jwt-abc");
    assert_eq!(session.principal.username, "alice");

    // And the session survives a fresh process.
    let reloaded = SessionStore::load(dir.path()).unwrap();
    assert_eq!(reloaded.current().unwrap().token, "jwt-abc");
}

#[test]
fn failed_login_leaves_the_store_empty() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::load(dir.path()).unwrap();

    let gateway = ScriptedGateway::new(vec![Ok(LoginOutcome::Denied(
        "Account is deactivated".into(),
    ))]);

    let mut flow = AuthFlow::new();
    let advance = flow.submit_password(&gateway, "carol", "pw123456").unwrap();

    assert_eq!(advance, Advance::Failed("Account is deactivated".into()));
    assert!(store.current().is_none());
    assert!(require_session(&store).is_err());
}

#[test]
fn totp_step_up_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut store = SessionStore::load(dir.path()).unwrap();

    let gateway = ScriptedGateway::new(vec![
        Ok(LoginOutcome::TotpRequired),
        Ok(LoginOutcome::Granted {
            token: "jwt-2fa".into(),
            principal: principal("alice"),
        }),
    ]);

    let mut flow = AuthFlow::new();
    let advance = flow.submit_password(&gateway, "alice", "hunter22").unwrap();
    assert_eq!(advance, Advance::TotpRequired);
    assert_eq!(*flow.state(), AuthState::TotpRequired);

    match flow.submit_totp(&gateway, "123456").unwrap() {
        Advance::Authenticated { token, principal } => store.set(token, *principal).unwrap(),
        other => panic!("expected Authenticated, got {other:?}"),
    }

    assert_eq!(store.current().unwrap().token, "jwt-2fa");
}

#[test]
fn wrong_totp_code_lands_in_failed_not_another_challenge() {
    let gateway = ScriptedGateway::new(vec![
        Ok(LoginOutcome::TotpRequired),
        Ok(LoginOutcome::Denied("Invalid TOTP code".into())),
    ]);

    let mut flow = AuthFlow::new();
    flow.submit_password(&gateway, "alice", "hunter22").unwrap();
    let advance = flow.submit_totp(&gateway, "999999").unwrap();

    assert_eq!(advance, Advance::Failed("Invalid TOTP code".into()));
    assert!(matches!(flow.state(), AuthState::Failed(_)));
}

/// A 401 on any authenticated call clears the store; a second clear
/// (another 401 in the same command) is a harmless no-op.
#[test]
fn unauthorized_clears_the_session_exactly_once() {
    let dir = TempDir::new().unwrap();
    let mut store = SessionStore::load(dir.path()).unwrap();
    store.set("jwt-stale".into(), principal("alice")).unwrap();

    let err = ConsoleError::Unauthorized;
    assert!(err.invalidates_session());

    store.clear().unwrap();
    assert!(store.current().is_none());

    // Second 401 from a concurrent slice.
    store.clear().unwrap();
    assert!(store.current().is_none());
    assert!(!dir.path().join("session.json").exists());
}

#[test]
fn relogin_replaces_the_previous_session() {
    let dir = TempDir::new().unwrap();
    let mut store = SessionStore::load(dir.path()).unwrap();

    store.set("jwt-old".into(), principal("alice")).unwrap();
    store.set("jwt-new".into(), principal("bob")).unwrap();

    let reloaded = SessionStore::load(dir.path()).unwrap();
    let session = reloaded.current().unwrap();
    assert_eq!(session.token, "jwt-new");
    assert_eq!(session.principal.username, "bob");
}
