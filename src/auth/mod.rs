//! Authentication State Machine — login, optional TOTP step-up, and
//! session establishment.
//!
//! The flow is split into an explicit begin/complete pair so the two
//! concurrency rules hold and are testable: only one attempt may be in
//! flight at a time, and a response for an attempt the user has since
//! abandoned (reset or superseded) is discarded instead of resurrecting
//! dead state. Each `begin` issues a [`LoginTicket`] stamped with an
//! attempt sequence number; `complete` ignores tickets whose number is
//! no longer current.
//!
//! The backend has no pending-session handle for the second factor —
//! it re-verifies username+password+code in a single request — so the
//! machine retains the credentials between the password step and the
//! TOTP step, in buffers that are wiped on every terminal transition.

use zeroize::Zeroizing;

use crate::api::types::{LoginReply, LoginRequest, Principal};
use crate::errors::{ConsoleError, Result};

/// Seam to the collaborator's login operation, so tests drive the
/// machine with a scripted fake instead of a live server.
pub trait LoginGateway {
    fn submit(&self, req: &LoginRequest) -> Result<LoginOutcome>;
}

/// Interpreted result of one login call.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Session granted.
    Granted { token: String, principal: Principal },
    /// Password verified, second factor required before a token is
    /// issued.
    TotpRequired,
    /// Bad credentials, inactive account, invalid code, rate limit.
    Denied(String),
}

impl LoginOutcome {
    /// Interpret the raw `/auth/login` reply.
    pub fn from_reply(reply: LoginReply) -> Self {
        if reply.requires_totp {
            return Self::TotpRequired;
        }
        match (reply.token, reply.user) {
            (Some(token), Some(principal)) if !token.is_empty() => {
                Self::Granted { token, principal }
            }
            _ => Self::Denied(
                reply
                    .message
                    .unwrap_or_else(|| "Malformed login response".to_string()),
            ),
        }
    }
}

/// Where the machine currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No attempt in progress.
    Anonymous,
    /// A request is in flight; further submissions are rejected.
    AwaitingOutcome,
    /// Password verified, waiting for the user's TOTP code.
    TotpRequired,
    /// Terminal: session established.
    Authenticated,
    /// Terminal: attempt abandoned with a user-facing reason. A new
    /// `begin` starts over.
    Failed(String),
}

/// Result of completing an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The outcome belonged to an abandoned attempt; state unchanged.
    Stale,
    /// Session granted — hand these to the session store.
    Authenticated { token: String, principal: Box<Principal> },
    /// Prompt the user for their TOTP code.
    TotpRequired,
    Failed(String),
}

/// Permission to complete one specific login attempt.
///
/// Carries the wire request (the transient login attempt) and the
/// sequence number that makes it stale once the user moves on.
pub struct LoginTicket {
    seq: u64,
    request: LoginRequest,
}

impl LoginTicket {
    /// The request to send to the collaborator.
    pub fn request(&self) -> &LoginRequest {
        &self.request
    }
}

/// Credentials retained between the password step and the TOTP step.
struct RetainedCredentials {
    username: String,
    password: Zeroizing<String>,
}

/// The login state machine. One per login interaction.
pub struct AuthFlow {
    state: AuthState,
    seq: u64,
    retained: Option<RetainedCredentials>,
}

impl Default for AuthFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthFlow {
    pub fn new() -> Self {
        Self {
            state: AuthState::Anonymous,
            seq: 0,
            retained: None,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Start a password attempt.
    ///
    /// Rejected while another attempt is in flight (submissions are
    /// dropped, not queued, so a double-click can never issue two
    /// tokens). Allowed from `Anonymous`, `Failed` and `TotpRequired`
    /// (starting over with different credentials).
    pub fn begin(&mut self, username: &str, password: &str) -> Result<LoginTicket> {
        if self.state == AuthState::AwaitingOutcome {
            return Err(ConsoleError::LoginInFlight);
        }

        self.seq += 1;
        self.retained = Some(RetainedCredentials {
            username: username.to_string(),
            password: Zeroizing::new(password.to_string()),
        });
        self.state = AuthState::AwaitingOutcome;

        Ok(LoginTicket {
            seq: self.seq,
            request: LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
                totp_code: None,
            },
        })
    }

    /// Start the second-factor attempt: re-submits the retained
    /// username and password together with the code.
    pub fn begin_totp(&mut self, code: &str) -> Result<LoginTicket> {
        if self.state == AuthState::AwaitingOutcome {
            return Err(ConsoleError::LoginInFlight);
        }
        if self.state != AuthState::TotpRequired {
            return Err(ConsoleError::CommandFailed(
                "no TOTP challenge is pending".into(),
            ));
        }

        let retained = self
            .retained
            .as_ref()
            .ok_or_else(|| ConsoleError::CommandFailed("no retained credentials".into()))?;

        self.seq += 1;
        let request = LoginRequest {
            username: retained.username.clone(),
            password: retained.password.to_string(),
            totp_code: Some(code.to_string()),
        };
        self.state = AuthState::AwaitingOutcome;

        Ok(LoginTicket {
            seq: self.seq,
            request,
        })
    }

    /// Feed the collaborator's answer back into the machine.
    ///
    /// A ticket from a superseded or abandoned attempt yields
    /// `Advance::Stale` and changes nothing. A repeated `TotpRequired`
    /// answer to a TOTP submission is a failure (invalid code), never a
    /// second challenge — otherwise a wrong code would loop forever.
    pub fn complete(&mut self, ticket: LoginTicket, outcome: Result<LoginOutcome>) -> Advance {
        if ticket.seq != self.seq || self.state != AuthState::AwaitingOutcome {
            return Advance::Stale;
        }

        let was_totp_step = ticket.request.totp_code.is_some();

        match outcome {
            Ok(LoginOutcome::Granted { token, principal }) => {
                self.retained = None;
                self.state = AuthState::Authenticated;
                Advance::Authenticated {
                    token,
                    principal: Box::new(principal),
                }
            }
            Ok(LoginOutcome::TotpRequired) if !was_totp_step => {
                // Credentials stay retained for the code submission.
                self.state = AuthState::TotpRequired;
                Advance::TotpRequired
            }
            Ok(LoginOutcome::TotpRequired) => {
                self.fail(ConsoleError::TotpInvalid.to_string())
            }
            Ok(LoginOutcome::Denied(reason)) => self.fail(reason),
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Abandon the current interaction: back to `Anonymous`, retained
    /// credentials wiped, outstanding tickets invalidated.
    pub fn reset(&mut self) {
        self.seq += 1;
        self.retained = None;
        self.state = AuthState::Anonymous;
    }

    fn fail(&mut self, reason: String) -> Advance {
        self.retained = None;
        self.state = AuthState::Failed(reason.clone());
        Advance::Failed(reason)
    }

    // ------------------------------------------------------------------
    // Synchronous drivers for the CLI path
    // ------------------------------------------------------------------

    /// Begin + call + complete in one step.
    pub fn submit_password(
        &mut self,
        gateway: &dyn LoginGateway,
        username: &str,
        password: &str,
    ) -> Result<Advance> {
        let ticket = self.begin(username, password)?;
        let outcome = gateway.submit(ticket.request());
        Ok(self.complete(ticket, outcome))
    }

    /// Begin-totp + call + complete in one step.
    pub fn submit_totp(&mut self, gateway: &dyn LoginGateway, code: &str) -> Result<Advance> {
        let ticket = self.begin_totp(code)?;
        let outcome = gateway.submit(ticket.request());
        Ok(self.complete(ticket, outcome))
    }
}
