//! `idamctl login` — sign in, with TOTP step-up when the account
//! requires a second factor.

use crate::auth::{Advance, AuthFlow};
use crate::cli::{app_context, output, prompt_password, prompt_text, prompt_totp_code, Cli};
use crate::errors::{ConsoleError, Result};

/// Execute the `login` command.
pub fn execute(cli: &Cli, username: Option<&str>) -> Result<()> {
    let mut ctx = app_context(cli)?;

    // Already signed in? Short-circuit instead of re-prompting.
    if let Some(session) = ctx.store.current() {
        output::info(&format!(
            "Already signed in as '{}'.",
            session.principal.username
        ));
        output::tip("Run `idamctl logout` first to switch accounts.");
        return Ok(());
    }

    let username = match username {
        Some(u) => u.to_string(),
        None => prompt_text("Username")?,
    };
    let password = prompt_password()?;

    let mut flow = AuthFlow::new();
    let mut advance = flow.submit_password(&ctx.client, &username, &password)?;

    if advance == Advance::TotpRequired {
        output::info("This account requires a second factor.");
        let code = prompt_totp_code()?;
        advance = flow.submit_totp(&ctx.client, &code)?;
    }

    match advance {
        Advance::Authenticated { token, principal } => {
            let username = principal.username.clone();
            ctx.store.set(token, *principal)?;
            output::success(&format!("Signed in as '{username}'."));
            Ok(())
        }
        Advance::Failed(reason) => Err(ConsoleError::AuthenticationFailed(reason)),
        // One synchronous attempt can neither go stale nor end on a
        // pending TOTP challenge here.
        Advance::Stale | Advance::TotpRequired => Err(ConsoleError::CommandFailed(
            "login did not complete".into(),
        )),
    }
}
