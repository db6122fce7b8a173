//! `idamctl register` — create a new account.

use crate::api::types::RegisterRequest;
use crate::cli::{app_context, output, prompt_new_password, Cli};
use crate::errors::Result;

/// Execute the `register` command.
pub fn execute(cli: &Cli, username: &str, email: &str) -> Result<()> {
    let ctx = app_context(cli)?;

    let password = prompt_new_password()?;

    let message = ctx.client.register(&RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    })?;

    output::success(&message);
    output::tip("Run `idamctl login` to sign in.");
    Ok(())
}
