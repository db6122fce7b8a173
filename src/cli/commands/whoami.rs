//! `idamctl whoami` — show the currently signed-in principal.

use crate::cli::{app_context, output, Cli};
use crate::errors::Result;

/// Execute the `whoami` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = app_context(cli)?;
    let session = ctx.require_session()?;

    let principal = &session.principal;
    println!("{} <{}>", principal.username, principal.email);
    println!("id: {}", principal.id);

    if !principal.roles.is_empty() {
        let roles = principal
            .roles
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("roles: {roles}");
    }

    if !principal.is_active {
        output::warning("This account is deactivated.");
    }

    Ok(())
}
