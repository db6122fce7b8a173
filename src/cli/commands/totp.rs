//! `idamctl totp` — manage two-factor authentication.

use crate::cli::{app_context, output, Cli};
use crate::errors::Result;

/// Execute `idamctl totp enable` — begin TOTP enrollment for the
/// signed-in account.
pub fn execute_enable(cli: &Cli) -> Result<()> {
    let mut ctx = app_context(cli)?;
    ctx.require_session()?;

    let enrollment = ctx.run(|api| api.enable_totp())?;

    output::success("TOTP enabled for this account.");
    println!("secret: {}", enrollment.secret);
    if !enrollment.qr_url.is_empty() {
        println!("provisioning url: {}", enrollment.qr_url);
    }
    output::warning("Add the secret to your authenticator now — it is not shown again.");
    output::tip("Your next login will ask for a 6-digit code.");
    Ok(())
}
