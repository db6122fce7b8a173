//! `idamctl logout` — discard the stored session.

use crate::cli::{app_context, output, Cli};
use crate::errors::Result;

/// Execute the `logout` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut ctx = app_context(cli)?;

    if ctx.store.current().is_none() {
        output::info("No active session.");
        return Ok(());
    }

    ctx.store.clear()?;
    output::success("Signed out.");
    Ok(())
}
