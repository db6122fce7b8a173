//! `idamctl audit` — view the server-side audit trail.

use crate::cli::{app_context, output, Cli};
use crate::errors::Result;

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, offset: usize) -> Result<()> {
    let mut ctx = app_context(cli)?;
    ctx.require_session()?;

    let events = ctx.run(|api| api.audit_logs(last, offset))?;
    output::info(&format!("{} audit event(s)", events.len()));
    output::print_audit_table(&events);
    Ok(())
}
