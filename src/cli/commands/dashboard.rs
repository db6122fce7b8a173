//! `idamctl dashboard` — platform summary statistics.

use chrono::Utc;

use crate::cli::{app_context, output, Cli};
use crate::dashboard::{aggregate, DashboardSources};
use crate::errors::Result;

/// Execute the `dashboard` command.
///
/// Each of the three source fetches may fail independently; the
/// dashboard still renders with that slice zeroed and a warning.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut ctx = app_context(cli)?;
    ctx.require_session()?;

    let audit_limit = ctx.settings.dashboard_audit_limit;
    let sources = DashboardSources {
        users: ctx.run(|api| api.list_users()),
        secrets: ctx.run(|api| api.list_secrets()),
        audit: ctx.run(|api| api.audit_logs(audit_limit, 0)),
    };

    let dashboard = aggregate(sources, Utc::now());

    output::print_stats_table(&dashboard.stats);

    if !dashboard.recent_activity.is_empty() {
        output::info("Recent activity:");
        output::print_audit_table(&dashboard.recent_activity);
    }

    for failure in &dashboard.degraded {
        output::warning(&format!("Partial data — failed to load {failure}"));
    }

    Ok(())
}
