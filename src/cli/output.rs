//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::api::types::{AuditEvent, Principal, SecretSummary};
use crate::dashboard::DashboardStats;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Print a table of users (Id, Username, Email, Active, Roles).
pub fn print_users_table(users: &[Principal]) {
    if users.is_empty() {
        info("No users found.");
        return;
    }

    let mut table = new_table();
    table.set_header(vec!["Id", "Username", "Email", "Active", "Roles"]);

    for user in users {
        let roles = user
            .roles
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            user.id.clone(),
            user.username.clone(),
            user.email.clone(),
            if user.is_active { "yes" } else { "no" }.to_string(),
            roles,
        ]);
    }

    println!("{table}");
}

/// Print a table of vault entries — metadata only, never values.
pub fn print_secrets_table(secrets: &[SecretSummary]) {
    if secrets.is_empty() {
        info("No secrets in the vault yet.");
        tip("Run `idamctl secret create <NAME>` to store your first credential.");
        return;
    }

    let mut table = new_table();
    table.set_header(vec!["Id", "Name", "Description", "Created by", "Updated"]);

    for s in secrets {
        table.add_row(vec![
            s.id.clone(),
            s.name.clone(),
            s.description.clone(),
            s.created_by_username.clone(),
            format_timestamp(&s.updated_at),
        ]);
    }

    println!("{table}");
}

/// Print a table of audit events.
pub fn print_audit_table(events: &[AuditEvent]) {
    if events.is_empty() {
        info("No audit events recorded yet.");
        return;
    }

    let mut table = new_table();
    table.set_header(vec!["Time", "User", "Action", "Resource", "IP address"]);

    for e in events {
        table.add_row(vec![
            format_timestamp(&e.created_at),
            e.username.clone(),
            e.action.clone(),
            e.resource.clone(),
            e.ip_address.clone(),
        ]);
    }

    println!("{table}");
}

/// Print the dashboard stat summary.
pub fn print_stats_table(stats: &DashboardStats) {
    let mut table = new_table();
    table.set_header(vec![
        "Total users",
        "Stored secrets",
        "Recent logins (24h)",
        "Audit logs",
    ]);
    table.add_row(vec![
        stats.total_users.to_string(),
        stats.total_secrets.to_string(),
        stats.recent_logins.to_string(),
        stats.total_audit_logs.to_string(),
    ]);

    println!("{table}");
}
