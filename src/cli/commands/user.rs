//! `idamctl user` — browse and manage platform users.

use crate::api::types::UserUpdate;
use crate::cli::{app_context, output, Cli};
use crate::errors::{ConsoleError, Result};

/// Execute `idamctl user list`.
pub fn execute_list(cli: &Cli) -> Result<()> {
    let mut ctx = app_context(cli)?;
    ctx.require_session()?;

    let users = ctx.run(|api| api.list_users())?;
    output::info(&format!("{} user(s)", users.len()));
    output::print_users_table(&users);
    Ok(())
}

/// Execute `idamctl user show <id>`.
pub fn execute_show(cli: &Cli, id: &str) -> Result<()> {
    let mut ctx = app_context(cli)?;
    ctx.require_session()?;

    let user = ctx.run(|api| api.get_user(id))?;
    output::print_users_table(std::slice::from_ref(&user));
    Ok(())
}

/// Execute `idamctl user update <id>`.
pub fn execute_update(
    cli: &Cli,
    id: &str,
    email: Option<&str>,
    active: Option<bool>,
) -> Result<()> {
    if email.is_none() && active.is_none() {
        return Err(ConsoleError::CommandFailed(
            "nothing to update — pass --email and/or --active".into(),
        ));
    }

    let mut ctx = app_context(cli)?;
    ctx.require_session()?;

    let update = UserUpdate {
        email: email.map(ToString::to_string),
        is_active: active,
    };
    ctx.run(|api| api.update_user(id, &update))?;

    output::success(&format!("Updated user {id}"));
    Ok(())
}

/// Execute `idamctl user assign-role <user-id> <role-id>`.
pub fn execute_assign_role(cli: &Cli, user_id: &str, role_id: &str) -> Result<()> {
    let mut ctx = app_context(cli)?;
    ctx.require_session()?;

    ctx.run(|api| api.assign_role(user_id, role_id))?;

    output::success(&format!("Assigned role {role_id} to user {user_id}"));
    Ok(())
}
