//! `idamctl secret` — the credential vault.
//!
//! `show` goes through the visibility cache so the decrypted value is
//! only fetched on explicit reveal, and `--copy` only hands the
//! clipboard a value that is currently revealed.

use dialoguer::Confirm;

use crate::api::types::CreateSecretRequest;
use crate::cli::{app_context, output, Cli};
use crate::errors::{ConsoleError, Result};
use crate::vault::{SystemClipboard, VisibilityCache};

/// Execute `idamctl secret list`.
pub fn execute_list(cli: &Cli) -> Result<()> {
    let mut ctx = app_context(cli)?;
    ctx.require_session()?;

    let secrets = ctx.run(|api| api.list_secrets())?;
    output::info(&format!("{} secret(s) in the vault", secrets.len()));
    output::print_secrets_table(&secrets);
    Ok(())
}

/// Execute `idamctl secret show <id>` — reveal the decrypted value.
pub fn execute_show(cli: &Cli, id: &str, copy: bool) -> Result<()> {
    let mut ctx = app_context(cli)?;
    ctx.require_session()?;

    let mut cache = VisibilityCache::new(ctx.settings.reveal_policy);
    ctx.run(|api| cache.reveal_with(id, api))?;

    if copy {
        let mut clipboard = SystemClipboard::new()?;
        cache.copy(id, &mut clipboard)?;
        output::success("Secret copied to clipboard.");
    } else {
        // Value to stdout so it can be piped; nothing else on stdout.
        let value = cache
            .value(id)
            .ok_or_else(|| ConsoleError::SecretNotFound(id.to_string()))?;
        println!("{value}");
    }

    Ok(())
}

/// Execute `idamctl secret create <name>`.
pub fn execute_create(cli: &Cli, name: &str, description: &str, data: Option<&str>) -> Result<()> {
    let mut ctx = app_context(cli)?;
    ctx.require_session()?;

    let data = match data {
        Some(value) => value.to_string(),
        None => dialoguer::Password::new()
            .with_prompt("Secret value")
            .interact()
            .map_err(|e| ConsoleError::CommandFailed(format!("value prompt: {e}")))?,
    };

    let request = CreateSecretRequest {
        name: name.to_string(),
        description: description.to_string(),
        data,
    };
    let created = ctx.run(|api| api.create_secret(&request))?;

    output::success(&format!("Stored secret '{name}' ({})", created.id));
    Ok(())
}

/// Execute `idamctl secret delete <id>`.
pub fn execute_delete(cli: &Cli, id: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete secret '{id}'?"))
            .default(false)
            .interact()
            .map_err(|e| ConsoleError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut ctx = app_context(cli)?;
    ctx.require_session()?;

    ctx.run(|api| api.delete_secret(id))?;

    output::success(&format!("Deleted secret '{id}'"));
    Ok(())
}
