use clap::Parser;
use idamctl::cli::{Cli, Commands, SecretAction, TotpAction, UserAction};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login { ref username } => {
            idamctl::cli::commands::login::execute(&cli, username.as_deref())
        }
        Commands::Logout => idamctl::cli::commands::logout::execute(&cli),
        Commands::Whoami => idamctl::cli::commands::whoami::execute(&cli),
        Commands::Register {
            ref username,
            ref email,
        } => idamctl::cli::commands::register::execute(&cli, username, email),
        Commands::Totp { ref action } => match action {
            TotpAction::Enable => idamctl::cli::commands::totp::execute_enable(&cli),
        },
        Commands::User { ref action } => match action {
            UserAction::List => idamctl::cli::commands::user::execute_list(&cli),
            UserAction::Show { ref id } => idamctl::cli::commands::user::execute_show(&cli, id),
            UserAction::Update {
                ref id,
                ref email,
                active,
            } => idamctl::cli::commands::user::execute_update(&cli, id, email.as_deref(), *active),
            UserAction::AssignRole {
                ref user_id,
                ref role_id,
            } => idamctl::cli::commands::user::execute_assign_role(&cli, user_id, role_id),
        },
        Commands::Secret { ref action } => match action {
            SecretAction::List => idamctl::cli::commands::secret::execute_list(&cli),
            SecretAction::Show { ref id, copy } => {
                idamctl::cli::commands::secret::execute_show(&cli, id, *copy)
            }
            SecretAction::Create {
                ref name,
                ref description,
                ref data,
            } => idamctl::cli::commands::secret::execute_create(
                &cli,
                name,
                description,
                data.as_deref(),
            ),
            SecretAction::Delete { ref id, force } => {
                idamctl::cli::commands::secret::execute_delete(&cli, id, *force)
            }
        },
        Commands::Audit { last, offset } => {
            idamctl::cli::commands::audit_cmd::execute(&cli, last, offset)
        }
        Commands::Dashboard => idamctl::cli::commands::dashboard::execute(&cli),
        Commands::Completions { ref shell } => {
            idamctl::cli::commands::completions::execute(shell)
        }
    };

    if let Err(e) = result {
        idamctl::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
