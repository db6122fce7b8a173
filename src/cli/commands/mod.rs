//! One module per subcommand, dispatched from `main.rs`.

pub mod audit_cmd;
pub mod completions;
pub mod dashboard;
pub mod login;
pub mod logout;
pub mod register;
pub mod secret;
pub mod totp;
pub mod user;
pub mod whoami;
