pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod session;
pub mod vault;

#[cfg(feature = "keyring-store")]
pub mod keyring;
