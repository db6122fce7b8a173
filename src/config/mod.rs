//! Configuration — settings file loading and the config directory.

pub mod settings;

pub use settings::{RevealPolicy, Settings};
