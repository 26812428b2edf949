mod intake_config;

pub use intake_config::{IntakeConfig, IntakeConfigError};
