mod application;
pub mod data;
mod report;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use report::{Report, configure_colors};
pub use runtime_config::RuntimeConfig;
