//! CLI commands

mod inputs;
mod publish;
mod settings;
mod validate;

pub use publish::PublishCommand;
pub use validate::ValidateCommand;
