mod config;
mod runner;

pub use config::{CompilerConfig, DEFAULT_COMMAND_TEMPLATE, PATH_SLOT};
pub use runner::{CompilerRunner, SolcRunner};
