pub mod commands;

pub use commands::{CaptureCommand, Cli, Commands, run};
