pub mod app;
pub mod commands;
pub mod session;

pub use app::Cli;
