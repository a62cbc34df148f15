pub mod app;
pub mod prompts;
pub mod session;

pub use app::Cli;
