use clap::Parser;

/// The tool is fully interactive; clap only provides `--help` and
/// `--version` plus argument validation.
#[derive(Parser)]
#[command(name = "directory-cli")]
#[command(version)]
#[command(about = "An interactive console for managing users in a remote directory")]
pub struct Cli {}
