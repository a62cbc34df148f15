use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use tokio_util::sync::CancellationToken;

use directory_cli::api::{
    ClientFactory, RateLimiter, TokenProvider, UserOperations, build_http_client,
};
use directory_cli::cli::{Cli, session};
use directory_cli::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("directory-cli.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let _cli = Cli::parse();
    info!("Starting directory-cli");

    let settings = Arc::new(Settings::load()?);
    let limiter = Arc::new(RateLimiter::new(settings.requests_per_second)?);
    let http = build_http_client();
    let tokens = Arc::new(TokenProvider::new(
        settings.clone(),
        limiter.clone(),
        http.clone(),
    ));
    let factory = ClientFactory::new(settings.clone(), tokens, http);
    let users = UserOperations::new(settings, limiter.clone(), factory);

    // One cancellation token covers the whole session; Ctrl-C trips it and
    // every in-flight wait observes it.
    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, canceling session");
            signal.cancel();
        }
    });

    let result = session::run(users, cancel).await;

    debug!("Rate limiter at shutdown: {:?}", limiter.stats());
    result
}
