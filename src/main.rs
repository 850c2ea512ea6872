use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use devfinder::client::ProcedureClient;
use devfinder::config::{
    CliArgs, Command, LookupArgs, ServeArgs, ServerConfig, GITHUB_TOKEN_ENV,
    NOTIFICATION_DURATION_SECS, QUERY_MAX_RETRIES,
};
use devfinder::query::{ProfileQuery, RetryPolicy};
use devfinder::render::{render_notification, render_result};
use devfinder::server;
use devfinder::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the token may come from the real environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devfinder=info,tower_http=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    match args.command {
        Command::Serve(serve_args) => serve(serve_args).await,
        Command::Lookup(lookup_args) => lookup(lookup_args).await,
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = ServerConfig::from_args(args);
    info!("Starting devfinder v{}", env!("CARGO_PKG_VERSION"));
    info!("GitHub API: {}", config.github.api_base);
    if !config.github.token_configured() {
        warn!(
            "{} is not set; profile lookups will fail until it is",
            GITHUB_TOKEN_ENV
        );
    }

    let addr = SocketAddr::new(config.bind, config.port);
    let state = Arc::new(AppState::new(config)?);
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("devfinder listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("devfinder shutting down");
    Ok(())
}

async fn lookup(args: LookupArgs) -> anyhow::Result<()> {
    let client = ProcedureClient::new(&args.endpoint)?;
    let policy = RetryPolicy {
        max_retries: QUERY_MAX_RETRIES,
        delay: args.retry_delay(),
    };
    let query = ProfileQuery::with_policy(
        Arc::new(client),
        policy,
        Duration::from_secs(NOTIFICATION_DURATION_SECS),
    );

    let mut tasks = Vec::with_capacity(args.usernames.len());
    for username in args.usernames {
        tasks.push(query.submit(username));
        println!("{}", render_result(&query.current()));
    }
    for task in tasks {
        task.await?;
    }

    let card = render_result(&query.current());
    if !card.is_empty() {
        println!("{}", card);
    }
    if let Some(notification) = query.notifications().current() {
        eprintln!("{}", render_notification(&notification));
        std::process::exit(1);
    }
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal");
}
