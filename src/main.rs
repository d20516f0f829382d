use clap::Parser;
use family_tasks_core::Database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use family_tasks::{
    api,
    client::{Board, RpcClient},
    config::{Cli, Commands, ServeArgs},
    mcp,
};

fn open_database(cli: &Cli) -> anyhow::Result<Database> {
    let db = match &cli.db {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(db: Database, args: &ServeArgs) -> anyhow::Result<()> {
    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(args.addr()).await?;
    tracing::info!("Family tasks server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the MCP protocol, so logs go to stderr there
    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "family_tasks=debug,family_tasks_core=info,tower_http=debug".into()
    }));
    let registry = tracing_subscriber::registry().with(filter);
    if matches!(cli.command, Some(Commands::Mcp)) {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    match &cli.command {
        Some(Commands::Serve(args)) => {
            let db = open_database(&cli)?;
            serve(db, args).await?;
        }
        Some(Commands::Mcp) => {
            let db = open_database(&cli)?;
            mcp::run_stdio_server(db).await?;
        }
        Some(Commands::Status(remote)) => {
            let client = RpcClient::new(&remote.url)?;
            match client.healthcheck().await {
                Ok(health) => println!(
                    "Server at {} is {} (server time {})",
                    remote.url, health.status, health.timestamp
                ),
                Err(e) => {
                    println!("Server at {} is not reachable: {}", remote.url, e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Board(remote)) => {
            let client = RpcClient::new(&remote.url)?;
            let board = Board::load(client).await;
            print!("{}", board.summary(chrono::Utc::now()));
        }
        None => {
            // Default: start server
            let db = open_database(&cli)?;
            serve(db, &ServeArgs::default()).await?;
        }
    }

    Ok(())
}
