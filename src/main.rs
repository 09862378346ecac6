use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use habit_tree::{api, config::TrackerConfig, db};

#[derive(Parser)]
#[command(name = "habit-tree")]
#[command(about = "Grow a garden of trees by completing daily habits")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Habit Tree server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Clear every habit's completion for a new day
    ResetDay,
    /// Print the current garden, trees and habits
    Status,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "habit_tree=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database() -> anyhow::Result<db::Database> {
    let db = db::Database::open_configured(TrackerConfig::load())?;
    db.migrate()?;
    db.seed_defaults()?;
    Ok(db)
}

async fn serve(port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting Habit Tree server on port {}", port);

    let db = open_database()?;
    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Habit Tree server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port }) => serve(port).await?,
        Some(Commands::ResetDay) => {
            let db = open_database()?;
            let rollover = db.day_boundary_reset()?;
            println!(
                "Reset {} habit(s) for {}",
                rollover.habits_reset, rollover.day
            );
        }
        Some(Commands::Status) => {
            let db = open_database()?;
            let state = db.tracker_state()?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        // Default: start server
        None => serve(3000).await?,
    }

    Ok(())
}
