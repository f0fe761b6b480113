use std::process::ExitCode;

use mentor_api::config::Config;
use mentor_api::{build_app, cli, db};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: mentor-api [serve | import-skills <file.json>]";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mentor_api=info,tower_http=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let mut args = std::env::args().skip(1);
    let command = args.next();

    let pool = db::init_pool(&config.database_url, config.max_connections).await?;

    match command.as_deref() {
        None | Some("serve") => serve(pool, &config).await,
        Some("import-skills") => {
            let path = args.next().ok_or(USAGE)?;
            let imported = cli::import_skills(&pool, &path, config.id_max_attempts).await?;
            tracing::info!(imported, %path, "imported skills");
            Ok(())
        }
        Some(other) => Err(format!("unknown command {other:?}; {USAGE}").into()),
    }
}

async fn serve(pool: SqlitePool, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_app(pool, config);
    let listener = TcpListener::bind(config.bind_addr).await?;

    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
