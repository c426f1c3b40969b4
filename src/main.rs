use anyhow::Result;
use catalog_api::{
    config::{AppConfig, Command, StorageDriver},
    db, jobs,
    routes::routes,
    services::auth_service::AuthService,
    state::AppState,
    storage::{Disk, LocalDisk, MemoryDisk},
};
use std::{fs, io::ErrorKind, path::Path, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + command ---
    let (cfg, command) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting catalog-api with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    tracing::debug!("Connecting using raw URL => {}", cfg.database_url);
    let pool = db::connect(&cfg.database_url).await?;

    match command {
        Command::Migrate => {
            db::run_migrations(&pool).await?;
            tracing::info!("Database migration complete.");
            Ok(())
        }
        Command::SweepTokens => {
            let removed = jobs::token_sweep::sweep_expired_tokens(&pool).await?;
            tracing::info!(removed, "Expired tokens removed.");
            Ok(())
        }
        Command::CreateUser {
            name,
            email,
            password,
        } => {
            let auth = AuthService::new(Arc::new(pool), cfg.token_lifetime);
            let user = auth.create_user(&name, &email, &password).await?;
            tracing::info!(user_id = user.id, "User {} created.", user.email);
            Ok(())
        }
        Command::Serve => serve(cfg, pool).await,
    }
}

async fn serve(cfg: AppConfig, pool: sqlx::SqlitePool) -> Result<()> {
    // --- Storage disk ---
    let disk: Arc<dyn Disk> = match cfg.storage_driver {
        StorageDriver::Local => {
            if !Path::new(&cfg.storage_dir).exists() {
                fs::create_dir_all(&cfg.storage_dir)?;
                tracing::info!("Created storage directory at {}", cfg.storage_dir);
            }
            Arc::new(LocalDisk::new(&cfg.storage_dir, &cfg.public_url))
        }
        StorageDriver::Memory => Arc::new(MemoryDisk::new(&cfg.public_url)),
    };
    tracing::info!(driver = disk.name(), "Storage disk ready");

    let sweep_every = Duration::from_secs(cfg.token_sweep_interval.max(1));
    let addr = cfg.addr();
    let (host, port) = (cfg.host.clone(), cfg.port);

    let state = AppState::new(pool, disk, cfg);
    jobs::token_sweep::spawn(state.db.clone(), sweep_every);

    // --- Build router ---
    let app = routes(state);

    // --- Start server ---
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{port}");
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
