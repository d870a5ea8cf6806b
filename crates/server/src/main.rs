use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_path = PathBuf::from(
        std::env::var("LPR_DATABASE_PATH").unwrap_or_else(|_| "lpr.db".to_string()),
    );
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {}", parent.display()))?;
        }
    }
    let db = lpr_storage::create_db(&db_path)
        .await
        .with_context(|| format!("opening database {}", db_path.display()))?;

    let bind_addr =
        std::env::var("LPR_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let app = routes::router(routes::AppState { db });

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, db = %db_path.display(), "lpr server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
