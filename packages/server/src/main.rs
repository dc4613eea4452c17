use std::sync::Arc;

use tracing::{Level, info};

use common::storage::FilesystemImageStore;
use server::config::AppConfig;
use server::database::init_db;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    let images = FilesystemImageStore::new(
        config.storage.upload_dir.clone(),
        config.storage.max_upload_size,
    )
    .await?;

    let state = AppState {
        db,
        images: Arc::new(images),
        config: config.clone(),
    };

    let app = server::build_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
