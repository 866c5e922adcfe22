use color_eyre::eyre::Result;
use tokio::net::TcpListener;
use warden::{AllowedOrigins, Settings, build_auth_service, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let settings = Settings::load()?;

    let auth_service = build_auth_service(&settings).await?;
    let allowed_origins = AllowedOrigins::new(&settings.server.allowed_origins);

    let listener = TcpListener::bind(&settings.server.address).await?;
    tracing::info!(storage = ?settings.storage, "Starting warden auth service");

    auth_service
        .run_standalone(listener, Some(allowed_origins))
        .await?;

    Ok(())
}
