use std::sync::Arc;

use ledger_client::PlaidClient;
use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendr={level},server={level},engine={level},ledger_client={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect_database(&settings.database).await?;

    let provider = PlaidClient::new(reqwest::Client::new(), settings.plaid.client_config()?);
    tracing::info!(
        environment = %settings.plaid.environment,
        "provider client configured"
    );

    let engine = engine::Engine::builder()
        .database(db.clone())
        .provider(Arc::new(provider))
        .build()
        .await?;

    server::run(engine, db, &settings.server.address()).await?;
    Ok(())
}

async fn connect_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(config.url()).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
