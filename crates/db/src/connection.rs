use std::time::Duration;

use mongodb::{Client, Database, options::ClientOptions};
use peopledesk_config::{DatabaseSettings, Settings};
use tracing::info;

/// Driver options for the configured deployment.
pub async fn client_options(
    database: &DatabaseSettings,
) -> Result<ClientOptions, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&database.url).await?;
    options.app_name = Some("peopledesk".to_string());
    options.max_pool_size = database.max_pool_size.or(options.max_pool_size);
    options.min_pool_size = database.min_pool_size.or(options.min_pool_size);
    if let Some(secs) = database.server_selection_timeout_secs {
        options.server_selection_timeout = Some(Duration::from_secs(secs));
    }
    Ok(options)
}

/// Opens a client and fails fast when the server does not answer a ping.
pub async fn open_client(database: &DatabaseSettings) -> Result<Client, mongodb::error::Error> {
    let client = Client::with_options(client_options(database).await?)?;
    client
        .database("admin")
        .run_command(bson::doc! { "ping": 1 })
        .await?;
    Ok(client)
}

pub async fn connect(settings: &Settings) -> Result<Database, mongodb::error::Error> {
    let client = open_client(&settings.database).await?;
    info!(
        db = %settings.database.name,
        pool = ?settings.database.max_pool_size,
        "MongoDB ready"
    );
    Ok(client.database(&settings.database.name))
}
