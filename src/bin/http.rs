#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use vocab_srs::{AppConfig, SqliteVocabularyStore, http_api, telemetry};

    telemetry::init_tracing();

    let config = AppConfig::from_env()?;
    let store = SqliteVocabularyStore::open(&config.database)?;
    tracing::info!(database = ?config.database, "store opened");

    http_api::serve(config.http_addr, store).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
