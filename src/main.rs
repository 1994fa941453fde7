use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;
use rust_rewards_service::{
    adapters::database::memory::MemoryDatabase, commands::DomainLogic, config::Config, http,
    logs,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;
    logs::init(config.log_format);

    let database = match &config.seed_file {
        Some(path) => MemoryDatabase::from_json_file(path)
            .with_context(|| format!("Failed to load transactions from {}", path.display()))?,
        None => MemoryDatabase::default(),
    };
    info!(
        transactions = database.len()?,
        empty_policy = ?config.empty_policy,
        "transaction store ready"
    );

    let logic = DomainLogic::new(Arc::new(database), config.empty_policy);
    http::serve(config.port, http::router(logic))
        .await
        .context("Failed to start server")?;

    info!("server stopped");

    Ok(())
}
