mod config;

use clap::Parser;
use shared::circulation::get_token_circulation;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    config.log.init();

    tracing::debug!(
        source = %config.source,
        token = %config.token,
        treasuries = ?config.treasuries,
        "Computing circulation"
    );

    let circulation =
        get_token_circulation(&config.source, &config.token, &config.treasuries)
            .await?;

    println!("{}", serde_json::to_string(&circulation)?);

    Ok(())
}
