//! Circulating supply of the $CLXY token on mainnet.

use clap::Parser;
use shared::circulation::get_token_circulation;
use shared::log_config::LogConfig;

const SOURCE: &str = "mainnet-public.mirrornode.hedera.com";
const TOKEN: &str = "0.0.859814";
const TREASURIES: &[&str] = &[
    "0.0.849428",
    "0.0.859877",
    "0.0.859897",
    "0.0.859903",
    "0.0.859906",
    "0.0.859908",
    "0.0.859910",
    "0.0.859911",
];

#[derive(clap::Parser)]
#[command(name = "clxy", about = "Prints the circulating supply of $CLXY.")]
struct AppConfig {
    #[command(flatten)]
    log: LogConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    config.log.init();

    tracing::debug!(
        source = SOURCE,
        token = TOKEN,
        treasuries = TREASURIES.len(),
        "Computing $CLXY circulation"
    );

    let circulation = get_token_circulation(SOURCE, TOKEN, TREASURIES).await?;

    println!("{}", serde_json::to_string_pretty(&circulation)?);

    Ok(())
}
