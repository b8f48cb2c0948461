use std::sync::Arc;

use clap::Parser;
use webserver::app::ApplicationServer;
use webserver::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    config.log.init();

    ApplicationServer::serve(Arc::new(config)).await
}
