use shared::log_config::LogConfig;

#[derive(clap::Parser)]
#[command(
    name = "circulation",
    about = "Prints the circulating supply of an HTS token as JSON."
)]
pub struct AppConfig {
    #[clap(value_name = "MIRROR_HOST", help = "Mirror node host to query")]
    pub source: String,

    #[clap(value_name = "TOKEN_ID", help = "Token id in shard.realm.num form")]
    pub token: String,

    #[clap(
        value_name = "TREASURY_ID",
        help = "Accounts whose holdings are not circulating"
    )]
    pub treasuries: Vec<String>,

    #[command(flatten)]
    pub log: LogConfig,
}
