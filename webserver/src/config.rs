use shared::log_config::LogConfig;

pub const DEFAULT_MIRROR_NODE: &str = "mainnet-public.mirrornode.hedera.com";

#[derive(clap::Parser, Clone, Debug)]
#[command(
    name = "webserver",
    about = "HTTP API reporting the circulating supply of an HTS token."
)]
pub struct AppConfig {
    #[clap(long, env, default_value = "3000")]
    pub port: u16,

    #[clap(long, env, help = "Token to report on, in shard.realm.num form")]
    pub token_id: String,

    #[clap(long, env, default_value = DEFAULT_MIRROR_NODE)]
    pub mirror_node: String,

    #[clap(
        long,
        env,
        default_value = "",
        help = "Comma or space separated treasury account ids"
    )]
    pub treasuries: String,

    #[clap(
        long,
        env,
        default_value = "60",
        help = "Request timeout in seconds"
    )]
    pub http_timeout: u64,

    #[command(flatten)]
    pub log: LogConfig,
}

impl AppConfig {
    pub fn treasury_ids(&self) -> Vec<String> {
        self.treasuries
            .trim()
            .split(|c: char| c == ',' || c == ' ')
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .collect()
    }
}
