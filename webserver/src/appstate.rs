use shared::client::MirrorClient;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    mirror: MirrorClient,
}

impl AppState {
    /// The mirror client, and with it the keep-alive connection pool, is
    /// shared by every request the server handles.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let mirror = MirrorClient::new(&config.mirror_node)?;

        Ok(Self { mirror })
    }

    pub fn get_mirror_client(&self) -> &MirrorClient {
        &self.mirror
    }
}
