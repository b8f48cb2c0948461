use shared::circulation::{Circulation, CirculationQuery};
use shared::error::CirculationError;

use crate::appstate::AppState;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct CirculationService {
    app_state: AppState,
    source: String,
    token: String,
    treasuries: Vec<String>,
}

impl CirculationService {
    pub fn new(app_state: AppState, config: &AppConfig) -> Self {
        Self {
            app_state,
            source: config.mirror_node.clone(),
            token: config.token_id.clone(),
            treasuries: config.treasury_ids(),
        }
    }

    /// Recomputed from the mirror node on every call, nothing is cached.
    pub async fn get_circulation(
        &self,
    ) -> Result<Circulation, CirculationError> {
        let query =
            CirculationQuery::new(&self.source, &self.token, &self.treasuries)?;

        query.execute(self.app_state.get_mirror_client()).await
    }
}
