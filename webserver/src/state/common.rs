use crate::appstate::AppState;
use crate::config::AppConfig;
use crate::service::circulation::CirculationService;

#[derive(Clone)]
pub struct CommonState {
    pub circulation_service: CirculationService,
}

impl CommonState {
    pub fn new(data: AppState, config: &AppConfig) -> Self {
        Self {
            circulation_service: CirculationService::new(data, config),
        }
    }
}
