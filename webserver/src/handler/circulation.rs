use axum::extract::State;
use axum::Json;
use shared::circulation::Circulation;

use crate::error::api::ApiError;
use crate::state::common::CommonState;

pub async fn get_circulation(
    State(state): State<CommonState>,
) -> Result<Json<Circulation>, ApiError> {
    let circulation = state.circulation_service.get_circulation().await?;

    Ok(Json(circulation))
}
