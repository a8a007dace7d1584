use crate::modules::profiles::service::ProfileService;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use tutorbot_core::AppError;
use tutorbot_models::{ProfileRecord, UserIdentity};

/// Operator lookup of a registered profile by identity.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<ProfileRecord>, AppError> {
    let identity = UserIdentity::new(identity.trim_start_matches('@'));
    let record = ProfileService::find(state.storage.as_ref(), &identity)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("No profile for {identity}")))?;

    Ok(Json(record))
}
