use crate::modules::profiles::controller::get_profile;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_profiles_router() -> Router<AppState> {
    Router::new().route("/{identity}", get(get_profile))
}
