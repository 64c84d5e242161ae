//! Access-control extractors.
//!
//! The only privilege tier is admin, gating the danger-zone operations
//! (restore, purge). Membership comes from [`ServerConfig::admin_uids`].
//!
//! [`ServerConfig::admin_uids`]: crate::config::ServerConfig

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use postmap_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires an admin uid. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user.uid is guaranteed to be in ADMIN_UIDS here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !state.config.is_admin(&user.uid) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin privileges required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
