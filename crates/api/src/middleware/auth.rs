//! Identity extractor for Axum handlers.
//!
//! Authentication itself happens at the external identity provider (the
//! reverse proxy verifies the session and forwards the identity as
//! headers). This extractor only reads those headers; a request without
//! them is rejected as unauthenticated.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use postmap_core::error::CoreError;
use postmap_core::types::{SpotAuthor, UserRef};

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user forwarded by the identity-aware proxy.
///
/// Use this as an extractor parameter in any handler that mutates data:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(uid = %user.uid, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Stable uid assigned by the identity provider.
    pub uid: String,
    /// Display name shown next to records the user touches.
    pub display_name: String,
    /// Avatar URL, if the provider supplies one.
    pub photo_url: Option<String>,
}

impl AuthUser {
    /// Identity stamped onto area updates.
    pub fn user_ref(&self) -> UserRef {
        UserRef {
            uid: self.uid.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone().unwrap_or_default(),
        }
    }

    /// Identity stamped onto spot creation (no avatar).
    pub fn spot_author(&self) -> SpotAuthor {
        SpotAuthor {
            uid: self.uid.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let uid = parts
            .headers
            .get("x-user-uid")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Core(CoreError::Access("Missing x-user-uid header".into())))?
            .to_string();

        let display_name = parts
            .headers
            .get("x-user-name")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let photo_url = parts
            .headers
            .get("x-user-photo")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(AuthUser {
            uid,
            display_name,
            photo_url,
        })
    }
}
