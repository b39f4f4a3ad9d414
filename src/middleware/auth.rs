use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::Identity;
use crate::config::AuthMode;
use crate::state::SharedState;

/// Decode an optional bearer token and attach the resulting `Identity` to the
/// request. In `AuthMode::Optional` this never rejects.
pub async fn attach_identity(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = Identity::from_headers(req.headers(), state.config.jwt_secret.as_deref());

    if state.config.auth_mode == AuthMode::Required {
        if let Err(rejection) = identity.require() {
            return rejection.into_response();
        }
    }

    if let Some(claims) = identity.claims() {
        tracing::debug!(user_id = %claims.sub, "Authenticated request");
    }

    req.extensions_mut().insert(identity);
    next.run(req).await
}
