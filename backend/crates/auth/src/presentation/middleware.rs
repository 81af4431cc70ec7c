//! Auth Middleware
//!
//! `require_auth` turns a bearer token into an [`Identity`] stored in the
//! request extensions; `require_roles` gates a route group on top of it.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use platform::bearer::extract_bearer_token;
use platform::client::extract_client_ip;

use crate::application::authorize::require_role;
use crate::domain::entity::identity::Identity;
use crate::domain::value_object::user_role::UserRole;
use crate::error::AuthError;
use crate::presentation::handlers::{AuthAppState, AuthBackend};

/// Middleware that requires a valid bearer token
pub async fn require_auth<S>(
    State(state): State<AuthAppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    S: AuthBackend,
{
    let identity = {
        let token = extract_bearer_token(req.headers()).map_err(|e| {
            tracing::debug!(reason = %e, "No usable bearer token");
            AuthError::MissingToken
        })?;
        state.tokens.verify(token).map_err(AuthError::InvalidToken)?
    };

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Roles allowed through a [`require_roles`] layer. `admin` always passes.
#[derive(Debug, Clone, Copy)]
pub struct RolePolicy {
    allowed: &'static [&'static str],
}

impl RolePolicy {
    pub fn admin_only() -> Self {
        Self {
            allowed: &[UserRole::ADMIN],
        }
    }

    pub fn any_of(allowed: &'static [&'static str]) -> Self {
        Self { allowed }
    }
}

/// Middleware that rejects identities outside the policy with 403.
/// Must run inside [`require_auth`].
pub async fn require_roles(
    State(policy): State<RolePolicy>,
    identity: Identity,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    require_role(&identity, policy.allowed)?;
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

/// Best-effort client address: `X-Forwarded-For` first, then the socket peer
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());

        Ok(ClientIp(extract_client_ip(&parts.headers, direct_ip)))
    }
}
