//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::presentation::handlers::{self, AuthAppState, AuthBackend};
use crate::presentation::middleware::{RolePolicy, require_auth, require_roles};

/// Build the auth routes for any credential backend.
///
/// Paths are relative; the binary nests them under `/api`.
pub fn auth_router<S>(state: AuthAppState<S>) -> Router
where
    S: AuthBackend,
{
    let admin: Router<AuthAppState<S>> = Router::new()
        .route(
            "/users",
            get(handlers::list_users::<S>).post(handlers::create_user::<S>),
        )
        .route(
            "/users/{id}",
            patch(handlers::update_user::<S>).delete(handlers::delete_user::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            RolePolicy::admin_only(),
            require_roles,
        ));

    // Later layers wrap earlier ones, so the token check runs before the role check.
    let authenticated: Router<AuthAppState<S>> = Router::new()
        .route("/2fa/setup", post(handlers::setup::<S>))
        .route("/2fa/confirm", post(handlers::confirm::<S>))
        .route("/2fa/disable", post(handlers::disable::<S>))
        .route("/auth/me", get(handlers::me::<S>))
        .route("/groups", get(handlers::groups::<S>))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<S>,
        ));

    let mut public: Router<AuthAppState<S>> = Router::new().route("/login", post(handlers::login::<S>));
    if state.config.allow_signup {
        public = public.route("/signup", post(handlers::signup::<S>));
    }

    public.merge(authenticated).with_state(state)
}
