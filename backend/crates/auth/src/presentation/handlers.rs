//! HTTP Handlers

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequest, Path, State};
use axum::http::StatusCode;
use kernel::id::AccountId;
use tracing::Instrument;

use crate::application::{
    AccountsUseCase, AuthConfig, CreateAccountInput, DecoyDigest, LoginInput, LoginUseCase,
    SecondFactorUseCase, TokenService, UpdateAccountInput,
};
use crate::domain::entity::identity::Identity;
use crate::domain::repository::{CredentialStore, GroupStore};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccountView, ConfirmRequest, CreateUserRequest, DisableRequest, GroupView, LoginAccount,
    LoginRequest, LoginResponse, OkResponse, SetupResponse, SignupRequest, UpdateUserRequest,
};
use crate::presentation::middleware::ClientIp;

/// Everything the HTTP layer needs from a credential backend
pub trait AuthBackend: CredentialStore + GroupStore + Clone + Send + Sync + 'static {}

impl<T> AuthBackend for T where T: CredentialStore + GroupStore + Clone + Send + Sync + 'static {}

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<S>
where
    S: AuthBackend,
{
    pub store: Arc<S>,
    pub config: Arc<AuthConfig>,
    pub tokens: Arc<TokenService>,
    decoy: DecoyDigest,
}

impl<S> AuthAppState<S>
where
    S: AuthBackend,
{
    /// Fails when the signing key or token lifetime is unusable
    pub fn new(store: S, config: AuthConfig) -> AuthResult<Self> {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_secs())?;
        Ok(Self {
            store: Arc::new(store),
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            decoy: DecoyDigest::default(),
        })
    }

    fn accounts(&self) -> AccountsUseCase<S> {
        AccountsUseCase::new(self.store.clone(), self.config.clone())
    }

    fn second_factor(&self) -> SecondFactorUseCase<S> {
        SecondFactorUseCase::new(self.store.clone(), self.config.clone())
    }
}

/// JSON body whose rejections use the common error body
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AuthError))]
pub struct ApiJson<T>(pub T);

// ============================================================================
// Login
// ============================================================================

/// POST /api/login
pub async fn login<S>(
    State(state): State<AuthAppState<S>>,
    ClientIp(client_ip): ClientIp,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AuthResult<Json<LoginResponse>>
where
    S: AuthBackend,
{
    let use_case = LoginUseCase::new(state.store.clone(), state.tokens.clone(), state.config.clone())
        .with_decoy(state.decoy.clone());

    let input = LoginInput {
        username: req.username,
        password: req.password,
        second_factor_code: req.second_factor_code,
    };

    let span = tracing::info_span!("login", client_ip = ?client_ip);
    let output = use_case.execute(input).instrument(span).await?;

    Ok(Json(LoginResponse {
        account: LoginAccount::from(&output.account),
        token: output.token,
    }))
}

// ============================================================================
// Second Factor (requires authentication)
// ============================================================================

/// POST /api/2fa/setup
pub async fn setup<S>(
    State(state): State<AuthAppState<S>>,
    identity: Identity,
) -> AuthResult<Json<SetupResponse>>
where
    S: AuthBackend,
{
    let output = state.second_factor().enroll(&identity)?;

    Ok(Json(SetupResponse {
        shared_secret_base32: output.shared_secret_base32,
        provisioning_uri: output.provisioning_uri,
        qr_code: output.qr_code,
    }))
}

/// POST /api/2fa/confirm
pub async fn confirm<S>(
    State(state): State<AuthAppState<S>>,
    identity: Identity,
    ApiJson(req): ApiJson<ConfirmRequest>,
) -> AuthResult<Json<OkResponse>>
where
    S: AuthBackend,
{
    state
        .second_factor()
        .confirm(&identity, &req.shared_secret, &req.code)
        .await?;

    Ok(Json(OkResponse { ok: true }))
}

/// POST /api/2fa/disable
pub async fn disable<S>(
    State(state): State<AuthAppState<S>>,
    identity: Identity,
    ApiJson(req): ApiJson<DisableRequest>,
) -> AuthResult<Json<OkResponse>>
where
    S: AuthBackend,
{
    state.second_factor().disable(&identity, &req.code).await?;

    Ok(Json(OkResponse { ok: true }))
}

// ============================================================================
// Profile & Groups (requires authentication)
// ============================================================================

/// GET /api/auth/me
pub async fn me<S>(
    State(state): State<AuthAppState<S>>,
    identity: Identity,
) -> AuthResult<Json<AccountView>>
where
    S: AuthBackend,
{
    let account = state.accounts().me(&identity).await?;
    Ok(Json(AccountView::from(&account)))
}

/// GET /api/groups
pub async fn groups<S>(State(state): State<AuthAppState<S>>) -> AuthResult<Json<Vec<GroupView>>>
where
    S: AuthBackend,
{
    let groups = state.accounts().groups().await?;
    Ok(Json(groups.into_iter().map(GroupView::from).collect()))
}

// ============================================================================
// User Management (admin only)
// ============================================================================

/// GET /api/users
pub async fn list_users<S>(
    State(state): State<AuthAppState<S>>,
) -> AuthResult<Json<Vec<AccountView>>>
where
    S: AuthBackend,
{
    let accounts = state.accounts().list().await?;
    Ok(Json(accounts.iter().map(AccountView::from).collect()))
}

/// POST /api/users
pub async fn create_user<S>(
    State(state): State<AuthAppState<S>>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> AuthResult<(StatusCode, Json<AccountView>)>
where
    S: AuthBackend,
{
    let account = state
        .accounts()
        .create(CreateAccountInput {
            username: req.username,
            password: req.password,
            full_name: req.full_name,
            role: req.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AccountView::from(&account))))
}

/// PATCH /api/users/{id}
pub async fn update_user<S>(
    State(state): State<AuthAppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> AuthResult<Json<AccountView>>
where
    S: AuthBackend,
{
    let account_id = parse_account_id(&id)?;

    let input = UpdateAccountInput {
        username: req.username,
        full_name: req.full_name,
        role: req.role,
        password: req.password,
    };

    let account = state.accounts().update(&identity, &account_id, input).await?;
    Ok(Json(AccountView::from(&account)))
}

/// DELETE /api/users/{id}
pub async fn delete_user<S>(
    State(state): State<AuthAppState<S>>,
    identity: Identity,
    Path(id): Path<String>,
) -> AuthResult<StatusCode>
where
    S: AuthBackend,
{
    let account_id = parse_account_id(&id)?;
    state.accounts().delete(&identity, &account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Signup (only mounted when enabled)
// ============================================================================

/// POST /api/signup
pub async fn signup<S>(
    State(state): State<AuthAppState<S>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> AuthResult<(StatusCode, Json<AccountView>)>
where
    S: AuthBackend,
{
    let account = state
        .accounts()
        .signup(req.username, req.password, req.full_name)
        .await?;

    Ok((StatusCode::CREATED, Json(AccountView::from(&account))))
}

/// Ids that are not UUIDs cannot name an account
fn parse_account_id(id: &str) -> AuthResult<AccountId> {
    AccountId::from_str(id).map_err(|_| AuthError::AccountNotFound)
}
