//! First-run Bootstrap
//!
//! Seeds the `admin` account when the credential store is empty.

use std::sync::Arc;

use platform::password::HashAlgorithm;

use crate::domain::entity::account::Account;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    password::{PasswordDigest, RawPassword},
    user_name::UserName,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

pub const BOOTSTRAP_USER_NAME: &str = "admin";

/// Create `admin` with role `admin` when no account exists yet.
///
/// Returns whether an account was created. The password is operator
/// supplied, so the policy for user-chosen passwords is not applied.
pub async fn ensure_admin<S>(
    store: &S,
    password: String,
    algorithm: HashAlgorithm,
) -> AuthResult<bool>
where
    S: CredentialStore,
{
    if store.count().await? > 0 {
        return Ok(false);
    }

    let password = RawPassword::for_verification(password);
    if password.is_empty() {
        return Err(AuthError::Validation(
            "bootstrap admin password must not be empty".to_string(),
        ));
    }

    let digest = PasswordDigest::hash(Arc::new(password), algorithm).await?;
    let account = Account::new(
        UserName::parse(BOOTSTRAP_USER_NAME)?,
        None,
        UserRole::admin(),
        digest,
    );

    match store.create(&account).await {
        Ok(()) => {
            tracing::info!(account_id = %account.account_id, "Bootstrap admin account created");
            Ok(true)
        }
        // Another instance won the race
        Err(AuthError::DuplicateUsername) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::SqliteCredentialStore;

    const FAST: HashAlgorithm = HashAlgorithm::Bcrypt { cost: 4 };

    #[tokio::test]
    async fn test_creates_admin_once() {
        let store = SqliteCredentialStore::in_memory().await.unwrap();

        assert!(ensure_admin(&store, "admin123".to_string(), FAST).await.unwrap());
        assert!(!ensure_admin(&store, "other-password".to_string(), FAST).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);

        let admin = store
            .find_by_user_name(&UserName::parse(BOOTSTRAP_USER_NAME).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_admin());
        assert!(!admin.second_factor_enabled());

        let password = Arc::new(RawPassword::for_verification("admin123".to_string()));
        assert!(admin.password.verify(password).await.unwrap());
    }

    #[tokio::test]
    async fn test_skipped_when_accounts_exist() {
        let store = SqliteCredentialStore::in_memory().await.unwrap();
        let digest = PasswordDigest::hash(
            Arc::new(RawPassword::for_verification("Retoma-2024!".to_string())),
            FAST,
        )
        .await
        .unwrap();
        let account = Account::new(
            UserName::parse("ana").unwrap(),
            None,
            UserRole::parse("vendedor").unwrap(),
            digest,
        );
        store.create(&account).await.unwrap();

        assert!(!ensure_admin(&store, "admin123".to_string(), FAST).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_password() {
        let store = SqliteCredentialStore::in_memory().await.unwrap();

        let result = ensure_admin(&store, String::new(), FAST).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
