//! Server Configuration
//!
//! Everything comes from the environment (after `.env` is loaded).
//! `APP_ENV=development` relaxes the secrets that production requires.

use std::env;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use auth::config::MIN_SECRET_LENGTH;
use auth::domain::value_object::user_role::UserRole;
use platform::password::HashAlgorithm;

const DEFAULT_PORT: u16 = 3000;
const DEV_DATABASE_URL: &str = "sqlite://retomas.db?mode=rwc";
const DEV_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Which credential store backs the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
    Postgres(String),
    Sqlite(String),
}

impl Database {
    fn from_url(url: String) -> anyhow::Result<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Database::Postgres(url))
        } else if url.starts_with("sqlite:") {
            Ok(Database::Sqlite(url))
        } else {
            bail!("DATABASE_URL must start with postgres:// or sqlite:");
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Database::Postgres(_) => "postgres",
            Database::Sqlite(_) => "sqlite",
        }
    }
}

pub struct AppConfig {
    pub environment: Environment,
    pub database: Database,
    pub port: u16,
    /// Empty means any origin
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    /// Seed password for the first admin; `None` skips bootstrapping
    pub bootstrap_admin_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match var("APP_ENV").as_deref() {
            Some("development") => Environment::Development,
            _ => Environment::Production,
        };
        let dev = environment == Environment::Development;

        let mut auth = match var("JWT_SECRET") {
            Some(secret) if secret.len() >= MIN_SECRET_LENGTH => AuthConfig::new(secret),
            Some(secret) if dev => {
                tracing::warn!(
                    "JWT_SECRET is shorter than {MIN_SECRET_LENGTH} bytes; acceptable only in development"
                );
                AuthConfig::new(secret)
            }
            Some(_) => bail!("JWT_SECRET must be at least {MIN_SECRET_LENGTH} bytes"),
            None if dev => {
                tracing::warn!("JWT_SECRET not set; using a random key, tokens will not survive a restart");
                AuthConfig::with_random_secret()
            }
            None => bail!("JWT_SECRET must be set in production"),
        };

        let database = match var("DATABASE_URL") {
            Some(url) => Database::from_url(url)?,
            None if dev => Database::Sqlite(DEV_DATABASE_URL.to_string()),
            None => bail!("DATABASE_URL must be set in production"),
        };

        let port = match var("PORT") {
            Some(port) => port.parse().context("PORT must be a port number")?,
            None => DEFAULT_PORT,
        };

        let frontend_origins = var("FRONTEND_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if let Some(ttl) = var("TOKEN_TTL_SECS") {
            let secs: u64 = ttl.parse().context("TOKEN_TTL_SECS must be a number of seconds")?;
            if secs == 0 {
                bail!("TOKEN_TTL_SECS must be positive");
            }
            auth.token_ttl = Duration::from_secs(secs);
        }

        if let Some(cost) = var("BCRYPT_COST") {
            let cost: u32 = cost.parse().context("BCRYPT_COST must be a number")?;
            auth.hash_algorithm = HashAlgorithm::bcrypt(cost)?;
        }

        if let Some(issuer) = var("TOTP_ISSUER") {
            if issuer.contains(':') {
                bail!("TOTP_ISSUER must not contain ':'");
            }
            auth.totp_issuer = issuer;
        }

        if let Some(flag) = var("ALLOW_SIGNUP") {
            auth.allow_signup = parse_bool(&flag).context("ALLOW_SIGNUP must be true or false")?;
        }

        if let Some(role) = var("DEFAULT_ROLE") {
            let role = UserRole::parse(&role).context("DEFAULT_ROLE is not a valid role code")?;
            if role.is_admin() {
                bail!("DEFAULT_ROLE must not be admin");
            }
            auth.default_role = role;
        }

        let bootstrap_admin_password = match var("BOOTSTRAP_ADMIN_PASSWORD") {
            Some(password) => Some(password),
            None if dev => {
                tracing::warn!("BOOTSTRAP_ADMIN_PASSWORD not set; the first admin gets the development default");
                Some(DEV_ADMIN_PASSWORD.to_string())
            }
            None => None,
        };

        Ok(Self {
            environment,
            database,
            port,
            frontend_origins,
            auth,
            bootstrap_admin_password,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    mod production {
        use super::*;

        #[test]
        fn test_requires_secret_and_database() {
            assert!(load(&[]).is_err());
            assert!(load(&[("DATABASE_URL", "postgres://db/retomas")]).is_err());
            assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
            assert!(
                load(&[("JWT_SECRET", "short"), ("DATABASE_URL", "postgres://db/retomas")])
                    .is_err()
            );
        }

        #[test]
        fn test_defaults() {
            let config =
                load(&[("JWT_SECRET", SECRET), ("DATABASE_URL", "postgres://db/retomas")]).unwrap();

            assert_eq!(config.environment, Environment::Production);
            assert_eq!(config.database, Database::Postgres("postgres://db/retomas".to_string()));
            assert_eq!(config.port, 3000);
            assert!(config.frontend_origins.is_empty());
            assert_eq!(config.auth.jwt_secret, SECRET.as_bytes());
            assert_eq!(config.auth.token_ttl_secs(), 28_800);
            assert!(!config.auth.allow_signup);
            assert!(config.bootstrap_admin_password.is_none());
        }
    }

    mod development {
        use super::*;

        #[test]
        fn test_fallbacks() {
            let config = load(&[("APP_ENV", "development")]).unwrap();

            assert_eq!(config.environment, Environment::Development);
            assert_eq!(config.database, Database::Sqlite(DEV_DATABASE_URL.to_string()));
            assert_eq!(config.auth.jwt_secret.len(), MIN_SECRET_LENGTH);
            assert_eq!(config.bootstrap_admin_password.as_deref(), Some("admin123"));
        }
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "8080"),
            ("FRONTEND_ORIGINS", "http://localhost:5173, https://retomas.example ,"),
            ("TOKEN_TTL_SECS", "3600"),
            ("BCRYPT_COST", "12"),
            ("TOTP_ISSUER", "Retomas Loja"),
            ("ALLOW_SIGNUP", "true"),
            ("DEFAULT_ROLE", "Comercial"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "s3nha-forte"),
        ])
        .unwrap();

        assert_eq!(config.database.kind(), "sqlite");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.frontend_origins,
            ["http://localhost:5173", "https://retomas.example"]
        );
        assert_eq!(config.auth.token_ttl_secs(), 3600);
        assert_eq!(config.auth.hash_algorithm, HashAlgorithm::Bcrypt { cost: 12 });
        assert_eq!(config.auth.totp_issuer, "Retomas Loja");
        assert!(config.auth.allow_signup);
        assert_eq!(config.auth.default_role.code(), "comercial");
        assert_eq!(config.bootstrap_admin_password.as_deref(), Some("s3nha-forte"));
    }

    #[test]
    fn test_rejects_bad_values() {
        let base = [("JWT_SECRET", SECRET), ("DATABASE_URL", "postgres://db/retomas")];
        for extra in [
            ("DATABASE_URL", "mysql://db"),
            ("PORT", "http"),
            ("TOKEN_TTL_SECS", "0"),
            ("BCRYPT_COST", "3"),
            ("TOTP_ISSUER", "Retomas:Loja"),
            ("ALLOW_SIGNUP", "maybe"),
            ("DEFAULT_ROLE", "admin"),
        ] {
            let mut vars = base.to_vec();
            vars.push(extra);
            assert!(load(&vars).is_err(), "{extra:?}");
        }
    }
}
