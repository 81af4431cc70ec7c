//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{account::Account, group::Group};

// ============================================================================
// Login
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// One-time code, only needed when the account has a second factor
    #[serde(default, alias = "token2")]
    pub second_factor_code: Option<String>,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub account: LoginAccount,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginAccount {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl From<&Account> for LoginAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.account_id.to_string(),
            username: account.user_name.original().to_string(),
            role: account.role.code().to_string(),
        }
    }
}

// ============================================================================
// Second Factor
// ============================================================================

/// Enrollment response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupResponse {
    /// Secret for manual entry
    pub shared_secret_base32: String,
    /// otpauth:// URL
    #[serde(rename = "provisioningURI")]
    pub provisioning_uri: String,
    /// QR code as base64-encoded PNG
    pub qr_code: String,
}

/// Enrollment confirmation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub shared_secret: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisableRequest {
    /// Current code to prove possession of the authenticator
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

// ============================================================================
// Accounts
// ============================================================================

/// Account profile as shown to the owner and to admins
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub role: String,
    pub is_admin: bool,
    pub second_factor_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.account_id.to_string(),
            username: account.user_name.original().to_string(),
            full_name: account.full_name.clone(),
            role: account.role.code().to_string(),
            is_admin: account.is_admin(),
            second_factor_enabled: account.second_factor_enabled(),
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub name: String,
    pub display_name: String,
}

impl From<Group> for GroupView {
    fn from(group: Group) -> Self {
        Self {
            name: group.name.code().to_string(),
            display_name: group.display_name,
        }
    }
}

/// Admin user creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Group code or `admin`; defaults to the configured role
    #[serde(default)]
    pub role: Option<String>,
}

/// Partial update, absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Self-service registration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_accepts_both_code_names() {
        let req: LoginRequest = serde_json::from_str(
            r#"{"username":"ana","password":"x","secondFactorCode":"123456"}"#,
        )
        .unwrap();
        assert_eq!(req.second_factor_code.as_deref(), Some("123456"));

        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"ana","password":"x","token2":"654321"}"#)
                .unwrap();
        assert_eq!(req.second_factor_code.as_deref(), Some("654321"));

        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"ana","password":"x"}"#).unwrap();
        assert!(req.second_factor_code.is_none());
    }

    #[test]
    fn test_setup_response_field_names() {
        let json = serde_json::to_value(SetupResponse {
            shared_secret_base32: "JBSWY3DPEHPK3PXP".to_string(),
            provisioning_uri: "otpauth://totp/x".to_string(),
            qr_code: "iVBOR".to_string(),
        })
        .unwrap();

        assert_eq!(json["sharedSecretBase32"], "JBSWY3DPEHPK3PXP");
        assert_eq!(json["provisioningURI"], "otpauth://totp/x");
        assert_eq!(json["qrCode"], "iVBOR");
    }
}
