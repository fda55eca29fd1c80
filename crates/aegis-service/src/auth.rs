//! JWT session tokens.
//!
//! The identity provider turns a bearer token into a [`Principal`]. Tokens
//! are HS256 signed and carry the principal's role and position, so no
//! session lookup is needed on each call. Signing out records the token id
//! until the token would have expired anyway.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use aegis_core::{Principal, Role};

use crate::config::AdminConfig;
use crate::error::{ServiceError, ServiceResult};

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal id)
    pub sub: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID, the handle used for sign-out
    pub jti: String,
}

impl Claims {
    fn into_principal(self) -> Principal {
        Principal {
            id: self.sub,
            email: self.email,
            display_name: self.name,
            role: self.role,
            tenant_id: self.tenant_id,
            company_id: self.company_id,
        }
    }
}

/// What the caller presents to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Credentials {
            token: token.into(),
        }
    }

    /// Parses an `Authorization: Bearer <token>` header value.
    pub fn from_authorization_header(header: &str) -> Option<Self> {
        let token = header.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            None
        } else {
            Some(Credentials::bearer(token))
        }
    }
}

/// A freshly issued token together with the principal it encodes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub token_id: String,
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Resolves credentials to the authenticated principal.
    async fn authenticate(&self, credentials: &Credentials) -> ServiceResult<Principal>;

    /// Ends the session the credentials belong to.
    async fn sign_out(&self, credentials: &Credentials) -> ServiceResult<()>;
}

/// HS256 identity provider with in-process revocation.
pub struct JwtIdentityProvider {
    secret: String,
    lifetime_secs: i64,
    /// jti -> exp of signed-out tokens
    revoked: RwLock<HashMap<String, i64>>,
}

impl JwtIdentityProvider {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        JwtIdentityProvider {
            secret: secret.into(),
            lifetime_secs,
            revoked: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.jwt_secret.clone(), config.jwt_lifetime_secs)
    }

    /// Issues a session token for `principal`.
    pub fn issue(&self, principal: &Principal) -> ServiceResult<Session> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: principal.id.clone(),
            email: principal.email.clone(),
            name: principal.display_name.clone(),
            role: principal.role,
            tenant_id: principal.tenant_id.clone(),
            company_id: principal.company_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = self.sign(&claims)?;
        debug!(principal_id = %principal.id, role = %principal.role, "Issued session token");

        Ok(Session {
            token,
            token_id: claims.jti,
            principal: principal.clone(),
            expires_at: Utc.timestamp_opt(claims.exp, 0).single().unwrap_or(exp),
        })
    }

    fn sign(&self, claims: &Claims) -> ServiceResult<String> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Unauthenticated(format!("Failed to sign token: {e}")))
    }

    /// Validates signature and expiry and decodes the claims.
    pub fn validate_token(&self, token: &str) -> ServiceResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ServiceError::Unauthenticated(format!("Invalid token: {e}")))?;

        Ok(data.claims)
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn authenticate(&self, credentials: &Credentials) -> ServiceResult<Principal> {
        let claims = self.validate_token(&credentials.token)?;

        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(ServiceError::Unauthenticated(
                "Session has been signed out".to_string(),
            ));
        }

        Ok(claims.into_principal())
    }

    async fn sign_out(&self, credentials: &Credentials) -> ServiceResult<()> {
        let claims = self.validate_token(&credentials.token)?;
        let now = Utc::now().timestamp();

        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti, claims.exp);

        info!(principal_id = %claims.sub, "Signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Principal {
        Principal {
            id: "user-001".to_string(),
            email: "owner@acme.example".to_string(),
            display_name: Some("Acme Owner".to_string()),
            role: Role::Owner,
            tenant_id: Some("tenant-001".to_string()),
            company_id: None,
        }
    }

    #[tokio::test]
    async fn test_issue_then_authenticate() {
        let provider = JwtIdentityProvider::new("test-secret", 3600);

        let session = provider.issue(&owner()).unwrap();
        let principal = provider
            .authenticate(&Credentials::bearer(&session.token))
            .await
            .unwrap();

        assert_eq!(principal, owner());
        assert!(session.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn test_wrong_secret_is_rejected() {
        let issuer = JwtIdentityProvider::new("test-secret", 3600);
        let other = JwtIdentityProvider::new("other-secret", 3600);

        let session = issuer.issue(&owner()).unwrap();
        let err = other
            .authenticate(&Credentials::bearer(session.token))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let provider = JwtIdentityProvider::new("test-secret", 3600);
        let past = Utc::now() - Duration::hours(2);

        let token = provider
            .sign(&Claims {
                sub: "user-001".to_string(),
                email: "owner@acme.example".to_string(),
                name: None,
                role: Role::Owner,
                tenant_id: Some("tenant-001".to_string()),
                company_id: None,
                iat: past.timestamp(),
                exp: (past + Duration::minutes(5)).timestamp(),
                jti: Uuid::new_v4().to_string(),
            })
            .unwrap();

        let err = provider
            .authenticate(&Credentials::bearer(token))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_sign_out_revokes_only_that_token() {
        let provider = JwtIdentityProvider::new("test-secret", 3600);
        let first = provider.issue(&owner()).unwrap();
        let second = provider.issue(&owner()).unwrap();

        provider
            .sign_out(&Credentials::bearer(&first.token))
            .await
            .unwrap();

        let err = provider
            .authenticate(&Credentials::bearer(&first.token))
            .await
            .unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::Unauthenticated);

        provider
            .authenticate(&Credentials::bearer(&second.token))
            .await
            .unwrap();
    }

    #[test]
    fn test_authorization_header() {
        assert_eq!(
            Credentials::from_authorization_header("Bearer abc.def"),
            Some(Credentials::bearer("abc.def"))
        );
        assert_eq!(Credentials::from_authorization_header("Basic abc"), None);
        assert_eq!(Credentials::from_authorization_header("Bearer "), None);
    }
}
