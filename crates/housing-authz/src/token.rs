//! Bearer-token minting and verification.
//!
//! Tokens are HS256 JWTs signed with a shared secret. The issuer string is used
//! as both `iss` and `aud`, so a token minted by one deployment is rejected by
//! another that is configured with a different issuer.
use crate::{Actor, AuthzError, AuthzResult, Role, UserId};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HousingClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl HousingClaims {
    pub fn user_id(&self) -> AuthzResult<UserId> {
        self.sub
            .parse()
            .map_err(|_| AuthzError::InvalidSubject(self.sub.clone()))
    }

    /// Actor described by the claims. An unknown role string yields an
    /// actor with no role.
    pub fn actor(&self) -> AuthzResult<Actor> {
        Ok(Actor::user(self.user_id()?, Role::parse(&self.role)))
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    issuer: String,
    ttl: Duration,
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> AuthzResult<Self> {
        if secret.is_empty() {
            return Err(AuthzError::EmptySecret);
        }
        Ok(Self {
            issuer: issuer.into(),
            ttl,
            encoding_key: EncodingKey::from_secret(secret),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn mint(&self, user_id: UserId, role: Role) -> AuthzResult<String> {
        let now = now_epoch_seconds();
        let lifetime = self.ttl.as_secs();
        let exp = i64::try_from(lifetime)
            .ok()
            .and_then(|lifetime| now.checked_add(lifetime))
            .ok_or(AuthzError::TokenLifetime(lifetime))?;
        let claims = HousingClaims {
            iss: self.issuer.clone(),
            aud: self.issuer.clone(),
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            exp,
            iat: now,
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    issuer: String,
    leeway: u64,
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(secret: &[u8], issuer: impl Into<String>, leeway: u64) -> AuthzResult<Self> {
        if secret.is_empty() {
            return Err(AuthzError::EmptySecret);
        }
        Ok(Self {
            issuer: issuer.into(),
            leeway,
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    pub fn verify(&self, token: &str) -> AuthzResult<HousingClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.issuer.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = self.leeway;
        let data = jsonwebtoken::decode::<HousingClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}
