//! Verification of bearer tokens issued by the auth service.

use std::collections::BTreeSet;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an access token.
///
/// `sub` is the caller's user id. The auth service has emitted it both as a
/// JSON number and as a numeric string, so both are accepted.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Subject,
    pub exp: i64,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Id(i64),
    Text(String),
}

impl Subject {
    fn user_id(&self) -> Option<i32> {
        match self {
            Subject::Id(id) => i32::try_from(*id).ok(),
            Subject::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl AccessClaims {
    /// Every role named by the token, merged from `role` and `roles`.
    pub fn role_set(&self) -> BTreeSet<String> {
        self.role
            .iter()
            .chain(self.roles.iter())
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect()
    }
}

/// Identity resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: i32,
    pub roles: BTreeSet<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("token subject is not a user id")]
    BadSubject,
}

/// HS256 verifier sharing its secret with the auth service.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenError> {
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.key, &self.validation)?;
        let claims = data.claims;

        let user_id = claims.sub.user_id().ok_or(TokenError::BadSubject)?;

        Ok(VerifiedIdentity {
            user_id,
            roles: claims.role_set(),
        })
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};

    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn mint(claims: &serde_json::Value, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        (chrono::Utc::now() + chrono::Duration::minutes(5)).timestamp()
    }

    #[test]
    fn accepts_numeric_and_string_subjects() {
        let verifier = TokenVerifier::new(SECRET);

        let numeric = mint(&serde_json::json!({ "sub": 7, "exp": future_exp() }), SECRET);
        assert_eq!(verifier.verify(&numeric).unwrap().user_id, 7);

        let text = mint(
            &serde_json::json!({ "sub": "12", "exp": future_exp(), "role": "admin" }),
            SECRET,
        );
        let identity = verifier.verify(&text).unwrap();
        assert_eq!(identity.user_id, 12);
        assert!(identity.roles.contains("admin"));
    }

    #[test]
    fn merges_role_and_roles() {
        let verifier = TokenVerifier::new(SECRET);
        let token = mint(
            &serde_json::json!({
                "sub": 1,
                "exp": future_exp(),
                "role": "user",
                "roles": ["moderator", " "]
            }),
            SECRET,
        );
        let roles = verifier.verify(&token).unwrap().roles;
        assert_eq!(roles.into_iter().collect::<Vec<_>>(), vec!["moderator", "user"]);
    }

    #[test]
    fn rejects_wrong_secret() {
        let verifier = TokenVerifier::new(SECRET);
        let token = mint(&serde_json::json!({ "sub": 1, "exp": future_exp() }), "other");
        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let verifier = TokenVerifier::new(SECRET);
        let exp = (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp();
        let token = mint(&serde_json::json!({ "sub": 1, "exp": exp }), SECRET);
        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_non_numeric_subject() {
        let verifier = TokenVerifier::new(SECRET);
        let token = mint(
            &serde_json::json!({ "sub": "alice", "exp": future_exp() }),
            SECRET,
        );
        assert!(matches!(verifier.verify(&token), Err(TokenError::BadSubject)));
    }
}
