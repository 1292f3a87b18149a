// SPDX-License-Identifier: Apache-2.0

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use weightlog_model::{Email, UserId};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const MAX_TOKEN_LEN: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token algorithm is not supported")]
    UnsupportedAlgorithm,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("signing key is unusable")]
    InvalidKey,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and checks HS256 JSON Web Tokens.
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, ttl: std::time::Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::hours(1)),
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::InvalidKey)
    }

    pub fn issue(
        &self,
        user: UserId,
        email: &Email,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user.to_string(),
            email: email.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };
        let header_part =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).map_err(|_| TokenError::Malformed)?);
        let claims_part =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).map_err(|_| TokenError::Malformed)?);
        let signing_input = format!("{header_part}.{claims_part}");
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signing_input}.{sig_part}"))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::Malformed);
        }
        let mut parts = token.split('.');
        let (Some(header_part), Some(claims_part), Some(sig_part), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_json(header_part)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let sig = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(header_part.as_bytes());
        mac.update(b".");
        mac.update(claims_part.as_bytes());
        mac.verify_slice(&sig)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_json(claims_part)?;
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

fn decode_json<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("time")
    }

    fn signer(secret: &str) -> TokenSigner {
        TokenSigner::new(secret, std::time::Duration::from_secs(3600))
    }

    fn email() -> Email {
        Email::parse("user@example.com").expect("email")
    }

    #[test]
    fn issued_token_verifies_until_expiry() {
        let user = UserId::new_random();
        let token = signer("k").issue(user, &email(), now()).expect("issue");
        assert_eq!(token.split('.').count(), 3);

        let claims = signer("k").verify(&token, now()).expect("verify");
        assert_eq!(claims.sub, user.to_string());
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);

        let later = now() + Duration::seconds(3599);
        assert!(signer("k").verify(&token, later).is_ok());
        let expired = now() + Duration::seconds(3600);
        assert_eq!(signer("k").verify(&token, expired), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = signer("k1").issue(UserId::new_random(), &email(), now()).expect("issue");
        assert_eq!(signer("k2").verify(&token, now()), Err(TokenError::BadSignature));
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let token = signer("k").issue(UserId::new_random(), &email(), now()).expect("issue");
        let parts: Vec<&str> = token.split('.').collect();
        let forged = Claims {
            sub: UserId::new_random().to_string(),
            email: "evil@example.com".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        let forged_part = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).expect("json"));
        let forged_token = format!("{}.{}.{}", parts[0], forged_part, parts[2]);
        assert_eq!(signer("k").verify(&forged_token, now()), Err(TokenError::BadSignature));
    }

    #[test]
    fn unsigned_algorithm_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(br#"{"sub":"x","email":"e","iat":0,"exp":99999999999}"#);
        let token = format!("{header}.{claims}.");
        assert_eq!(
            signer("k").verify(&token, now()),
            Err(TokenError::UnsupportedAlgorithm)
        );
    }

    #[test]
    fn malformed_shapes_are_rejected() {
        for token in ["", "a.b", "a.b.c.d", "!!.??.**"] {
            assert_eq!(signer("k").verify(token, now()), Err(TokenError::Malformed), "{token}");
        }
    }

    proptest! {
        #[test]
        fn arbitrary_strings_never_verify(raw in "[A-Za-z0-9_.-]{0,200}") {
            prop_assert!(signer("k").verify(&raw, now()).is_err());
        }
    }
}
