//! Session token signing and verification.
//!
//! Tokens are three-part JWTs (`header.claims.signature`) signed with
//! HMAC-SHA256 over a process-wide secret. Claims embed the principal id and
//! role; validity is purely signature + expiry, with no server-side state and
//! no revocation list. A token stays valid until its `exp` passes, regardless
//! of logout.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Fixed validity window for issued tokens: 30 days.
pub const TOKEN_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

const TOKEN_ALG: &str = "HS256";

/// Principal role, fixed by the table the record lives in.
///
/// The set is closed: adding a role means adding a variant, and every
/// dispatch over roles is an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Organizer,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Organizer => "organizer",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: TOKEN_ALG.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Claims carried by a session token.
///
/// A role tag outside the closed [`Role`] set fails deserialization, which
/// verification reports as [`Error::Json`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("signing secret is not configured")]
    MissingSecret,
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| Error::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Issues and verifies session tokens.
///
/// Holds the immutable signing secret for the process lifetime; construction
/// fails when no secret is configured, which callers must treat as fatal at
/// startup rather than a per-request condition.
pub struct TokenSigner {
    secret: SecretString,
    ttl_seconds: i64,
}

impl TokenSigner {
    /// Build a signer from the configured secret.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSecret`] when the secret is empty.
    pub fn new(secret: SecretString, ttl_seconds: i64) -> Result<Self, Error> {
        if secret.expose_secret().is_empty() {
            return Err(Error::MissingSecret);
        }
        Ok(Self {
            secret,
            ttl_seconds,
        })
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Create a signed session token for a principal.
    ///
    /// # Errors
    ///
    /// Returns an error if header/claims JSON cannot be encoded.
    pub fn issue(&self, principal_id: Uuid, role: Role) -> Result<String, Error> {
        self.issue_at(principal_id, role, OffsetDateTime::now_utc().unix_timestamp())
    }

    pub(crate) fn issue_at(
        &self,
        principal_id: Uuid,
        role: Role,
        now_unix_seconds: i64,
    ) -> Result<String, Error> {
        let header = TokenHeader::hs256();
        let claims = SessionClaims {
            sub: principal_id,
            role,
            iat: now_unix_seconds,
            exp: now_unix_seconds + self.ttl_seconds,
        };
        let header_b64 = b64e_json(&header)?;
        let claims_b64 = b64e_json(&claims)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        let signature_b64 = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify a session token and return its decoded claims.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the token is malformed or contains invalid base64/json,
    /// - the algorithm is not `HS256`,
    /// - the signature does not match,
    /// - the token has expired.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, Error> {
        self.verify_at(token, OffsetDateTime::now_utc().unix_timestamp())
    }

    pub(crate) fn verify_at(
        &self,
        token: &str,
        now_unix_seconds: i64,
    ) -> Result<SessionClaims, Error> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(Error::TokenFormat)?;
        let claims_b64 = parts.next().ok_or(Error::TokenFormat)?;
        let sig_b64 = parts.next().ok_or(Error::TokenFormat)?;
        if parts.next().is_some() {
            return Err(Error::TokenFormat);
        }

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != TOKEN_ALG {
            return Err(Error::UnsupportedAlg(header.alg));
        }

        // Signature first; claims are only parsed once the input is trusted.
        let signing_input = format!("{header_b64}.{claims_b64}");
        let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| Error::Base64)?;
        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| Error::InvalidSignature)?;

        let claims: SessionClaims = b64d_json(claims_b64)?;
        if claims.exp <= now_unix_seconds {
            return Err(Error::Expired);
        }

        Ok(claims)
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length; new_from_slice only fails for
        // unsized keys, which cannot happen with a &[u8].
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .unwrap_or_else(|_| unreachable!("hmac accepts any key length"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const SECRET: &str = "gatherguru-test-signing-secret";

    fn signer() -> TokenSigner {
        TokenSigner::new(SecretString::from(SECRET.to_string()), TOKEN_TTL_SECONDS).unwrap()
    }

    fn forge(secret: &str, header_json: &str, claims_json: &str) -> String {
        let header_b64 = Base64UrlUnpadded::encode_string(header_json.as_bytes());
        let claims_b64 = Base64UrlUnpadded::encode_string(claims_json.as_bytes());
        let signing_input = format!("{header_b64}.{claims_b64}");
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signing_input.as_bytes());
        let sig_b64 = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());
        format!("{signing_input}.{sig_b64}")
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let result = TokenSigner::new(SecretString::from(String::new()), TOKEN_TTL_SECONDS);
        assert!(matches!(result, Err(Error::MissingSecret)));
    }

    #[test]
    fn issue_and_verify_round_trip_for_every_role() -> Result<(), Error> {
        let signer = signer();
        for role in [Role::Admin, Role::Organizer, Role::User] {
            let id = Uuid::new_v4();
            let token = signer.issue_at(id, role, NOW)?;
            let claims = signer.verify_at(&token, NOW + 60)?;
            assert_eq!(claims.sub, id);
            assert_eq!(claims.role, role);
            assert_eq!(claims.iat, NOW);
            assert_eq!(claims.exp, NOW + TOKEN_TTL_SECONDS);
        }
        Ok(())
    }

    #[test]
    fn token_has_three_base64url_parts() -> Result<(), Error> {
        let token = signer().issue_at(Uuid::new_v4(), Role::User, NOW)?;
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let header: TokenHeader = b64d_json(parts[0])?;
        assert_eq!(header, TokenHeader::hs256());
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> Result<(), Error> {
        let signer = signer();
        let token = signer.issue_at(Uuid::new_v4(), Role::User, NOW)?;
        // Boundary: exp == now counts as expired.
        assert!(matches!(
            signer.verify_at(&token, NOW + TOKEN_TTL_SECONDS),
            Err(Error::Expired)
        ));
        assert!(matches!(
            signer.verify_at(&token, NOW + TOKEN_TTL_SECONDS + 1),
            Err(Error::Expired)
        ));
        // Still fine one second before.
        assert!(signer.verify_at(&token, NOW + TOKEN_TTL_SECONDS - 1).is_ok());
        Ok(())
    }

    #[test]
    fn tampered_claims_fail_signature_check() -> Result<(), Error> {
        let signer = signer();
        let token = signer.issue_at(Uuid::new_v4(), Role::User, NOW)?;
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = Base64UrlUnpadded::encode_string(
            format!(
                r#"{{"sub":"{}","role":"admin","iat":{NOW},"exp":{}}}"#,
                Uuid::new_v4(),
                NOW + TOKEN_TTL_SECONDS
            )
            .as_bytes(),
        );
        let tampered = format!("{}.{forged_claims}.{}", parts[0], parts[2]);
        assert!(matches!(
            signer.verify_at(&tampered, NOW),
            Err(Error::InvalidSignature)
        ));
        Ok(())
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() -> Result<(), Error> {
        let other =
            TokenSigner::new(SecretString::from("other-secret".to_string()), TOKEN_TTL_SECONDS)
                .unwrap();
        let token = other.issue_at(Uuid::new_v4(), Role::Admin, NOW)?;
        assert!(matches!(
            signer().verify_at(&token, NOW),
            Err(Error::InvalidSignature)
        ));
        Ok(())
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let signer = signer();
        for bad in ["", "a", "a.b", "a.b.c.d", "not a token at all"] {
            assert!(signer.verify_at(bad, NOW).is_err(), "accepted {bad:?}");
        }
        assert!(matches!(
            signer.verify_at("!!!.@@@.###", NOW),
            Err(Error::Base64)
        ));
    }

    #[test]
    fn unsupported_algorithm_is_rejected() {
        let token = forge(
            SECRET,
            r#"{"alg":"none","typ":"JWT"}"#,
            r#"{"sub":"00000000-0000-0000-0000-000000000000","role":"user","iat":0,"exp":9999999999}"#,
        );
        assert!(matches!(
            signer().verify_at(&token, NOW),
            Err(Error::UnsupportedAlg(alg)) if alg == "none"
        ));
    }

    #[test]
    fn unknown_role_tag_is_rejected_after_signature_passes() {
        // Correctly signed, but the embedded role is not one of the three
        // recognized kinds.
        let claims = format!(
            r#"{{"sub":"{}","role":"superuser","iat":{NOW},"exp":{}}}"#,
            Uuid::new_v4(),
            NOW + TOKEN_TTL_SECONDS
        );
        let token = forge(SECRET, r#"{"alg":"HS256","typ":"JWT"}"#, &claims);
        assert!(matches!(signer().verify_at(&token, NOW), Err(Error::Json(_))));
    }

    #[test]
    fn role_tags_serialize_lowercase() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Organizer.as_str(), "organizer");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(serde_json::to_string(&Role::Organizer).unwrap(), r#""organizer""#);
    }
}
