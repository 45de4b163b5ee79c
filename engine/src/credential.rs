use std::{fmt, time::Duration};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use color_eyre::Result;
use jsonwebtoken::{Algorithm, EncodingKey, crypto};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Environment variable {0} is not set")]
    Missing(String),

    #[error("Credential must have the form `id.secret`")]
    Malformed,
}

/// The static `id.secret` API key pair.
#[derive(Clone)]
pub struct Credential {
    id: String,
    secret: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenHeader {
    pub alg: String,
    pub sign_type: String,
}

/// Timestamps are milliseconds since the epoch.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub api_key: String,
    pub exp: i64,
    pub timestamp: i64,
}

impl Credential {
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        let (id, secret) = raw
            .trim()
            .split_once('.')
            .ok_or(CredentialError::Malformed)?;
        let (id, secret) = (id.trim(), secret.trim());
        if id.is_empty() || secret.is_empty() {
            return Err(CredentialError::Malformed);
        }

        Ok(Self {
            id: id.into(),
            secret: secret.into(),
        })
    }

    pub fn from_env(var: &str) -> Result<Self, CredentialError> {
        match std::env::var(var) {
            Ok(raw) if !raw.trim().is_empty() => Self::parse(&raw),
            _ => Err(CredentialError::Missing(var.into())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sign(&self, ttl: Duration) -> Result<AccessToken> {
        self.sign_at(Utc::now().timestamp_millis(), ttl)
    }

    /// Mints an HS256 token issued at `now_ms`.
    pub fn sign_at(&self, now_ms: i64, ttl: Duration) -> Result<AccessToken> {
        let header = TokenHeader {
            alg: "HS256".into(),
            sign_type: "SIGN".into(),
        };
        let claims = TokenClaims {
            api_key: self.id.clone(),
            exp: now_ms + i64::try_from(ttl.as_millis())?,
            timestamp: now_ms,
        };

        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?),
        );
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        let signature = crypto::sign(message.as_bytes(), &key, Algorithm::HS256)?;

        Ok(AccessToken(format!("{message}.{signature}")))
    }
}

/// Signed bearer token, shared read-only by every client of a run.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

impl From<String> for AccessToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use jsonwebtoken::DecodingKey;

    use super::*;

    fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> T {
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segment).unwrap()).unwrap()
    }

    #[test]
    fn token_expiry_is_issue_time_plus_ttl() {
        let cred = Credential::parse("my-id.my-secret").unwrap();
        let token = cred
            .sign_at(1_700_000_000_000, Duration::from_secs(3600))
            .unwrap();

        let parts = token.as_str().split('.').collect::<Vec<_>>();
        let [header, payload, signature] = parts[..] else {
            panic!("token should have three segments: {}", token.as_str());
        };

        let claims: TokenClaims = decode_segment(payload);
        assert_eq!(claims.api_key, "my-id");
        assert_eq!(claims.timestamp, 1_700_000_000_000);
        assert_eq!(claims.exp, claims.timestamp + 3_600_000);

        let header: TokenHeader = decode_segment(header);
        assert_eq!(header.alg, "HS256");
        assert_eq!(header.sign_type, "SIGN");

        let message = format!("{}.{}", parts[0], parts[1]);
        assert!(
            crypto::verify(
                signature,
                message.as_bytes(),
                &DecodingKey::from_secret(b"my-secret"),
                Algorithm::HS256
            )
            .unwrap()
        );
        assert!(
            !crypto::verify(
                signature,
                message.as_bytes(),
                &DecodingKey::from_secret(b"other-secret"),
                Algorithm::HS256
            )
            .unwrap()
        );
    }

    #[test]
    fn custom_ttl() {
        let cred = Credential::parse("id.secret").unwrap();
        let token = cred.sign_at(42, Duration::from_secs(60)).unwrap();
        let payload = token.as_str().split('.').nth(1).unwrap();
        let claims: TokenClaims = decode_segment(payload);
        assert_eq!(claims.exp - claims.timestamp, 60_000);
    }

    #[test]
    fn live_token_expiry() {
        let cred = Credential::parse("id.secret").unwrap();
        let token = cred.sign(Duration::from_secs(3600)).unwrap();
        let payload = token.as_str().split('.').nth(1).unwrap();
        let claims: TokenClaims = decode_segment(payload);
        assert_eq!(claims.exp, claims.timestamp + 3_600_000);
    }

    #[test]
    fn header_encoding() {
        let token = Credential::parse("a.b")
            .unwrap()
            .sign_at(0, Duration::ZERO)
            .unwrap();
        let header = token.as_str().split('.').next().unwrap();
        let json = String::from_utf8(URL_SAFE_NO_PAD.decode(header).unwrap()).unwrap();
        expect![[r#"{"alg":"HS256","sign_type":"SIGN"}"#]].assert_eq(&json);
    }

    #[test]
    fn malformed_credentials() {
        for raw in ["", "   ", "no-separator", ".secret", "id.", " . "] {
            assert_eq!(
                Credential::parse(raw).unwrap_err(),
                CredentialError::Malformed,
                "{raw:?}"
            );
        }
    }

    #[test]
    fn secret_may_contain_dots() {
        let cred = Credential::parse(" id.sec.ret \n").unwrap();
        assert_eq!(cred.id(), "id");
        assert_eq!(cred.secret, "sec.ret");
    }

    #[test]
    fn unset_env_var() {
        let var = "ILLUSTRATE_TEST_CREDENTIAL_THAT_IS_NEVER_SET";
        assert_eq!(
            Credential::from_env(var).unwrap_err(),
            CredentialError::Missing(var.into())
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cred = Credential::parse("id.topsecret").unwrap();
        assert!(!format!("{cred:?}").contains("topsecret"));
        let token = cred.sign_at(0, Duration::from_secs(1)).unwrap();
        assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
    }
}
