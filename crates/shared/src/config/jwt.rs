use crate::{abstract_trait::JwtServiceTrait, errors::ClientError};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Payload of the access token issued by the users service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<usize>,
}

/// Reads access-token claims.
///
/// Clients normally do not hold the signing secret, so without one the
/// payload is decoded without signature verification. The gateway remains
/// the party that actually authenticates the token.
#[derive(Debug, Clone, Default)]
pub struct JwtConfig {
    pub jwt_secret: Option<String>,
}

impl JwtConfig {
    pub fn new(jwt_secret: Option<&str>) -> Self {
        JwtConfig {
            jwt_secret: jwt_secret.map(str::to_string),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        if self.jwt_secret.is_none() {
            validation.insecure_disable_signature_validation();
        }
        validation
    }
}

impl JwtServiceTrait for JwtConfig {
    fn decode_claims(&self, token: &str) -> Result<Claims, ClientError> {
        let secret = self.jwt_secret.as_deref().unwrap_or_default();
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        decode::<Claims>(token, &decoding_key, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| ClientError::NotAuthorized(format!("Invalid token: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn decodes_payload_without_secret() {
        let claims = Claims {
            user_id: 7,
            role: Some("admin".into()),
            exp: None,
        };
        let decoded = JwtConfig::default()
            .decode_claims(&token("server-side-secret", &claims))
            .unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn verifies_signature_when_secret_is_known() {
        let claims = Claims {
            user_id: 7,
            role: Some("customer".into()),
            exp: None,
        };
        let forged = token("other-secret", &claims);

        let config = JwtConfig::new(Some("vinfast-secret"));
        assert!(config.decode_claims(&forged).is_err());
        assert!(
            config
                .decode_claims(&token("vinfast-secret", &claims))
                .is_ok()
        );
    }

    #[test]
    fn garbage_token_is_not_authorized() {
        let err = JwtConfig::default().decode_claims("not-a-jwt").unwrap_err();
        assert!(matches!(err, ClientError::NotAuthorized(_)));
    }

    #[test]
    fn expired_token_still_decodes() {
        let claims = Claims {
            user_id: 1,
            role: None,
            exp: Some(1),
        };
        let decoded = JwtConfig::default()
            .decode_claims(&token("s", &claims))
            .unwrap();
        assert_eq!(decoded.exp, Some(1));
    }
}
