// JWT identity gate
//
// Verifies a caller-presented bearer token and resolves it to a stable
// owner id before any session operation proceeds. Token issuance lives
// outside this service; the gate only verifies.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts, StatusCode};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Shared JWT verifier (HS256)
#[derive(Clone)]
pub struct JwtVerifier {
    decoding: Arc<DecodingKey>,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a token and resolve the owner id from its `sub` claim.
    /// Any failure (bad signature, expired, malformed sub) resolves to None.
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).ok()?;
        Uuid::parse_str(&data.claims.sub).ok()
    }
}

/// Extractor for the authenticated owner.
///
/// Rejects with 401 when the Authorization header is missing, is not a
/// bearer token, or fails verification.
pub struct AuthOwner(pub Uuid);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthOwner
where
    JwtVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = JwtVerifier::from_ref(state);

        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let owner_id = verifier.verify(token).ok_or(StatusCode::UNAUTHORIZED)?;
        Ok(AuthOwner(owner_id))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;
    use uuid::Uuid;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: usize,
    }

    /// Mint a token the way the external issuer would
    pub fn token_for(owner_id: Uuid, secret: &str, expires_in_secs: i64) -> String {
        let exp = (chrono::Utc::now().timestamp() + expires_in_secs) as usize;
        encode(
            &Header::default(),
            &TestClaims {
                sub: owner_id.to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }
}
