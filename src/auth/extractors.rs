use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use sha2::{Digest, Sha256};
use std::future::{ready, Ready};

use crate::config::SecurityConfig;
use crate::error::AppError;

/// Extractor for the service-role Bearer key on /api routes
///
/// Usage in handlers:
/// ```ignore
/// async fn my_handler(_auth: ServiceAuth) -> HttpResponse {
///     // only reached with a valid key, or when no key is configured
/// }
/// ```
pub struct ServiceAuth;

impl FromRequest for ServiceAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let security = match req.app_data::<web::Data<SecurityConfig>>() {
            Some(security) => security,
            None => {
                return ready(Err(AppError::Internal(
                    "Security configuration not registered".to_string(),
                )))
            }
        };

        let expected = match security.service_api_key {
            Some(ref key) => key,
            None => return ready(Ok(ServiceAuth)),
        };

        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        ready(check_bearer(header, expected).map(|_| ServiceAuth))
    }
}

/// Validates an `Authorization` header value against the expected key
pub fn check_bearer(header: Option<&str>, expected: &str) -> Result<(), AppError> {
    let header =
        header.ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized(
            "Invalid Authorization header format, expected 'Bearer <token>'".to_string(),
        )
    })?;

    if !keys_match(token.trim().as_bytes(), expected.as_bytes()) {
        return Err(AppError::Unauthorized("Invalid Bearer token".to_string()));
    }

    Ok(())
}

/// Constant-time comparison over SHA-256 digests, so neither the key bytes
/// nor its length show up in response timing
fn keys_match(a: &[u8], b: &[u8]) -> bool {
    let a = Sha256::digest(a);
    let b = Sha256::digest(b);
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
