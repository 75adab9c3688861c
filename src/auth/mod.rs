//! Shared-secret authentication for the stats backend
//!
//! Every upload and read endpoint takes an [`Authorized`] extractor. The
//! `Authorization` header must equal the configured token, optionally with a
//! `Bearer ` prefix.

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use tracing::warn;

use crate::error::{AppError, AuthError};
use crate::AppState;

/// Proof that the request carried the configured API token.
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

pub fn extract_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

pub fn verify_token(presented: Option<&str>, expected: &str) -> Result<(), AuthError> {
    match presented {
        None => Err(AuthError::MissingToken),
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(AuthError::InvalidToken),
    }
}

impl FromRequest for Authorized {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(AppError::InternalError("application state missing".to_string())));
        };

        let result = verify_token(extract_token(req), &state.config.auth.api_token)
            .map(|_| Authorized)
            .map_err(|e| {
                warn!("Authorization failed for {}: {}", req.path(), e);
                AppError::from(e)
            });

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extract_token_accepts_raw_and_bearer() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "secret"))
            .to_http_request();
        assert_eq!(extract_token(&req), Some("secret"));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer secret"))
            .to_http_request();
        assert_eq!(extract_token(&req), Some("secret"));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer "))
            .to_http_request();
        assert_eq!(extract_token(&req), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(extract_token(&req), None);
    }

    #[test]
    fn test_verify_token() {
        assert!(verify_token(Some("secret"), "secret").is_ok());
        assert!(matches!(verify_token(Some("nope"), "secret"), Err(AuthError::InvalidToken)));
        assert!(matches!(verify_token(None, "secret"), Err(AuthError::MissingToken)));
    }
}
