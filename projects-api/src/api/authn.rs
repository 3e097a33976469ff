use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use log::warn;
use serde::Deserialize;
use thiserror::Error;

/// Authenticated principal, taken from the token's `sub` claim.
///
/// Inserted into request extensions by the middleware; immutable for the
/// lifetime of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject(String);

impl Subject {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AuthnError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("Authorization header is not a Bearer credential")]
    NotBearer,
    #[error("malformed access token")]
    Malformed,
    #[error("access token has no subject claim")]
    MissingSubject,
    #[error("access token is expired")]
    Expired,
    #[error("access token audience mismatch")]
    WrongAudience,
}

/// The `aud` claim may be a single string or an array of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AudienceClaim {
    One(String),
    Many(Vec<String>),
}

impl AudienceClaim {
    fn contains(&self, audience: &str) -> bool {
        match self {
            AudienceClaim::One(aud) => aud == audience,
            AudienceClaim::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    aud: Option<AudienceClaim>,
}

/// Extract and check the bearer token's claims.
///
/// Signature verification is the STS validation middleware's job (an
/// external collaborator); only claim contents are checked here. `audience`
/// empty disables the `aud` check.
fn subject_from_token(token: &str, audience: &str) -> Result<Subject, AuthnError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthnError::Malformed);
    };

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthnError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| AuthnError::Malformed)?;

    if let Some(exp) = claims.exp {
        if exp <= Utc::now().timestamp() {
            return Err(AuthnError::Expired);
        }
    }

    if !audience.is_empty() {
        match claims.aud {
            Some(aud) if aud.contains(audience) => {}
            _ => return Err(AuthnError::WrongAudience),
        }
    }

    match claims.sub {
        Some(sub) if !sub.is_empty() => Ok(Subject::new(sub)),
        _ => Err(AuthnError::MissingSubject),
    }
}

pub(super) async fn authentication_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let result = match request.headers().get(http::header::AUTHORIZATION) {
        None => Err(AuthnError::MissingHeader),
        Some(header) => match header.to_str() {
            Ok(value) if value.to_lowercase().starts_with("bearer ") => {
                subject_from_token(value[7..].trim(), &state.config.auth.audience)
            }
            Ok(_) | Err(_) => Err(AuthnError::NotBearer),
        },
    };

    match result {
        Ok(subject) => {
            request.extensions_mut().insert(subject);
            next.run(request).await
        }
        Err(err) => {
            warn!("Authentication failed: {err}");
            (StatusCode::UNAUTHORIZED, err.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_token, test_token_with_claims, TestFixture};
    use serde_json::json;

    #[test]
    fn test_subject_from_valid_token() {
        let token = test_token("u1");
        let subject = subject_from_token(&token, "projects-api").unwrap();
        assert_eq!(subject.id(), "u1");
    }

    #[test]
    fn test_rejects_garbage_token() {
        assert_eq!(
            subject_from_token("not-a-jwt", "projects-api"),
            Err(AuthnError::Malformed)
        );
        assert_eq!(
            subject_from_token("a.b.c.d", "projects-api"),
            Err(AuthnError::Malformed)
        );
        assert_eq!(
            subject_from_token("a.!!!.c", "projects-api"),
            Err(AuthnError::Malformed)
        );
    }

    #[test]
    fn test_rejects_missing_subject() {
        let token = test_token_with_claims(json!({ "aud": "projects-api" }));
        assert_eq!(
            subject_from_token(&token, "projects-api"),
            Err(AuthnError::MissingSubject)
        );
    }

    #[test]
    fn test_rejects_expired_token() {
        let token = test_token_with_claims(json!({
            "sub": "u1",
            "aud": "projects-api",
            "exp": 1_000_000,
        }));
        assert_eq!(
            subject_from_token(&token, "projects-api"),
            Err(AuthnError::Expired)
        );
    }

    #[test]
    fn test_rejects_wrong_audience() {
        let token = test_token_with_claims(json!({ "sub": "u1", "aud": "other-api" }));
        assert_eq!(
            subject_from_token(&token, "projects-api"),
            Err(AuthnError::WrongAudience)
        );
    }

    #[test]
    fn test_audience_array_form_accepted() {
        let token = test_token_with_claims(json!({
            "sub": "u1",
            "aud": ["something-else", "projects-api"],
        }));
        assert!(subject_from_token(&token, "projects-api").is_ok());
    }

    #[test]
    fn test_empty_audience_setting_disables_check() {
        let token = test_token_with_claims(json!({ "sub": "u1" }));
        assert!(subject_from_token(&token, "").is_ok());
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let fixture = TestFixture::new().await;
        let response = fixture.get_unauthenticated("/Projects").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_bearer_header() {
        let fixture = TestFixture::new().await;
        let response = fixture
            .get_with_header("/Projects", "Basic dXNlcjpwYXNz")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_bearer_passes() {
        let fixture = TestFixture::new().await;
        let response = fixture.get("/Projects", "u1").await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_is_unauthenticated() {
        let fixture = TestFixture::new().await;
        let response = fixture.get_unauthenticated("/health").await;
        response.assert_status(StatusCode::OK);
    }
}
