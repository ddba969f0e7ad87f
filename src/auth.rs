use std::result::Result as DefaultResult;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use http::header;
use http::StatusCode as HttpStatusCode;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{decode as jwt_decode, Algorithm, DecodingKey, Validation as JwtValidation};
use serde::{Deserialize, Serialize};

use crate::constant::app_meta;
use crate::AppSharedState;

#[derive(Debug)]
pub enum AuthJwtError {
    MissingHeader,
    InvalidHeader,
    VerifyFailure(JwtErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppAuthRoleCode {
    Admin,
    Seller,
}

/// claim set issued by the user-management service, the token is signed with
/// a symmetric secret shared through deployment configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct AppAuthedClaim {
    pub profile: u32,
    pub iat: i64,
    pub exp: i64,
    pub aud: Vec<String>,
    #[serde(default)]
    pub roles: Vec<AppAuthRoleCode>,
}

impl AppAuthedClaim {
    pub fn contains_role(&self, code: AppAuthRoleCode) -> bool {
        self.roles.iter().any(|r| r == &code)
    }
    pub fn is_admin(&self) -> bool {
        self.contains_role(AppAuthRoleCode::Admin)
    }
    pub fn is_seller(&self) -> bool {
        self.contains_role(AppAuthRoleCode::Seller)
    }
}

pub fn validate_encoded_token(
    secret: &str,
    encoded: &str,
) -> DefaultResult<AppAuthedClaim, AuthJwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validator = {
        let aud = [app_meta::LABEL];
        let required_claims = ["profile", "aud", "exp", "iat"];
        let mut v = JwtValidation::new(Algorithm::HS256);
        v.set_audience(&aud);
        v.set_required_spec_claims(&required_claims);
        v
    };
    let decoded = jwt_decode::<AppAuthedClaim>(encoded, &key, &validator)?;
    Ok(decoded.claims)
}

impl From<JwtError> for AuthJwtError {
    fn from(value: JwtError) -> Self {
        Self::VerifyFailure(value.into_kind())
    }
}

impl From<AuthJwtError> for (HttpStatusCode, String) {
    fn from(value: AuthJwtError) -> Self {
        let status = match &value {
            AuthJwtError::MissingHeader | AuthJwtError::InvalidHeader => {
                HttpStatusCode::UNAUTHORIZED
            }
            AuthJwtError::VerifyFailure(ekind) => match ekind {
                JwtErrorKind::Json(_) | JwtErrorKind::InvalidToken => HttpStatusCode::BAD_REQUEST,
                JwtErrorKind::MissingRequiredClaim(_)
                | JwtErrorKind::InvalidAudience
                | JwtErrorKind::ExpiredSignature
                | JwtErrorKind::InvalidSignature
                | JwtErrorKind::InvalidAlgorithmName => HttpStatusCode::UNAUTHORIZED,
                _others => HttpStatusCode::INTERNAL_SERVER_ERROR,
            },
        };
        (status, format!("{:?}", value))
    }
}

#[async_trait]
impl FromRequestParts<AppSharedState> for AppAuthedClaim {
    type Rejection = (HttpStatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppSharedState,
    ) -> DefaultResult<Self, Self::Rejection> {
        let reject = <(HttpStatusCode, String)>::from;
        let hdr_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| reject(AuthJwtError::MissingHeader))?;
        let encoded = hdr_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| reject(AuthJwtError::InvalidHeader))?;
        let secret = state.config().api_server.auth.secret.as_str();
        validate_encoded_token(secret, encoded).map_err(reject)
    }
} // end of impl FromRequestParts for AppAuthedClaim
