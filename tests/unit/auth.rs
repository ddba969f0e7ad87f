use chrono::Local;
use http::StatusCode as HttpStatusCode;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{encode as jwt_encode, Algorithm, EncodingKey, Header as JwtHeader};
use serde_json::json;

use storefront::constant::app_meta;
use storefront::{validate_encoded_token, AppAuthRoleCode, AuthJwtError};

use crate::ut_authed_claim;

const UT_SECRET: &str = "test-only-signing-secret";

fn ut_encode(secret: &str, claim: &impl serde::Serialize) -> String {
    let key = EncodingKey::from_secret(secret.as_bytes());
    jwt_encode(&JwtHeader::new(Algorithm::HS256), claim, &key).unwrap()
}

#[test]
fn verify_ok_with_roles() {
    let mut claim = ut_authed_claim(188, vec![AppAuthRoleCode::Seller]);
    claim.roles.push(AppAuthRoleCode::Admin);
    let encoded = ut_encode(UT_SECRET, &claim);
    let decoded = validate_encoded_token(UT_SECRET, encoded.as_str()).unwrap();
    assert_eq!(decoded.profile, 188);
    assert!(decoded.is_seller());
    assert!(decoded.is_admin());
}

#[test]
fn verify_roles_default_empty() {
    // tokens minted before the roles claim existed still verify
    let now = Local::now().timestamp();
    let claim = json!({
        "profile": 52u32,
        "iat": now,
        "exp": now + 600,
        "aud": [app_meta::LABEL],
    });
    let encoded = ut_encode(UT_SECRET, &claim);
    let decoded = validate_encoded_token(UT_SECRET, encoded.as_str()).unwrap();
    assert_eq!(decoded.profile, 52);
    assert!(decoded.roles.is_empty());
    assert!(!decoded.is_seller());
}

#[test]
fn verify_wrong_signature() {
    let claim = ut_authed_claim(188, vec![]);
    let encoded = ut_encode("some-other-secret", &claim);
    let error = validate_encoded_token(UT_SECRET, encoded.as_str())
        .err()
        .unwrap();
    assert!(matches!(
        error,
        AuthJwtError::VerifyFailure(JwtErrorKind::InvalidSignature)
    ));
}

#[test]
fn verify_wrong_audience() {
    let mut claim = ut_authed_claim(188, vec![]);
    claim.aud = vec!["some-other-service".to_string()];
    let encoded = ut_encode(UT_SECRET, &claim);
    let error = validate_encoded_token(UT_SECRET, encoded.as_str())
        .err()
        .unwrap();
    assert!(matches!(
        error,
        AuthJwtError::VerifyFailure(JwtErrorKind::InvalidAudience)
    ));
}

#[test]
fn verify_expired() {
    let mut claim = ut_authed_claim(188, vec![]);
    claim.iat -= 7200;
    claim.exp -= 7200;
    let encoded = ut_encode(UT_SECRET, &claim);
    let error = validate_encoded_token(UT_SECRET, encoded.as_str())
        .err()
        .unwrap();
    assert!(matches!(
        error,
        AuthJwtError::VerifyFailure(JwtErrorKind::ExpiredSignature)
    ));
}

#[test]
fn rejection_status_mapping() {
    let cases = [
        (AuthJwtError::MissingHeader, HttpStatusCode::UNAUTHORIZED),
        (AuthJwtError::InvalidHeader, HttpStatusCode::UNAUTHORIZED),
        (
            AuthJwtError::VerifyFailure(JwtErrorKind::InvalidToken),
            HttpStatusCode::BAD_REQUEST,
        ),
        (
            AuthJwtError::VerifyFailure(JwtErrorKind::MissingRequiredClaim("profile".to_string())),
            HttpStatusCode::UNAUTHORIZED,
        ),
        (
            AuthJwtError::VerifyFailure(JwtErrorKind::ExpiredSignature),
            HttpStatusCode::UNAUTHORIZED,
        ),
        (
            AuthJwtError::VerifyFailure(JwtErrorKind::InvalidSignature),
            HttpStatusCode::UNAUTHORIZED,
        ),
    ];
    for (error, expect) in cases {
        let (status, _detail) = <(HttpStatusCode, String)>::from(error);
        assert_eq!(status, expect);
    }
}

#[test]
fn verify_garbage_token() {
    let error = validate_encoded_token(UT_SECRET, "not-a-jwt-at-all")
        .err()
        .unwrap();
    assert!(matches!(error, AuthJwtError::VerifyFailure(_)));
}
