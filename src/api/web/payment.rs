use axum::debug_handler;
use axum::extract::{Json as ExtractJson, Path as ExtractPath, State as ExtractState};
use axum::http::{
    header as HttpHeader, HeaderMap as HttpHeaderMap, HeaderValue as HttpHeaderValue,
    StatusCode as HttpStatusCode,
};
use axum::response::IntoResponse;

use crate::api::web::dto::PaymentConfirmReqDto;
use crate::constant as AppConst;
use crate::error::AppErrorCode;
use crate::logging::{app_log_event, AppLogLevel};
use crate::repository::app_repo_order;
use crate::usecase::{
    CreatePaymentSessionUseCase, PaySessionUcOutput, PaymentConfirmUcOutput, PaymentConfirmUseCase,
};
use crate::{AppAuthedClaim, AppSharedState};

fn json_resp_headers() -> HttpHeaderMap {
    let resp_ctype_val = HttpHeaderValue::from_str(AppConst::HTTP_CONTENT_TYPE_JSON).unwrap();
    let mut hdr_map = HttpHeaderMap::new();
    hdr_map.insert(HttpHeader::CONTENT_TYPE, resp_ctype_val);
    hdr_map
}

fn serialize_or_500<T: serde::Serialize>(
    ok_status: HttpStatusCode,
    value: &T,
) -> (HttpStatusCode, String) {
    match serde_json::to_string(value) {
        Ok(s) => (ok_status, s),
        Err(_) => (
            HttpStatusCode::INTERNAL_SERVER_ERROR,
            r#"{"reason":"serialization-failure"}"#.to_string(),
        ),
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn create_session_handler(
    ExtractPath(oid): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(_appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let log_ctx = _appstate.log_context().clone();
    let ds = _appstate.datastore();
    let (status, body) = match app_repo_order(ds).await {
        Ok(repo_order) => {
            let uc = CreatePaymentSessionUseCase {
                glb_state: _appstate,
                repo_order,
                auth_claim: authed,
            };
            match uc.execute(oid.as_str()).await {
                Ok(PaySessionUcOutput::Success(dto)) => {
                    serialize_or_500(HttpStatusCode::CREATED, &dto)
                }
                Ok(PaySessionUcOutput::NotFound) => {
                    (HttpStatusCode::NOT_FOUND, r#"{}"#.to_string())
                }
                Ok(PaySessionUcOutput::PermissionDeny) => {
                    (HttpStatusCode::FORBIDDEN, r#"{}"#.to_string())
                }
                Ok(PaySessionUcOutput::AlreadyPaid) => (
                    HttpStatusCode::CONFLICT,
                    r#"{"reason":"order-already-paid"}"#.to_string(),
                ),
                Ok(PaySessionUcOutput::NotOnlineMethod) => (
                    HttpStatusCode::BAD_REQUEST,
                    r#"{"reason":"not-online-payment"}"#.to_string(),
                ),
                Err(e) if e.code == AppErrorCode::PaymentGatewayFailure => (
                    HttpStatusCode::BAD_GATEWAY,
                    r#"{"reason":"payment-gateway-failure"}"#.to_string(),
                ),
                Err(e) => {
                    app_log_event!(
                        log_ctx,
                        AppLogLevel::ERROR,
                        "pay-session failure, oid:{}, reason:{:?}",
                        oid.as_str(),
                        e
                    );
                    (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string())
                }
            }
        }
        Err(e) => {
            app_log_event!(log_ctx, AppLogLevel::ERROR, "repository init failure: {e}");
            (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string())
        }
    };
    (status, json_resp_headers(), body)
} // end of create_session_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn confirm_handler(
    ExtractPath(oid): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(_appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<PaymentConfirmReqDto>,
) -> impl IntoResponse {
    let log_ctx = _appstate.log_context().clone();
    let ds = _appstate.datastore();
    let (status, body) = match app_repo_order(ds).await {
        Ok(repo_order) => {
            let uc = PaymentConfirmUseCase {
                glb_state: _appstate,
                repo_order,
                auth_claim: authed,
            };
            match uc.execute(oid.as_str(), req_body).await {
                // repeated confirmation responds the same as the first one
                Ok(PaymentConfirmUcOutput::Success(detail))
                | Ok(PaymentConfirmUcOutput::AlreadyPaid(detail)) => {
                    serialize_or_500(HttpStatusCode::OK, detail.as_ref())
                }
                Ok(PaymentConfirmUcOutput::NotFound) => {
                    (HttpStatusCode::NOT_FOUND, r#"{}"#.to_string())
                }
                Ok(PaymentConfirmUcOutput::PermissionDeny) => {
                    (HttpStatusCode::FORBIDDEN, r#"{}"#.to_string())
                }
                Ok(PaymentConfirmUcOutput::MissingTxnId) => (
                    HttpStatusCode::BAD_REQUEST,
                    r#"{"reason":"missing-txn-id"}"#.to_string(),
                ),
                Err(e) => {
                    app_log_event!(
                        log_ctx,
                        AppLogLevel::ERROR,
                        "payment confirm failure, oid:{}, reason:{:?}",
                        oid.as_str(),
                        e
                    );
                    (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string())
                }
            }
        }
        Err(e) => {
            app_log_event!(log_ctx, AppLogLevel::ERROR, "repository init failure: {e}");
            (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string())
        }
    };
    (status, json_resp_headers(), body)
} // end of confirm_handler
