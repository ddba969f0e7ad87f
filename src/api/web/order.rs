use axum::debug_handler;
use axum::extract::{Json as ExtractJson, Path as ExtractPath, State as ExtractState};
use axum::http::{
    header as HttpHeader, HeaderMap as HttpHeaderMap, HeaderValue as HttpHeaderValue,
    StatusCode as HttpStatusCode,
};
use axum::response::IntoResponse;

use crate::api::web::dto::{OrderCreateReqData, StatusAdvanceReqDto};
use crate::constant as AppConst;
use crate::logging::{app_log_event, AppLogLevel};
use crate::repository::{app_repo_order, app_repo_product};
use crate::usecase::{
    AdvanceStatusUcOutput, AdvanceStatusUseCase, CancelOrderUcOutput, CancelOrderUseCase,
    CreateOrderUsKsErr, CreateOrderUseCase, ListOwnerOrdersUseCase, MarkDeliveredUseCase,
    ReadOrderUcOutput, ReadOrderUseCase,
};
use crate::{AppAuthedClaim, AppSharedState};

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

fn json_resp_headers() -> HttpHeaderMap {
    let resp_ctype_val = HttpHeaderValue::from_str(AppConst::HTTP_CONTENT_TYPE_JSON).unwrap();
    let mut hdr_map = HttpHeaderMap::new();
    hdr_map.insert(HttpHeader::CONTENT_TYPE, resp_ctype_val);
    hdr_map
}

// always to specify state type explicitly to the debug macro
#[debug_handler(state = AppSharedState)]
pub(super) async fn create_handler(
    authed: AppAuthedClaim,
    ExtractState(_appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<OrderCreateReqData>,
) -> impl IntoResponse {
    let usr_id = authed.profile;
    let log_ctx = _appstate.log_context().clone();
    let ds = _appstate.datastore();
    let results = (
        app_repo_order(ds.clone()).await,
        app_repo_product(ds).await,
    );
    let (resp_status_code, serial_resp_body) = if let (Ok(repo_order), Ok(repo_product)) = results {
        let uc = CreateOrderUseCase {
            glb_state: _appstate,
            repo_order,
            repo_product,
            auth_claim: authed,
        };
        match uc.execute(req_body).await {
            Ok(value) => serialize_or_500(HttpStatusCode::CREATED, &value),
            Err(CreateOrderUsKsErr::ReqContent(value)) => {
                serialize_or_500(HttpStatusCode::BAD_REQUEST, &value)
            }
            Err(CreateOrderUsKsErr::Server(errors)) => {
                let msg = errors
                    .into_iter()
                    .map(|e| format!("{:?}", e))
                    .collect::<Vec<_>>()
                    .join(", ");
                app_log_event!(log_ctx, AppLogLevel::ERROR, "{msg}");
                (
                    HttpStatusCode::INTERNAL_SERVER_ERROR,
                    r#"{"reason":"internal-error"}"#.to_string(),
                )
            }
        }
    } else {
        app_log_event!(
            log_ctx,
            AppLogLevel::ERROR,
            "repository init failure, user:{}",
            usr_id
        );
        (
            HttpStatusCode::INTERNAL_SERVER_ERROR,
            r#"{"reason":"internal-error"}"#.to_string(),
        )
    };
    (resp_status_code, json_resp_headers(), serial_resp_body)
} // end of create_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn read_handler(
    ExtractPath(oid): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(_appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let log_ctx = _appstate.log_context().clone();
    let ds = _appstate.datastore();
    let (status, body) = match app_repo_order(ds).await {
        Ok(repo_order) => {
            let uc = ReadOrderUseCase {
                repo_order,
                auth_claim: authed,
            };
            match uc.execute(oid.as_str()).await {
                Ok(ReadOrderUcOutput::Full(detail)) => {
                    serialize_or_500(HttpStatusCode::OK, detail.as_ref())
                }
                Ok(ReadOrderUcOutput::SellerScope(view)) => {
                    serialize_or_500(HttpStatusCode::OK, view.as_ref())
                }
                Ok(ReadOrderUcOutput::NotFound) => {
                    (HttpStatusCode::NOT_FOUND, r#"{}"#.to_string())
                }
                Ok(ReadOrderUcOutput::PermissionDeny) => {
                    (HttpStatusCode::FORBIDDEN, r#"{}"#.to_string())
                }
                Err(e) => {
                    app_log_event!(
                        log_ctx,
                        AppLogLevel::ERROR,
                        "read order failure, oid:{}, reason:{:?}",
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
} // end of read_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn list_mine_handler(
    authed: AppAuthedClaim,
    ExtractState(_appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let log_ctx = _appstate.log_context().clone();
    let ds = _appstate.datastore();
    let (status, body) = match app_repo_order(ds).await {
        Ok(repo_order) => {
            let uc = ListOwnerOrdersUseCase {
                repo_order,
                auth_claim: authed,
            };
            match uc.execute().await {
                Ok(items) => serialize_or_500(HttpStatusCode::OK, &items),
                Err(e) => {
                    app_log_event!(log_ctx, AppLogLevel::ERROR, "list orders failure: {:?}", e);
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
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn cancel_handler(
    ExtractPath(oid): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(_appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let log_ctx = _appstate.log_context().clone();
    let ds = _appstate.datastore();
    let results = (
        app_repo_order(ds.clone()).await,
        app_repo_product(ds).await,
    );
    let (status, body) = if let (Ok(repo_order), Ok(repo_product)) = results {
        let uc = CancelOrderUseCase {
            glb_state: _appstate,
            repo_order,
            repo_product,
            auth_claim: authed,
        };
        match uc.execute(oid.as_str()).await {
            Ok(CancelOrderUcOutput::Success) => (HttpStatusCode::OK, r#"{}"#.to_string()),
            Ok(CancelOrderUcOutput::NotFound) => (HttpStatusCode::NOT_FOUND, r#"{}"#.to_string()),
            Ok(CancelOrderUcOutput::PermissionDeny) => {
                (HttpStatusCode::FORBIDDEN, r#"{}"#.to_string())
            }
            Err(e) => {
                app_log_event!(
                    log_ctx,
                    AppLogLevel::ERROR,
                    "cancel order failure, oid:{}, reason:{:?}",
                    oid.as_str(),
                    e
                );
                (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string())
            }
        }
    } else {
        app_log_event!(log_ctx, AppLogLevel::ERROR, "repository init failure");
        (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string())
    };
    (status, json_resp_headers(), body)
} // end of cancel_handler

fn advance_status_response(
    result: Result<AdvanceStatusUcOutput, crate::error::AppError>,
) -> (HttpStatusCode, String) {
    match result {
        Ok(AdvanceStatusUcOutput::Success(detail)) => {
            serialize_or_500(HttpStatusCode::OK, detail.as_ref())
        }
        Ok(AdvanceStatusUcOutput::NotFound) => (HttpStatusCode::NOT_FOUND, r#"{}"#.to_string()),
        Ok(AdvanceStatusUcOutput::PermissionDeny) => {
            (HttpStatusCode::FORBIDDEN, r#"{}"#.to_string())
        }
        Ok(AdvanceStatusUcOutput::InvalidTransition(e)) => {
            let detail = e.detail.unwrap_or_default();
            let body = format!(r#"{{"reason":"invalid-status-transition","detail":"{}"}}"#, detail);
            (HttpStatusCode::CONFLICT, body)
        }
        Err(_e) => (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string()),
    }
}

#[debug_handler(state = AppSharedState)]
pub(super) async fn advance_status_handler(
    ExtractPath(oid): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(_appstate): ExtractState<AppSharedState>,
    ExtractJson(req_body): ExtractJson<StatusAdvanceReqDto>,
) -> impl IntoResponse {
    let log_ctx = _appstate.log_context().clone();
    let ds = _appstate.datastore();
    let (status, body) = match app_repo_order(ds).await {
        Ok(repo_order) => {
            let uc = AdvanceStatusUseCase {
                glb_state: _appstate,
                repo_order,
                auth_claim: authed,
            };
            let result = uc.execute(oid.as_str(), req_body).await;
            if let Err(e) = result.as_ref() {
                app_log_event!(
                    log_ctx,
                    AppLogLevel::ERROR,
                    "status advance failure, oid:{}, reason:{:?}",
                    oid.as_str(),
                    e
                );
            }
            advance_status_response(result)
        }
        Err(e) => {
            app_log_event!(log_ctx, AppLogLevel::ERROR, "repository init failure: {e}");
            (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string())
        }
    };
    (status, json_resp_headers(), body)
} // end of advance_status_handler

#[debug_handler(state = AppSharedState)]
pub(super) async fn mark_delivered_handler(
    ExtractPath(oid): ExtractPath<String>,
    authed: AppAuthedClaim,
    ExtractState(_appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let log_ctx = _appstate.log_context().clone();
    let ds = _appstate.datastore();
    let (status, body) = match app_repo_order(ds).await {
        Ok(repo_order) => {
            let uc = MarkDeliveredUseCase {
                glb_state: _appstate,
                repo_order,
                auth_claim: authed,
            };
            let result = uc.execute(oid.as_str()).await;
            if let Err(e) = result.as_ref() {
                app_log_event!(
                    log_ctx,
                    AppLogLevel::ERROR,
                    "mark delivered failure, oid:{}, reason:{:?}",
                    oid.as_str(),
                    e
                );
            }
            advance_status_response(result)
        }
        Err(e) => {
            app_log_event!(log_ctx, AppLogLevel::ERROR, "repository init failure: {e}");
            (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string())
        }
    };
    (status, json_resp_headers(), body)
}
