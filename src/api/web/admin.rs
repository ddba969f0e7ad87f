use axum::debug_handler;
use axum::extract::State as ExtractState;
use axum::http::{
    header as HttpHeader, HeaderMap as HttpHeaderMap, HeaderValue as HttpHeaderValue,
    StatusCode as HttpStatusCode,
};
use axum::response::IntoResponse;

use crate::constant as AppConst;
use crate::logging::{app_log_event, AppLogLevel};
use crate::repository::app_repo_order;
use crate::usecase::AdminOrderStatsUseCase;
use crate::{AppAuthedClaim, AppSharedState};

#[debug_handler(state = AppSharedState)]
pub(super) async fn stats_handler(
    authed: AppAuthedClaim,
    ExtractState(_appstate): ExtractState<AppSharedState>,
) -> impl IntoResponse {
    let log_ctx = _appstate.log_context().clone();
    let ds = _appstate.datastore();
    let (status, body) = match app_repo_order(ds).await {
        Ok(repo_order) => {
            let uc = AdminOrderStatsUseCase {
                repo_order,
                auth_claim: authed,
            };
            match uc.execute().await {
                Ok(Some(stats)) => match serde_json::to_string(&stats) {
                    Ok(s) => (HttpStatusCode::OK, s),
                    Err(_) => (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string()),
                },
                Ok(None) => (HttpStatusCode::FORBIDDEN, r#"{}"#.to_string()),
                Err(e) => {
                    app_log_event!(log_ctx, AppLogLevel::ERROR, "order stats failure: {:?}", e);
                    (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string())
                }
            }
        }
        Err(e) => {
            app_log_event!(log_ctx, AppLogLevel::ERROR, "repository init failure: {e}");
            (HttpStatusCode::INTERNAL_SERVER_ERROR, r#"{}"#.to_string())
        }
    };
    let resp_ctype_val = HttpHeaderValue::from_str(AppConst::HTTP_CONTENT_TYPE_JSON).unwrap();
    let mut hdr_map = HttpHeaderMap::new();
    hdr_map.insert(HttpHeader::CONTENT_TYPE, resp_ctype_val);
    (status, hdr_map, body)
}
