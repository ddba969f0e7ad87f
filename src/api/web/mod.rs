use std::collections::HashMap;

use axum::routing::{delete, get, patch, post, MethodRouter};
use http_body::Body as HttpBody;

use crate::config::WebApiRouteCfg;
use crate::constant::api::web as WebConst;
use crate::{AppSharedState, WebApiHdlrLabel};

mod admin;
pub mod dto;
mod order;
mod payment;
mod seller;

// type parameter `B` for http body of the method router has to match the same
// type parameter in `axum::Router`
pub type ApiRouteType<HB> = MethodRouter<AppSharedState, HB>;
pub type ApiRouteTableType<HB> = HashMap<WebApiHdlrLabel, ApiRouteType<HB>>;

pub fn route_table<HB>() -> ApiRouteTableType<HB>
where
    HB: HttpBody + Send + 'static,
    <HB as HttpBody>::Data: Send,
    <HB as HttpBody>::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut out: ApiRouteTableType<HB> = HashMap::new();
    out.insert(WebConst::CREATE_NEW_ORDER, post(order::create_handler));
    out.insert(WebConst::READ_ORDER, get(order::read_handler));
    out.insert(WebConst::LIST_ORDERS_MINE, get(order::list_mine_handler));
    out.insert(WebConst::CANCEL_ORDER, delete(order::cancel_handler));
    out.insert(
        WebConst::LIST_ORDERS_SELLER,
        get(seller::list_orders_handler),
    );
    out.insert(
        WebConst::CREATE_PAYMENT_SESSION,
        post(payment::create_session_handler),
    );
    out.insert(WebConst::CONFIRM_PAYMENT, patch(payment::confirm_handler));
    out.insert(
        WebConst::ADVANCE_ORDER_STATUS,
        patch(order::advance_status_handler),
    );
    out.insert(
        WebConst::MARK_ORDER_DELIVERED,
        patch(order::mark_delivered_handler),
    );
    out.insert(WebConst::ADMIN_ORDER_STATS, get(admin::stats_handler));
    out
}

/// canonical path-to-handler bindings, the config file may override paths but
/// tests and local tooling rely on this table
pub fn default_route_cfg() -> Vec<WebApiRouteCfg> {
    [
        ("/order", WebConst::CREATE_NEW_ORDER),
        ("/order/mine", WebConst::LIST_ORDERS_MINE),
        ("/order/seller", WebConst::LIST_ORDERS_SELLER),
        ("/order/stats", WebConst::ADMIN_ORDER_STATS),
        ("/order/:oid", WebConst::READ_ORDER),
        // same path as READ_ORDER, the method routers merge on registration
        ("/order/:oid", WebConst::CANCEL_ORDER),
        ("/order/:oid/payment-session", WebConst::CREATE_PAYMENT_SESSION),
        ("/order/:oid/payment", WebConst::CONFIRM_PAYMENT),
        ("/order/:oid/status", WebConst::ADVANCE_ORDER_STATUS),
        ("/order/:oid/delivered", WebConst::MARK_ORDER_DELIVERED),
    ]
    .into_iter()
    .map(|(path, handler)| WebApiRouteCfg {
        path: path.to_string(),
        handler: handler.to_string(),
    })
    .collect()
}
