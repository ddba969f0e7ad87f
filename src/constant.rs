use crate::WebApiHdlrLabel;

pub mod app_meta {
    pub const LABEL: &str = "storefront-order";
    pub const MACHINE_CODE: u8 = 1;
    // TODO, machine code to UUID generator should be configurable
}

pub const ENV_VAR_CONFIG_FILE_PATH: &str = "CONFIG_FILE_PATH";

pub mod hard_limit {
    pub const MAX_ITEMS_STORED_PER_MODEL: u32 = 2200u32;
    pub const MAX_ORDER_LINES_PER_REQUEST: usize = 365;
    pub const MAX_ORDER_LINE_QTY: u32 = 10000;
    pub const MAX_NOTIFY_QUEUE_DEPTH: usize = 512;
    pub const MAX_NOTIFY_RETRIES: u8 = 3;
}

pub(crate) mod api {
    use super::WebApiHdlrLabel;

    #[allow(non_camel_case_types)]
    pub(crate) struct web {}

    impl web {
        pub(crate) const CREATE_NEW_ORDER: WebApiHdlrLabel = "create_new_order";
        pub(crate) const READ_ORDER: WebApiHdlrLabel = "read_order";
        pub(crate) const LIST_ORDERS_MINE: WebApiHdlrLabel = "list_orders_mine";
        pub(crate) const LIST_ORDERS_SELLER: WebApiHdlrLabel = "list_orders_seller";
        pub(crate) const CANCEL_ORDER: WebApiHdlrLabel = "cancel_order";
        pub(crate) const CREATE_PAYMENT_SESSION: WebApiHdlrLabel = "create_payment_session";
        pub(crate) const CONFIRM_PAYMENT: WebApiHdlrLabel = "confirm_payment";
        pub(crate) const ADVANCE_ORDER_STATUS: WebApiHdlrLabel = "advance_order_status";
        pub(crate) const MARK_ORDER_DELIVERED: WebApiHdlrLabel = "mark_order_delivered";
        pub(crate) const ADMIN_ORDER_STATS: WebApiHdlrLabel = "admin_order_stats";
    }
} // end of inner-mod api

pub(crate) const HTTP_CONTENT_TYPE_JSON: &str = "application/json";

// transaction IDs recorded through the manual (cash-on-delivery) path
// carry this prefix, no external processor is involved
pub const MANUAL_TXN_ID_PREFIX: &str = "manual:";

pub mod logging {
    use serde::Deserialize;

    #[derive(Deserialize, Clone, Copy)]
    pub enum Level {
        TRACE,
        DEBUG,
        INFO,
        WARNING,
        ERROR,
        FATAL,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Destination {
        CONSOLE,
        LOCALFS,
    }
}
