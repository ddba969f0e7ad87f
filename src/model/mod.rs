mod order;
mod stock;

pub use order::{
    OrderChargeModel, OrderLineModel, OrderLinePriceModel, OrderModel, OrderStatus, PaymentMethod,
    PaymentResultModel, SellerOrderViewModel, ShippingAddrModel,
};
pub use stock::{ProductModel, StockLevelModelSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseProductIdentity {
    pub seller_id: u32,
    pub product_id: u64,
}
