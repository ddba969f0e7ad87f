use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::{
    OrderLineModel, OrderModel, OrderStatus, PaymentMethod, SellerOrderViewModel,
};

#[derive(Deserialize, Serialize)]
pub struct OrderLineReqDto {
    pub seller_id: u32,
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct ShippingAddrDto {
    pub full_name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum ShippingAddrErrorReason {
    Empty,
    InvalidChar,
}

#[derive(Deserialize, Serialize)]
pub struct ShippingAddrErrorDto {
    pub fields: Vec<(String, ShippingAddrErrorReason)>,
}

// client-computed charge breakdown, minor currency units, the server
// recomputes the items subtotal before accepting it
#[derive(Deserialize, Serialize)]
pub struct OrderChargeDto {
    pub items: u32,
    pub tax: u32,
    pub shipping: u32,
    pub total: u32,
}

#[derive(Deserialize, Serialize)]
pub struct OrderCreateReqData {
    pub order_lines: Vec<OrderLineReqDto>,
    pub shipping_addr: ShippingAddrDto,
    pub payment_method: PaymentMethod,
    pub charge: OrderChargeDto,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum OrderLineCreateErrorReason {
    NotExist,
    OutOfStock,
    NotEnoughToClaim,
    ZeroQuantity,
    ExceedQuantityLimit,
    DuplicateProduct,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OrderLineCreateErrorDto {
    pub seller_id: u32,
    pub product_id: u64,
    pub reason: OrderLineCreateErrorReason,
    pub shortage: Option<u32>,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum OrderCreateNonFieldReason {
    EmptyOrderLines,
    TooManyOrderLines,
    PriceMismatch,
}

#[derive(Deserialize, Serialize)]
pub struct OrderCreateRespErrorDto {
    pub order_lines: Option<Vec<OrderLineCreateErrorDto>>,
    pub shipping_addr: Option<ShippingAddrErrorDto>,
    pub nonfield: Option<OrderCreateNonFieldReason>,
    pub detail: Option<String>,
}

#[derive(Deserialize, Serialize)]
pub struct OrderCreateRespOkDto {
    pub order_id: String,
    pub usr_id: u32,
    pub status: OrderStatus,
    pub total: u32,
    pub time: u64,
}

#[derive(Deserialize, Serialize)]
pub struct OrderLineRespDto {
    pub seller_id: u32,
    pub product_id: u64,
    pub quantity: u32,
    pub unit_price: u32,
    pub total_price: u32,
    pub name: String,
    pub image: String,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct PaymentResultDto {
    pub txn_id: String,
    pub status: String,
    pub settled_time: DateTime<FixedOffset>,
    pub payer_email: String,
}

#[derive(Deserialize, Serialize)]
pub struct OrderDetailDto {
    pub order_id: String,
    pub usr_id: u32,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub lines: Vec<OrderLineRespDto>,
    pub shipping_addr: ShippingAddrDto,
    pub charge: OrderChargeDto,
    pub payment: Option<PaymentResultDto>,
    pub paid_time: Option<DateTime<FixedOffset>>,
    pub delivered_time: Option<DateTime<FixedOffset>>,
    pub expect_delivery: Option<DateTime<FixedOffset>>,
    pub create_time: DateTime<FixedOffset>,
    pub update_time: DateTime<FixedOffset>,
}

/// one seller's slice of an order, line items from other sellers and the
/// buyer's overall total never appear here
#[derive(Deserialize, Serialize)]
pub struct SellerOrderDto {
    pub order_id: String,
    pub status: OrderStatus,
    pub is_paid: bool,
    pub payment_method: PaymentMethod,
    pub shipping_addr: ShippingAddrDto,
    pub lines: Vec<OrderLineRespDto>,
    pub seller_total: u32,
    pub create_time: DateTime<FixedOffset>,
}

#[derive(Deserialize, Serialize)]
pub struct PaymentSessionRespDto {
    pub session_id: String,
    pub order_id: String,
    pub amount: u32,
    pub currency: String,
    pub create_time: DateTime<FixedOffset>,
}

#[derive(Deserialize, Serialize)]
pub struct PaymentConfirmReqDto {
    // absent for cash-on-delivery, the server synthesizes a manual record
    pub txn_id: Option<String>,
    pub payer_email: Option<String>,
}

#[derive(Deserialize, Serialize)]
pub struct StatusAdvanceReqDto {
    pub status: OrderStatus,
    pub expect_delivery: Option<DateTime<FixedOffset>>,
}

#[derive(Deserialize, Serialize)]
pub struct AdminOrderStatsDto {
    pub num_orders: usize,
    pub num_paid: usize,
    pub num_delivered: usize,
    pub revenue_paid: u64,
}

impl From<&OrderLineModel> for OrderLineRespDto {
    fn from(value: &OrderLineModel) -> Self {
        Self {
            seller_id: value.id_.seller_id,
            product_id: value.id_.product_id,
            quantity: value.qty,
            unit_price: value.price.unit,
            total_price: value.price.total,
            name: value.name.clone(),
            image: value.image.clone(),
        }
    }
}

impl From<OrderModel> for OrderDetailDto {
    fn from(value: OrderModel) -> Self {
        let lines = value.lines.iter().map(OrderLineRespDto::from).collect();
        Self {
            order_id: value.id_,
            usr_id: value.owner_id,
            status: value.status,
            payment_method: value.payment_method,
            is_paid: value.payment.is_some(),
            lines,
            shipping_addr: value.shipping.into(),
            charge: OrderChargeDto {
                items: value.charge.items,
                tax: value.charge.tax,
                shipping: value.charge.shipping,
                total: value.charge.total,
            },
            payment: value.payment.map(PaymentResultDto::from),
            paid_time: value.paid_time,
            delivered_time: value.delivered_time,
            expect_delivery: value.expect_delivery,
            create_time: value.create_time,
            update_time: value.update_time,
        }
    } // end of fn from
}

impl From<SellerOrderViewModel> for SellerOrderDto {
    fn from(value: SellerOrderViewModel) -> Self {
        let lines = value.lines.iter().map(OrderLineRespDto::from).collect();
        Self {
            order_id: value.order_id,
            status: value.status,
            is_paid: value.is_paid,
            payment_method: value.payment_method,
            shipping_addr: value.shipping.into(),
            lines,
            seller_total: value.seller_total,
            create_time: value.create_time,
        }
    }
}
