use std::result::Result as DefaultResult;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::web::dto::{
    OrderLineReqDto, PaymentResultDto, ShippingAddrDto, ShippingAddrErrorDto,
    ShippingAddrErrorReason,
};
use crate::constant::MANUAL_TXN_ID_PREFIX;
use crate::error::{AppError, AppErrorCode};
use crate::generate_custom_uid;

use super::{BaseProductIdentity, ProductModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[serde(rename = "online")]
    OnlinePrepay,
    #[serde(rename = "cod")]
    CashOnDelivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
}

impl OrderStatus {
    fn ordinal(&self) -> u8 {
        match self {
            Self::Processing => 0,
            Self::Shipped => 1,
            Self::OutForDelivery => 2,
            Self::Delivered => 3,
        }
    }

    // fulfilment status only moves forward, cancellation is modelled as
    // order deletion rather than a transition
    pub fn try_transit(&self, next: Self) -> DefaultResult<Self, AppError> {
        if next.ordinal() > self.ordinal() {
            Ok(next)
        } else {
            let detail = format!("from:{:?}, to:{:?}", self, next);
            Err(AppError {
                code: AppErrorCode::InvalidStatusTransition,
                detail: Some(detail),
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
        }
    }
}

impl TryFrom<&str> for OrderStatus {
    type Error = AppError;
    fn try_from(value: &str) -> DefaultResult<Self, Self::Error> {
        match value {
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            _others => Err(AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(format!("order-status, actual:{}", value)),
            }),
        }
    }
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnlinePrepay => "online",
            Self::CashOnDelivery => "cod",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = AppError;
    fn try_from(value: &str) -> DefaultResult<Self, Self::Error> {
        match value {
            "online" => Ok(Self::OnlinePrepay),
            "cod" => Ok(Self::CashOnDelivery),
            _others => Err(AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(format!("payment-method, actual:{}", value)),
            }),
        }
    }
}

#[derive(Clone)]
pub struct ShippingAddrModel {
    pub full_name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl TryFrom<ShippingAddrDto> for ShippingAddrModel {
    type Error = ShippingAddrErrorDto;
    fn try_from(value: ShippingAddrDto) -> DefaultResult<Self, Self::Error> {
        let required = [
            ("full_name", value.full_name.as_str()),
            ("line1", value.line1.as_str()),
            ("city", value.city.as_str()),
            ("postal_code", value.postal_code.as_str()),
            ("country", value.country.as_str()),
        ];
        let mut error = Self::Error { fields: vec![] };
        required
            .into_iter()
            .map(|(label, given)| {
                if let Some(reason) = Self::check_field(given) {
                    error.fields.push((label.to_string(), reason));
                }
            })
            .count();
        if !value.phone.chars().all(|c| c.is_ascii_digit() || c == '+') {
            error
                .fields
                .push(("phone".to_string(), ShippingAddrErrorReason::InvalidChar));
        }
        if error.fields.is_empty() {
            Ok(Self {
                full_name: value.full_name,
                line1: value.line1,
                line2: value.line2,
                city: value.city,
                region: value.region,
                postal_code: value.postal_code,
                country: value.country,
                phone: value.phone,
            })
        } else {
            Err(error)
        }
    } // end of fn try_from
}

impl From<ShippingAddrModel> for ShippingAddrDto {
    fn from(value: ShippingAddrModel) -> ShippingAddrDto {
        ShippingAddrDto {
            full_name: value.full_name,
            line1: value.line1,
            line2: value.line2,
            city: value.city,
            region: value.region,
            postal_code: value.postal_code,
            country: value.country,
            phone: value.phone,
        }
    }
}

impl ShippingAddrModel {
    fn check_field(value: &str) -> Option<ShippingAddrErrorReason> {
        if value.is_empty() {
            Some(ShippingAddrErrorReason::Empty)
        } else if value.chars().any(char::is_control) {
            Some(ShippingAddrErrorReason::InvalidChar)
        } else {
            None
        }
    }
}

#[derive(Clone)]
pub struct PaymentResultModel {
    pub txn_id: String,
    pub status: String,
    pub settled_time: DateTime<FixedOffset>,
    pub payer_email: String,
}

impl PaymentResultModel {
    pub fn is_manual(&self) -> bool {
        self.txn_id.starts_with(MANUAL_TXN_ID_PREFIX)
    }
}

impl From<PaymentResultModel> for PaymentResultDto {
    fn from(value: PaymentResultModel) -> PaymentResultDto {
        PaymentResultDto {
            txn_id: value.txn_id,
            status: value.status,
            settled_time: value.settled_time,
            payer_email: value.payer_email,
        }
    }
}
impl From<PaymentResultDto> for PaymentResultModel {
    fn from(value: PaymentResultDto) -> PaymentResultModel {
        PaymentResultModel {
            txn_id: value.txn_id,
            status: value.status,
            settled_time: value.settled_time,
            payer_email: value.payer_email,
        }
    }
}

#[derive(Clone)]
pub struct OrderLinePriceModel {
    pub unit: u32,
    pub total: u32,
}

#[derive(Clone)]
pub struct OrderLineModel {
    pub id_: BaseProductIdentity,
    pub qty: u32,
    pub price: OrderLinePriceModel,
    // display snapshot, independent of later catalog edits
    pub name: String,
    pub image: String,
}

impl OrderLineModel {
    pub fn try_from(data: &OrderLineReqDto, product: &ProductModel) -> DefaultResult<Self, AppError> {
        if data.quantity == 0 {
            return Err(AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(format!("zero-quantity, product:{}", data.product_id)),
            });
        }
        if data.product_id != product.id_.product_id || data.seller_id != product.id_.seller_id {
            return Err(AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some("product-identity-mismatch".to_string()),
            });
        }
        // unit price and quantity are both client-reachable u32, the line
        // subtotal has to stay within u32 as well
        let total = product.price.checked_mul(data.quantity).ok_or(AppError {
            code: AppErrorCode::InvalidInput,
            detail: Some(format!("line-total-overflow, product:{}", data.product_id)),
        })?;
        Ok(Self {
            id_: product.id_.clone(),
            qty: data.quantity,
            price: OrderLinePriceModel {
                unit: product.price,
                total,
            },
            name: product.name.clone(),
            image: product.image.clone(),
        })
    }
}

#[derive(Clone)]
pub struct OrderChargeModel {
    pub items: u32,
    pub tax: u32,
    pub shipping: u32,
    pub total: u32,
}

impl OrderChargeModel {
    // the client still submits its own breakdown for display consistency,
    // the items subtotal is recomputed from catalog unit prices and any
    // divergence rejects the checkout
    pub fn validate(&self, lines: &[OrderLineModel]) -> DefaultResult<(), AppError> {
        // accumulate in u64, many max-size line subtotals must not wrap
        let items_expect = lines.iter().map(|l| u64::from(l.price.total)).sum::<u64>();
        if u64::from(self.items) != items_expect {
            let detail = format!("items, expect:{}, given:{}", items_expect, self.items);
            return Err(AppError {
                code: AppErrorCode::PriceMismatch,
                detail: Some(detail),
            });
        }
        let total_expect =
            u64::from(self.items) + u64::from(self.tax) + u64::from(self.shipping);
        if u64::from(self.total) != total_expect {
            let detail = format!("total, expect:{}, given:{}", total_expect, self.total);
            return Err(AppError {
                code: AppErrorCode::PriceMismatch,
                detail: Some(detail),
            });
        }
        Ok(())
    }
}

pub struct OrderModel {
    pub id_: String,
    pub owner_id: u32,
    pub lines: Vec<OrderLineModel>,
    pub shipping: ShippingAddrModel,
    pub payment_method: PaymentMethod,
    pub charge: OrderChargeModel,
    pub payment: Option<PaymentResultModel>,
    pub paid_time: Option<DateTime<FixedOffset>>,
    pub delivered_time: Option<DateTime<FixedOffset>>,
    pub status: OrderStatus,
    pub expect_delivery: Option<DateTime<FixedOffset>>,
    pub create_time: DateTime<FixedOffset>,
    pub update_time: DateTime<FixedOffset>,
}

pub struct SellerOrderViewModel {
    pub order_id: String,
    pub status: OrderStatus,
    pub is_paid: bool,
    pub payment_method: PaymentMethod,
    pub shipping: ShippingAddrModel,
    pub lines: Vec<OrderLineModel>,
    pub seller_total: u32,
    pub create_time: DateTime<FixedOffset>,
}

impl OrderModel {
    pub fn generate_order_id(machine_code: u8) -> String {
        let oid = generate_custom_uid(machine_code);
        Self::hex_str_order_id(oid)
    }
    fn hex_str_order_id(oid: Uuid) -> String {
        let bs = oid.into_bytes();
        bs.into_iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<String>>()
            .join("")
    }

    pub fn is_paid(&self) -> bool {
        self.payment.is_some()
    }

    /// Record a payment confirmation exactly once. The stored payment result
    /// is immutable, a repeated confirmation is reported as `false` and the
    /// original record survives.
    pub fn confirm_payment(
        &mut self,
        result: PaymentResultModel,
        time_now: DateTime<FixedOffset>,
    ) -> bool {
        if self.payment.is_some() {
            false
        } else {
            self.payment = Some(result);
            self.paid_time = Some(time_now);
            self.update_time = time_now;
            true
        }
    }

    pub fn advance_status(
        &mut self,
        next: OrderStatus,
        expect_delivery: Option<DateTime<FixedOffset>>,
        time_now: DateTime<FixedOffset>,
    ) -> DefaultResult<(), AppError> {
        self.status = self.status.try_transit(next)?;
        if let Some(t) = expect_delivery {
            self.expect_delivery = Some(t);
        }
        if matches!(next, OrderStatus::Delivered) {
            self.delivered_time = Some(time_now);
        }
        self.update_time = time_now;
        Ok(())
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered_time.is_some()
    }

    pub fn contains_seller(&self, seller_id: u32) -> bool {
        self.lines.iter().any(|l| l.id_.seller_id == seller_id)
    }

    /// Project this order down to one seller's share. A multi-seller order
    /// must never leak another seller's line items nor the buyer's full total,
    /// only `seller_total` computed from the filtered subset is exposed.
    pub fn seller_view(&self, seller_id: u32) -> Option<SellerOrderViewModel> {
        let lines = self
            .lines
            .iter()
            .filter(|l| l.id_.seller_id == seller_id)
            .cloned()
            .collect::<Vec<_>>();
        if lines.is_empty() {
            None
        } else {
            let seller_total = lines.iter().map(|l| l.price.total).sum::<u32>();
            Some(SellerOrderViewModel {
                order_id: self.id_.clone(),
                status: self.status,
                is_paid: self.is_paid(),
                payment_method: self.payment_method,
                shipping: self.shipping.clone(),
                lines,
                seller_total,
                create_time: self.create_time,
            })
        }
    } // end of fn seller_view
} // end of impl OrderModel
