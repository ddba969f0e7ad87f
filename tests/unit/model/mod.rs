mod order;
mod stock;

use chrono::{DateTime, Duration, FixedOffset, Local};

use storefront::model::{
    BaseProductIdentity, OrderChargeModel, OrderLineModel, OrderLinePriceModel, OrderModel,
    OrderStatus, PaymentMethod, ProductModel, ShippingAddrModel,
};

pub(crate) fn ut_time_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

pub(crate) fn ut_setup_shipping_addr() -> ShippingAddrModel {
    ShippingAddrModel {
        full_name: "Ina Hughes".to_string(),
        line1: "1-43 Dover Crescent".to_string(),
        line2: None,
        city: "Wellington".to_string(),
        region: "Te Aro".to_string(),
        postal_code: "6011".to_string(),
        country: "NZ".to_string(),
        phone: "+6449391234".to_string(),
    }
}

pub(crate) fn ut_setup_product(seller_id: u32, product_id: u64, price: u32, stock: u32) -> ProductModel {
    ProductModel {
        id_: BaseProductIdentity {
            seller_id,
            product_id,
        },
        name: format!("item-{}", product_id),
        image: format!("/img/{}.jpg", product_id),
        price,
        count_in_stock: stock,
    }
}

pub(crate) fn ut_setup_order_line(seller_id: u32, product_id: u64, qty: u32, unit: u32) -> OrderLineModel {
    OrderLineModel {
        id_: BaseProductIdentity {
            seller_id,
            product_id,
        },
        qty,
        price: OrderLinePriceModel {
            unit,
            total: unit * qty,
        },
        name: format!("item-{}", product_id),
        image: format!("/img/{}.jpg", product_id),
    }
}

/// charge recomputed from the given lines, zero tax and shipping so callers
/// can reason about totals easily
pub(crate) fn ut_setup_order(
    oid: &str,
    owner_id: u32,
    method: PaymentMethod,
    lines: Vec<OrderLineModel>,
) -> OrderModel {
    let items = lines.iter().map(|l| l.price.total).sum::<u32>();
    let t0 = ut_time_now() - Duration::seconds(5);
    OrderModel {
        id_: oid.to_string(),
        owner_id,
        lines,
        shipping: ut_setup_shipping_addr(),
        payment_method: method,
        charge: OrderChargeModel {
            items,
            tax: 0,
            shipping: 0,
            total: items,
        },
        payment: None,
        paid_time: None,
        delivered_time: None,
        status: OrderStatus::Processing,
        expect_delivery: None,
        create_time: t0,
        update_time: t0,
    }
}
