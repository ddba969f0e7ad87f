use chrono::Duration;

use storefront::api::web::dto::{OrderLineReqDto, ShippingAddrDto, ShippingAddrErrorReason};
use storefront::error::AppErrorCode;
use storefront::model::{
    OrderLineModel, OrderStatus, PaymentMethod, PaymentResultModel, ShippingAddrModel,
};

use super::{
    ut_setup_order, ut_setup_order_line, ut_setup_product, ut_setup_shipping_addr, ut_time_now,
};

#[test]
fn status_transit_forward_ok() {
    let fwd_chain = [
        (OrderStatus::Processing, OrderStatus::Shipped),
        (OrderStatus::Processing, OrderStatus::Delivered),
        (OrderStatus::Shipped, OrderStatus::OutForDelivery),
        (OrderStatus::OutForDelivery, OrderStatus::Delivered),
    ];
    for (curr, next) in fwd_chain {
        let result = curr.try_transit(next);
        assert_eq!(result.unwrap(), next);
    }
}

#[test]
fn status_transit_backward_denied() {
    let denied = [
        (OrderStatus::Processing, OrderStatus::Processing),
        (OrderStatus::Shipped, OrderStatus::Processing),
        (OrderStatus::Delivered, OrderStatus::OutForDelivery),
        (OrderStatus::Delivered, OrderStatus::Delivered),
    ];
    for (curr, next) in denied {
        let result = curr.try_transit(next);
        let error = result.err().unwrap();
        assert_eq!(error.code, AppErrorCode::InvalidStatusTransition);
    }
}

#[test]
fn advance_status_records_delivery_time() {
    let lines = vec![ut_setup_order_line(41, 9001, 2, 350)];
    let mut order = ut_setup_order("d1e2", 188, PaymentMethod::OnlinePrepay, lines);
    let t1 = ut_time_now();
    order.advance_status(OrderStatus::Shipped, None, t1).unwrap();
    assert!(order.delivered_time.is_none());
    let t2 = t1 + Duration::seconds(30);
    order
        .advance_status(OrderStatus::Delivered, None, t2)
        .unwrap();
    assert!(order.is_delivered());
    assert_eq!(order.delivered_time.unwrap(), t2);
    assert_eq!(order.update_time, t2);
}

#[test]
fn confirm_payment_only_once() {
    let lines = vec![ut_setup_order_line(41, 9001, 1, 1299)];
    let mut order = ut_setup_order("f00d", 188, PaymentMethod::OnlinePrepay, lines);
    assert!(!order.is_paid());
    let t1 = ut_time_now();
    let first = PaymentResultModel {
        txn_id: "ch_3OX7aB".to_string(),
        status: "settled".to_string(),
        settled_time: t1,
        payer_email: "ina@example.com".to_string(),
    };
    assert!(order.confirm_payment(first, t1));
    assert!(order.is_paid());
    let t2 = t1 + Duration::seconds(90);
    let second = PaymentResultModel {
        txn_id: "ch_9ZY8xW".to_string(),
        status: "settled".to_string(),
        settled_time: t2,
        payer_email: "intruder@example.com".to_string(),
    };
    // the original record survives a repeated confirmation
    assert!(!order.confirm_payment(second, t2));
    let kept = order.payment.as_ref().unwrap();
    assert_eq!(kept.txn_id.as_str(), "ch_3OX7aB");
    assert_eq!(order.paid_time.unwrap(), t1);
}

#[test]
fn charge_validate_ok() {
    let lines = vec![
        ut_setup_order_line(41, 9001, 2, 350),
        ut_setup_order_line(52, 9002, 1, 1200),
    ];
    let order = ut_setup_order("00aa", 188, PaymentMethod::CashOnDelivery, lines);
    assert_eq!(order.charge.items, 1900);
    let result = order.charge.validate(order.lines.as_slice());
    assert!(result.is_ok());
}

#[test]
fn charge_validate_tampered_subtotal() {
    let lines = vec![ut_setup_order_line(41, 9001, 2, 350)];
    let mut order = ut_setup_order("00ab", 188, PaymentMethod::CashOnDelivery, lines);
    order.charge.items -= 100;
    order.charge.total -= 100;
    let error = order.charge.validate(order.lines.as_slice()).err().unwrap();
    assert_eq!(error.code, AppErrorCode::PriceMismatch);
}

#[test]
fn charge_validate_inconsistent_total() {
    let lines = vec![ut_setup_order_line(41, 9001, 2, 350)];
    let mut order = ut_setup_order("00ac", 188, PaymentMethod::CashOnDelivery, lines);
    order.charge.tax = 35;
    // total left stale, it no longer equals items + tax + shipping
    let error = order.charge.validate(order.lines.as_slice()).err().unwrap();
    assert_eq!(error.code, AppErrorCode::PriceMismatch);
}

#[test]
fn order_line_from_req_ok() {
    let product = ut_setup_product(41, 9001, 350, 10);
    let data = OrderLineReqDto {
        seller_id: 41,
        product_id: 9001,
        quantity: 3,
    };
    let line = OrderLineModel::try_from(&data, &product).unwrap();
    assert_eq!(line.qty, 3);
    assert_eq!(line.price.unit, 350);
    assert_eq!(line.price.total, 1050);
    assert_eq!(line.name.as_str(), "item-9001");
}

#[test]
fn order_line_from_req_zero_qty() {
    let product = ut_setup_product(41, 9001, 350, 10);
    let data = OrderLineReqDto {
        seller_id: 41,
        product_id: 9001,
        quantity: 0,
    };
    let error = OrderLineModel::try_from(&data, &product).err().unwrap();
    assert_eq!(error.code, AppErrorCode::InvalidInput);
}

#[test]
fn order_line_from_req_total_overflow() {
    let product = ut_setup_product(41, 9001, 3_000_000, 9999);
    let data = OrderLineReqDto {
        seller_id: 41,
        product_id: 9001,
        quantity: 2_000, // 6e9 minor units exceeds u32
    };
    let error = OrderLineModel::try_from(&data, &product).err().unwrap();
    assert_eq!(error.code, AppErrorCode::InvalidInput);
}

#[test]
fn shipping_addr_convert_ok() {
    let data = ShippingAddrDto::from(ut_setup_shipping_addr());
    let result = ShippingAddrModel::try_from(data);
    assert!(result.is_ok());
}

#[test]
fn shipping_addr_missing_fields() {
    let mut data = ShippingAddrDto::from(ut_setup_shipping_addr());
    data.full_name = String::new();
    data.postal_code = String::new();
    data.phone = "04-939-1234".to_string();
    let error = ShippingAddrModel::try_from(data).err().unwrap();
    assert_eq!(error.fields.len(), 3);
    let expect = [
        ("full_name".to_string(), ShippingAddrErrorReason::Empty),
        ("postal_code".to_string(), ShippingAddrErrorReason::Empty),
        ("phone".to_string(), ShippingAddrErrorReason::InvalidChar),
    ];
    for pair in expect {
        assert!(error.fields.contains(&pair));
    }
}

#[test]
fn seller_view_filters_other_sellers() {
    let lines = vec![
        ut_setup_order_line(41, 9001, 2, 350),
        ut_setup_order_line(41, 9005, 1, 80),
        ut_setup_order_line(52, 9002, 1, 1200),
    ];
    let order = ut_setup_order("5e11", 188, PaymentMethod::OnlinePrepay, lines);
    let view = order.seller_view(41).unwrap();
    assert_eq!(view.lines.len(), 2);
    assert!(view.lines.iter().all(|l| l.id_.seller_id == 41));
    // only this seller's subtotal, never the buyer's overall total
    assert_eq!(view.seller_total, 780);
    assert_ne!(view.seller_total, order.charge.total);
}

#[test]
fn seller_view_unrelated_seller() {
    let lines = vec![ut_setup_order_line(41, 9001, 2, 350)];
    let order = ut_setup_order("5e12", 188, PaymentMethod::OnlinePrepay, lines);
    assert!(order.seller_view(99).is_none());
    assert!(!order.contains_seller(99));
    assert!(order.contains_seller(41));
}
