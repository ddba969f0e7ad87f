use storefront::api::web::dto::OrderLineCreateErrorReason;
use storefront::model::StockLevelModelSet;

use super::{ut_setup_order_line, ut_setup_product};

fn ut_mset() -> StockLevelModelSet {
    StockLevelModelSet {
        items: vec![
            ut_setup_product(41, 9001, 350, 5),
            ut_setup_product(41, 9005, 80, 0),
            ut_setup_product(52, 9002, 1200, 2),
        ],
    }
}

#[test]
fn reserve_all_lines_ok() {
    let mut mset = ut_mset();
    let lines = vec![
        ut_setup_order_line(41, 9001, 3, 350),
        ut_setup_order_line(52, 9002, 2, 1200),
    ];
    let errors = mset.try_reserve(lines.as_slice());
    assert!(errors.is_empty());
    assert_eq!(mset.items[0].count_in_stock, 2);
    assert_eq!(mset.items[2].count_in_stock, 0);
}

#[test]
fn reserve_shortage_applies_nothing() {
    let mut mset = ut_mset();
    let lines = vec![
        ut_setup_order_line(41, 9001, 2, 350),
        ut_setup_order_line(52, 9002, 3, 1200), // only 2 left
    ];
    let errors = mset.try_reserve(lines.as_slice());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].product_id, 9002);
    assert_eq!(errors[0].reason, OrderLineCreateErrorReason::NotEnoughToClaim);
    assert_eq!(errors[0].shortage, Some(1));
    // the satisfiable line is rolled into the rejection, stock is untouched
    assert_eq!(mset.items[0].count_in_stock, 5);
    assert_eq!(mset.items[2].count_in_stock, 2);
}

#[test]
fn reserve_duplicate_lines_totalled() {
    // two lines on the same product demand 6 units against 5 in stock,
    // neither may slip through on its own
    let mut mset = ut_mset();
    let lines = vec![
        ut_setup_order_line(41, 9001, 3, 350),
        ut_setup_order_line(41, 9001, 3, 350),
    ];
    let errors = mset.try_reserve(lines.as_slice());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].product_id, 9001);
    assert_eq!(errors[0].reason, OrderLineCreateErrorReason::NotEnoughToClaim);
    assert_eq!(errors[0].shortage, Some(1));
    assert_eq!(mset.items[0].count_in_stock, 5);
    // the combined demand fits, it is applied once
    let lines = vec![
        ut_setup_order_line(41, 9001, 2, 350),
        ut_setup_order_line(41, 9001, 2, 350),
    ];
    let errors = mset.try_reserve(lines.as_slice());
    assert!(errors.is_empty());
    assert_eq!(mset.items[0].count_in_stock, 1);
}

#[test]
fn reserve_out_of_stock_and_missing() {
    let mut mset = ut_mset();
    let lines = vec![
        ut_setup_order_line(41, 9005, 1, 80),
        ut_setup_order_line(77, 1234, 1, 10),
    ];
    let mut errors = mset.try_reserve(lines.as_slice());
    assert_eq!(errors.len(), 2);
    errors.sort_by_key(|e| e.product_id);
    assert_eq!(errors[0].product_id, 1234);
    assert_eq!(errors[0].reason, OrderLineCreateErrorReason::NotExist);
    assert_eq!(errors[1].product_id, 9005);
    assert_eq!(errors[1].reason, OrderLineCreateErrorReason::OutOfStock);
}

#[test]
fn reserve_exact_remaining_stock() {
    let mut mset = ut_mset();
    let lines = vec![ut_setup_order_line(52, 9002, 2, 1200)];
    let errors = mset.try_reserve(lines.as_slice());
    assert!(errors.is_empty());
    assert_eq!(mset.items[2].count_in_stock, 0);
    // next attempt on the same product reports out-of-stock
    let errors = mset.try_reserve(lines.as_slice());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].reason, OrderLineCreateErrorReason::OutOfStock);
}

#[test]
fn return_restores_stock() {
    let mut mset = ut_mset();
    let lines = vec![ut_setup_order_line(41, 9001, 3, 350)];
    let errors = mset.try_reserve(lines.as_slice());
    assert!(errors.is_empty());
    assert_eq!(mset.items[0].count_in_stock, 2);
    let skipped = mset.try_return(lines.as_slice());
    assert!(skipped.is_empty());
    assert_eq!(mset.items[0].count_in_stock, 5);
}

#[test]
fn return_skips_removed_product() {
    let mut mset = ut_mset();
    let lines = vec![
        ut_setup_order_line(41, 9001, 1, 350),
        ut_setup_order_line(88, 4444, 2, 60), // no longer in the catalog
    ];
    let skipped = mset.try_return(lines.as_slice());
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].seller_id, 88);
    assert_eq!(skipped[0].product_id, 4444);
    assert_eq!(mset.items[0].count_in_stock, 6);
}
