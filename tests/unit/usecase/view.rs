use storefront::model::{OrderStatus, PaymentMethod, PaymentResultModel};
use storefront::repository::app_repo_order;
use storefront::usecase::{
    AdminOrderStatsUseCase, ListOwnerOrdersUseCase, ListSellerOrdersUseCase, ReadOrderUcOutput,
    ReadOrderUseCase,
};
use storefront::AppAuthRoleCode;

use super::{ut_place_order, ut_seed_state_products};
use crate::model::{ut_setup_order_line, ut_time_now};
use crate::{ut_authed_claim, ut_setup_share_state};

async fn ut_read_uc(
    state: &storefront::AppSharedState,
    profile: u32,
    roles: Vec<AppAuthRoleCode>,
) -> ReadOrderUseCase {
    ReadOrderUseCase {
        repo_order: app_repo_order(state.datastore()).await.unwrap(),
        auth_claim: ut_authed_claim(profile, roles),
    }
}

fn ut_mixed_seller_lines() -> Vec<storefront::model::OrderLineModel> {
    vec![
        ut_setup_order_line(41, 9001, 2, 350),
        ut_setup_order_line(52, 9002, 1, 1200),
    ]
}

#[tokio::test]
async fn read_order_owner_gets_full_view() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    ut_place_order(&state, "va01", 188, PaymentMethod::OnlinePrepay, ut_mixed_seller_lines()).await;

    let uc = ut_read_uc(&state, 188, vec![]).await;
    let output = uc.execute("va01").await.unwrap();
    let detail = match output {
        ReadOrderUcOutput::Full(v) => v,
        _others => panic!("expect full detail"),
    };
    assert_eq!(detail.usr_id, 188);
    assert_eq!(detail.lines.len(), 2);
    assert_eq!(detail.charge.total, 1900);
}

#[tokio::test]
async fn read_order_admin_gets_full_view() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    ut_place_order(&state, "vb01", 188, PaymentMethod::OnlinePrepay, ut_mixed_seller_lines()).await;

    let uc = ut_read_uc(&state, 3, vec![AppAuthRoleCode::Admin]).await;
    let output = uc.execute("vb01").await.unwrap();
    assert!(matches!(output, ReadOrderUcOutput::Full(_)));
}

#[tokio::test]
async fn read_order_seller_gets_own_slice() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    ut_place_order(&state, "vc01", 188, PaymentMethod::OnlinePrepay, ut_mixed_seller_lines()).await;

    let uc = ut_read_uc(&state, 41, vec![AppAuthRoleCode::Seller]).await;
    let output = uc.execute("vc01").await.unwrap();
    let view = match output {
        ReadOrderUcOutput::SellerScope(v) => v,
        _others => panic!("expect the seller slice"),
    };
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].seller_id, 41);
    assert_eq!(view.seller_total, 700);

    // a seller with no line in this order is treated like any stranger
    let uc = ut_read_uc(&state, 66, vec![AppAuthRoleCode::Seller]).await;
    let output = uc.execute("vc01").await.unwrap();
    assert!(matches!(output, ReadOrderUcOutput::PermissionDeny));
}

#[tokio::test]
async fn read_order_stranger_denied() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    ut_place_order(&state, "vd01", 188, PaymentMethod::OnlinePrepay, ut_mixed_seller_lines()).await;

    let uc = ut_read_uc(&state, 999, vec![]).await;
    let output = uc.execute("vd01").await.unwrap();
    assert!(matches!(output, ReadOrderUcOutput::PermissionDeny));

    let uc = ut_read_uc(&state, 999, vec![]).await;
    let output = uc.execute("no-such-order").await.unwrap();
    assert!(matches!(output, ReadOrderUcOutput::NotFound));
}

#[tokio::test]
async fn list_owner_orders_only_mine() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    ut_place_order(
        &state,
        "ve01",
        188,
        PaymentMethod::OnlinePrepay,
        vec![ut_setup_order_line(41, 9001, 1, 350)],
    )
    .await;
    ut_place_order(
        &state,
        "ve02",
        191,
        PaymentMethod::CashOnDelivery,
        vec![ut_setup_order_line(41, 9005, 1, 80)],
    )
    .await;

    let uc = ListOwnerOrdersUseCase {
        repo_order: app_repo_order(state.datastore()).await.unwrap(),
        auth_claim: ut_authed_claim(188, vec![]),
    };
    let found = uc.execute().await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].order_id.as_str(), "ve01");
}

#[tokio::test]
async fn list_seller_orders_scoped() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    ut_place_order(&state, "vf01", 188, PaymentMethod::OnlinePrepay, ut_mixed_seller_lines()).await;
    ut_place_order(
        &state,
        "vf02",
        191,
        PaymentMethod::CashOnDelivery,
        vec![ut_setup_order_line(52, 9002, 1, 1200)],
    )
    .await;

    let uc = ListSellerOrdersUseCase {
        repo_order: app_repo_order(state.datastore()).await.unwrap(),
        auth_claim: ut_authed_claim(52, vec![AppAuthRoleCode::Seller]),
    };
    let found = uc.execute().await.unwrap().unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|v| v.seller_total == 1200));

    // no seller role, no seller listing at all
    let uc = ListSellerOrdersUseCase {
        repo_order: app_repo_order(state.datastore()).await.unwrap(),
        auth_claim: ut_authed_claim(52, vec![]),
    };
    assert!(uc.execute().await.unwrap().is_none());
}

#[tokio::test]
async fn admin_stats_aggregates() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    ut_place_order(
        &state,
        "vg01",
        188,
        PaymentMethod::OnlinePrepay,
        vec![ut_setup_order_line(41, 9001, 2, 350)],
    )
    .await;
    ut_place_order(
        &state,
        "vg02",
        191,
        PaymentMethod::CashOnDelivery,
        vec![ut_setup_order_line(41, 9005, 1, 80)],
    )
    .await;

    // settle and deliver the first order
    let repo_o = app_repo_order(state.datastore()).await.unwrap();
    let mut order = repo_o.fetch_by_id("vg01").await.unwrap();
    let t1 = ut_time_now();
    let result = PaymentResultModel {
        txn_id: "ch_2kWq8d".to_string(),
        status: "settled".to_string(),
        settled_time: t1,
        payer_email: String::new(),
    };
    assert!(order.confirm_payment(result, t1));
    order
        .advance_status(OrderStatus::Delivered, None, t1)
        .unwrap();
    repo_o.save_payment(&order).await.unwrap();

    let uc = AdminOrderStatsUseCase {
        repo_order: app_repo_order(state.datastore()).await.unwrap(),
        auth_claim: ut_authed_claim(3, vec![AppAuthRoleCode::Admin]),
    };
    let stats = uc.execute().await.unwrap().unwrap();
    assert_eq!(stats.num_orders, 2);
    assert_eq!(stats.num_paid, 1);
    assert_eq!(stats.num_delivered, 1);
    assert_eq!(stats.revenue_paid, 700);

    let uc = AdminOrderStatsUseCase {
        repo_order: app_repo_order(state.datastore()).await.unwrap(),
        auth_claim: ut_authed_claim(3, vec![AppAuthRoleCode::Seller]),
    };
    assert!(uc.execute().await.unwrap().is_none());
}
