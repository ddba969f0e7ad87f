use storefront::api::web::dto::PaymentConfirmReqDto;
use storefront::constant::MANUAL_TXN_ID_PREFIX;
use storefront::model::PaymentMethod;
use storefront::repository::app_repo_order;
use storefront::usecase::{
    CreatePaymentSessionUseCase, PaySessionUcOutput, PaymentConfirmUcOutput, PaymentConfirmUseCase,
};
use storefront::AppAuthRoleCode;

use super::{ut_place_order, ut_seed_state_products};
use crate::model::ut_setup_order_line;
use crate::{ut_authed_claim, ut_setup_share_state};

async fn ut_session_uc(
    state: &storefront::AppSharedState,
    profile: u32,
) -> CreatePaymentSessionUseCase {
    CreatePaymentSessionUseCase {
        glb_state: state.clone(),
        repo_order: app_repo_order(state.datastore()).await.unwrap(),
        auth_claim: ut_authed_claim(profile, vec![]),
    }
}

async fn ut_confirm_uc(
    state: &storefront::AppSharedState,
    profile: u32,
    roles: Vec<AppAuthRoleCode>,
) -> PaymentConfirmUseCase {
    PaymentConfirmUseCase {
        glb_state: state.clone(),
        repo_order: app_repo_order(state.datastore()).await.unwrap(),
        auth_claim: ut_authed_claim(profile, roles),
    }
}

#[tokio::test]
async fn pay_session_owner_ok() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    let lines = vec![ut_setup_order_line(41, 9001, 2, 350)];
    ut_place_order(&state, "pa01", 188, PaymentMethod::OnlinePrepay, lines).await;

    let uc = ut_session_uc(&state, 188).await;
    let output = uc.execute("pa01").await.unwrap();
    let session = match output {
        PaySessionUcOutput::Success(v) => v,
        _others => panic!("expect a pay-in session"),
    };
    assert_eq!(session.order_id.as_str(), "pa01");
    assert_eq!(session.amount, 700);
    assert!(!session.session_id.is_empty());

    // opening a session does not touch the order, only confirmation does
    let repo_o = app_repo_order(state.datastore()).await.unwrap();
    let saved = repo_o.fetch_by_id("pa01").await.unwrap();
    assert!(!saved.is_paid());
}

#[tokio::test]
async fn pay_session_not_owner_denied() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    let lines = vec![ut_setup_order_line(41, 9001, 1, 350)];
    ut_place_order(&state, "pb01", 188, PaymentMethod::OnlinePrepay, lines).await;

    let uc = ut_session_uc(&state, 999).await;
    let output = uc.execute("pb01").await.unwrap();
    assert!(matches!(output, PaySessionUcOutput::PermissionDeny));
}

#[tokio::test]
async fn pay_session_cod_rejected() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    let lines = vec![ut_setup_order_line(41, 9001, 1, 350)];
    ut_place_order(&state, "pc01", 188, PaymentMethod::CashOnDelivery, lines).await;

    let uc = ut_session_uc(&state, 188).await;
    let output = uc.execute("pc01").await.unwrap();
    assert!(matches!(output, PaySessionUcOutput::NotOnlineMethod));
}

#[tokio::test]
async fn pay_session_order_not_found() {
    let state = ut_setup_share_state();
    let uc = ut_session_uc(&state, 188).await;
    let output = uc.execute("missing").await.unwrap();
    assert!(matches!(output, PaySessionUcOutput::NotFound));
}

#[tokio::test]
async fn confirm_online_ok_then_idempotent() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    let lines = vec![ut_setup_order_line(41, 9001, 2, 350)];
    ut_place_order(&state, "pd01", 188, PaymentMethod::OnlinePrepay, lines).await;

    let uc = ut_confirm_uc(&state, 188, vec![]).await;
    let data = PaymentConfirmReqDto {
        txn_id: Some("ch_3OX7aB".to_string()),
        payer_email: Some("ina@example.com".to_string()),
    };
    let output = uc.execute("pd01", data).await.unwrap();
    let detail = match output {
        PaymentConfirmUcOutput::Success(v) => v,
        _others => panic!("expect confirmed payment"),
    };
    assert!(detail.is_paid);
    assert_eq!(detail.payment.as_ref().unwrap().txn_id.as_str(), "ch_3OX7aB");

    // a second confirmation keeps the original record untouched
    let uc = ut_confirm_uc(&state, 188, vec![]).await;
    let data = PaymentConfirmReqDto {
        txn_id: Some("ch_9ZY8xW".to_string()),
        payer_email: None,
    };
    let output = uc.execute("pd01", data).await.unwrap();
    let detail = match output {
        PaymentConfirmUcOutput::AlreadyPaid(v) => v,
        _others => panic!("expect already-paid report"),
    };
    assert_eq!(detail.payment.as_ref().unwrap().txn_id.as_str(), "ch_3OX7aB");
}

#[tokio::test]
async fn confirm_online_missing_txn_id() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    let lines = vec![ut_setup_order_line(41, 9001, 1, 350)];
    ut_place_order(&state, "pe01", 188, PaymentMethod::OnlinePrepay, lines).await;

    let uc = ut_confirm_uc(&state, 188, vec![]).await;
    let data = PaymentConfirmReqDto {
        txn_id: None,
        payer_email: None,
    };
    let output = uc.execute("pe01", data).await.unwrap();
    assert!(matches!(output, PaymentConfirmUcOutput::MissingTxnId));
}

#[tokio::test]
async fn confirm_cod_synthesizes_manual_record() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    let lines = vec![ut_setup_order_line(41, 9005, 3, 80)];
    ut_place_order(&state, "pf01", 188, PaymentMethod::CashOnDelivery, lines).await;

    // the seller settles in person, no gateway transaction exists
    let uc = ut_confirm_uc(&state, 77, vec![AppAuthRoleCode::Seller]).await;
    let data = PaymentConfirmReqDto {
        txn_id: None,
        payer_email: None,
    };
    let output = uc.execute("pf01", data).await.unwrap();
    assert!(matches!(output, PaymentConfirmUcOutput::PermissionDeny));

    let uc = ut_confirm_uc(&state, 41, vec![AppAuthRoleCode::Seller]).await;
    let data = PaymentConfirmReqDto {
        txn_id: None,
        payer_email: None,
    };
    let output = uc.execute("pf01", data).await.unwrap();
    let detail = match output {
        PaymentConfirmUcOutput::Success(v) => v,
        _others => panic!("expect confirmed payment"),
    };
    let txn_id = detail.payment.as_ref().unwrap().txn_id.clone();
    assert!(txn_id.starts_with(MANUAL_TXN_ID_PREFIX));

    let repo_o = app_repo_order(state.datastore()).await.unwrap();
    let saved = repo_o.fetch_by_id("pf01").await.unwrap();
    assert!(saved.payment.as_ref().unwrap().is_manual());
}

#[tokio::test]
async fn confirm_stranger_denied() {
    let state = ut_setup_share_state();
    ut_seed_state_products(&state).await;
    let lines = vec![ut_setup_order_line(41, 9001, 1, 350)];
    ut_place_order(&state, "pg01", 188, PaymentMethod::OnlinePrepay, lines).await;

    let uc = ut_confirm_uc(&state, 999, vec![]).await;
    let data = PaymentConfirmReqDto {
        txn_id: Some("ch_3OX7aB".to_string()),
        payer_email: None,
    };
    let output = uc.execute("pg01", data).await.unwrap();
    assert!(matches!(output, PaymentConfirmUcOutput::PermissionDeny));
}
