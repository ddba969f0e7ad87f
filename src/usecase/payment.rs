use std::boxed::Box;
use std::result::Result as DefaultResult;

use chrono::Local as LocalTime;

use crate::adapter::AbstractPaymentProcessor;
use crate::api::web::dto::{OrderDetailDto, PaymentConfirmReqDto, PaymentSessionRespDto};
use crate::constant::{app_meta, MANUAL_TXN_ID_PREFIX};
use crate::error::{AppError, AppErrorCode};
use crate::logging::{app_log_event, AppLogLevel};
use crate::model::{OrderModel, PaymentMethod, PaymentResultModel};
use crate::repository::AbsOrderRepo;
use crate::{AppAuthedClaim, AppSharedState};

pub enum PaySessionUcOutput {
    Success(PaymentSessionRespDto),
    NotFound,
    PermissionDeny,
    AlreadyPaid,
    NotOnlineMethod,
}

pub struct CreatePaymentSessionUseCase {
    pub glb_state: AppSharedState,
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub auth_claim: AppAuthedClaim,
}

impl CreatePaymentSessionUseCase {
    pub async fn execute(self, oid: &str) -> DefaultResult<PaySessionUcOutput, AppError> {
        let order = match self.repo_order.fetch_by_id(oid).await {
            Ok(v) => v,
            Err(e) if e.code == AppErrorCode::OrderNotExist => {
                return Ok(PaySessionUcOutput::NotFound);
            }
            Err(e) => {
                return Err(e);
            }
        };
        if order.owner_id != self.auth_claim.profile {
            return Ok(PaySessionUcOutput::PermissionDeny);
        }
        if order.is_paid() {
            return Ok(PaySessionUcOutput::AlreadyPaid);
        }
        if !matches!(order.payment_method, PaymentMethod::OnlinePrepay) {
            return Ok(PaySessionUcOutput::NotOnlineMethod);
        }
        let processor = self.glb_state.processor_context();
        // gateway failure leaves the order untouched, the client may retry
        let session = match processor.create_session(oid, order.charge.total).await {
            Ok(v) => v,
            Err(e) => {
                let logctx_p = self.glb_state.log_context().clone();
                app_log_event!(
                    logctx_p,
                    AppLogLevel::ERROR,
                    "pay-session gateway failure, order:{}, {:?}",
                    oid,
                    e.reason
                );
                return Err(AppError::from(e));
            }
        };
        Ok(PaySessionUcOutput::Success(PaymentSessionRespDto {
            session_id: session.session_id,
            order_id: session.order_id,
            amount: session.amount,
            currency: session.currency_label,
            create_time: session.create_time,
        }))
    } // end of fn execute
} // end of impl CreatePaymentSessionUseCase

pub enum PaymentConfirmUcOutput {
    Success(Box<OrderDetailDto>),
    // repeated confirmation keeps the original record untouched
    AlreadyPaid(Box<OrderDetailDto>),
    NotFound,
    PermissionDeny,
    MissingTxnId,
}

pub struct PaymentConfirmUseCase {
    pub glb_state: AppSharedState,
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub auth_claim: AppAuthedClaim,
}

impl PaymentConfirmUseCase {
    pub async fn execute(
        self,
        oid: &str,
        data: PaymentConfirmReqDto,
    ) -> DefaultResult<PaymentConfirmUcOutput, AppError> {
        let mut order = match self.repo_order.fetch_by_id(oid).await {
            Ok(v) => v,
            Err(e) if e.code == AppErrorCode::OrderNotExist => {
                return Ok(PaymentConfirmUcOutput::NotFound);
            }
            Err(e) => {
                return Err(e);
            }
        };
        if !Self::allowed(&self.auth_claim, &order) {
            return Ok(PaymentConfirmUcOutput::PermissionDeny);
        }
        if order.is_paid() {
            return Ok(PaymentConfirmUcOutput::AlreadyPaid(Box::new(order.into())));
        }
        let txn_id = match (order.payment_method, data.txn_id) {
            (PaymentMethod::OnlinePrepay, Some(t)) => t,
            (PaymentMethod::OnlinePrepay, None) => {
                return Ok(PaymentConfirmUcOutput::MissingTxnId);
            }
            // cash-on-delivery settles outside any gateway, synthesize the
            // manual transaction record
            (PaymentMethod::CashOnDelivery, _) => {
                format!("{}{}", MANUAL_TXN_ID_PREFIX, Self::manual_serial())
            }
        };
        let timenow = LocalTime::now().fixed_offset();
        let result = PaymentResultModel {
            txn_id,
            status: "settled".to_string(),
            settled_time: timenow,
            payer_email: data.payer_email.unwrap_or_default(),
        };
        let accepted = order.confirm_payment(result, timenow);
        debug_assert!(accepted);
        self.repo_order.save_payment(&order).await?;
        Ok(PaymentConfirmUcOutput::Success(Box::new(order.into())))
    } // end of fn execute

    fn allowed(claim: &AppAuthedClaim, order: &OrderModel) -> bool {
        order.owner_id == claim.profile
            || claim.is_admin()
            || (claim.is_seller() && order.contains_seller(claim.profile))
    }

    fn manual_serial() -> String {
        let uid = crate::generate_custom_uid(app_meta::MACHINE_CODE);
        uid.into_bytes()
            .into_iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join("")
    }
} // end of impl PaymentConfirmUseCase
