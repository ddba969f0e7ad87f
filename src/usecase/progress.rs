use std::boxed::Box;
use std::result::Result as DefaultResult;

use chrono::Local as LocalTime;

use crate::adapter::AppNotifyTask;
use crate::api::web::dto::{OrderDetailDto, StatusAdvanceReqDto};
use crate::error::{AppError, AppErrorCode};
use crate::model::{OrderModel, OrderStatus};
use crate::repository::AbsOrderRepo;
use crate::{AppAuthedClaim, AppSharedState};

pub enum AdvanceStatusUcOutput {
    Success(Box<OrderDetailDto>),
    NotFound,
    PermissionDeny,
    InvalidTransition(AppError),
}

pub struct AdvanceStatusUseCase {
    pub glb_state: AppSharedState,
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub auth_claim: AppAuthedClaim,
}

impl AdvanceStatusUseCase {
    pub async fn execute(
        self,
        oid: &str,
        data: StatusAdvanceReqDto,
    ) -> DefaultResult<AdvanceStatusUcOutput, AppError> {
        let mut order = match self.repo_order.fetch_by_id(oid).await {
            Ok(v) => v,
            Err(e) if e.code == AppErrorCode::OrderNotExist => {
                return Ok(AdvanceStatusUcOutput::NotFound);
            }
            Err(e) => {
                return Err(e);
            }
        };
        if !Self::allowed(&self.auth_claim, &order) {
            return Ok(AdvanceStatusUcOutput::PermissionDeny);
        }
        let timenow = LocalTime::now().fixed_offset();
        if let Err(e) = order.advance_status(data.status, data.expect_delivery, timenow) {
            return Ok(AdvanceStatusUcOutput::InvalidTransition(e));
        }
        self.repo_order.save_status(&order).await?;
        self.glb_state
            .notify_dispatcher()
            .enqueue(AppNotifyTask::StatusUpdate {
                order_id: order.id_.clone(),
                owner_id: order.owner_id,
                status: order.status,
            });
        Ok(AdvanceStatusUcOutput::Success(Box::new(order.into())))
    } // end of fn execute

    fn allowed(claim: &AppAuthedClaim, order: &OrderModel) -> bool {
        claim.is_admin() || (claim.is_seller() && order.contains_seller(claim.profile))
    }
} // end of impl AdvanceStatusUseCase

/// separate entry point for the delivery confirmation endpoint, the resulting
/// order state is identical to advancing the status to `Delivered`
pub struct MarkDeliveredUseCase {
    pub glb_state: AppSharedState,
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub auth_claim: AppAuthedClaim,
}

impl MarkDeliveredUseCase {
    pub async fn execute(self, oid: &str) -> DefaultResult<AdvanceStatusUcOutput, AppError> {
        let inner = AdvanceStatusUseCase {
            glb_state: self.glb_state,
            repo_order: self.repo_order,
            auth_claim: self.auth_claim,
        };
        let req = StatusAdvanceReqDto {
            status: OrderStatus::Delivered,
            expect_delivery: None,
        };
        inner.execute(oid, req).await
    }
}
