use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::vec::Vec;

use crate::api::web::dto::{AdminOrderStatsDto, OrderDetailDto, SellerOrderDto};
use crate::error::{AppError, AppErrorCode};
use crate::repository::AbsOrderRepo;
use crate::AppAuthedClaim;

pub enum ReadOrderUcOutput {
    Full(Box<OrderDetailDto>),
    SellerScope(Box<SellerOrderDto>),
    NotFound,
    PermissionDeny,
}

pub struct ReadOrderUseCase {
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub auth_claim: AppAuthedClaim,
}

impl ReadOrderUseCase {
    pub async fn execute(self, oid: &str) -> DefaultResult<ReadOrderUcOutput, AppError> {
        let order = match self.repo_order.fetch_by_id(oid).await {
            Ok(v) => v,
            Err(e) if e.code == AppErrorCode::OrderNotExist => {
                return Ok(ReadOrderUcOutput::NotFound);
            }
            Err(e) => {
                return Err(e);
            }
        };
        let claim = &self.auth_claim;
        if order.owner_id == claim.profile || claim.is_admin() {
            Ok(ReadOrderUcOutput::Full(Box::new(order.into())))
        } else if claim.is_seller() {
            // a seller only ever sees the projection over their own lines
            match order.seller_view(claim.profile) {
                Some(v) => Ok(ReadOrderUcOutput::SellerScope(Box::new(v.into()))),
                None => Ok(ReadOrderUcOutput::PermissionDeny),
            }
        } else {
            Ok(ReadOrderUcOutput::PermissionDeny)
        }
    } // end of fn execute
}

pub struct ListOwnerOrdersUseCase {
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub auth_claim: AppAuthedClaim,
}

impl ListOwnerOrdersUseCase {
    pub async fn execute(self) -> DefaultResult<Vec<OrderDetailDto>, AppError> {
        let orders = self
            .repo_order
            .fetch_by_owner(self.auth_claim.profile)
            .await?;
        Ok(orders.into_iter().map(OrderDetailDto::from).collect())
    }
}

pub struct ListSellerOrdersUseCase {
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub auth_claim: AppAuthedClaim,
}

impl ListSellerOrdersUseCase {
    pub async fn execute(self) -> DefaultResult<Option<Vec<SellerOrderDto>>, AppError> {
        if !self.auth_claim.is_seller() {
            return Ok(None);
        }
        let seller_id = self.auth_claim.profile;
        let orders = self.repo_order.fetch_by_seller(seller_id).await?;
        let out = orders
            .iter()
            .filter_map(|o| o.seller_view(seller_id))
            .map(SellerOrderDto::from)
            .collect();
        Ok(Some(out))
    }
}

pub struct AdminOrderStatsUseCase {
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub auth_claim: AppAuthedClaim,
}

impl AdminOrderStatsUseCase {
    pub async fn execute(self) -> DefaultResult<Option<AdminOrderStatsDto>, AppError> {
        if !self.auth_claim.is_admin() {
            return Ok(None);
        }
        let orders = self.repo_order.fetch_all().await?;
        let num_orders = orders.len();
        let num_paid = orders.iter().filter(|o| o.is_paid()).count();
        let num_delivered = orders.iter().filter(|o| o.is_delivered()).count();
        let revenue_paid = orders
            .iter()
            .filter(|o| o.is_paid())
            .map(|o| o.charge.total as u64)
            .sum::<u64>();
        Ok(Some(AdminOrderStatsDto {
            num_orders,
            num_paid,
            num_delivered,
            revenue_paid,
        }))
    }
}
