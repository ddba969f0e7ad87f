use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::vec::Vec;

use chrono::Local as LocalTime;

use crate::adapter::AppNotifyTask;
use crate::api::web::dto::{
    OrderCreateNonFieldReason, OrderCreateReqData, OrderCreateRespErrorDto, OrderCreateRespOkDto,
    OrderLineCreateErrorDto, OrderLineCreateErrorReason, OrderLineReqDto,
};
use crate::constant::{app_meta, hard_limit};
use crate::error::{AppError, AppErrorCode};
use crate::logging::{app_log_event, AppLogLevel};
use crate::model::{
    BaseProductIdentity, OrderChargeModel, OrderLineModel, OrderModel, OrderStatus,
    ShippingAddrModel, StockLevelModelSet,
};
use crate::repository::{AbsOrderRepo, AbsProductRepo, AppStockRepoReserveReturn};
use crate::{AppAuthedClaim, AppSharedState};

pub enum CreateOrderUsKsErr {
    ReqContent(OrderCreateRespErrorDto),
    Server(Vec<AppError>),
}

fn empty_resp_error() -> OrderCreateRespErrorDto {
    OrderCreateRespErrorDto {
        order_lines: None,
        shipping_addr: None,
        nonfield: None,
        detail: None,
    }
}

pub struct CreateOrderUseCase {
    pub glb_state: AppSharedState,
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub repo_product: Box<dyn AbsProductRepo>,
    pub auth_claim: AppAuthedClaim,
}

impl CreateOrderUseCase {
    pub async fn execute(
        self,
        req: OrderCreateReqData,
    ) -> DefaultResult<OrderCreateRespOkDto, CreateOrderUsKsErr> {
        Self::validate_num_lines(&req.order_lines)?;
        let o_shipping = Self::validate_address(req.shipping_addr)?;
        let stock_mset = self.load_products(&req.order_lines).await?;
        let o_lines = Self::validate_orderlines(&stock_mset, &req.order_lines)?;
        let charge = OrderChargeModel {
            items: req.charge.items,
            tax: req.charge.tax,
            shipping: req.charge.shipping,
            total: req.charge.total,
        };
        // the items subtotal is recomputed from the catalog snapshot, any
        // client-side price tampering stops the checkout here
        if let Err(e) = charge.validate(o_lines.as_slice()) {
            let mut err_obj = empty_resp_error();
            err_obj.nonfield = Some(OrderCreateNonFieldReason::PriceMismatch);
            err_obj.detail = e.detail;
            return Err(CreateOrderUsKsErr::ReqContent(err_obj));
        }
        let timenow = LocalTime::now().fixed_offset();
        let usr_id = self.auth_claim.profile;
        let order = OrderModel {
            id_: OrderModel::generate_order_id(app_meta::MACHINE_CODE),
            owner_id: usr_id,
            lines: o_lines,
            shipping: o_shipping,
            payment_method: req.payment_method,
            charge,
            payment: None,
            paid_time: None,
            delivered_time: None,
            status: OrderStatus::Processing,
            expect_delivery: None,
            create_time: timenow,
            update_time: timenow,
        };
        // repository treats stock decrement and order persistence as one
        // atomic step, a failed reservation writes nothing
        self.try_reserve_stock(&order).await?;
        self.glb_state
            .notify_dispatcher()
            .enqueue(AppNotifyTask::OrderConfirmation {
                order_id: order.id_.clone(),
                owner_id: usr_id,
                total: order.charge.total,
            });
        Ok(OrderCreateRespOkDto {
            order_id: order.id_,
            usr_id,
            status: order.status,
            total: order.charge.total,
            time: timenow.timestamp() as u64,
        })
    } // end of fn execute

    fn validate_num_lines(data: &[OrderLineReqDto]) -> DefaultResult<(), CreateOrderUsKsErr> {
        let reason = if data.is_empty() {
            Some(OrderCreateNonFieldReason::EmptyOrderLines)
        } else if data.len() > hard_limit::MAX_ORDER_LINES_PER_REQUEST {
            Some(OrderCreateNonFieldReason::TooManyOrderLines)
        } else {
            None
        };
        if let Some(r) = reason {
            let mut err_obj = empty_resp_error();
            err_obj.nonfield = Some(r);
            Err(CreateOrderUsKsErr::ReqContent(err_obj))
        } else {
            Ok(())
        }
    }

    fn validate_address(
        data: crate::api::web::dto::ShippingAddrDto,
    ) -> DefaultResult<ShippingAddrModel, CreateOrderUsKsErr> {
        ShippingAddrModel::try_from(data).map_err(|e| {
            let mut err_obj = empty_resp_error();
            err_obj.shipping_addr = Some(e);
            CreateOrderUsKsErr::ReqContent(err_obj)
        })
    }

    async fn load_products(
        &self,
        data: &[OrderLineReqDto],
    ) -> DefaultResult<StockLevelModelSet, CreateOrderUsKsErr> {
        let ids = data
            .iter()
            .map(|d| BaseProductIdentity {
                seller_id: d.seller_id,
                product_id: d.product_id,
            })
            .collect::<Vec<_>>();
        self.repo_product.fetch_many(ids).await.map_err(|e| {
            let logctx_p = self.glb_state.log_context().clone();
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-fail-fetch-products: {e}");
            CreateOrderUsKsErr::Server(vec![e])
        })
    }

    fn validate_orderlines(
        stock_mset: &StockLevelModelSet,
        data: &[OrderLineReqDto],
    ) -> DefaultResult<Vec<OrderLineModel>, CreateOrderUsKsErr> {
        let (mut client_errors, mut server_errors) = (vec![], vec![]);
        let lines = data
            .iter()
            .enumerate()
            .filter_map(|(idx, d)| {
                if d.quantity == 0 {
                    client_errors.push(OrderLineCreateErrorDto {
                        seller_id: d.seller_id,
                        product_id: d.product_id,
                        reason: OrderLineCreateErrorReason::ZeroQuantity,
                        shortage: None,
                    });
                    return None;
                }
                if d.quantity > hard_limit::MAX_ORDER_LINE_QTY {
                    client_errors.push(OrderLineCreateErrorDto {
                        seller_id: d.seller_id,
                        product_id: d.product_id,
                        reason: OrderLineCreateErrorReason::ExceedQuantityLimit,
                        shortage: None,
                    });
                    return None;
                }
                // one line per product, repeated identities would otherwise
                // collide on the persisted line key
                let repeated = data[..idx]
                    .iter()
                    .any(|prev| prev.seller_id == d.seller_id && prev.product_id == d.product_id);
                if repeated {
                    client_errors.push(OrderLineCreateErrorDto {
                        seller_id: d.seller_id,
                        product_id: d.product_id,
                        reason: OrderLineCreateErrorReason::DuplicateProduct,
                        shortage: None,
                    });
                    return None;
                }
                let found = stock_mset.items.iter().find(|p| {
                    p.id_.seller_id == d.seller_id && p.id_.product_id == d.product_id
                });
                if let Some(product) = found {
                    match OrderLineModel::try_from(d, product) {
                        Ok(line) => Some(line),
                        // the line subtotal overflowed, the quantity asked
                        // for is unserviceable however much stock exists
                        Err(e) if e.code == AppErrorCode::InvalidInput => {
                            client_errors.push(OrderLineCreateErrorDto {
                                seller_id: d.seller_id,
                                product_id: d.product_id,
                                reason: OrderLineCreateErrorReason::ExceedQuantityLimit,
                                shortage: None,
                            });
                            None
                        }
                        Err(e) => {
                            server_errors.push(e);
                            None
                        }
                    }
                } else {
                    client_errors.push(OrderLineCreateErrorDto {
                        seller_id: d.seller_id,
                        product_id: d.product_id,
                        reason: OrderLineCreateErrorReason::NotExist,
                        shortage: None,
                    });
                    None
                }
            })
            .collect::<Vec<_>>();
        if !server_errors.is_empty() {
            Err(CreateOrderUsKsErr::Server(server_errors))
        } else if !client_errors.is_empty() {
            let mut err_obj = empty_resp_error();
            err_obj.order_lines = Some(client_errors);
            Err(CreateOrderUsKsErr::ReqContent(err_obj))
        } else {
            Ok(lines)
        }
    } // end of fn validate_orderlines

    async fn try_reserve_stock(&self, order: &OrderModel) -> DefaultResult<(), CreateOrderUsKsErr> {
        let logctx_p = self.glb_state.log_context().clone();
        match self
            .repo_product
            .try_reserve(Self::try_reserve_stock_cb, order)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => match e {
                Ok(client_e) => {
                    app_log_event!(logctx_p, AppLogLevel::WARNING, "stock reserve client error");
                    let mut err_obj = empty_resp_error();
                    err_obj.order_lines = Some(client_e);
                    Err(CreateOrderUsKsErr::ReqContent(err_obj))
                }
                Err(server_e) => {
                    app_log_event!(
                        logctx_p,
                        AppLogLevel::ERROR,
                        "stock reserve server error, detail:{server_e}"
                    );
                    Err(CreateOrderUsKsErr::Server(vec![server_e]))
                }
            },
        }
    } // end of fn try_reserve_stock

    fn try_reserve_stock_cb(ms: &mut StockLevelModelSet, order: &OrderModel) -> AppStockRepoReserveReturn {
        let result = ms.try_reserve(order.lines.as_slice());
        if result.is_empty() {
            Ok(())
        } else {
            Err(Ok(result))
        }
    }
} // end of impl CreateOrderUseCase

pub enum CancelOrderUcOutput {
    Success,
    NotFound,
    PermissionDeny,
}

pub struct CancelOrderUseCase {
    pub glb_state: AppSharedState,
    pub repo_order: Box<dyn AbsOrderRepo>,
    pub repo_product: Box<dyn AbsProductRepo>,
    pub auth_claim: AppAuthedClaim,
}

impl CancelOrderUseCase {
    pub async fn execute(self, oid: &str) -> DefaultResult<CancelOrderUcOutput, AppError> {
        let existing = match self.repo_order.fetch_by_id(oid).await {
            Ok(v) => v,
            Err(e) if e.code == AppErrorCode::OrderNotExist => {
                return Ok(CancelOrderUcOutput::NotFound);
            }
            Err(e) => {
                return Err(e);
            }
        };
        if existing.owner_id != self.auth_claim.profile && !self.auth_claim.is_admin() {
            return Ok(CancelOrderUcOutput::PermissionDeny);
        }
        // the take is atomic, whichever concurrent cancel loses the race gets
        // `OrderNotExist` and never reaches the stock restore below
        let taken = match self.repo_order.delete_take(oid).await {
            Ok(v) => v,
            Err(e) if e.code == AppErrorCode::OrderNotExist => {
                return Ok(CancelOrderUcOutput::NotFound);
            }
            Err(e) => {
                return Err(e);
            }
        };
        let skipped = self
            .repo_product
            .try_return(Self::try_return_cb, taken.lines)
            .await?;
        if !skipped.is_empty() {
            let logctx_p = self.glb_state.log_context().clone();
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "stock restore skipped removed products, order:{}, num:{}",
                oid,
                skipped.len()
            );
        }
        Ok(CancelOrderUcOutput::Success)
    } // end of fn execute

    fn try_return_cb(
        ms: &mut StockLevelModelSet,
        lines: &[OrderLineModel],
    ) -> Vec<BaseProductIdentity> {
        ms.try_return(lines)
    }
} // end of impl CancelOrderUseCase
