use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;

use crate::api::web::dto::OrderLineCreateErrorDto;
use crate::error::{AppError, AppErrorCode};
use crate::model::{
    BaseProductIdentity, OrderLineModel, OrderModel, StockLevelModelSet,
};
use crate::AppDataStoreContext;

mod in_mem;
// make in-memory repo visible only for testing purpose
pub use in_mem::order::OrderInMemRepo;
pub use in_mem::product::ProductInMemRepo;

// the repository instance may be used across an await,
// the future created by app callers has to be able to pass to different threads
// , it is the reason to add `Send` and `Sync` as super-traits
#[async_trait]
pub trait AbsOrderRepo: Sync + Send {
    async fn fetch_by_id(&self, oid: &str) -> DefaultResult<OrderModel, AppError>;

    /// newest order first
    async fn fetch_by_owner(&self, owner_id: u32) -> DefaultResult<Vec<OrderModel>, AppError>;

    async fn fetch_by_seller(&self, seller_id: u32) -> DefaultResult<Vec<OrderModel>, AppError>;

    async fn fetch_all(&self) -> DefaultResult<Vec<OrderModel>, AppError>;

    async fn save_payment(&self, saved: &OrderModel) -> DefaultResult<(), AppError>;

    async fn save_status(&self, saved: &OrderModel) -> DefaultResult<(), AppError>;

    /// remove the order and hand the final snapshot back in one step, a second
    /// cancellation request loses the race and sees `OrderNotExist`, which is
    /// what keeps the compensating stock restore from running twice
    async fn delete_take(&self, oid: &str) -> DefaultResult<OrderModel, AppError>;
} // end of trait AbsOrderRepo

pub type AppStockRepoReserveReturn =
    DefaultResult<(), DefaultResult<Vec<OrderLineCreateErrorDto>, AppError>>;

pub type AppStockRepoReserveUserFunc =
    fn(&mut StockLevelModelSet, &OrderModel) -> AppStockRepoReserveReturn;

// if the function pointer type is declared directly in function signature of a
// trait method, the function pointer will be viewed as closure block
pub type AppStockRepoReturnUserFunc =
    fn(&mut StockLevelModelSet, &[OrderLineModel]) -> Vec<BaseProductIdentity>;

#[async_trait]
pub trait AbsProductRepo: Sync + Send {
    async fn fetch_many(
        &self,
        ids: Vec<BaseProductIdentity>,
    ) -> DefaultResult<StockLevelModelSet, AppError>;

    async fn save(&self, mset: StockLevelModelSet) -> DefaultResult<(), AppError>;

    /// stock decrement and order persistence happen under one datastore lock,
    /// either the whole order is recorded with every line reserved or nothing
    /// is written at all
    async fn try_reserve(
        &self,
        usr_cb: AppStockRepoReserveUserFunc,
        order: &OrderModel,
    ) -> AppStockRepoReserveReturn;

    async fn try_return(
        &self,
        usr_cb: AppStockRepoReturnUserFunc,
        lines: Vec<OrderLineModel>,
    ) -> DefaultResult<Vec<BaseProductIdentity>, AppError>;
}

pub async fn app_repo_order(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsOrderRepo>, AppError> {
    if let Some(m) = &ds.in_mem {
        let obj = OrderInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("unknown-type".to_string()),
        })
    }
}

pub async fn app_repo_product(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsProductRepo>, AppError> {
    if let Some(m) = &ds.in_mem {
        let obj = ProductInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("unknown-type".to_string()),
        })
    }
}
