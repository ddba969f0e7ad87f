use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;
use std::vec::Vec;

use async_trait::async_trait;

use crate::datastore::{
    AbstInMemoryDStore, AppInMemDstoreLock, AppInMemFetchedData, AppInMemFetchedSingleTable,
};
use crate::error::AppError;
use crate::model::{
    BaseProductIdentity, OrderLineModel, OrderModel, ProductModel, StockLevelModelSet,
};

use super::super::{
    AbsProductRepo, AppStockRepoReserveReturn, AppStockRepoReserveUserFunc,
    AppStockRepoReturnUserFunc,
};
use super::order::OrderInMemRepo;
use super::parse_cell;

mod _product {
    pub(super) const TABLE_LABEL: &str = "product";

    pub(super) enum InMemColIdx {
        Name,
        Image,
        Price,
        CountInStock,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            match value {
                InMemColIdx::Name => 0,
                InMemColIdx::Image => 1,
                InMemColIdx::Price => 2,
                InMemColIdx::CountInStock => 3,
                InMemColIdx::TotNumColumns => 4,
            }
        }
    }
} // end of inner module _product

struct FetchArg(AppInMemFetchedSingleTable);
struct SaveArg(StockLevelModelSet);

impl TryFrom<FetchArg> for StockLevelModelSet {
    type Error = AppError;
    fn try_from(value: FetchArg) -> DefaultResult<Self, Self::Error> {
        let items = value
            .0
            .into_iter()
            .map(|(key, row)| {
                let id_elms = key.split('/').collect::<Vec<&str>>();
                let seller_id = parse_cell::<u32>(id_elms[0], "seller-id")?;
                let product_id = parse_cell::<u64>(
                    id_elms.get(1).map(|s| &**s).unwrap_or(""),
                    "product-id",
                )?;
                let fetch = |idx: _product::InMemColIdx| -> &str {
                    let idx: usize = idx.into();
                    row.get(idx).map(|s| s.as_str()).unwrap_or("")
                };
                Ok(ProductModel {
                    id_: BaseProductIdentity {
                        seller_id,
                        product_id,
                    },
                    name: fetch(_product::InMemColIdx::Name).to_string(),
                    image: fetch(_product::InMemColIdx::Image).to_string(),
                    price: parse_cell(fetch(_product::InMemColIdx::Price), "price")?,
                    count_in_stock: parse_cell(
                        fetch(_product::InMemColIdx::CountInStock),
                        "count-in-stock",
                    )?,
                })
            })
            .collect::<DefaultResult<Vec<_>, AppError>>()?;
        Ok(StockLevelModelSet { items })
    }
} // end of impl TryFrom for StockLevelModelSet

impl From<SaveArg> for AppInMemFetchedSingleTable {
    fn from(value: SaveArg) -> Self {
        let kv_pairs = value.0.items.into_iter().map(|p| {
            let pkey = format!("{}/{}", p.id_.seller_id, p.id_.product_id);
            let mut row = (0.._product::InMemColIdx::TotNumColumns.into())
                .map(|_n| String::new())
                .collect::<Vec<String>>();
            [
                (_product::InMemColIdx::Name, p.name),
                (_product::InMemColIdx::Image, p.image),
                (_product::InMemColIdx::Price, p.price.to_string()),
                (
                    _product::InMemColIdx::CountInStock,
                    p.count_in_stock.to_string(),
                ),
            ]
            .into_iter()
            .map(|(idx, val)| {
                let idx: usize = idx.into();
                row[idx] = val;
            })
            .count();
            (pkey, row)
        });
        HashMap::from_iter(kv_pairs)
    }
}

pub struct ProductInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl ProductInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(_product::TABLE_LABEL).await?;
        Ok(Self { datastore: m })
    }

    fn row_keys(ids: &[BaseProductIdentity]) -> Vec<String> {
        ids.iter()
            .map(|d| format!("{}/{}", d.seller_id, d.product_id))
            .collect()
    }

    async fn fetch_with_lock(
        &self,
        ids: Vec<BaseProductIdentity>,
    ) -> DefaultResult<(StockLevelModelSet, AppInMemDstoreLock), AppError> {
        let info = HashMap::from([(_product::TABLE_LABEL.to_string(), Self::row_keys(&ids))]);
        let (tableset, lock) = self.datastore.fetch_acquire(info).await?;
        let mset = Self::try_into_modelset(tableset)?;
        Ok((mset, lock))
    }

    fn try_into_modelset(
        mut tableset: AppInMemFetchedData,
    ) -> DefaultResult<StockLevelModelSet, AppError> {
        let rows = tableset
            .remove(_product::TABLE_LABEL)
            .unwrap_or_default();
        StockLevelModelSet::try_from(FetchArg(rows))
    }
} // end of impl ProductInMemRepo

#[async_trait]
impl AbsProductRepo for ProductInMemRepo {
    async fn fetch_many(
        &self,
        ids: Vec<BaseProductIdentity>,
    ) -> DefaultResult<StockLevelModelSet, AppError> {
        let info = HashMap::from([(_product::TABLE_LABEL.to_string(), Self::row_keys(&ids))]);
        let tableset = self.datastore.fetch(info).await?;
        Self::try_into_modelset(tableset)
    }

    async fn save(&self, mset: StockLevelModelSet) -> DefaultResult<(), AppError> {
        let rows = AppInMemFetchedSingleTable::from(SaveArg(mset));
        let data = HashMap::from([(_product::TABLE_LABEL.to_string(), rows)]);
        let _num_saved = self.datastore.save(data).await?;
        Ok(())
    }

    async fn try_reserve(
        &self,
        usr_cb: AppStockRepoReserveUserFunc,
        order: &OrderModel,
    ) -> AppStockRepoReserveReturn {
        let ids = order
            .lines
            .iter()
            .map(|l| l.id_.clone())
            .collect::<Vec<_>>();
        let (mut mset, d_lock) = match self.fetch_with_lock(ids).await {
            Ok(v) => v,
            Err(e) => {
                return Err(Err(e));
            }
        };
        usr_cb(&mut mset, order)?;
        let data = {
            let mut seq = OrderInMemRepo::in_mem_order_rows(order);
            let rows = AppInMemFetchedSingleTable::from(SaveArg(mset));
            seq.insert(0, (_product::TABLE_LABEL.to_string(), rows));
            HashMap::from_iter(seq)
        };
        if let Err(e) = self.datastore.save_release(data, d_lock) {
            Err(Err(e))
        } else {
            Ok(())
        }
    } // end of fn try_reserve

    async fn try_return(
        &self,
        usr_cb: AppStockRepoReturnUserFunc,
        lines: Vec<OrderLineModel>,
    ) -> DefaultResult<Vec<BaseProductIdentity>, AppError> {
        let ids = lines.iter().map(|l| l.id_.clone()).collect::<Vec<_>>();
        let (mut mset, d_lock) = self.fetch_with_lock(ids).await?;
        let skipped = usr_cb(&mut mset, lines.as_slice());
        let rows = AppInMemFetchedSingleTable::from(SaveArg(mset));
        let data = HashMap::from([(_product::TABLE_LABEL.to_string(), rows)]);
        let _num_saved = self.datastore.save_release(data, d_lock)?;
        Ok(skipped)
    }
} // end of impl AbsProductRepo for ProductInMemRepo
