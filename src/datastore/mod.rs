mod in_mem;

use std::boxed::Box;
use std::sync::Arc;

use crate::config::AppDataStoreCfg;
use crate::logging::AppLogContext;

pub use in_mem::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemDeleteInfo, AppInMemDstoreLock,
    AppInMemFetchKeys, AppInMemFetchedData, AppInMemFetchedSingleRow, AppInMemFetchedSingleTable,
    AppInMemUpdateData, AppInMemoryDStore,
};

pub(crate) fn build_context(
    _logctx: Arc<AppLogContext>,
    cfg: &Vec<AppDataStoreCfg>,
) -> Option<Box<dyn AbstInMemoryDStore>> {
    let mut inmem = None;
    for c in cfg {
        match c {
            AppDataStoreCfg::InMemory(d) => {
                let item: Box<dyn AbstInMemoryDStore> = Box::new(AppInMemoryDStore::new(d));
                inmem = Some(item);
            }
        }
    }
    inmem
}
