use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::AppInMemoryDbCfg;
use crate::error::{AppError, AppErrorCode};

pub type AppInMemFetchedSingleRow = Vec<String>;
pub type AppInMemFetchedSingleTable = HashMap<String, AppInMemFetchedSingleRow>;
pub type AppInMemFetchedData = HashMap<String, AppInMemFetchedSingleTable>;
pub type AppInMemUpdateData = AppInMemFetchedData;
// map of table label to row keys
pub type AppInMemFetchKeys = HashMap<String, Vec<String>>;
pub type AppInMemDeleteInfo = AppInMemFetchKeys;

type InnerTableMap = HashMap<String, AppInMemFetchedSingleTable>;

pub trait AbsDStoreFilterKeyOp: Sync + Send {
    fn filter(&self, k: &String, v: &AppInMemFetchedSingleRow) -> bool;
}

/// Guard held across a read-modify-write cycle. All tables share one mutex,
/// a holder serializes every other reservation / cancellation until the
/// paired `save_release` / `save_delete_release` call drops it.
pub struct AppInMemDstoreLock {
    guard: OwnedMutexGuard<InnerTableMap>,
}

// The in-memory data store excercises the same repository contract as a real
// database would, it is the default backend for this single-database service
// and the only backend unit tests rely on.
#[async_trait]
pub trait AbstInMemoryDStore: Send + Sync {
    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError>;
    async fn fetch(&self, keys: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError>;
    async fn fetch_all(&self, tbl_label: &str)
        -> DefaultResult<AppInMemFetchedSingleTable, AppError>;
    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError>;
    async fn delete(&self, info: AppInMemDeleteInfo) -> DefaultResult<usize, AppError>;
    async fn filter_keys(
        &self,
        tbl_label: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError>;
    async fn fetch_acquire(
        &self,
        keys: AppInMemFetchKeys,
    ) -> DefaultResult<(AppInMemFetchedData, AppInMemDstoreLock), AppError>;
    fn save_release(
        &self,
        data: AppInMemUpdateData,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError>;
    fn save_delete_release(
        &self,
        data: AppInMemUpdateData,
        removal: AppInMemDeleteInfo,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError>;
}

pub struct AppInMemoryDStore {
    max_items_per_table: u32,
    tables: Arc<Mutex<InnerTableMap>>,
}

impl AppInMemoryDStore {
    pub fn new(cfg: &AppInMemoryDbCfg) -> Self {
        Self {
            max_items_per_table: cfg.max_items,
            tables: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn table_not_exist(label: &str) -> AppError {
        AppError {
            code: AppErrorCode::DataTableNotExist,
            detail: Some(label.to_string()),
        }
    }

    fn _fetch(
        guard: &InnerTableMap,
        keys: AppInMemFetchKeys,
    ) -> DefaultResult<AppInMemFetchedData, AppError> {
        let mut out = HashMap::new();
        for (tbl_label, row_keys) in keys {
            let table = guard
                .get(&tbl_label)
                .ok_or_else(|| Self::table_not_exist(tbl_label.as_str()))?;
            let rows = row_keys
                .into_iter()
                .filter_map(|k| table.get(&k).map(|row| (k, row.clone())))
                .collect::<AppInMemFetchedSingleTable>();
            out.insert(tbl_label, rows);
        }
        Ok(out)
    }

    fn _save(
        guard: &mut InnerTableMap,
        data: AppInMemUpdateData,
        max_items: u32,
    ) -> DefaultResult<usize, AppError> {
        let mut num_saved = 0;
        for (tbl_label, rows) in data {
            let table = guard
                .get_mut(&tbl_label)
                .ok_or_else(|| Self::table_not_exist(tbl_label.as_str()))?;
            for (k, row) in rows {
                if !table.contains_key(&k) && table.len() >= max_items as usize {
                    return Err(AppError {
                        code: AppErrorCode::ExceedingMaxLimit,
                        detail: Some(format!("table:{}, limit:{}", tbl_label, max_items)),
                    });
                }
                table.insert(k, row);
                num_saved += 1;
            }
        }
        Ok(num_saved)
    }

    fn _delete(guard: &mut InnerTableMap, info: AppInMemDeleteInfo) -> DefaultResult<usize, AppError> {
        let mut num_del = 0;
        for (tbl_label, row_keys) in info {
            let table = guard
                .get_mut(&tbl_label)
                .ok_or_else(|| Self::table_not_exist(tbl_label.as_str()))?;
            for k in row_keys {
                if table.remove(&k).is_some() {
                    num_del += 1;
                }
            }
        }
        Ok(num_del)
    }
} // end of impl AppInMemoryDStore

#[async_trait]
impl AbstInMemoryDStore for AppInMemoryDStore {
    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError> {
        let mut guard = self.tables.lock().await;
        if !guard.contains_key(label) {
            guard.insert(label.to_string(), HashMap::new());
        }
        Ok(())
    }

    async fn fetch(&self, keys: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError> {
        let guard = self.tables.lock().await;
        Self::_fetch(&guard, keys)
    }

    async fn fetch_all(
        &self,
        tbl_label: &str,
    ) -> DefaultResult<AppInMemFetchedSingleTable, AppError> {
        let guard = self.tables.lock().await;
        let table = guard
            .get(tbl_label)
            .ok_or_else(|| Self::table_not_exist(tbl_label))?;
        Ok(table.clone())
    }

    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError> {
        let mut guard = self.tables.lock().await;
        Self::_save(&mut guard, data, self.max_items_per_table)
    }

    async fn delete(&self, info: AppInMemDeleteInfo) -> DefaultResult<usize, AppError> {
        let mut guard = self.tables.lock().await;
        Self::_delete(&mut guard, info)
    }

    async fn filter_keys(
        &self,
        tbl_label: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError> {
        let guard = self.tables.lock().await;
        let table = guard
            .get(&tbl_label)
            .ok_or_else(|| Self::table_not_exist(tbl_label.as_str()))?;
        let out = table
            .iter()
            .filter(|(k, v)| op.filter(k, v))
            .map(|(k, _v)| k.clone())
            .collect();
        Ok(out)
    }

    async fn fetch_acquire(
        &self,
        keys: AppInMemFetchKeys,
    ) -> DefaultResult<(AppInMemFetchedData, AppInMemDstoreLock), AppError> {
        let guard = self.tables.clone().lock_owned().await;
        let data = Self::_fetch(&guard, keys)?;
        Ok((data, AppInMemDstoreLock { guard }))
    }

    fn save_release(
        &self,
        data: AppInMemUpdateData,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError> {
        self.save_delete_release(data, HashMap::new(), lock)
    }

    fn save_delete_release(
        &self,
        data: AppInMemUpdateData,
        removal: AppInMemDeleteInfo,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError> {
        let mut guard = lock.guard;
        let num_saved = Self::_save(&mut guard, data, self.max_items_per_table)?;
        let num_del = Self::_delete(&mut guard, removal)?;
        Ok(num_saved + num_del)
    } // guard dropped at here, other requests may proceed
} // end of impl AbstInMemoryDStore for AppInMemoryDStore
