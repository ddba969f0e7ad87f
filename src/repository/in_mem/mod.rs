pub(super) mod order;
pub(super) mod product;

use std::result::Result as DefaultResult;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};

use crate::error::{AppError, AppErrorCode};

pub(super) fn parse_cell<T: FromStr>(raw: &str, label: &str) -> DefaultResult<T, AppError> {
    raw.parse::<T>().map_err(|_e| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(format!("column:{}, actual:{}", label, raw)),
    })
}

pub(super) fn parse_time_cell(
    raw: &str,
    label: &str,
) -> DefaultResult<DateTime<FixedOffset>, AppError> {
    DateTime::parse_from_rfc3339(raw).map_err(|_e| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(format!("column:{}, actual:{}", label, raw)),
    })
}

// optional columns keep an empty string when absent
pub(super) fn parse_opt_time_cell(
    raw: &str,
    label: &str,
) -> DefaultResult<Option<DateTime<FixedOffset>>, AppError> {
    if raw.is_empty() {
        Ok(None)
    } else {
        parse_time_cell(raw, label).map(Some)
    }
}
