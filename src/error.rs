use std::fmt::{Debug, Display};
use std::io::ErrorKind;

#[derive(Debug, Clone, PartialEq)]
pub enum AppErrorCode {
    Unknown,
    NotImplemented,
    MissingConfigPath,
    MissingDataStore,
    InvalidJsonFormat,
    MissingAliasLogHdlerCfg,
    MissingAliasLoggerCfg,
    NoRouteApiServerCfg,
    EmptyInputData, // zero-line checkout attempt
    InvalidInput,   // for frontend client error
    PriceMismatch,  // client-computed breakdown diverges from catalog recomputation
    OrderNotExist,
    ProductNotExist,
    PermissionDenied,
    PaymentGatewayFailure,
    OrderAlreadyPaid,
    NotEnoughStock,
    InvalidStatusTransition,
    ExceedingMaxLimit,
    AcquireLockFailure,
    DataTableNotExist,
    DataCorruption,
    CryptoFailure,
    IOerror(ErrorKind),
} // end of AppErrorCode

#[derive(Debug, Clone)]
pub struct AppError {
    pub code: AppErrorCode,
    pub detail: Option<String>,
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let default_detail = "none";
        let dp = if let Some(s) = &self.detail {
            s.as_str()
        } else {
            default_detail
        };
        write!(f, "code:{:?}, detail:{}", self.code, dp)
    }
}

impl From<(AppErrorCode, String)> for AppError {
    fn from(value: (AppErrorCode, String)) -> Self {
        AppError {
            code: value.0,
            detail: Some(value.1),
        }
    }
}
