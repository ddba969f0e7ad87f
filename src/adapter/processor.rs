use std::boxed::Box;
use std::marker::{Send, Sync};
use std::result::Result as DefaultResult;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local};

use crate::config::AppPaymentCfg;
use crate::error::{AppError, AppErrorCode};
use crate::generate_custom_uid;

#[derive(Debug)]
pub enum AppProcessorErrorReason {
    InvalidConfig(String),
    GatewayDeclined,
    LowLvlNet(String),
}

#[derive(Debug)]
pub struct AppProcessorError {
    pub reason: AppProcessorErrorReason,
}

impl From<AppProcessorError> for AppError {
    fn from(value: AppProcessorError) -> Self {
        Self {
            code: AppErrorCode::PaymentGatewayFailure,
            detail: Some(format!("{:?}", value.reason)),
        }
    }
}

/// opaque pay-in session handed back to the storefront client, the client
/// completes the session against the gateway then reports the result through
/// the payment-confirmation endpoint
pub struct AppProcessorSession {
    pub session_id: String,
    pub order_id: String,
    pub amount: u32,
    pub currency_label: String,
    pub create_time: DateTime<FixedOffset>,
}

#[async_trait]
pub trait AbstractPaymentProcessor: Send + Sync {
    async fn create_session(
        &self,
        order_id: &str,
        amount: u32,
    ) -> DefaultResult<AppProcessorSession, AppProcessorError>;
}

/// stand-in gateway for local deployment and unit test, a real processor
/// integration implements the same trait
pub struct MockPaymentProcessor {
    fail_mode: AtomicBool,
}

impl Default for MockPaymentProcessor {
    fn default() -> Self {
        Self {
            fail_mode: AtomicBool::new(false),
        }
    }
}

impl MockPaymentProcessor {
    pub fn set_fail_mode(&self, enabled: bool) {
        self.fail_mode.store(enabled, Ordering::Relaxed);
    }
}

#[async_trait]
impl AbstractPaymentProcessor for MockPaymentProcessor {
    async fn create_session(
        &self,
        order_id: &str,
        amount: u32,
    ) -> DefaultResult<AppProcessorSession, AppProcessorError> {
        if self.fail_mode.load(Ordering::Relaxed) {
            return Err(AppProcessorError {
                reason: AppProcessorErrorReason::GatewayDeclined,
            });
        }
        let uid = generate_custom_uid(crate::constant::app_meta::MACHINE_CODE);
        let session_id = uid
            .into_bytes()
            .into_iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join("");
        Ok(AppProcessorSession {
            session_id,
            order_id: order_id.to_string(),
            amount,
            currency_label: "usd".to_string(),
            create_time: Local::now().fixed_offset(),
        })
    }
}

pub fn app_processor_context(
    cfg: &AppPaymentCfg,
) -> DefaultResult<Box<dyn AbstractPaymentProcessor>, AppError> {
    match cfg.processor.as_str() {
        "mock" => Ok(Box::new(MockPaymentProcessor::default())),
        _others => Err(AppError {
            code: AppErrorCode::NotImplemented,
            detail: Some(format!("payment-processor:{}", cfg.processor)),
        }),
    }
}
