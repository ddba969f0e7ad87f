use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::AppNotificationCfg;
use crate::error::{AppError, AppErrorCode};
use crate::logging::{app_log_event, AppLogContext, AppLogLevel};
use crate::model::OrderStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppNotifyTask {
    OrderConfirmation {
        order_id: String,
        owner_id: u32,
        total: u32,
    },
    StatusUpdate {
        order_id: String,
        owner_id: u32,
        status: OrderStatus,
    },
}

impl AppNotifyTask {
    fn order_id(&self) -> &str {
        match self {
            Self::OrderConfirmation { order_id, .. } => order_id.as_str(),
            Self::StatusUpdate { order_id, .. } => order_id.as_str(),
        }
    }
}

#[async_trait]
pub trait AbsNotifySink: Send + Sync {
    async fn deliver(&self, task: &AppNotifyTask) -> DefaultResult<(), AppError>;
}

/// delivery backend for deployments without a mail / push provider, it renders
/// each message to the application log stream
pub struct AppLogNotifySink {
    logctx: Arc<AppLogContext>,
}

impl AppLogNotifySink {
    pub fn new(logctx: Arc<AppLogContext>) -> Self {
        Self { logctx }
    }
}

#[async_trait]
impl AbsNotifySink for AppLogNotifySink {
    async fn deliver(&self, task: &AppNotifyTask) -> DefaultResult<(), AppError> {
        let serial = serde_json::to_string(task).map_err(|e| AppError {
            code: AppErrorCode::InvalidJsonFormat,
            detail: Some(e.to_string()),
        })?;
        let logctx_p = &self.logctx;
        app_log_event!(logctx_p, AppLogLevel::INFO, "notify-out, {}", serial);
        Ok(())
    }
}

/// Queue-backed dispatcher which decouples notification delivery from the
/// request path. `enqueue` never blocks a request, a full queue drops the
/// message and records the drop. The background worker owns the receiving end
/// and retries a failed delivery a bounded number of times before it
/// dead-letters the message to the error log.
pub struct AppNotifyDispatcher {
    sender: Sender<AppNotifyTask>,
    receiver: Mutex<Option<Receiver<AppNotifyTask>>>,
    logctx: Arc<AppLogContext>,
    max_retries: u8,
    retry_delay: Duration,
}

impl AppNotifyDispatcher {
    pub fn new(cfg: &AppNotificationCfg, logctx: Arc<AppLogContext>) -> Self {
        let (sender, receiver) = channel(cfg.queue_depth);
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            logctx,
            max_retries: cfg.max_retries,
            retry_delay: Duration::from_millis(cfg.retry_delay_ms),
        }
    }

    pub fn enqueue(&self, task: AppNotifyTask) {
        if let Err(e) = self.sender.try_send(task) {
            let logctx_p = &self.logctx;
            app_log_event!(
                logctx_p,
                AppLogLevel::ERROR,
                "notify-queue-full, dropped, {:?}",
                e
            );
        }
    }

    /// hand out the receiving end exactly once, the caller is expected to
    /// spawn `run_worker` with it
    async fn take_receiver(&self) -> DefaultResult<Receiver<AppNotifyTask>, AppError> {
        let mut guard = self.receiver.lock().await;
        guard.take().ok_or(AppError {
            code: AppErrorCode::AcquireLockFailure,
            detail: Some("notify-worker-already-running".to_string()),
        })
    }

    pub fn spawn_worker(
        self: &Arc<Self>,
        sink: Box<dyn AbsNotifySink>,
    ) -> JoinHandle<DefaultResult<(), AppError>> {
        let me = self.clone();
        tokio::spawn(async move { me.run_worker(sink).await })
    }

    pub async fn run_worker(
        &self,
        sink: Box<dyn AbsNotifySink>,
    ) -> DefaultResult<(), AppError> {
        let mut receiver = self.take_receiver().await?;
        while let Some(task) = receiver.recv().await {
            self.deliver_with_retry(sink.as_ref(), task).await;
        }
        Ok(()) // channel closed, the dispatcher went out of scope
    }

    async fn deliver_with_retry(&self, sink: &dyn AbsNotifySink, task: AppNotifyTask) {
        let mut num_attempts = 0u8;
        loop {
            num_attempts += 1;
            let result = sink.deliver(&task).await;
            match result {
                Ok(()) => {
                    break;
                }
                Err(e) if num_attempts <= self.max_retries => {
                    let logctx_p = &self.logctx;
                    app_log_event!(
                        logctx_p,
                        AppLogLevel::WARNING,
                        "notify-retry, order:{}, attempt:{}, {}",
                        task.order_id(),
                        num_attempts,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    let logctx_p = &self.logctx;
                    app_log_event!(
                        logctx_p,
                        AppLogLevel::ERROR,
                        "notify-dead-letter, order:{}, {}",
                        task.order_id(),
                        e
                    );
                    break;
                }
            }
        }
    } // end of fn deliver_with_retry
} // end of impl AppNotifyDispatcher
