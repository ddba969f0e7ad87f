use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use storefront::adapter::{
    app_processor_context, AbsNotifySink, AbstractPaymentProcessor, AppNotifyDispatcher,
    AppNotifyTask, MockPaymentProcessor,
};
use storefront::error::{AppError, AppErrorCode};
use storefront::logging::AppLogContext;
use storefront::{AppNotificationCfg, AppPaymentCfg};

use crate::ut_setup_share_state;

struct UTestCountingSink {
    num_calls: Arc<AtomicU32>,
    num_failures: u32,
}

#[async_trait]
impl AbsNotifySink for UTestCountingSink {
    async fn deliver(&self, _task: &AppNotifyTask) -> Result<(), AppError> {
        let seq = self.num_calls.fetch_add(1, Ordering::SeqCst);
        if seq < self.num_failures {
            Err(AppError {
                code: AppErrorCode::Unknown,
                detail: Some("utest-sink-down".to_string()),
            })
        } else {
            Ok(())
        }
    }
}

fn ut_notify_cfg(queue_depth: usize, max_retries: u8) -> AppNotificationCfg {
    AppNotificationCfg {
        queue_depth,
        max_retries,
        retry_delay_ms: 2,
    }
}

fn ut_log_ctx() -> Arc<AppLogContext> {
    let state = ut_setup_share_state();
    state.log_context().clone()
}

fn ut_confirm_task(oid: &str) -> AppNotifyTask {
    AppNotifyTask::OrderConfirmation {
        order_id: oid.to_string(),
        owner_id: 188,
        total: 700,
    }
}

// the worker loop only quits when the dispatcher is gone, so tests poll the
// attempt counter with a deadline then abort the worker task
async fn ut_wait_num_calls(counter: &AtomicU32, expect: u32) {
    let mut num_polls = 0u32;
    while counter.load(Ordering::SeqCst) < expect {
        num_polls += 1;
        assert!(num_polls < 500, "sink never reached {} attempts", expect);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn notify_deliver_ok() {
    let dispatcher = Arc::new(AppNotifyDispatcher::new(&ut_notify_cfg(4, 1), ut_log_ctx()));
    let num_calls = Arc::new(AtomicU32::new(0));
    let sink = UTestCountingSink {
        num_calls: num_calls.clone(),
        num_failures: 0,
    };
    dispatcher.enqueue(ut_confirm_task("na01"));
    let handle = dispatcher.spawn_worker(Box::new(sink));
    ut_wait_num_calls(&num_calls, 1).await;
    handle.abort();
    assert_eq!(num_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn notify_retry_then_succeed() {
    let dispatcher = Arc::new(AppNotifyDispatcher::new(&ut_notify_cfg(4, 3), ut_log_ctx()));
    let num_calls = Arc::new(AtomicU32::new(0));
    let sink = UTestCountingSink {
        num_calls: num_calls.clone(),
        num_failures: 2,
    };
    dispatcher.enqueue(ut_confirm_task("nb01"));
    let handle = dispatcher.spawn_worker(Box::new(sink));
    // 2 failed attempts, one success
    ut_wait_num_calls(&num_calls, 3).await;
    handle.abort();
}

#[tokio::test]
async fn notify_dead_letter_after_exhausted_retries() {
    let dispatcher = Arc::new(AppNotifyDispatcher::new(&ut_notify_cfg(4, 2), ut_log_ctx()));
    let num_calls = Arc::new(AtomicU32::new(0));
    let sink = UTestCountingSink {
        num_calls: num_calls.clone(),
        num_failures: u32::MAX,
    };
    dispatcher.enqueue(ut_confirm_task("nc01"));
    dispatcher.enqueue(ut_confirm_task("nc02"));
    let handle = dispatcher.spawn_worker(Box::new(sink));
    // first attempt plus 2 retries for each message, then give up and move on
    ut_wait_num_calls(&num_calls, 6).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    handle.abort();
    assert_eq!(num_calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn notify_worker_runs_only_once() {
    let dispatcher = Arc::new(AppNotifyDispatcher::new(&ut_notify_cfg(4, 1), ut_log_ctx()));
    let sink0 = UTestCountingSink {
        num_calls: Arc::new(AtomicU32::new(0)),
        num_failures: 0,
    };
    let sink1 = UTestCountingSink {
        num_calls: Arc::new(AtomicU32::new(0)),
        num_failures: 0,
    };
    let handle0 = dispatcher.spawn_worker(Box::new(sink0));
    tokio::time::sleep(Duration::from_millis(10)).await;
    // the receiving end was already taken, a second worker must bail out
    let error = dispatcher.run_worker(Box::new(sink1)).await.err().unwrap();
    assert_eq!(error.code, AppErrorCode::AcquireLockFailure);
    handle0.abort();
}

#[tokio::test]
async fn notify_full_queue_drops_without_blocking() {
    // no worker running yet, capacity 2, the third message is dropped
    let dispatcher = Arc::new(AppNotifyDispatcher::new(&ut_notify_cfg(2, 1), ut_log_ctx()));
    dispatcher.enqueue(ut_confirm_task("nd01"));
    dispatcher.enqueue(ut_confirm_task("nd02"));
    dispatcher.enqueue(ut_confirm_task("nd03"));
    let num_calls = Arc::new(AtomicU32::new(0));
    let sink = UTestCountingSink {
        num_calls: num_calls.clone(),
        num_failures: 0,
    };
    let handle = dispatcher.spawn_worker(Box::new(sink));
    ut_wait_num_calls(&num_calls, 2).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    handle.abort();
    assert_eq!(num_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn processor_mock_session_ok() {
    let cfg = AppPaymentCfg {
        processor: "mock".to_string(),
    };
    let proc_ctx = app_processor_context(&cfg).unwrap();
    let session = proc_ctx.create_session("pa01", 700).await.unwrap();
    assert_eq!(session.order_id.as_str(), "pa01");
    assert_eq!(session.amount, 700);
    assert!(!session.session_id.is_empty());
}

#[tokio::test]
async fn processor_mock_gateway_declined() {
    let proc_ctx = MockPaymentProcessor::default();
    proc_ctx.set_fail_mode(true);
    let error = proc_ctx.create_session("pb01", 700).await.err().unwrap();
    let app_e = AppError::from(error);
    assert_eq!(app_e.code, AppErrorCode::PaymentGatewayFailure);
    proc_ctx.set_fail_mode(false);
    assert!(proc_ctx.create_session("pb01", 700).await.is_ok());
}

#[test]
fn processor_unknown_label() {
    let cfg = AppPaymentCfg {
        processor: "no-such-gateway".to_string(),
    };
    let error = app_processor_context(&cfg).err().unwrap();
    assert_eq!(error.code, AppErrorCode::NotImplemented);
}
