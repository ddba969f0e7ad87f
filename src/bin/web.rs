use std::boxed::Box;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::env;
use std::sync::atomic::Ordering;

use http_body::Limited;
use hyper::Body as HyperBody;
use tokio::runtime::Builder as RuntimeBuilder;
use tower::ServiceBuilder;

use storefront::adapter::AppLogNotifySink;
use storefront::api::web::route_table;
use storefront::constant::ENV_VAR_CONFIG_FILE_PATH;
use storefront::logging::{app_log_event, AppLogContext, AppLogLevel};
use storefront::network::{app_web_service, middleware, net_server_listener};
use storefront::{AppConfig, AppSharedState};

type AppFinalHttpBody = Limited<HyperBody>;

async fn start_server(shr_state: AppSharedState) {
    let log_ctx_p = shr_state.log_context().clone();
    let cfg = shr_state.config().clone();
    let shutdown_flag = shr_state.shutdown();
    // the background worker drains the notification queue for the whole
    // process lifetime
    let dispatcher = shr_state.notify_dispatcher();
    let sink = Box::new(AppLogNotifySink::new(log_ctx_p.clone()));
    let _notify_worker = dispatcher.spawn_worker(sink);
    let routes = route_table::<AppFinalHttpBody>();
    let listener = &cfg.api_server.listen;
    let (service, num_applied) = app_web_service::<AppFinalHttpBody>(listener, routes, shr_state);
    if num_applied == 0 {
        app_log_event!(
            log_ctx_p,
            AppLogLevel::ERROR,
            "no route created, web API server failed to start"
        );
        return;
    }
    let result = net_server_listener(listener.host.clone(), listener.port);
    match result {
        Ok(b) => {
            let ratelm = middleware::rate_limit(listener.max_connections);
            let reqlm = middleware::req_body_limit(cfg.api_server.limit_req_body_in_bytes);
            let co = middleware::cors();
            let middlewares1 = ServiceBuilder::new().layer(reqlm).layer(co);
            let service = service.layer(middlewares1);
            let middlewares2 = ServiceBuilder::new()
                .layer(ratelm) // rate-limit not allowed to clone
                .service(service.into_make_service());
            let sr = b.serve(middlewares2).with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                shutdown_flag.store(true, Ordering::Relaxed);
            });
            let _ = sr.await;
            app_log_event!(log_ctx_p, AppLogLevel::WARNING, "API server terminating");
        }
        Err(e) => {
            app_log_event!(
                log_ctx_p,
                AppLogLevel::ERROR,
                "API server failed to start, {} ",
                e
            );
        }
    }
} // end of fn start_server

fn start_async_runtime(cfg: AppConfig) {
    let log_ctx = AppLogContext::new(&cfg.api_server.logging);
    let shr_state = match AppSharedState::new(cfg, log_ctx) {
        Ok(v) => v,
        Err(e) => {
            println!("app failed to init shared state, error: {} ", e);
            return;
        }
    };
    let result = RuntimeBuilder::new_multi_thread()
        .thread_name("web-api-worker")
        // manage low-level I/O drivers used by network types
        .enable_io()
        // rate limiter in crate `tower` requires the timer in the runtime builder
        .enable_time()
        .build();
    match result {
        Ok(rt) => {
            // new worker threads spawned
            rt.block_on(async move {
                start_server(shr_state).await;
            }); // runtime started
        }
        Err(e) => {
            let log_ctx_p = shr_state.log_context();
            app_log_event!(
                log_ctx_p,
                AppLogLevel::ERROR,
                "async runtime failed to build, {} ",
                e
            );
        }
    };
} // end of fn start_async_runtime

fn main() {
    let iter = env::vars().filter(|(k, _v)| k.as_str() == ENV_VAR_CONFIG_FILE_PATH);
    let arg_map: HashMap<String, String, RandomState> = HashMap::from_iter(iter);
    match AppConfig::new(arg_map) {
        Ok(cfg) => start_async_runtime(cfg),
        Err(e) => {
            println!("app failed to configure, error code: {} ", e);
        }
    };
} // end of main
