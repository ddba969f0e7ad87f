use std::io::ErrorKind;
use std::net::ToSocketAddrs;
use std::result::Result as DefaultResult;

use axum::Router;
use http_body::Body as HttpBody;
use hyper::server::conn::AddrIncoming;
use hyper::server::Builder as HyperSrvBuilder;
use hyper::Server as HyperServer;

use crate::api::web::{ApiRouteTableType, ApiRouteType};
use crate::config::{WebApiListenCfg, WebApiRouteCfg};
use crate::error::{AppError, AppErrorCode};
use crate::AppSharedState;

// Due to the issues #1110 and discussion #1818 in Axum v0.6.x,
// the generic type parameter of final router depends all the middleware
// layers added to the router, because they wrap the original http request
// and response body layer by layer, the type parameter `HB` has to match
// that at compile time
pub type WebServiceRoute<HB> = Router<(), HB>;

pub fn app_web_service<HB>(
    cfg: &WebApiListenCfg,
    rtable: ApiRouteTableType<HB>,
    shr_state: AppSharedState,
) -> (WebServiceRoute<HB>, u16)
where
    HB: HttpBody + Send + 'static,
    <HB as HttpBody>::Data: Send,
    <HB as HttpBody>::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // the type parameters for shared state and http body should be explicitly
    // annotated, this function creates a router first then specify type of the
    // shared state later at the end of the same function.
    let mut router: Router<AppSharedState, HB> = Router::new();
    let iterator = cfg.routes.iter();
    let filt_fn = |&item: &&WebApiRouteCfg| -> bool {
        let hdlr_label = item.handler.as_str();
        rtable.contains_key(hdlr_label)
    };
    let filtered = iterator.filter(filt_fn);
    let mut num_applied: u16 = 0;
    for item in filtered {
        let hdlr_label = item.handler.as_str();
        if let Some(route) = rtable.get(hdlr_label) {
            let route_cpy: ApiRouteType<HB> = route.clone();
            // method routers registered at the same path merge into one entry
            router = router.route(item.path.as_str(), route_cpy);
            num_applied += 1u16;
        }
    }
    let router = if num_applied > 0 {
        let api_ver_path = String::from("/") + &cfg.api_version;
        Router::new().nest(api_ver_path.as_str(), router)
    } else {
        router
    };
    // DO NOT specify state type at here, Axum converts a router to a leaf service
    // ONLY when the type parameter `S` in `Router` becomes empty tuple `()`.
    let router = router.with_state(shr_state);
    (router, num_applied)
} // end of fn app_web_service

pub mod middleware {
    use std::time::Duration;

    use axum::http;
    use tower::limit::RateLimitLayer;
    use tower_http::cors::{Any as CorsAny, CorsLayer};
    use tower_http::limit::RequestBodyLimitLayer;

    pub fn rate_limit(max_conn: u32) -> RateLimitLayer {
        let num = max_conn as u64;
        let period = Duration::from_secs(1);
        RateLimitLayer::new(num, period)
    }

    pub fn cors() -> CorsLayer {
        CorsLayer::new()
            .allow_origin(CorsAny)
            .allow_methods([
                http::Method::GET,
                http::Method::POST,
                http::Method::PATCH,
                http::Method::DELETE,
            ])
            .allow_headers([
                http::header::AUTHORIZATION,
                http::header::CONTENT_TYPE,
                http::header::ACCEPT,
            ])
            .max_age(Duration::from_secs(3600))
    }

    pub fn req_body_limit(limit: usize) -> RequestBodyLimitLayer {
        RequestBodyLimitLayer::new(limit)
    }
} // end of inner-module middleware

pub fn net_server_listener(
    mut domain_host: String,
    port: u16,
) -> DefaultResult<HyperSrvBuilder<AddrIncoming>, AppError> {
    if !domain_host.contains(':') {
        domain_host += ":0";
    }
    let iterator = domain_host.to_socket_addrs().map_err(
        // IP not found after domain name resolution
        |e| AppError {
            detail: Some(e.to_string() + ", domain_host:" + &domain_host),
            code: AppErrorCode::IOerror(ErrorKind::AddrNotAvailable),
        },
    )?;
    for mut addr in iterator {
        addr.set_port(port);
        if let Ok(b) = HyperServer::try_bind(&addr) {
            return Ok(b);
        }
    }
    Err(AppError {
        detail: Some("failed to bound with all IPs".to_string()),
        code: AppErrorCode::IOerror(ErrorKind::AddrInUse),
    })
} // end of fn net_server_listener
