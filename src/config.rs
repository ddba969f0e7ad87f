use std::env::VarError;
use std::fs::File;
use std::result::Result as DefaultResult;

use serde::Deserialize;

use crate::constant::logging::{Destination, Level};
use crate::constant::{hard_limit, ENV_VAR_CONFIG_FILE_PATH};
use crate::error::{AppError, AppErrorCode};

#[derive(Deserialize)]
pub struct AppLogHandlerCfg {
    pub alias: String,
    pub min_level: Level,
    pub destination: Destination,
    pub path: Option<String>,
}

#[derive(Deserialize)]
pub struct AppLoggerCfg {
    pub alias: String,
    pub handlers: Vec<String>,
}

#[derive(Deserialize)]
pub struct AppLoggingCfg {
    pub handlers: Vec<AppLogHandlerCfg>,
    pub loggers: Vec<AppLoggerCfg>,
}

#[derive(Deserialize)]
pub struct WebApiRouteCfg {
    pub path: String,
    pub handler: String,
}

#[derive(Deserialize)]
pub struct WebApiListenCfg {
    pub api_version: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub routes: Vec<WebApiRouteCfg>,
}

#[derive(Deserialize)]
pub struct AppInMemoryDbCfg {
    pub alias: String,
    pub max_items: u32,
}

#[derive(Deserialize)]
pub enum AppDataStoreCfg {
    InMemory(AppInMemoryDbCfg),
} // single-database deployment, sql variants could be added as new entries

#[derive(Deserialize)]
pub struct AppAuthCfg {
    // symmetric signing secret shared with the user-management service
    pub secret: String,
}

#[derive(Deserialize)]
pub struct AppPaymentCfg {
    pub processor: String,
}

#[derive(Deserialize)]
pub struct AppNotificationCfg {
    pub queue_depth: usize,
    pub max_retries: u8,
    pub retry_delay_ms: u64,
}

#[derive(Deserialize)]
pub struct ApiServerCfg {
    pub listen: WebApiListenCfg,
    pub limit_req_body_in_bytes: usize,
    pub logging: AppLoggingCfg,
    pub data_store: Vec<AppDataStoreCfg>,
    pub auth: AppAuthCfg,
    pub payment: AppPaymentCfg,
    pub notification: AppNotificationCfg,
}

pub struct AppConfig {
    pub api_server: ApiServerCfg,
}

impl AppConfig {
    pub fn new(mut args: std::collections::HashMap<String, String>) -> DefaultResult<Self, AppError> {
        let cfg_path = args.remove(ENV_VAR_CONFIG_FILE_PATH).ok_or(AppError {
            code: AppErrorCode::MissingConfigPath,
            detail: Some(ENV_VAR_CONFIG_FILE_PATH.to_string()),
        })?;
        let api_server = Self::parse_from_file(cfg_path)?;
        Ok(Self { api_server })
    }

    pub fn parse_from_file(filepath: String) -> DefaultResult<ApiServerCfg, AppError> {
        let f = File::open(&filepath).map_err(|e| AppError {
            code: AppErrorCode::IOerror(e.kind()),
            detail: Some(filepath.clone()),
        })?;
        let obj = serde_json::from_reader::<File, ApiServerCfg>(f).map_err(|e| AppError {
            code: AppErrorCode::InvalidJsonFormat,
            detail: Some(e.to_string()),
        })?;
        Self::_check_web_listener(&obj.listen)?;
        Self::_check_logging(&obj.logging)?;
        Ok(obj)
    }

    fn _check_web_listener(cfg: &WebApiListenCfg) -> DefaultResult<(), AppError> {
        if cfg.routes.is_empty() {
            Err(AppError {
                code: AppErrorCode::NoRouteApiServerCfg,
                detail: None,
            })
        } else {
            Ok(())
        }
    }

    fn _check_logging(cfg: &AppLoggingCfg) -> DefaultResult<(), AppError> {
        let hdlr_aliases = cfg
            .handlers
            .iter()
            .map(|h| h.alias.as_str())
            .collect::<Vec<_>>();
        let mut missing = cfg.loggers.iter().flat_map(|logger| {
            logger
                .handlers
                .iter()
                .filter(|a| !hdlr_aliases.contains(&a.as_str()))
        });
        if let Some(alias) = missing.next() {
            Err(AppError {
                code: AppErrorCode::MissingAliasLogHdlerCfg,
                detail: Some(alias.clone()),
            })
        } else {
            Ok(())
        }
    }
} // end of impl AppConfig

impl From<VarError> for AppError {
    fn from(value: VarError) -> Self {
        let detail = match value {
            VarError::NotPresent => "env-var-not-present".to_string(),
            VarError::NotUnicode(source) => format!("env-var-not-unicode: {:?}", source),
        };
        AppError {
            code: AppErrorCode::MissingConfigPath,
            detail: Some(detail),
        }
    }
}

impl ApiServerCfg {
    /// programmatic counterpart of `parse_from_file`, used by unit tests
    /// and local tooling which do not ship a config file
    pub fn attribute_defaults(num_routes_expected: usize) -> Self {
        let routes = crate::api::web::default_route_cfg()
            .into_iter()
            .take(num_routes_expected)
            .collect::<Vec<_>>();
        Self {
            listen: WebApiListenCfg {
                api_version: "1.0.0".to_string(),
                host: "localhost".to_string(),
                port: 8012,
                max_connections: 256,
                routes,
            },
            limit_req_body_in_bytes: 131072,
            logging: AppLoggingCfg {
                handlers: vec![AppLogHandlerCfg {
                    alias: "std-output".to_string(),
                    min_level: Level::WARNING,
                    destination: Destination::CONSOLE,
                    path: None,
                }],
                loggers: vec![],
            },
            data_store: vec![AppDataStoreCfg::InMemory(AppInMemoryDbCfg {
                alias: "store-in-mem".to_string(),
                max_items: hard_limit::MAX_ITEMS_STORED_PER_MODEL,
            })],
            auth: AppAuthCfg {
                secret: "test-only-signing-secret".to_string(),
            },
            payment: AppPaymentCfg {
                processor: "mock".to_string(),
            },
            notification: AppNotificationCfg {
                queue_depth: hard_limit::MAX_NOTIFY_QUEUE_DEPTH,
                max_retries: hard_limit::MAX_NOTIFY_RETRIES,
                retry_delay_ms: 20,
            },
        }
    } // end of fn attribute_defaults
} // end of impl ApiServerCfg
