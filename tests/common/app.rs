use std::sync::Arc;

use axum::Router;

use run_history_backend::config::{Config, UpstreamConfig};
use run_history_backend::history::RunSource;
use run_history_backend::routes::build_router;
use run_history_backend::state::AppState;

use super::observer::FailureRecorder;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub observer: Arc<FailureRecorder>,
}

// 直接构造 Config，避免 set_var 造成多线程测试环境变量竞态
pub fn test_config(upstream_base_url: &str) -> Config {
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        upstream: UpstreamConfig {
            base_url: upstream_base_url.to_string(),
            timeout_secs: 5,
            user_agent: "run-history-test".to_string(),
        },
    }
}

pub fn spawn_with_source(source: Arc<dyn RunSource>) -> TestApp {
    let config = test_config("http://127.0.0.1:9");
    let observer = Arc::new(FailureRecorder::default());
    let state = AppState::new(source, &config).with_observer(observer.clone());
    let app = build_router(state.clone());
    TestApp {
        app,
        state,
        observer,
    }
}

pub fn spawn_with_config(config: &Config) -> TestApp {
    let observer = Arc::new(FailureRecorder::default());
    let state = AppState::from_config(config).with_observer(observer.clone());
    let app = build_router(state.clone());
    TestApp {
        app,
        state,
        observer,
    }
}
