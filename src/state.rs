use std::sync::Arc;

use classaccess_auth::TokenIssuer;
use classaccess_config::{CookieConfig, CorsConfig, JwtConfig, RateLimitConfig};
use classaccess_db::Store;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenIssuer>,
    pub cookie_config: CookieConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        jwt_config: &JwtConfig,
        cookie_config: CookieConfig,
        cors_config: CorsConfig,
        rate_limit_config: RateLimitConfig,
    ) -> Self {
        Self {
            store,
            tokens: Arc::new(TokenIssuer::new(jwt_config)),
            cookie_config,
            cors_config,
            rate_limit_config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}
