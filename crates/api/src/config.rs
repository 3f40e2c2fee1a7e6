//! Application configuration loaded from environment variables.

use saga::ParticipantEndpoints;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `8080`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `ORDER_SERVICE_URL`: order participant (default: `"http://localhost:8081"`)
/// - `PAYMENT_SERVICE_URL`: payment participant (default: `"http://localhost:8082"`)
/// - `SHIPPING_SERVICE_URL`: shipping participant (default: `"http://localhost:8083"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub order_service_url: String,
    pub payment_service_url: String,
    pub shipping_service_url: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            order_service_url: std::env::var("ORDER_SERVICE_URL")
                .unwrap_or(defaults.order_service_url),
            payment_service_url: std::env::var("PAYMENT_SERVICE_URL")
                .unwrap_or(defaults.payment_service_url),
            shipping_service_url: std::env::var("SHIPPING_SERVICE_URL")
                .unwrap_or(defaults.shipping_service_url),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the participant base URLs.
    pub fn endpoints(&self) -> ParticipantEndpoints {
        ParticipantEndpoints::new(
            self.order_service_url.as_str(),
            self.payment_service_url.as_str(),
            self.shipping_service_url.as_str(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        let endpoints = ParticipantEndpoints::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            order_service_url: endpoints.order,
            payment_service_url: endpoints.payment,
            shipping_service_url: endpoints.shipping,
        }
    }
}
