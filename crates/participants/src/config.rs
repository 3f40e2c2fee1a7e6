//! Participant configuration loaded from environment variables.

/// Listen addresses and failure switches for the three participants.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `ORDER_PORT` / `PAYMENT_PORT` / `SHIPPING_PORT`: default `8081` / `8082` / `8083`
/// - `PAYMENT_DECLINE_ALL`: decline every charge (default: `false`)
/// - `SHIPPING_FAIL_ALL`: fail every shipment (default: `false`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub order_port: u16,
    pub payment_port: u16,
    pub shipping_port: u16,
    pub payment_decline_all: bool,
    pub shipping_fail_all: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            order_port: port_var("ORDER_PORT").unwrap_or(defaults.order_port),
            payment_port: port_var("PAYMENT_PORT").unwrap_or(defaults.payment_port),
            shipping_port: port_var("SHIPPING_PORT").unwrap_or(defaults.shipping_port),
            payment_decline_all: flag_var("PAYMENT_DECLINE_ALL"),
            shipping_fail_all: flag_var("SHIPPING_FAIL_ALL"),
        }
    }

    /// Returns the `"host:port"` bind address for a port.
    pub fn addr(&self, port: u16) -> String {
        format!("{}:{}", self.host, port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            order_port: 8081,
            payment_port: 8082,
            shipping_port: 8083,
            payment_decline_all: false,
            shipping_fail_all: false,
        }
    }
}

fn port_var(name: &str) -> Option<u16> {
    std::env::var(name).ok().and_then(|p| p.parse().ok())
}

fn flag_var(name: &str) -> bool {
    std::env::var(name)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
