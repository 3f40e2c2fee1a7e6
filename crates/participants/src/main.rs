//! Runs the order, payment and shipping participants in one process.

use axum::Router;
use participants::{Config, OrderService, PaymentService, ShippingService};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve(name: &'static str, addr: String, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, participant = name, "participant started");
    axum::serve(listener, app.layer(TraceLayer::new_for_http()))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let orders = OrderService::new();
    let payments = PaymentService::new();
    payments.set_decline_all(config.payment_decline_all).await;
    let shipping = ShippingService::new();
    shipping.set_fail_all(config.shipping_fail_all).await;

    let result = tokio::try_join!(
        serve(
            "order",
            config.addr(config.order_port),
            participants::order::router(orders)
        ),
        serve(
            "payment",
            config.addr(config.payment_port),
            participants::payment::router(payments)
        ),
        serve(
            "shipping",
            config.addr(config.shipping_port),
            participants::shipping::router(shipping)
        ),
    );
    result.expect("participant server error");

    tracing::info!("participants shut down gracefully");
}
