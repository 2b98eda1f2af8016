use actix_web::{web, App, HttpServer};
use campus_market_engine::{
    events::{EventHandlers, EventHooks},
    AccountApi,
    DisputeApi,
    OrderFlowApi,
    SqliteDatabase,
};
use log::*;

use crate::{config::ServerConfig, errors::ServerError, integrations::Gateway, routes};

/// Wires the engine, gateway and event hooks together and serves until shutdown.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;

    // Notification delivery is out of band; the server just logs what the engine emits.
    let mut hooks = EventHooks::default();
    hooks.on_order_completed(|ev| {
        Box::pin(async move {
            info!(
                "📣️ Order {} settled: {} / {} / {}",
                ev.order.order_number, ev.settlement.seller, ev.settlement.rider, ev.settlement.platform
            );
        })
    });
    hooks.on_dispute_resolved(|ev| {
        Box::pin(async move {
            info!("📣️ Dispute #{} resolved as {}", ev.dispute.id, ev.dispute.status);
        })
    });
    let handlers = EventHandlers::new(64, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let gateway = Gateway::paystack(config.paystack.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let order_api = web::Data::new(OrderFlowApi::new(db.clone(), producers.clone()));
    let dispute_api = web::Data::new(
        DisputeApi::new(db.clone(), producers.clone())
            .with_refund_policy(config.refund_policy)
            .with_penalty_policy(config.penalty_policy),
    );
    let account_api = web::Data::new(AccountApi::new(db.clone()));
    let gateway = web::Data::new(gateway);

    let srv = HttpServer::new(move || {
        App::new()
            .app_data(order_api.clone())
            .app_data(dispute_api.clone())
            .app_data(account_api.clone())
            .app_data(gateway.clone())
            .service(routes::health)
            .service(routes::create_order)
            .service(routes::confirm_payment)
            .service(routes::accept_order)
            .service(routes::update_delivery_status)
            .service(routes::confirm_delivery)
            .service(routes::fetch_order)
            .service(routes::open_dispute)
            .service(routes::respond_to_dispute)
            .service(routes::resolve_dispute)
            .service(routes::issue_penalty)
            .service(routes::withdraw)
            .service(routes::account_balance)
            .service(routes::account_history)
    })
    .bind((config.host.as_str(), config.port))?;
    info!("🚀️ Campus market server listening on {}:{}", config.host, config.port);
    srv.run().await?;
    Ok(())
}
