//! Request handler definitions.
//!
//! Handlers stay thin: extract the authenticated user, hand the ids to the engine, translate the
//! result. Anything that looks like a business rule belongs in `campus_market_engine`, not here.
use actix_web::{get, patch, post, web, HttpResponse};
use campus_market_engine::{
    db_types::{OrderNumber, Role},
    AccountApi,
    DisputeApi,
    OrderFlowApi,
    SqliteDatabase,
};
use campus_market_engine::traits::BankDetails;
use log::*;

use crate::{
    auth::AuthenticatedUser,
    data_objects::{
        ConfirmPaymentRequest,
        CreateOrderRequest,
        DisputeMessageRequest,
        IssuePenaltyRequest,
        JsonResponse,
        OpenDisputeRequest,
        ResolveDisputeRequest,
        UpdateStatusRequest,
        WithdrawRequest,
    },
    errors::ServerError,
    integrations::Gateway,
};

type Backend = SqliteDatabase;

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(JsonResponse::success("👍️"))
}

#[post("/api/orders")]
pub async fn create_order(
    user: AuthenticatedUser,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<Backend>>,
) -> Result<HttpResponse, ServerError> {
    let draft = api.create_order(user.account_id, body.product_id, body.quantity).await?;
    Ok(HttpResponse::Ok().json(draft))
}

#[post("/api/payments/confirm")]
pub async fn confirm_payment(
    _user: AuthenticatedUser,
    body: web::Json<ConfirmPaymentRequest>,
    api: web::Data<OrderFlowApi<Backend>>,
    gateway: web::Data<Gateway>,
) -> Result<HttpResponse, ServerError> {
    let order = api.confirm_payment(&body.reference, gateway.get_ref()).await?;
    Ok(HttpResponse::Ok().json(order))
}

#[post("/api/orders/{order_number}/accept")]
pub async fn accept_order(
    user: AuthenticatedUser,
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<Backend>>,
) -> Result<HttpResponse, ServerError> {
    let order_number = OrderNumber::from(path.into_inner());
    let assignment = api.accept_order(user.account_id, &order_number).await?;
    Ok(HttpResponse::Ok().json(assignment))
}

#[patch("/api/orders/{order_number}/status")]
pub async fn update_delivery_status(
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<OrderFlowApi<Backend>>,
) -> Result<HttpResponse, ServerError> {
    let order_number = OrderNumber::from(path.into_inner());
    let order = api.update_delivery_status(user.account_id, &order_number, body.status).await?;
    Ok(HttpResponse::Ok().json(order))
}

#[post("/api/orders/{order_number}/confirm-delivery")]
pub async fn confirm_delivery(
    user: AuthenticatedUser,
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<Backend>>,
) -> Result<HttpResponse, ServerError> {
    let order_number = OrderNumber::from(path.into_inner());
    let breakdown = api.confirm_delivery(user.account_id, &order_number).await?;
    Ok(HttpResponse::Ok().json(breakdown))
}

#[get("/api/orders/{order_number}")]
pub async fn fetch_order(
    user: AuthenticatedUser,
    path: web::Path<String>,
    api: web::Data<AccountApi<Backend>>,
) -> Result<HttpResponse, ServerError> {
    let order_number = OrderNumber::from(path.into_inner());
    let order = api
        .order_by_number(&order_number)
        .await?
        .ok_or_else(|| ServerError::InvalidRequestPath(format!("no order {order_number}")))?;
    let is_party = order.buyer_id == user.account_id
        || order.seller_id == user.account_id
        || order.rider_id == Some(user.account_id);
    if !is_party && !user.has_role(Role::Admin) {
        return Err(ServerError::InsufficientPermissions("not a party to this order".to_string()));
    }
    Ok(HttpResponse::Ok().json(order))
}

#[post("/api/disputes")]
pub async fn open_dispute(
    user: AuthenticatedUser,
    body: web::Json<OpenDisputeRequest>,
    api: web::Data<DisputeApi<Backend>>,
) -> Result<HttpResponse, ServerError> {
    let body = body.into_inner();
    let order_number = OrderNumber::from(body.order_number);
    let dispute = api.open_dispute(user.account_id, &order_number, &body.reason, body.evidence).await?;
    Ok(HttpResponse::Ok().json(dispute))
}

#[post("/api/disputes/{dispute_id}/messages")]
pub async fn respond_to_dispute(
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<DisputeMessageRequest>,
    api: web::Data<DisputeApi<Backend>>,
) -> Result<HttpResponse, ServerError> {
    let body = body.into_inner();
    let message = api.respond(user.account_id, path.into_inner(), &body.message, body.evidence).await?;
    Ok(HttpResponse::Ok().json(message))
}

#[post("/api/disputes/{dispute_id}/resolve")]
pub async fn resolve_dispute(
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<ResolveDisputeRequest>,
    api: web::Data<DisputeApi<Backend>>,
) -> Result<HttpResponse, ServerError> {
    user.require_role(Role::Admin)?;
    let dispute = api.resolve(user.account_id, path.into_inner(), body.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(dispute))
}

#[post("/api/penalties")]
pub async fn issue_penalty(
    user: AuthenticatedUser,
    body: web::Json<IssuePenaltyRequest>,
    api: web::Data<DisputeApi<Backend>>,
) -> Result<HttpResponse, ServerError> {
    user.require_role(Role::Admin)?;
    let body = body.into_inner();
    let penalty = api.issue_penalty(user.account_id, body.user_id, body.action, &body.reason).await?;
    Ok(HttpResponse::Ok().json(penalty))
}

#[post("/api/withdrawals")]
pub async fn withdraw(
    user: AuthenticatedUser,
    body: web::Json<WithdrawRequest>,
    api: web::Data<AccountApi<Backend>>,
    gateway: web::Data<Gateway>,
) -> Result<HttpResponse, ServerError> {
    let body = body.into_inner();
    let recipient = BankDetails {
        bank_code: body.bank_code,
        account_number: body.account_number,
        account_name: body.account_name,
    };
    let receipt = api.withdraw(user.account_id, body.amount, &recipient, gateway.get_ref()).await?;
    info!("💸️ Withdrawal [{}] accepted for account #{}", receipt.reference, user.account_id);
    Ok(HttpResponse::Ok().json(receipt))
}

#[get("/api/account")]
pub async fn account_balance(
    user: AuthenticatedUser,
    api: web::Data<AccountApi<Backend>>,
) -> Result<HttpResponse, ServerError> {
    let balance = api.balance(user.account_id).await?;
    Ok(HttpResponse::Ok().json(balance))
}

#[get("/api/account/history")]
pub async fn account_history(
    user: AuthenticatedUser,
    api: web::Data<AccountApi<Backend>>,
) -> Result<HttpResponse, ServerError> {
    let history = api.history(user.account_id).await?;
    Ok(HttpResponse::Ok().json(history))
}
