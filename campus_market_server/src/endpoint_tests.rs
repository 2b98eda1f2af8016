//! Endpoint tests against a real engine on a throwaway database, with the gateway mocked.
use actix_web::{http::StatusCode, test, web, App};
use campus_market_engine::{
    db_types::{NewAccount, NewOrder, NewProduct, Role},
    events::EventProducers,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        MockGateway,
    },
    AccountApi,
    DisputeApi,
    OrderFlowApi,
    SqliteDatabase,
};
use cm_common::Naira;
use serde_json::json;

use crate::{
    auth::{ACCOUNT_ID_HEADER, ROLES_HEADER},
    integrations::Gateway,
    routes,
};

async fn test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

macro_rules! test_app {
    ($db:expr, $gateway:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(OrderFlowApi::new($db.clone(), EventProducers::default())))
                .app_data(web::Data::new(DisputeApi::new($db.clone(), EventProducers::default())))
                .app_data(web::Data::new(AccountApi::new($db.clone())))
                .app_data(web::Data::new(Gateway::Mock($gateway.clone())))
                .service(routes::health)
                .service(routes::create_order)
                .service(routes::confirm_payment)
                .service(routes::account_balance)
                .service(routes::issue_penalty),
        )
        .await
    };
}

#[actix_web::test]
async fn health_needs_no_identity() {
    let db = test_db().await;
    let gateway = MockGateway::new();
    let app = test_app!(db, gateway);
    let req = test::TestRequest::get().uri("/health").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn api_routes_reject_anonymous_requests() {
    let db = test_db().await;
    let gateway = MockGateway::new();
    let app = test_app!(db, gateway);
    let req = test::TestRequest::post()
        .uri("/api/orders")
        .set_json(json!({"product_id": 1, "quantity": 1}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn checkout_round_trip_over_http() {
    let db = test_db().await;
    let gateway = MockGateway::new();
    let buyer = db.create_account(NewAccount::new("ada", vec![Role::Buyer])).await.unwrap();
    let seller = db.create_account(NewAccount::new("chinedu", vec![Role::Seller])).await.unwrap();
    let product = db
        .create_product(NewProduct {
            seller_id: seller.id,
            title: "Hall 3 fan".to_string(),
            price: Naira::from(5000),
            quantity: 1,
        })
        .await
        .unwrap();
    let app = test_app!(db, gateway);

    let req = test::TestRequest::post()
        .uri("/api/orders")
        .insert_header((ACCOUNT_ID_HEADER, buyer.id.to_string()))
        .insert_header((ROLES_HEADER, "Buyer"))
        .set_json(json!({"product_id": product.id, "quantity": 1}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let draft: NewOrder = test::read_body_json(res).await;
    assert_eq!(draft.total_amount, Naira::from(5800));

    gateway.prime_payment(&draft);
    let req = test::TestRequest::post()
        .uri("/api/payments/confirm")
        .insert_header((ACCOUNT_ID_HEADER, buyer.id.to_string()))
        .insert_header((ROLES_HEADER, "Buyer"))
        .set_json(json!({"reference": draft.payment_reference}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let order: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["total_amount"], 5800);
}

#[actix_web::test]
async fn penalty_endpoint_is_admin_only() {
    let db = test_db().await;
    let gateway = MockGateway::new();
    let buyer = db.create_account(NewAccount::new("ada", vec![Role::Buyer])).await.unwrap();
    let app = test_app!(db, gateway);
    let req = test::TestRequest::post()
        .uri("/api/penalties")
        .insert_header((ACCOUNT_ID_HEADER, buyer.id.to_string()))
        .insert_header((ROLES_HEADER, "Buyer"))
        .set_json(json!({"user_id": buyer.id, "action": "Warning", "reason": "nope"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
