//! Shared fixtures for the engine integration tests.
use campus_market_engine::{
    db_types::{Account, LedgerEntry, NewAccount, NewProduct, Order, OrderStatus, Product, Role},
    events::EventProducers,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        MockGateway,
    },
    AccountApi,
    AccountManagement,
    DisputeApi,
    OrderFlowApi,
    SqliteDatabase,
};
use cm_common::Naira;

pub struct TestRig {
    pub db: SqliteDatabase,
    pub gateway: MockGateway,
    pub buyer: Account,
    pub seller: Account,
    pub rider: Account,
    pub admin: Account,
    pub product: Product,
}

/// A fresh database with one of each actor and a product priced at ₦5000 with 3 in stock.
pub async fn new_rig() -> TestRig {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    let buyer = db.create_account(NewAccount::new("ada", vec![Role::Buyer])).await.unwrap();
    let seller = db.create_account(NewAccount::new("chinedu", vec![Role::Seller, Role::Buyer])).await.unwrap();
    let rider = db.create_account(NewAccount::new("emeka", vec![Role::Rider])).await.unwrap();
    let admin = db.create_account(NewAccount::new("ngozi", vec![Role::Admin])).await.unwrap();
    let product = db
        .create_product(NewProduct {
            seller_id: seller.id,
            title: "MTH201 textbook".to_string(),
            price: Naira::from(5000),
            quantity: 3,
        })
        .await
        .unwrap();
    TestRig { db, gateway: MockGateway::new(), buyer, seller, rider, admin, product }
}

impl TestRig {
    pub fn order_api(&self) -> OrderFlowApi<SqliteDatabase> {
        OrderFlowApi::new(self.db.clone(), EventProducers::default())
    }

    pub fn dispute_api(&self) -> DisputeApi<SqliteDatabase> {
        DisputeApi::new(self.db.clone(), EventProducers::default())
    }

    pub fn account_api(&self) -> AccountApi<SqliteDatabase> {
        AccountApi::new(self.db.clone())
    }

    /// Runs a checkout for one unit through payment confirmation.
    pub async fn paid_order(&self) -> Order {
        let api = self.order_api();
        let draft = self.order_api().create_order(self.buyer.id, self.product.id, 1).await.unwrap();
        self.gateway.prime_payment(&draft);
        api.confirm_payment(&draft.payment_reference, &self.gateway).await.unwrap()
    }

    /// A paid order driven through rider acceptance and all delivery steps.
    pub async fn delivered_order(&self) -> Order {
        let order = self.paid_order().await;
        let api = self.order_api();
        api.accept_order(self.rider.id, &order.order_number).await.unwrap();
        for status in [OrderStatus::PickedUp, OrderStatus::OnTheWay, OrderStatus::Delivered] {
            api.update_delivery_status(self.rider.id, &order.order_number, status).await.unwrap();
        }
        self.refetch(&order).await
    }

    /// A delivered order the buyer has confirmed, i.e. fully settled.
    pub async fn completed_order(&self) -> Order {
        let order = self.delivered_order().await;
        self.order_api().confirm_delivery(self.buyer.id, &order.order_number).await.unwrap();
        self.refetch(&order).await
    }

    pub async fn account(&self, account_id: i64) -> Account {
        self.db.fetch_account(account_id).await.unwrap().expect("account should exist")
    }

    pub async fn ledger(&self, account_id: i64) -> Vec<LedgerEntry> {
        self.db.fetch_ledger_for_account(account_id).await.unwrap()
    }

    pub async fn refetch(&self, order: &Order) -> Order {
        self.db.fetch_order_by_number(&order.order_number).await.unwrap().expect("order should exist")
    }
}
