use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProduct, Product},
    traits::AccountApiError,
};

pub async fn product_by_id(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, AccountApiError> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, AccountApiError> {
    let product: Product = sqlx::query_as(
        "INSERT INTO products (seller_id, title, price, quantity) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(product.seller_id)
    .bind(product.title)
    .bind(product.price)
    .bind(product.quantity)
    .fetch_one(conn)
    .await?;
    debug!("📦️ Product #{} listed by seller #{}", product.id, product.seller_id);
    Ok(product)
}

/// Takes `quantity` units out of stock if the product is live and has them. The guard is part of
/// the UPDATE, so a paid order can never oversell against a concurrent purchase.
pub async fn decrement_stock(
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, AccountApiError> {
    let updated = sqlx::query(
        "UPDATE products SET quantity = quantity - $1, updated_at = CURRENT_TIMESTAMP \
         WHERE id = $2 AND is_active = 1 AND quantity >= $1",
    )
    .bind(quantity)
    .bind(product_id)
    .execute(conn)
    .await?;
    Ok(updated.rows_affected() == 1)
}
