use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    cme_api::order_objects::OrderQueryFilter,
    db_types::{NewOrder, Order, OrderNumber, OrderStatus},
    traits::OrderFlowError,
};

/// Inserts the order row for a verified payment, in `Pending` status.
pub async fn insert_order(
    order_number: &OrderNumber,
    draft: &NewOrder,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let order: Order = sqlx::query_as(
        r#"
        INSERT INTO orders (
            order_number,
            payment_reference,
            buyer_id,
            seller_id,
            product_id,
            quantity,
            product_price,
            delivery_fee,
            platform_commission,
            total_amount
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *;
        "#,
    )
    .bind(order_number)
    .bind(&draft.payment_reference)
    .bind(draft.buyer_id)
    .bind(draft.seller_id)
    .bind(draft.product_id)
    .bind(draft.quantity)
    .bind(draft.product_price)
    .bind(draft.delivery_fee)
    .bind(draft.platform_commission)
    .bind(draft.total_amount)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order {} inserted with id {}", order.order_number, order.id);
    Ok(order)
}

pub async fn fetch_order_by_number(
    order_number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE order_number = $1")
        .bind(order_number.as_str())
        .fetch_optional(conn)
        .await
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_order_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE payment_reference = $1")
        .bind(reference)
        .fetch_optional(conn)
        .await
}

/// Claims the rider slot on a pending order. First writer wins: the guard is part of the UPDATE,
/// so of two racing riders exactly one sees a row come back.
pub async fn claim_rider_slot(
    order_number: &OrderNumber,
    rider_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET
            rider_id = $1,
            status = 'RiderAssigned',
            rider_assigned_at = CURRENT_TIMESTAMP,
            updated_at = CURRENT_TIMESTAMP
        WHERE order_number = $2 AND status = 'Pending' AND rider_id IS NULL
        RETURNING *;
        "#,
    )
    .bind(rider_id)
    .bind(order_number.as_str())
    .fetch_optional(conn)
    .await
}

/// Moves a delivery one step forward, compare-and-set on (rider, current status). Stamps
/// `delivered_at` the first time the order reaches `Delivered`.
pub async fn progress_status(
    order_number: &OrderNumber,
    rider_id: i64,
    from: OrderStatus,
    to: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let sql = if to == OrderStatus::Delivered {
        r#"
        UPDATE orders SET
            status = $1,
            delivered_at = COALESCE(delivered_at, CURRENT_TIMESTAMP),
            updated_at = CURRENT_TIMESTAMP
        WHERE order_number = $2 AND rider_id = $3 AND status = $4
        RETURNING *;
        "#
    } else {
        r#"
        UPDATE orders SET
            status = $1,
            updated_at = CURRENT_TIMESTAMP
        WHERE order_number = $2 AND rider_id = $3 AND status = $4
        RETURNING *;
        "#
    };
    sqlx::query_as(sql)
        .bind(to)
        .bind(order_number.as_str())
        .bind(rider_id)
        .bind(from)
        .fetch_optional(conn)
        .await
}

/// The terminal transition. Only fires for the order's buyer, only from `Delivered`, and never
/// while a dispute is live — two racing confirmations can't both succeed.
pub async fn complete_order(
    order_number: &OrderNumber,
    buyer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET
            status = 'Completed',
            completed_at = CURRENT_TIMESTAMP,
            updated_at = CURRENT_TIMESTAMP
        WHERE order_number = $1 AND buyer_id = $2 AND status = 'Delivered' AND is_disputed = 0
        RETURNING *;
        "#,
    )
    .bind(order_number.as_str())
    .bind(buyer_id)
    .fetch_optional(conn)
    .await
}

/// Freezes the order for a new dispute. Returns false if a dispute is already in flight.
pub async fn flag_disputed(order_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let updated =
        sqlx::query("UPDATE orders SET is_disputed = 1, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND is_disputed = 0")
            .bind(order_id)
            .execute(conn)
            .await?;
    Ok(updated.rows_affected() == 1)
}

pub async fn clear_disputed(order_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET is_disputed = 0, updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Fetches orders matching the filter, oldest first.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(buyer_id) = query.buyer_id {
        where_clause.push("buyer_id = ");
        where_clause.push_bind_unseparated(buyer_id);
    }
    if let Some(seller_id) = query.seller_id {
        where_clause.push("seller_id = ");
        where_clause.push_bind_unseparated(seller_id);
    }
    if let Some(rider_id) = query.rider_id {
        where_clause.push("rider_id = ");
        where_clause.push_bind_unseparated(rider_id);
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status.to_string());
    }
    if query.disputed_only {
        where_clause.push("is_disputed = 1");
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at ASC");

    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    Ok(orders)
}

/// All orders in which the account participates, as buyer, seller or rider. Newest first.
pub async fn orders_for_account(account_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM orders WHERE buyer_id = $1 OR seller_id = $1 OR rider_id = $1 ORDER BY created_at DESC",
    )
    .bind(account_id)
    .fetch_all(conn)
    .await
}
