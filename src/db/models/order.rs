//! Order records, the order total calculation, and status updates.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::{now_rfc3339, today};

/// One product/quantity/variant entry within an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Referenced good id
    pub id: i64,
    pub amount: i64,
    pub size: String,
    pub color: String,
}

/// Recipient data captured at order time, independent of later profile edits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecipient {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub city: String,
    pub postal_office: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: i64,
    pub items: String,
    pub sum: i64,
    pub user_id: Option<String>,
    pub date: String,
    pub order_num: i64,
    pub comment: String,
    pub status: String,
    pub recipient_first_name: String,
    pub recipient_last_name: String,
    pub recipient_phone: String,
    pub recipient_city: String,
    pub recipient_postal_office: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub products: Vec<OrderItem>,
    pub sum: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub date: String,
    pub order_num: i64,
    pub comment: String,
    pub status: String,
    pub user_data: OrderRecipient,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            products: serde_json::from_str(&order.items).unwrap_or_default(),
            sum: order.sum,
            user_id: order.user_id,
            date: order.date,
            order_num: order.order_num,
            comment: order.comment,
            status: order.status,
            user_data: OrderRecipient {
                first_name: order.recipient_first_name,
                last_name: order.recipient_last_name,
                phone: order.recipient_phone,
                city: order.recipient_city,
                postal_office: order.recipient_postal_office,
            },
        }
    }
}

/// Human-facing 7-digit order number. Best effort: collisions are accepted,
/// the primary key stays authoritative.
fn random_order_number() -> i64 {
    rand::rng().random_range(1_111_111..=9_999_999)
}

/// Compute an order total from line items and resolved unit prices. Items
/// whose good did not resolve contribute zero. The result is rounded up to a
/// whole currency unit.
pub fn order_total(items: &[OrderItem], unit_prices: &HashMap<i64, f64>) -> i64 {
    let sum: f64 = items
        .iter()
        .filter_map(|item| {
            unit_prices
                .get(&item.id)
                .map(|price| item.amount as f64 * price)
        })
        .sum();
    sum.ceil() as i64
}

/// Resolve authoritative unit prices for a set of goods in one batch lookup
pub async fn fetch_unit_prices(
    db: &SqlitePool,
    good_ids: &[i64],
) -> Result<HashMap<i64, f64>, sqlx::Error> {
    if good_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; good_ids.len()].join(", ");
    let sql = format!(
        "SELECT id, price_value FROM goods WHERE id IN ({})",
        placeholders
    );

    let mut query = sqlx::query_as::<_, (i64, f64)>(&sql);
    for id in good_ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(db).await?;

    Ok(rows.into_iter().collect())
}

/// Create an order: resolve prices, compute the total, persist the record.
/// `user_id` is present only on the authenticated checkout path.
pub async fn create_order(
    db: &SqlitePool,
    items: &[OrderItem],
    comment: &str,
    recipient: &OrderRecipient,
    user_id: Option<&str>,
) -> Result<OrderResponse, sqlx::Error> {
    let good_ids: Vec<i64> = items.iter().map(|item| item.id).collect();
    let unit_prices = fetch_unit_prices(db, &good_ids).await?;
    let sum = order_total(items, &unit_prices);

    let items_json = serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string());
    let order_num = random_order_number();
    let date = today();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO orders \
         (items, sum, user_id, date, order_num, comment, \
          recipient_first_name, recipient_last_name, recipient_phone, recipient_city, \
          recipient_postal_office, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&items_json)
    .bind(sum)
    .bind(user_id)
    .bind(&date)
    .bind(order_num)
    .bind(comment)
    .bind(&recipient.first_name)
    .bind(&recipient.last_name)
    .bind(&recipient.phone)
    .bind(&recipient.city)
    .bind(recipient.postal_office)
    .bind(now_rfc3339())
    .fetch_one(db)
    .await?;

    let order: Order = sqlx::query_as("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_one(db)
        .await?;

    Ok(OrderResponse::from(order))
}

/// Orders placed by a user account or addressed to the user's phone
pub async fn list_orders_for_user(
    db: &SqlitePool,
    user_id: &str,
    phone: &str,
) -> Result<Vec<OrderResponse>, sqlx::Error> {
    let orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE user_id = ? OR recipient_phone = ? ORDER BY id")
            .bind(user_id)
            .bind(phone)
            .fetch_all(db)
            .await?;

    Ok(orders.into_iter().map(OrderResponse::from).collect())
}

/// Update an order's status. Returns None when no such order exists.
pub async fn update_order_status(
    db: &SqlitePool,
    id: i64,
    status: &str,
) -> Result<Option<OrderResponse>, sqlx::Error> {
    let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    let order: Order = sqlx::query_as("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_one(db)
        .await?;

    Ok(Some(OrderResponse::from(order)))
}
