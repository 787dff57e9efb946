//! Order API: checkout for guests and signed-in users, order history,
//! and admin status updates.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::db::{self, OrderItem, OrderRecipient, OrderResponse};
use crate::AppState;

use super::auth::{AdminUser, CurrentUser};
use super::error::ApiError;
use super::validation::{
    validate_color, validate_id, validate_order_status, validate_phone, validate_postal_office,
    validate_required, validate_size,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub products: Vec<OrderItem>,
    #[serde(default)]
    pub comment: String,
    pub user_data: OrderRecipient,
}

fn validate_order_request(req: &CreateOrderRequest) -> Result<(), ApiError> {
    if req.products.is_empty() {
        return Err(ApiError::validation("Order must contain at least one item"));
    }

    for item in &req.products {
        validate_id(item.id, "product id").map_err(ApiError::validation)?;
        if item.amount < 1 {
            return Err(ApiError::validation("Amount must be at least 1"));
        }
        validate_size(&item.size).map_err(ApiError::validation)?;
        validate_color(&item.color).map_err(ApiError::validation)?;
    }

    validate_required(&req.user_data.first_name, "firstName").map_err(ApiError::validation)?;
    validate_required(&req.user_data.last_name, "lastName").map_err(ApiError::validation)?;
    validate_phone(&req.user_data.phone).map_err(ApiError::validation)?;
    validate_required(&req.user_data.city, "city").map_err(ApiError::validation)?;
    validate_postal_office(req.user_data.postal_office).map_err(ApiError::validation)?;

    Ok(())
}

/// Orders of the authenticated user: placed from the account, or addressed
/// to the account's phone number
///
/// GET /api/orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = db::list_orders_for_user(&state.db, &user.id, &user.phone).await?;
    Ok(Json(orders))
}

/// Guest checkout
///
/// POST /api/orders
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    validate_order_request(&req)?;

    let order =
        db::create_order(&state.db, &req.products, &req.comment, &req.user_data, None).await?;

    info!(order_num = order.order_num, "Order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

/// Checkout for the signed-in user; the order is tied to the account
///
/// POST /api/orders/user
pub async fn create_order_for_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    validate_order_request(&req)?;

    let order = db::create_order(
        &state.db,
        &req.products,
        &req.comment,
        &req.user_data,
        Some(&user.id),
    )
    .await?;

    info!(order_num = order.order_num, user_id = %user.id, "Order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
pub struct PatchOrderRequest {
    pub status: String,
}

/// Update an order's status. Admin only.
///
/// PATCH /api/orders/:order_id
pub async fn patch_order(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(order_id): Path<i64>,
    Json(req): Json<PatchOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    validate_id(order_id, "orderId").map_err(ApiError::validation)?;
    validate_order_status(&req.status).map_err(ApiError::validation)?;

    let order = db::update_order_status(&state.db, order_id, &req.status)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;

    info!(order_id, status = %req.status, admin_id = %admin.id, "Order status updated");

    Ok(Json(order))
}
