//! Catalog API: goods listing with filters, single goods, categories,
//! and feedbacks.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{
    self, CategoriesListResponse, Category, FeedbackResponse, FeedbacksListResponse, GoodResponse,
    GoodsFilter, GoodsListResponse,
};
use crate::AppState;

use super::error::ApiError;
use super::validation::{
    parse_price_range, validate_author, validate_color, validate_feedback_description,
    validate_gender, validate_id, validate_page, validate_per_page, validate_rate,
    validate_sizes_filter,
};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoodsListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category: Option<i64>,
    pub search: Option<String>,
    pub gender: Option<String>,
    pub price: Option<String>,
    pub color: Option<String>,
    pub sizes: Option<String>,
    pub sort: Option<String>,
}

impl GoodsListQuery {
    /// Validate the raw query and turn it into a filter
    fn into_filter(self) -> Result<GoodsFilter, ApiError> {
        let page = self.page.unwrap_or(1);
        let per_page = self.per_page.unwrap_or(8);
        validate_page(page).map_err(ApiError::validation)?;
        validate_per_page(per_page, 5, 20).map_err(ApiError::validation)?;

        if let Some(gender) = &self.gender {
            validate_gender(gender).map_err(ApiError::validation)?;
        }
        if let Some(color) = &self.color {
            validate_color(color).map_err(ApiError::validation)?;
        }
        if let Some(category) = self.category {
            validate_id(category, "category").map_err(ApiError::validation)?;
        }
        if let Some(sort) = &self.sort {
            if sort != "desc" {
                return Err(ApiError::validation("sort must be \"desc\""));
            }
        }

        let sizes = match &self.sizes {
            Some(sizes) => {
                validate_sizes_filter(sizes).map_err(ApiError::validation)?;
                Some(sizes.split(',').map(str::to_string).collect())
            }
            None => None,
        };

        let price = match &self.price {
            Some(price) => Some(parse_price_range(price).map_err(ApiError::validation)?),
            None => None,
        };

        Ok(GoodsFilter {
            category: self.category,
            search: self.search,
            gender: self.gender,
            price,
            color: self.color,
            sizes,
            page,
            per_page,
            ranked: self.sort.is_some(),
        })
    }
}

/// List goods with filtering, derived ratings, and pagination
///
/// GET /api/goods
pub async fn list_goods(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GoodsListQuery>,
) -> Result<Json<GoodsListResponse>, ApiError> {
    let filter = query.into_filter()?;
    let result = db::list_goods(&state.db, &filter).await?;
    Ok(Json(result))
}

/// Fetch a single good with category, feedbacks, and rating
///
/// GET /api/goods/:good_id
pub async fn get_good(
    State(state): State<Arc<AppState>>,
    Path(good_id): Path<i64>,
) -> Result<Json<GoodResponse>, ApiError> {
    validate_id(good_id, "goodId").map_err(ApiError::validation)?;

    let good = db::get_good(&state.db, good_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Good not found"))?;

    Ok(Json(good))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// List categories with pagination
///
/// GET /api/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoriesListQuery>,
) -> Result<Json<CategoriesListResponse>, ApiError> {
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(6);
    validate_page(page).map_err(ApiError::validation)?;
    validate_per_page(per_page, 4, 20).map_err(ApiError::validation)?;

    let result = db::list_categories(&state.db, page, per_page).await?;
    Ok(Json(result))
}

/// Fetch a single category
///
/// GET /api/categories/:category_id
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> Result<Json<Category>, ApiError> {
    validate_id(category_id, "categoryId").map_err(ApiError::validation)?;

    let category = db::get_category(&state.db, category_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;

    Ok(Json(category))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FeedbacksListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub good_id: Option<i64>,
}

/// List feedbacks, optionally for one good
///
/// GET /api/feedbacks
pub async fn list_feedbacks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedbacksListQuery>,
) -> Result<Json<FeedbacksListResponse>, ApiError> {
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(6);
    validate_page(page).map_err(ApiError::validation)?;
    validate_per_page(per_page, 6, 20).map_err(ApiError::validation)?;
    if let Some(good_id) = query.good_id {
        validate_id(good_id, "goodId").map_err(ApiError::validation)?;
    }

    let result = db::list_feedbacks(&state.db, page, per_page, query.good_id).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    pub author: String,
    pub description: String,
    pub rate: f64,
    pub good_id: i64,
}

/// Leave feedback on a good
///
/// POST /api/feedbacks
pub async fn create_feedback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    validate_author(&req.author).map_err(ApiError::validation)?;
    validate_feedback_description(&req.description).map_err(ApiError::validation)?;
    validate_rate(req.rate).map_err(ApiError::validation)?;
    validate_id(req.good_id, "goodId").map_err(ApiError::validation)?;

    let feedback = db::create_feedback(
        &state.db,
        &req.author,
        &req.description,
        req.rate,
        req.good_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(feedback)))
}
