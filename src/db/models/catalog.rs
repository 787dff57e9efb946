//! Catalog queries: goods, categories, and feedbacks.
//!
//! Star ratings are derived at query time from the joined feedback rows, in
//! one aggregation path shared by the list and single-good lookups. The
//! unpaged total for a filtered list is computed independently of the page
//! fetch; both queries are issued concurrently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::{now_rfc3339, parse_string_list, today, Price};

/// Filter parameters for the goods listing, already validated and parsed
#[derive(Debug, Clone, Default)]
pub struct GoodsFilter {
    pub category: Option<i64>,
    pub search: Option<String>,
    pub gender: Option<String>,
    pub price: Option<(f64, f64)>,
    pub color: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub page: i64,
    pub per_page: i64,
    /// Rating-ranked ordering instead of newest-first
    pub ranked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackGoodRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub id: i64,
    pub author: String,
    pub date: String,
    pub description: String,
    pub rate: f64,
    pub good_id: FeedbackGoodRef,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub category: CategoryRef,
    pub prev_description: String,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub gender: String,
    pub description: String,
    pub price: Price,
    pub characteristics: Vec<String>,
    pub feedbacks: Vec<FeedbackResponse>,
    pub stars: f64,
    /// Used for ranked ordering; not part of the response body
    #[serde(skip_serializing)]
    pub feedbacks_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodsListResponse {
    pub page: i64,
    pub per_page: i64,
    pub total_goods: i64,
    pub total_pages: i64,
    pub goods: Vec<GoodResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesListResponse {
    pub page: i64,
    pub per_page: i64,
    pub total_categories: i64,
    pub total_pages: i64,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbacksListResponse {
    pub page: i64,
    pub per_page: i64,
    pub total_feedbacks: i64,
    pub total_pages: i64,
    pub feedbacks: Vec<FeedbackResponse>,
}

/// Joined row for the goods aggregation query
#[derive(Debug, FromRow)]
struct GoodAggRow {
    id: i64,
    name: String,
    image: String,
    category_id: i64,
    category_name: String,
    prev_description: String,
    description: String,
    colors: String,
    sizes: String,
    gender: String,
    price_value: f64,
    price_currency: String,
    characteristics: String,
    stars: f64,
    feedbacks_count: i64,
}

impl GoodAggRow {
    fn into_response(self, feedbacks: Vec<FeedbackResponse>) -> GoodResponse {
        GoodResponse {
            id: self.id,
            name: self.name,
            image: self.image,
            category: CategoryRef {
                id: self.category_id,
                name: self.category_name,
            },
            prev_description: self.prev_description,
            colors: parse_string_list(&self.colors),
            sizes: parse_string_list(&self.sizes),
            gender: self.gender,
            description: self.description,
            price: Price {
                value: self.price_value,
                currency: self.price_currency,
            },
            characteristics: parse_string_list(&self.characteristics),
            feedbacks,
            stars: self.stars,
            feedbacks_count: self.feedbacks_count,
        }
    }
}

#[derive(Debug, FromRow)]
struct FeedbackJoinRow {
    id: i64,
    author: String,
    date: String,
    description: String,
    rate: f64,
    good_id: i64,
    good_name: String,
}

impl From<FeedbackJoinRow> for FeedbackResponse {
    fn from(row: FeedbackJoinRow) -> Self {
        Self {
            id: row.id,
            author: row.author,
            date: row.date,
            description: row.description,
            rate: row.rate,
            good_id: FeedbackGoodRef {
                id: row.good_id,
                name: row.good_name,
            },
        }
    }
}

const GOOD_AGG_SELECT: &str = "SELECT g.id, g.name, g.image, g.category_id, c.name AS category_name, \
     g.prev_description, g.description, g.colors, g.sizes, g.gender, \
     g.price_value, g.price_currency, g.characteristics, \
     CASE WHEN COUNT(f.id) > 0 THEN ROUND(AVG(f.rate) * 2) / 2.0 ELSE 0.0 END AS stars, \
     COUNT(f.id) AS feedbacks_count \
     FROM goods g \
     JOIN categories c ON c.id = g.category_id \
     LEFT JOIN feedbacks f ON f.good_id = g.id";

/// Build the WHERE clause and its bindings for a goods filter. Every filter
/// narrows the set; the clauses are conjunctive. All bindings are passed as
/// text, column affinity converts the numeric ones.
fn build_goods_where(filter: &GoodsFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(gender) = &filter.gender {
        conditions.push("g.gender = ?".to_string());
        bindings.push(gender.clone());
    }

    if let Some(category) = filter.category {
        conditions.push("g.category_id = ?".to_string());
        bindings.push(category.to_string());
    }

    if let Some(color) = &filter.color {
        conditions
            .push("EXISTS (SELECT 1 FROM json_each(g.colors) WHERE json_each.value = ?)".to_string());
        bindings.push(color.clone());
    }

    if let Some(sizes) = &filter.sizes {
        if !sizes.is_empty() {
            let placeholders = vec!["?"; sizes.len()].join(", ");
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM json_each(g.sizes) WHERE json_each.value IN ({}))",
                placeholders
            ));
            bindings.extend(sizes.iter().cloned());
        }
    }

    if let Some((from, to)) = filter.price {
        conditions.push("g.price_value >= ? AND g.price_value <= ?".to_string());
        bindings.push(from.to_string());
        bindings.push(to.to_string());
    }

    if let Some(search) = &filter.search {
        conditions.push("g.id IN (SELECT rowid FROM goods_fts WHERE goods_fts MATCH ?)".to_string());
        // Quote the term so user input is matched literally, not parsed as
        // FTS query syntax
        bindings.push(format!("\"{}\"", search.replace('"', "\"\"")));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bindings)
}

/// Fetch the embedded feedback lists for a set of goods, keyed by good id
async fn fetch_feedbacks_for(
    db: &SqlitePool,
    good_ids: &[i64],
) -> Result<HashMap<i64, Vec<FeedbackResponse>>, sqlx::Error> {
    if good_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; good_ids.len()].join(", ");
    let sql = format!(
        "SELECT f.id, f.author, f.date, f.description, f.rate, f.good_id, g.name AS good_name \
         FROM feedbacks f JOIN goods g ON g.id = f.good_id \
         WHERE f.good_id IN ({}) ORDER BY f.id",
        placeholders
    );

    let mut query = sqlx::query_as::<_, FeedbackJoinRow>(&sql);
    for id in good_ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(db).await?;

    let mut grouped: HashMap<i64, Vec<FeedbackResponse>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.good_id)
            .or_default()
            .push(FeedbackResponse::from(row));
    }
    Ok(grouped)
}

/// List goods matching a filter, with derived ratings and pagination
pub async fn list_goods(
    db: &SqlitePool,
    filter: &GoodsFilter,
) -> Result<GoodsListResponse, sqlx::Error> {
    let page = filter.page;
    let per_page = filter.per_page;
    let offset = (page - 1) * per_page;

    let (where_clause, bindings) = build_goods_where(filter);

    let order_clause = if filter.ranked {
        "stars DESC, feedbacks_count DESC, g.id ASC"
    } else {
        "g.id DESC"
    };

    let count_sql = format!("SELECT COUNT(*) FROM goods g {}", where_clause);
    let page_sql = format!(
        "{} {} GROUP BY g.id ORDER BY {} LIMIT ? OFFSET ?",
        GOOD_AGG_SELECT, where_clause, order_clause
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for binding in &bindings {
        count_query = count_query.bind(binding);
    }

    let mut page_query = sqlx::query_as::<_, GoodAggRow>(&page_sql);
    for binding in &bindings {
        page_query = page_query.bind(binding);
    }
    page_query = page_query.bind(per_page).bind(offset);

    // The total and the page are independent reads
    let (total_goods, rows) =
        tokio::try_join!(count_query.fetch_one(db), page_query.fetch_all(db))?;

    let good_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut feedbacks = fetch_feedbacks_for(db, &good_ids).await?;

    let goods = rows
        .into_iter()
        .map(|row| {
            let fb = feedbacks.remove(&row.id).unwrap_or_default();
            row.into_response(fb)
        })
        .collect();

    let total_pages = (total_goods as f64 / per_page as f64).ceil() as i64;

    Ok(GoodsListResponse {
        page,
        per_page,
        total_goods,
        total_pages,
        goods,
    })
}

/// Fetch one good with its category, feedbacks, and derived rating
pub async fn get_good(db: &SqlitePool, id: i64) -> Result<Option<GoodResponse>, sqlx::Error> {
    let sql = format!("{} WHERE g.id = ? GROUP BY g.id", GOOD_AGG_SELECT);

    let row = sqlx::query_as::<_, GoodAggRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut feedbacks = fetch_feedbacks_for(db, &[row.id]).await?;
    let fb = feedbacks.remove(&row.id).unwrap_or_default();
    Ok(Some(row.into_response(fb)))
}

/// List categories with pagination
pub async fn list_categories(
    db: &SqlitePool,
    page: i64,
    per_page: i64,
) -> Result<CategoriesListResponse, sqlx::Error> {
    let offset = (page - 1) * per_page;

    let count_query = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories");
    let page_query =
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id LIMIT ? OFFSET ?")
            .bind(per_page)
            .bind(offset);

    let (total_categories, categories) =
        tokio::try_join!(count_query.fetch_one(db), page_query.fetch_all(db))?;

    let total_pages = (total_categories as f64 / per_page as f64).ceil() as i64;

    Ok(CategoriesListResponse {
        page,
        per_page,
        total_categories,
        total_pages,
        categories,
    })
}

pub async fn get_category(db: &SqlitePool, id: i64) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// List feedbacks, optionally restricted to one good, with pagination
pub async fn list_feedbacks(
    db: &SqlitePool,
    page: i64,
    per_page: i64,
    good_id: Option<i64>,
) -> Result<FeedbacksListResponse, sqlx::Error> {
    let offset = (page - 1) * per_page;

    let (where_clause, count_sql) = if good_id.is_some() {
        (
            "WHERE f.good_id = ?",
            "SELECT COUNT(*) FROM feedbacks f WHERE f.good_id = ?",
        )
    } else {
        ("", "SELECT COUNT(*) FROM feedbacks f")
    };

    let page_sql = format!(
        "SELECT f.id, f.author, f.date, f.description, f.rate, f.good_id, g.name AS good_name \
         FROM feedbacks f JOIN goods g ON g.id = f.good_id \
         {} ORDER BY f.id LIMIT ? OFFSET ?",
        where_clause
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(count_sql);
    let mut page_query = sqlx::query_as::<_, FeedbackJoinRow>(&page_sql);
    if let Some(id) = good_id {
        count_query = count_query.bind(id);
        page_query = page_query.bind(id);
    }
    page_query = page_query.bind(per_page).bind(offset);

    let (total_feedbacks, rows) =
        tokio::try_join!(count_query.fetch_one(db), page_query.fetch_all(db))?;

    let total_pages = (total_feedbacks as f64 / per_page as f64).ceil() as i64;

    Ok(FeedbacksListResponse {
        page,
        per_page,
        total_feedbacks,
        total_pages,
        feedbacks: rows.into_iter().map(FeedbackResponse::from).collect(),
    })
}

/// Create a feedback entry dated today
pub async fn create_feedback(
    db: &SqlitePool,
    author: &str,
    description: &str,
    rate: f64,
    good_id: i64,
) -> Result<FeedbackResponse, sqlx::Error> {
    let date = today();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO feedbacks (author, date, description, rate, good_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(author)
    .bind(&date)
    .bind(description)
    .bind(rate)
    .bind(good_id)
    .bind(now_rfc3339())
    .fetch_one(db)
    .await?;

    let row: FeedbackJoinRow = sqlx::query_as(
        "SELECT f.id, f.author, f.date, f.description, f.rate, f.good_id, g.name AS good_name \
         FROM feedbacks f JOIN goods g ON g.id = f.good_id WHERE f.id = ?",
    )
    .bind(id)
    .fetch_one(db)
    .await?;

    Ok(FeedbackResponse::from(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_in_memory;

    async fn seed_category(db: &SqlitePool, name: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO categories (name, created_at, updated_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(now_rfc3339())
        .bind(now_rfc3339())
        .fetch_one(db)
        .await
        .unwrap()
    }

    async fn seed_good(
        db: &SqlitePool,
        name: &str,
        category_id: i64,
        gender: &str,
        price: f64,
        colors: &[&str],
        sizes: &[&str],
    ) -> i64 {
        let colors_json = serde_json::to_string(colors).unwrap();
        let sizes_json = serde_json::to_string(sizes).unwrap();
        sqlx::query_scalar(
            "INSERT INTO goods \
             (name, category_id, prev_description, description, colors, sizes, gender, \
              price_value, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(category_id)
        .bind(format!("{} preview", name))
        .bind(format!("{} full description", name))
        .bind(colors_json)
        .bind(sizes_json)
        .bind(gender)
        .bind(price)
        .bind(now_rfc3339())
        .bind(now_rfc3339())
        .fetch_one(db)
        .await
        .unwrap()
    }

    async fn seed_feedback(db: &SqlitePool, good_id: i64, rate: f64) {
        create_feedback(db, "Tester", "fine", rate, good_id)
            .await
            .unwrap();
    }

    fn filter() -> GoodsFilter {
        GoodsFilter {
            page: 1,
            per_page: 8,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_stars_zero_without_feedback() {
        let db = init_in_memory().await.unwrap();
        let cat = seed_category(&db, "Shirts").await;
        let good = seed_good(&db, "Linen shirt", cat, "men", 100.0, &["white"], &["M"]).await;

        let found = get_good(&db, good).await.unwrap().unwrap();
        assert_eq!(found.stars, 0.0);
        assert_eq!(found.feedbacks_count, 0);
        assert!(found.feedbacks.is_empty());
    }

    #[tokio::test]
    async fn test_stars_half_step_rounding() {
        let db = init_in_memory().await.unwrap();
        let cat = seed_category(&db, "Shirts").await;

        // Mean 3.5, already half-step aligned
        let g1 = seed_good(&db, "Shirt A", cat, "men", 100.0, &["white"], &["M"]).await;
        seed_feedback(&db, g1, 3.0).await;
        seed_feedback(&db, g1, 4.0).await;
        assert_eq!(get_good(&db, g1).await.unwrap().unwrap().stars, 3.5);

        // Mean 3.333 rounds up to 3.5
        let g2 = seed_good(&db, "Shirt B", cat, "men", 100.0, &["white"], &["M"]).await;
        seed_feedback(&db, g2, 3.0).await;
        seed_feedback(&db, g2, 3.0).await;
        seed_feedback(&db, g2, 4.0).await;
        assert_eq!(get_good(&db, g2).await.unwrap().unwrap().stars, 3.5);

        // Mean 2.0 stays put
        let g3 = seed_good(&db, "Shirt C", cat, "men", 100.0, &["white"], &["M"]).await;
        seed_feedback(&db, g3, 2.0).await;
        assert_eq!(get_good(&db, g3).await.unwrap().unwrap().stars, 2.0);
    }

    #[tokio::test]
    async fn test_get_good_not_found() {
        let db = init_in_memory().await.unwrap();
        assert!(get_good(&db, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pagination_totals() {
        let db = init_in_memory().await.unwrap();
        let cat = seed_category(&db, "Shirts").await;
        for i in 0..11 {
            seed_good(
                &db,
                &format!("Shirt {}", i),
                cat,
                "men",
                100.0,
                &["white"],
                &["M"],
            )
            .await;
        }

        let mut f = filter();
        f.per_page = 5;
        let page1 = list_goods(&db, &f).await.unwrap();
        assert_eq!(page1.total_goods, 11);
        assert_eq!(page1.total_pages, 3);
        assert_eq!(page1.goods.len(), 5);

        f.page = 3;
        let page3 = list_goods(&db, &f).await.unwrap();
        assert_eq!(page3.goods.len(), 1);

        // Past the last page: empty list, totals unchanged
        f.page = 4;
        let page4 = list_goods(&db, &f).await.unwrap();
        assert!(page4.goods.is_empty());
        assert_eq!(page4.total_goods, 11);
        assert_eq!(page4.total_pages, 3);
    }

    #[tokio::test]
    async fn test_default_order_newest_first() {
        let db = init_in_memory().await.unwrap();
        let cat = seed_category(&db, "Shirts").await;
        let first = seed_good(&db, "Oldest", cat, "men", 100.0, &["white"], &["M"]).await;
        let last = seed_good(&db, "Newest", cat, "men", 100.0, &["white"], &["M"]).await;

        let result = list_goods(&db, &filter()).await.unwrap();
        assert_eq!(result.goods.first().unwrap().id, last);
        assert_eq!(result.goods.last().unwrap().id, first);
    }

    #[tokio::test]
    async fn test_ranked_sort_with_stable_tie_break() {
        let db = init_in_memory().await.unwrap();
        let cat = seed_category(&db, "Shirts").await;

        let low = seed_good(&db, "Low", cat, "men", 100.0, &["white"], &["M"]).await;
        seed_feedback(&db, low, 2.0).await;

        // Two goods with identical stars and feedback counts
        let tie_a = seed_good(&db, "Tie A", cat, "men", 100.0, &["white"], &["M"]).await;
        seed_feedback(&db, tie_a, 4.0).await;
        let tie_b = seed_good(&db, "Tie B", cat, "men", 100.0, &["white"], &["M"]).await;
        seed_feedback(&db, tie_b, 4.0).await;

        // Same stars as the tie pair but more feedback
        let busy = seed_good(&db, "Busy", cat, "men", 100.0, &["white"], &["M"]).await;
        seed_feedback(&db, busy, 4.0).await;
        seed_feedback(&db, busy, 4.0).await;

        let mut f = filter();
        f.ranked = true;
        let result = list_goods(&db, &f).await.unwrap();
        let ids: Vec<i64> = result.goods.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![busy, tie_a, tie_b, low]);
    }

    #[tokio::test]
    async fn test_filters_are_conjunctive() {
        let db = init_in_memory().await.unwrap();
        let shirts = seed_category(&db, "Shirts").await;
        let pants = seed_category(&db, "Pants").await;

        let matching = seed_good(&db, "Shirt", shirts, "men", 150.0, &["white"], &["M"]).await;
        // Each of these fails exactly one of the three filters
        seed_good(&db, "Pants", pants, "men", 150.0, &["white"], &["M"]).await;
        seed_good(&db, "Shirt W", shirts, "women", 150.0, &["white"], &["M"]).await;
        seed_good(&db, "Shirt $", shirts, "men", 500.0, &["white"], &["M"]).await;

        let mut f = filter();
        f.category = Some(shirts);
        f.gender = Some("men".to_string());
        f.price = Some((100.0, 200.0));
        let result = list_goods(&db, &f).await.unwrap();

        assert_eq!(result.total_goods, 1);
        assert_eq!(result.goods[0].id, matching);
    }

    #[tokio::test]
    async fn test_color_and_sizes_membership() {
        let db = init_in_memory().await.unwrap();
        let cat = seed_category(&db, "Shirts").await;

        let blue = seed_good(&db, "Blue", cat, "men", 100.0, &["blue", "white"], &["S", "M"]).await;
        seed_good(&db, "Red", cat, "men", 100.0, &["red"], &["XL"]).await;

        let mut f = filter();
        f.color = Some("blue".to_string());
        let by_color = list_goods(&db, &f).await.unwrap();
        assert_eq!(by_color.total_goods, 1);
        assert_eq!(by_color.goods[0].id, blue);

        let mut f = filter();
        f.sizes = Some(vec!["M".to_string(), "L".to_string()]);
        let by_sizes = list_goods(&db, &f).await.unwrap();
        assert_eq!(by_sizes.total_goods, 1);
        assert_eq!(by_sizes.goods[0].id, blue);
    }

    #[tokio::test]
    async fn test_text_search() {
        let db = init_in_memory().await.unwrap();
        let cat = seed_category(&db, "Shirts").await;
        let linen = seed_good(&db, "Linen shirt", cat, "men", 100.0, &["white"], &["M"]).await;
        seed_good(&db, "Wool hoodie", cat, "men", 100.0, &["grey"], &["M"]).await;

        let mut f = filter();
        f.search = Some("linen".to_string());
        let result = list_goods(&db, &f).await.unwrap();
        assert_eq!(result.total_goods, 1);
        assert_eq!(result.goods[0].id, linen);

        f.search = Some("sneakers".to_string());
        let none = list_goods(&db, &f).await.unwrap();
        assert_eq!(none.total_goods, 0);
        assert!(none.goods.is_empty());
    }

    #[tokio::test]
    async fn test_good_embeds_category_and_feedbacks() {
        let db = init_in_memory().await.unwrap();
        let cat = seed_category(&db, "Shirts").await;
        let good = seed_good(&db, "Shirt", cat, "men", 100.0, &["white"], &["M"]).await;
        seed_feedback(&db, good, 4.0).await;

        let found = get_good(&db, good).await.unwrap().unwrap();
        assert_eq!(found.category.name, "Shirts");
        assert_eq!(found.feedbacks.len(), 1);
        assert_eq!(found.feedbacks[0].good_id.name, "Shirt");
        assert_eq!(found.price.currency, "грн");
    }

    #[tokio::test]
    async fn test_list_categories_pagination() {
        let db = init_in_memory().await.unwrap();
        for i in 0..7 {
            seed_category(&db, &format!("Category {}", i)).await;
        }

        let page1 = list_categories(&db, 1, 6).await.unwrap();
        assert_eq!(page1.total_categories, 7);
        assert_eq!(page1.total_pages, 2);
        assert_eq!(page1.categories.len(), 6);

        let page2 = list_categories(&db, 2, 6).await.unwrap();
        assert_eq!(page2.categories.len(), 1);

        let page3 = list_categories(&db, 3, 6).await.unwrap();
        assert!(page3.categories.is_empty());
        assert_eq!(page3.total_categories, 7);
    }

    #[tokio::test]
    async fn test_list_feedbacks_filtered_by_good() {
        let db = init_in_memory().await.unwrap();
        let cat = seed_category(&db, "Shirts").await;
        let g1 = seed_good(&db, "Shirt A", cat, "men", 100.0, &["white"], &["M"]).await;
        let g2 = seed_good(&db, "Shirt B", cat, "men", 100.0, &["white"], &["M"]).await;
        seed_feedback(&db, g1, 4.0).await;
        seed_feedback(&db, g1, 5.0).await;
        seed_feedback(&db, g2, 3.0).await;

        let all = list_feedbacks(&db, 1, 6, None).await.unwrap();
        assert_eq!(all.total_feedbacks, 3);

        let for_g1 = list_feedbacks(&db, 1, 6, Some(g1)).await.unwrap();
        assert_eq!(for_g1.total_feedbacks, 2);
        assert!(for_g1.feedbacks.iter().all(|f| f.good_id.id == g1));
    }

    #[tokio::test]
    async fn test_create_feedback_dated_today() {
        let db = init_in_memory().await.unwrap();
        let cat = seed_category(&db, "Shirts").await;
        let good = seed_good(&db, "Shirt", cat, "men", 100.0, &["white"], &["M"]).await;

        let feedback = create_feedback(&db, "Iryna", "Lovely fit", 4.5, good)
            .await
            .unwrap();
        assert_eq!(feedback.date, today());
        assert_eq!(feedback.rate, 4.5);
        assert_eq!(feedback.good_id.id, good);
    }

    #[tokio::test]
    async fn test_create_feedback_unknown_good() {
        let db = init_in_memory().await.unwrap();
        let err = create_feedback(&db, "Iryna", "??", 4.0, 999).await;
        assert!(err.is_err());
    }
}
