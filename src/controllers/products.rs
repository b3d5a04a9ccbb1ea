use crate::controllers::functions;
use crate::insertables::NewProduct;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder, Result};
use chrono::Utc;
use diesel::{prelude::*, r2d2};
use rust_decimal::Decimal;
use schema::products::dsl::*;
use serde::{Deserialize, Serialize};
use storefront_api::error::StoreError;
use storefront_api::models::Product;
use storefront_api::schema;
type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

const SLUG_ATTEMPTS: u32 = 100;
const RELATED_PRODUCTS: i64 = 4;
const TRENDING_PRODUCTS: i64 = 6;
const FEATURED_PRODUCTS: i64 = 8;
const SEARCH_SUGGESTIONS: i64 = 5;

#[derive(Deserialize)]
pub struct ProductListQuery {
    pub category: Option<i32>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

#[derive(Deserialize)]
pub struct ProductDto {
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i32,
    #[serde(default)]
    pub is_trending: bool,
}

#[derive(Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub current_price: Decimal,
    pub discount_percentage: i32,
    pub related_products: Vec<Product>,
}

#[derive(Serialize)]
pub struct StorefrontView {
    pub trending_products: Vec<Product>,
    pub featured_products: Vec<Product>,
}

#[derive(Serialize)]
pub struct SearchSuggestion {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

pub fn get_all_products(
    conn: &mut PgConnection,
    params: &ProductListQuery,
) -> Result<Vec<Product>, StoreError> {
    let mut query = products.select(Product::as_select()).into_boxed();
    if let Some(_category_id) = params.category {
        query = query.filter(category_id.eq(_category_id));
    }
    if let Some(term) = params.search.as_deref().filter(|term| !term.is_empty()) {
        let pattern = format!("%{}%", term);
        query = query.filter(name.ilike(pattern.clone()).or(description.ilike(pattern)));
    }
    // Whitelisted sort keys; anything else falls back to newest-first.
    query = match params.sort.as_deref() {
        Some("name") => query.order(name.asc()),
        Some("price") => query.order(price.asc()),
        Some("-price") => query.order(price.desc()),
        Some("created_at") => query.order(created_at.asc()),
        _ => query.order(created_at.desc()),
    };
    let all_products = query.load(conn)?;
    Ok(all_products)
}

pub fn get_product_by_slug(
    conn: &mut PgConnection,
    _slug: &str,
) -> Result<ProductDetail, StoreError> {
    let product = products
        .filter(slug.eq(_slug))
        .first::<Product>(conn)
        .optional()?
        .ok_or(StoreError::NotFound("product"))?;
    let related_products = products
        .filter(category_id.eq(product.category_id))
        .filter(id.ne(product.id))
        .order(created_at.desc())
        .limit(RELATED_PRODUCTS)
        .select(Product::as_select())
        .load(conn)?;
    Ok(ProductDetail {
        current_price: product.current_price(),
        discount_percentage: product.discount_percentage(),
        product,
        related_products,
    })
}

pub fn get_storefront(conn: &mut PgConnection) -> Result<StorefrontView, StoreError> {
    let trending_products = products
        .filter(is_trending.eq(true))
        .order(created_at.desc())
        .limit(TRENDING_PRODUCTS)
        .select(Product::as_select())
        .load(conn)?;
    let featured_products = products
        .order(created_at.desc())
        .limit(FEATURED_PRODUCTS)
        .select(Product::as_select())
        .load(conn)?;
    Ok(StorefrontView {
        trending_products,
        featured_products,
    })
}

pub fn get_search_suggestions(
    conn: &mut PgConnection,
    term: &str,
) -> Result<Vec<SearchSuggestion>, StoreError> {
    if term.is_empty() {
        return Ok(vec![]);
    }
    let matches: Vec<Product> = products
        .filter(name.ilike(format!("%{}%", term)))
        .limit(SEARCH_SUGGESTIONS)
        .select(Product::as_select())
        .load(conn)?;
    Ok(matches
        .into_iter()
        .map(|product| SearchSuggestion {
            id: product.id,
            name: product.name,
            slug: product.slug,
        })
        .collect())
}

fn unique_product_slug(conn: &mut PgConnection, _name: &str) -> Result<String, StoreError> {
    let base = functions::slugify(_name);
    for counter in 0..SLUG_ATTEMPTS {
        let candidate = functions::slug_candidate(&base, counter);
        let taken: bool =
            diesel::select(diesel::dsl::exists(products.filter(slug.eq(&candidate))))
                .get_result(conn)?;
        if !taken {
            return Ok(candidate);
        }
    }
    Err(StoreError::SlugGenerationFailed(base))
}

pub fn insert_new_product(
    conn: &mut PgConnection,
    form: &ProductDto,
) -> Result<Product, StoreError> {
    let new_product = NewProduct {
        category_id: form.category_id,
        name: form.name.clone(),
        slug: unique_product_slug(conn, &form.name)?,
        description: form.description.clone(),
        price: form.price,
        discount_price: form.discount_price,
        stock: form.stock,
        is_trending: form.is_trending,
    };
    let created = diesel::insert_into(products)
        .values(&new_product)
        .get_result(conn)?;
    Ok(created)
}

// The slug survives renames so existing product links keep working.
pub fn update_product_by_id(
    conn: &mut PgConnection,
    _product_id: i32,
    form: &ProductDto,
) -> Result<Product, StoreError> {
    let product = products
        .filter(id.eq(_product_id))
        .first::<Product>(conn)
        .optional()?
        .ok_or(StoreError::NotFound("product"))?;
    let updated = diesel::update(&product)
        .set((
            category_id.eq(form.category_id),
            name.eq(&form.name),
            description.eq(&form.description),
            price.eq(form.price),
            discount_price.eq(form.discount_price),
            stock.eq(form.stock),
            is_trending.eq(form.is_trending),
            updated_at.eq(Utc::now()),
        ))
        .get_result(conn)?;
    Ok(updated)
}

pub fn delete_product_by_id(
    conn: &mut PgConnection,
    _product_id: i32,
) -> Result<String, StoreError> {
    let deleted = diesel::delete(products.filter(id.eq(_product_id))).execute(conn)?;
    if deleted == 0 {
        return Err(StoreError::NotFound("product"));
    }
    Ok("Product deleted".to_string())
}

#[get("/api/products")]
async fn get_products(
    pool: web::Data<DbPool>,
    params: web::Query<ProductListQuery>,
) -> Result<impl Responder> {
    let all_products = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_all_products(&mut conn, &params)
    })
    .await??;
    Ok(HttpResponse::Ok().json(all_products))
}

#[get("/api/products/search_suggestions")]
async fn search_suggestions(
    pool: web::Data<DbPool>,
    params: web::Query<SuggestionQuery>,
) -> Result<impl Responder> {
    let suggestions = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_search_suggestions(&mut conn, params.q.as_deref().unwrap_or(""))
    })
    .await??;
    Ok(HttpResponse::Ok().json(suggestions))
}

#[derive(Deserialize)]
pub struct SuggestionQuery {
    pub q: Option<String>,
}

#[get("/api/products/{slug}")]
async fn get_product(pool: web::Data<DbPool>, path: web::Path<String>) -> Result<impl Responder> {
    let detail = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_product_by_slug(&mut conn, &path)
    })
    .await??;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/api/storefront")]
async fn storefront(pool: web::Data<DbPool>) -> Result<impl Responder> {
    let view = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_storefront(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/products")]
async fn create_product(
    pool: web::Data<DbPool>,
    form: web::Json<ProductDto>,
) -> Result<impl Responder> {
    let product = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        insert_new_product(&mut conn, &form)
    })
    .await??;
    Ok(HttpResponse::Created().json(product))
}

#[put("/api/products/{product_id}")]
async fn update_product(
    pool: web::Data<DbPool>,
    product_id: web::Path<i32>,
    form: web::Json<ProductDto>,
) -> Result<impl Responder> {
    let product = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        update_product_by_id(&mut conn, *product_id, &form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(product))
}

#[delete("/api/products/{product_id}")]
async fn delete_product(
    pool: web::Data<DbPool>,
    product_id: web::Path<i32>,
) -> Result<impl Responder> {
    let product = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        delete_product_by_id(&mut conn, *product_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(product))
}
