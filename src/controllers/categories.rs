use crate::controllers::functions;
use crate::insertables::NewCategory;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder, Result};
use diesel::{prelude::*, r2d2};
use schema::categories::dsl::*;
use serde::Deserialize;
use storefront_api::error::StoreError;
use storefront_api::models::Category;
use storefront_api::schema;
type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

const SLUG_ATTEMPTS: u32 = 100;

#[derive(Deserialize)]
pub struct CategoryDto {
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
}

pub fn get_all_categories(conn: &mut PgConnection) -> Result<Vec<Category>, StoreError> {
    let all_categories = categories
        .select(Category::as_select())
        .order(name.asc())
        .load(conn)?;
    Ok(all_categories)
}

pub fn get_category_by_id(
    conn: &mut PgConnection,
    _category_id: i32,
) -> Result<Category, StoreError> {
    categories
        .filter(id.eq(_category_id))
        .first::<Category>(conn)
        .optional()?
        .ok_or(StoreError::NotFound("category"))
}

fn unique_category_slug(conn: &mut PgConnection, _name: &str) -> Result<String, StoreError> {
    let base = functions::slugify(_name);
    for counter in 0..SLUG_ATTEMPTS {
        let candidate = functions::slug_candidate(&base, counter);
        let taken: bool = diesel::select(diesel::dsl::exists(
            categories.filter(slug.eq(&candidate)),
        ))
        .get_result(conn)?;
        if !taken {
            return Ok(candidate);
        }
    }
    Err(StoreError::SlugGenerationFailed(base))
}

pub fn insert_new_category(
    conn: &mut PgConnection,
    form: &CategoryDto,
) -> Result<Category, StoreError> {
    let new_category = NewCategory {
        name: form.name.clone(),
        slug: unique_category_slug(conn, &form.name)?,
        description: form.description.clone(),
        icon: form.icon.clone().unwrap_or_else(|| "fas fa-box".to_string()),
    };
    let created = diesel::insert_into(categories)
        .values(&new_category)
        .get_result(conn)?;
    Ok(created)
}

pub fn update_category_by_id(
    conn: &mut PgConnection,
    _category_id: i32,
    form: &CategoryDto,
) -> Result<Category, StoreError> {
    let category = get_category_by_id(conn, _category_id)?;
    let updated = diesel::update(&category)
        .set((
            name.eq(&form.name),
            description.eq(&form.description),
            icon.eq(form.icon.as_deref().unwrap_or(&category.icon)),
        ))
        .get_result(conn)?;
    Ok(updated)
}

// Products under the category go with it, via the FK cascade.
pub fn delete_category_by_id(
    conn: &mut PgConnection,
    _category_id: i32,
) -> Result<String, StoreError> {
    let deleted = diesel::delete(categories.filter(id.eq(_category_id))).execute(conn)?;
    if deleted == 0 {
        return Err(StoreError::NotFound("category"));
    }
    Ok("Category deleted".to_string())
}

#[get("/api/categories")]
async fn get_categories(pool: web::Data<DbPool>) -> Result<impl Responder> {
    let all_categories = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_all_categories(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(all_categories))
}

#[get("/api/categories/{category_id}")]
async fn get_category(
    pool: web::Data<DbPool>,
    category_id: web::Path<i32>,
) -> Result<impl Responder> {
    let category = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_category_by_id(&mut conn, *category_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(category))
}

#[post("/api/categories")]
async fn create_category(
    pool: web::Data<DbPool>,
    form: web::Json<CategoryDto>,
) -> Result<impl Responder> {
    let category = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        insert_new_category(&mut conn, &form)
    })
    .await??;
    Ok(HttpResponse::Created().json(category))
}

#[put("/api/categories/{category_id}")]
async fn update_category(
    pool: web::Data<DbPool>,
    category_id: web::Path<i32>,
    form: web::Json<CategoryDto>,
) -> Result<impl Responder> {
    let category = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        update_category_by_id(&mut conn, *category_id, &form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(category))
}

#[delete("/api/categories/{category_id}")]
async fn delete_category(
    pool: web::Data<DbPool>,
    category_id: web::Path<i32>,
) -> Result<impl Responder> {
    let category = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        delete_category_by_id(&mut conn, *category_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(category))
}
