use crate::insertables::NewCoupon;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder, Result};
use chrono::{DateTime, Utc};
use diesel::{prelude::*, r2d2};
use schema::coupons::dsl::*;
use serde::Deserialize;
use storefront_api::error::StoreError;
use storefront_api::models::Coupon;
use storefront_api::schema;
type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
pub struct CouponDto {
    pub code: String,
    pub discount_percent: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Case-insensitive lookup of a usable coupon: the code is uppercased before
/// matching, only active rows qualify, and the validity window must contain
/// `now`. A wrong code, an inactive coupon and an out-of-window coupon are
/// indistinguishable to the caller.
pub fn lookup_coupon(
    conn: &mut PgConnection,
    _code: &str,
    now: DateTime<Utc>,
) -> Result<Option<Coupon>, StoreError> {
    let normalized = _code.trim().to_uppercase();
    let coupon = coupons
        .filter(code.eq(&normalized).and(is_active.eq(true)))
        .first::<Coupon>(conn)
        .optional()?;
    Ok(coupon.filter(|found| found.is_usable_at(now)))
}

pub fn get_all_coupons(conn: &mut PgConnection) -> Result<Vec<Coupon>, StoreError> {
    let all_coupons = coupons
        .select(Coupon::as_select())
        .order(code.asc())
        .load(conn)?;
    Ok(all_coupons)
}

pub fn get_coupon_by_id(conn: &mut PgConnection, _coupon_id: i32) -> Result<Coupon, StoreError> {
    coupons
        .filter(id.eq(_coupon_id))
        .first::<Coupon>(conn)
        .optional()?
        .ok_or(StoreError::NotFound("coupon"))
}

pub fn insert_new_coupon(conn: &mut PgConnection, form: &CouponDto) -> Result<Coupon, StoreError> {
    let new_coupon = NewCoupon {
        code: form.code.trim().to_uppercase(),
        discount_percent: form.discount_percent,
        valid_from: form.valid_from,
        valid_to: form.valid_to,
        is_active: form.is_active,
    };
    let created = diesel::insert_into(coupons)
        .values(&new_coupon)
        .get_result(conn)?;
    Ok(created)
}

pub fn update_coupon_by_id(
    conn: &mut PgConnection,
    _coupon_id: i32,
    form: &CouponDto,
) -> Result<Coupon, StoreError> {
    let coupon = get_coupon_by_id(conn, _coupon_id)?;
    let updated = diesel::update(&coupon)
        .set((
            code.eq(form.code.trim().to_uppercase()),
            discount_percent.eq(form.discount_percent),
            valid_from.eq(form.valid_from),
            valid_to.eq(form.valid_to),
            is_active.eq(form.is_active),
        ))
        .get_result(conn)?;
    Ok(updated)
}

pub fn delete_coupon_by_id(
    conn: &mut PgConnection,
    _coupon_id: i32,
) -> Result<String, StoreError> {
    let deleted = diesel::delete(coupons.filter(id.eq(_coupon_id))).execute(conn)?;
    if deleted == 0 {
        return Err(StoreError::NotFound("coupon"));
    }
    Ok("Coupon deleted".to_string())
}

#[get("/api/coupons")]
async fn get_coupons(pool: web::Data<DbPool>) -> Result<impl Responder> {
    let all_coupons = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_all_coupons(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(all_coupons))
}

#[get("/api/coupons/{coupon_id}")]
async fn get_coupon(pool: web::Data<DbPool>, coupon_id: web::Path<i32>) -> Result<impl Responder> {
    let coupon = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_coupon_by_id(&mut conn, *coupon_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(coupon))
}

#[post("/api/coupons")]
async fn create_coupon(
    pool: web::Data<DbPool>,
    form: web::Json<CouponDto>,
) -> Result<impl Responder> {
    let coupon = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        insert_new_coupon(&mut conn, &form)
    })
    .await??;
    Ok(HttpResponse::Created().json(coupon))
}

#[put("/api/coupons/{coupon_id}")]
async fn update_coupon(
    pool: web::Data<DbPool>,
    coupon_id: web::Path<i32>,
    form: web::Json<CouponDto>,
) -> Result<impl Responder> {
    let coupon = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        update_coupon_by_id(&mut conn, *coupon_id, &form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(coupon))
}

#[delete("/api/coupons/{coupon_id}")]
async fn delete_coupon(
    pool: web::Data<DbPool>,
    coupon_id: web::Path<i32>,
) -> Result<impl Responder> {
    let coupon = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        delete_coupon_by_id(&mut conn, *coupon_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(coupon))
}
