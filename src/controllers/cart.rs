use crate::controllers::functions;
use crate::insertables::NewCartItem;
use actix_web::{get, post, web, HttpResponse, Responder, Result};
use chrono::Utc;
use diesel::{prelude::*, r2d2};
use rust_decimal::Decimal;
use schema::cart_items::dsl::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use storefront_api::error::StoreError;
use storefront_api::models::{CartItem, Product};
use storefront_api::schema;
type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

fn default_quantity() -> i32 {
    1
}

#[derive(Deserialize)]
pub struct AddToCartDto {
    pub user_id: i32,
    pub product_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Deserialize)]
pub struct UpdateCartDto {
    pub user_id: i32,
    pub cart_item_id: i32,
    pub quantity: i32,
}

#[derive(Deserialize)]
pub struct RemoveFromCartDto {
    pub user_id: i32,
    pub cart_item_id: i32,
}

#[derive(Deserialize)]
pub struct CartQuery {
    pub user_id: i32,
}

#[derive(Serialize)]
pub struct CartLine {
    pub id: i32,
    pub product: Product,
    pub quantity: i32,
    pub total_price: Decimal,
}

#[derive(Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total_price: Decimal,
    pub count: usize,
}

pub fn load_cart(
    conn: &mut PgConnection,
    _user_id: i32,
) -> Result<Vec<(CartItem, Product)>, StoreError> {
    let lines = cart_items
        .inner_join(schema::products::table)
        .filter(user_id.eq(_user_id))
        .order(created_at.asc())
        .select((CartItem::as_select(), Product::as_select()))
        .load::<(CartItem, Product)>(conn)?;
    Ok(lines)
}

pub fn get_cart_view(conn: &mut PgConnection, _user_id: i32) -> Result<CartView, StoreError> {
    let lines = load_cart(conn, _user_id)?;
    let total_price = functions::cart_subtotal(&lines);
    let items: Vec<CartLine> = lines
        .into_iter()
        .map(|(item, product)| CartLine {
            id: item.id,
            total_price: functions::line_total(&product, item.quantity),
            quantity: item.quantity,
            product,
        })
        .collect();
    Ok(CartView {
        count: items.len(),
        items,
        total_price,
    })
}

// One row per (user, product): a second add folds into the existing row. The
// stock check is against raw stock, not stock minus other pending carts, and
// the increment path does not re-check the combined quantity.
pub fn add_to_cart(conn: &mut PgConnection, form: &AddToCartDto) -> Result<(), StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let product = schema::products::table
            .filter(schema::products::id.eq(form.product_id))
            .first::<Product>(conn)
            .optional()?
            .ok_or(StoreError::NotFound("product"))?;
        if product.stock < form.quantity {
            return Err(StoreError::InsufficientStock(product.name));
        }
        let existing = cart_items
            .filter(user_id.eq(form.user_id).and(product_id.eq(form.product_id)))
            .for_update()
            .first::<CartItem>(conn)
            .optional()?;
        match existing {
            Some(item) => {
                diesel::update(&item)
                    .set((
                        quantity.eq(quantity + form.quantity),
                        updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;
            }
            None => {
                diesel::insert_into(cart_items)
                    .values(&NewCartItem {
                        user_id: form.user_id,
                        product_id: form.product_id,
                        quantity: form.quantity,
                    })
                    .execute(conn)?;
            }
        }
        Ok(())
    })
}

pub fn update_cart_item(conn: &mut PgConnection, form: &UpdateCartDto) -> Result<(), StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let item = cart_items
            .filter(id.eq(form.cart_item_id).and(user_id.eq(form.user_id)))
            .for_update()
            .first::<CartItem>(conn)
            .optional()?
            .ok_or(StoreError::NotFound("cart item"))?;
        if form.quantity <= 0 {
            diesel::delete(&item).execute(conn)?;
            return Ok(());
        }
        let product = schema::products::table
            .filter(schema::products::id.eq(item.product_id))
            .first::<Product>(conn)?;
        if product.stock < form.quantity {
            return Err(StoreError::InsufficientStock(product.name));
        }
        diesel::update(&item)
            .set((quantity.eq(form.quantity), updated_at.eq(Utc::now())))
            .execute(conn)?;
        Ok(())
    })
}

pub fn remove_cart_item(
    conn: &mut PgConnection,
    _user_id: i32,
    _cart_item_id: i32,
) -> Result<(), StoreError> {
    let deleted = diesel::delete(
        cart_items.filter(id.eq(_cart_item_id).and(user_id.eq(_user_id))),
    )
    .execute(conn)?;
    if deleted == 0 {
        return Err(StoreError::NotFound("cart item"));
    }
    Ok(())
}

pub fn count_cart_items(conn: &mut PgConnection, _user_id: i32) -> Result<i64, StoreError> {
    let count = cart_items
        .filter(user_id.eq(_user_id))
        .count()
        .get_result(conn)?;
    Ok(count)
}

#[get("/api/cart")]
async fn view_cart(pool: web::Data<DbPool>, params: web::Query<CartQuery>) -> Result<impl Responder> {
    let cart = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_cart_view(&mut conn, params.user_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(cart))
}

#[post("/api/cart/add")]
async fn add_item(pool: web::Data<DbPool>, form: web::Json<AddToCartDto>) -> Result<impl Responder> {
    web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        add_to_cart(&mut conn, &form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(json!({"success": true, "message": "Added to cart"})))
}

#[post("/api/cart/update")]
async fn update_item(
    pool: web::Data<DbPool>,
    form: web::Json<UpdateCartDto>,
) -> Result<impl Responder> {
    web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        update_cart_item(&mut conn, &form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(json!({"success": true})))
}

#[post("/api/cart/remove")]
async fn remove_item(
    pool: web::Data<DbPool>,
    form: web::Json<RemoveFromCartDto>,
) -> Result<impl Responder> {
    web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        remove_cart_item(&mut conn, form.user_id, form.cart_item_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(json!({"success": true})))
}

#[get("/api/cart/count")]
async fn cart_count(pool: web::Data<DbPool>, params: web::Query<CartQuery>) -> Result<impl Responder> {
    let count = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        count_cart_items(&mut conn, params.user_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(json!({"count": count})))
}
