use crate::controllers::{cart, coupons, functions, users};
use crate::insertables::{NewOrder, NewOrderItem};
use actix_web::{get, post, web, HttpResponse, Responder, Result};
use chrono::{Duration, Utc};
use diesel::{prelude::*, r2d2};
use rust_decimal::Decimal;
use schema::orders::dsl::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use storefront_api::error::StoreError;
use storefront_api::models::{Address, Coupon, Order, OrderItem, OrderStatus, Product};
use storefront_api::schema;
type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

const ORDER_NUMBER_ATTEMPTS: u32 = 5;
const ESTIMATED_DELIVERY_DAYS: i64 = 4;
const DEFAULT_PAYMENT_METHOD: &str = "COD";

#[derive(Deserialize)]
pub struct PlaceOrderDto {
    pub user_id: i32,
    pub address_id: i32,
    pub coupon_code: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Deserialize)]
pub struct ApplyCouponDto {
    pub user_id: i32,
    pub coupon_code: String,
}

#[derive(Deserialize)]
pub struct OwnerQuery {
    pub user_id: i32,
}

#[derive(Deserialize)]
pub struct AdminOrderQuery {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct CheckoutView {
    pub items: Vec<cart::CartLine>,
    pub addresses: Vec<Address>,
    pub total_price: Decimal,
}

#[derive(Serialize)]
pub struct OrderLine {
    pub item: OrderItem,
    pub product: Product,
}

#[derive(Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderLine>,
}

/// Snapshot totals at placement time: `(total_amount, discount_amount)`.
/// These are persisted as-is and never recomputed, even if product prices or
/// the coupon change later.
pub fn order_totals(subtotal: Decimal, coupon: Option<&Coupon>) -> (Decimal, Decimal) {
    let discount = coupon
        .map(|c| functions::compute_discount(subtotal, c.discount_percent))
        .unwrap_or(Decimal::ZERO);
    (subtotal - discount, discount)
}

pub fn get_checkout_view(
    conn: &mut PgConnection,
    _user_id: i32,
) -> Result<CheckoutView, StoreError> {
    let view = cart::get_cart_view(conn, _user_id)?;
    if view.items.is_empty() {
        return Err(StoreError::EmptyCart);
    }
    let user_addresses = users::get_user_addresses(conn, _user_id)?;
    Ok(CheckoutView {
        items: view.items,
        addresses: user_addresses,
        total_price: view.total_price,
    })
}

/// Coupon preview for the checkout page. Unlike order placement, an unusable
/// coupon here is an explicit error.
pub fn preview_coupon(
    conn: &mut PgConnection,
    _user_id: i32,
    _coupon_code: &str,
) -> Result<serde_json::Value, StoreError> {
    let lines = cart::load_cart(conn, _user_id)?;
    let subtotal = functions::cart_subtotal(&lines);
    let coupon = coupons::lookup_coupon(conn, _coupon_code, Utc::now())?
        .ok_or(StoreError::CouponInvalid)?;
    let (final_total, discount) = order_totals(subtotal, Some(&coupon));
    Ok(json!({
        "success": true,
        "discount": discount,
        "final_total": final_total,
        "coupon_code": coupon.code,
    }))
}

fn allocate_order_number(conn: &mut PgConnection) -> Result<String, StoreError> {
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let candidate = functions::generate_order_number();
        let taken: bool = diesel::select(diesel::dsl::exists(
            orders.filter(order_number.eq(&candidate)),
        ))
        .get_result(conn)?;
        if !taken {
            return Ok(candidate);
        }
    }
    Err(StoreError::OrderCreationFailed)
}

fn place_order_attempt(
    conn: &mut PgConnection,
    form: &PlaceOrderDto,
) -> Result<Order, StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let lines = cart::load_cart(conn, form.user_id)?;
        if lines.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        let address = schema::addresses::table
            .filter(schema::addresses::id.eq(form.address_id))
            .first::<Address>(conn)
            .optional()?
            .ok_or(StoreError::NotFound("address"))?;
        if address.user_id != form.user_id {
            return Err(StoreError::Forbidden("address"));
        }

        let subtotal = functions::cart_subtotal(&lines);
        let now = Utc::now();

        // An unusable coupon at this point means the order goes through at
        // full price; only the preview endpoint reports CouponInvalid.
        let coupon = match form.coupon_code.as_deref() {
            Some(submitted) => coupons::lookup_coupon(conn, submitted, now)?,
            None => None,
        };
        let (_total_amount, _discount_amount) = order_totals(subtotal, coupon.as_ref());

        let order: Order = diesel::insert_into(orders)
            .values(&NewOrder {
                order_number: allocate_order_number(conn)?,
                user_id: form.user_id,
                address_id: address.id,
                status: OrderStatus::Placed.as_str().to_owned(),
                payment_method: form
                    .payment_method
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_owned()),
                total_amount: _total_amount,
                discount_amount: _discount_amount,
                coupon_code: form.coupon_code.clone(),
                estimated_delivery: (now + Duration::days(ESTIMATED_DELIVERY_DAYS)).date_naive(),
            })
            .get_result(conn)?;

        for (item, product) in &lines {
            diesel::insert_into(schema::order_items::table)
                .values(&NewOrderItem {
                    order_id: order.id,
                    product_id: product.id,
                    quantity: item.quantity,
                    price: product.current_price(),
                    total: functions::line_total(product, item.quantity),
                })
                .execute(conn)?;

            // Conditional decrement: refuses to drive stock negative even
            // under concurrent checkouts, and rolls the whole order back.
            let decremented = diesel::update(
                schema::products::table.filter(
                    schema::products::id
                        .eq(product.id)
                        .and(schema::products::stock.ge(item.quantity)),
                ),
            )
            .set((
                schema::products::stock.eq(schema::products::stock - item.quantity),
                schema::products::updated_at.eq(now),
            ))
            .execute(conn)?;
            if decremented == 0 {
                return Err(StoreError::InsufficientStock(product.name.clone()));
            }
        }

        diesel::delete(
            schema::cart_items::table.filter(schema::cart_items::user_id.eq(form.user_id)),
        )
        .execute(conn)?;

        Ok(order)
    })
}

pub fn place_new_order(conn: &mut PgConnection, form: &PlaceOrderDto) -> Result<Order, StoreError> {
    // A lost stock race aborts the first transaction; one more attempt runs
    // against the post-race stock before the failure is reported.
    let outcome = match place_order_attempt(conn, form) {
        Err(StoreError::InsufficientStock(_)) => place_order_attempt(conn, form),
        outcome => outcome,
    };
    if let Ok(order) = &outcome {
        tracing::info!(
            order_number = %order.order_number,
            user_id = form.user_id,
            total = %order.total_amount,
            "order placed"
        );
    }
    outcome
}

pub fn get_all_orders(
    conn: &mut PgConnection,
    filter: &AdminOrderQuery,
) -> Result<Vec<Order>, StoreError> {
    let mut query = orders.select(Order::as_select()).into_boxed();
    if let Some(wanted) = filter.status.as_deref() {
        let parsed =
            OrderStatus::parse(wanted).ok_or_else(|| StoreError::InvalidStatus(wanted.into()))?;
        query = query.filter(status.eq(parsed.as_str()));
    }
    let all_orders = query.order(created_at.desc()).load(conn)?;
    Ok(all_orders)
}

pub fn get_orders_for_user(
    conn: &mut PgConnection,
    _user_id: i32,
) -> Result<Vec<Order>, StoreError> {
    let user_orders = orders
        .filter(user_id.eq(_user_id))
        .order(created_at.desc())
        .select(Order::as_select())
        .load(conn)?;
    Ok(user_orders)
}

pub fn get_order_for_user(
    conn: &mut PgConnection,
    _user_id: i32,
    _order_id: i32,
) -> Result<Order, StoreError> {
    orders
        .filter(id.eq(_order_id).and(user_id.eq(_user_id)))
        .first::<Order>(conn)
        .optional()?
        .ok_or(StoreError::NotFound("order"))
}

pub fn get_order_detail(
    conn: &mut PgConnection,
    _user_id: i32,
    _order_id: i32,
) -> Result<OrderDetail, StoreError> {
    let order = get_order_for_user(conn, _user_id, _order_id)?;
    let lines: Vec<(OrderItem, Product)> = schema::order_items::table
        .inner_join(schema::products::table)
        .filter(schema::order_items::order_id.eq(order.id))
        .select((OrderItem::as_select(), Product::as_select()))
        .load(conn)?;
    Ok(OrderDetail {
        order,
        items: lines
            .into_iter()
            .map(|(item, product)| OrderLine { item, product })
            .collect(),
    })
}

#[get("/api/orders/checkout")]
async fn checkout(pool: web::Data<DbPool>, params: web::Query<OwnerQuery>) -> Result<impl Responder> {
    let view = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_checkout_view(&mut conn, params.user_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/orders/apply_coupon")]
async fn apply_coupon(
    pool: web::Data<DbPool>,
    form: web::Json<ApplyCouponDto>,
) -> Result<impl Responder> {
    let preview = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        preview_coupon(&mut conn, form.user_id, &form.coupon_code)
    })
    .await??;
    Ok(HttpResponse::Ok().json(preview))
}

#[post("/api/orders")]
async fn place_order(
    pool: web::Data<DbPool>,
    form: web::Json<PlaceOrderDto>,
) -> Result<impl Responder> {
    let order = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        place_new_order(&mut conn, &form)
    })
    .await??;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "order_number": order.order_number,
        "redirect_url": format!("/orders/order-confirmation/{}/", order.id),
    })))
}

#[get("/api/orders")]
async fn get_orders(pool: web::Data<DbPool>, params: web::Query<OwnerQuery>) -> Result<impl Responder> {
    let user_orders = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_orders_for_user(&mut conn, params.user_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(user_orders))
}

#[get("/api/orders/{order_id}")]
async fn get_order(
    pool: web::Data<DbPool>,
    order_id: web::Path<i32>,
    params: web::Query<OwnerQuery>,
) -> Result<impl Responder> {
    let detail = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_order_detail(&mut conn, params.user_id, *order_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/api/orders/{order_id}/confirmation")]
async fn order_confirmation(
    pool: web::Data<DbPool>,
    order_id: web::Path<i32>,
    params: web::Query<OwnerQuery>,
) -> Result<impl Responder> {
    let order = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_order_for_user(&mut conn, params.user_id, *order_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(json!({"success": true, "order": order})))
}

#[get("/api/admin/orders")]
async fn admin_orders(
    pool: web::Data<DbPool>,
    params: web::Query<AdminOrderQuery>,
) -> Result<impl Responder> {
    let all_orders = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_all_orders(&mut conn, &params)
    })
    .await??;
    Ok(HttpResponse::Ok().json(all_orders))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn coupon(percent: i32) -> Coupon {
        Coupon {
            id: 1,
            code: "SAVE10".to_string(),
            discount_percent: percent,
            valid_from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            valid_to: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn totals_without_coupon_keep_full_price() {
        let (total, discount) = order_totals(Decimal::new(2500, 2), None);
        assert_eq!(total, Decimal::new(2500, 2));
        assert_eq!(discount, Decimal::ZERO);
    }

    #[test]
    fn totals_with_ten_percent_coupon() {
        let (total, discount) = order_totals(Decimal::new(2500, 2), Some(&coupon(10)));
        assert_eq!(discount, Decimal::new(250, 2));
        assert_eq!(total, Decimal::new(2250, 2));
    }

    #[test]
    fn totals_always_recompose_to_subtotal() {
        for percent in [0, 3, 10, 33, 100] {
            let subtotal = Decimal::new(9999, 2);
            let (total, discount) = order_totals(subtotal, Some(&coupon(percent)));
            assert_eq!(total + discount, subtotal);
        }
    }
}
